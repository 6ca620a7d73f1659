// src/inspect/fixtures.rs
//
// In-memory Parquet images for tests.

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::sync::Arc;

/// Write `batches` with the given writer properties into a byte buffer.
pub fn write(schema: Arc<ArrowSchema>, batches: &[RecordBatch], props: WriterProperties) -> Bytes {
    let mut buf = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buf, schema, Some(props)).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.close().unwrap();
    }
    Bytes::from(buf)
}

pub fn props(with_stats: bool) -> WriterProperties {
    let level = if with_stats {
        EnabledStatistics::Chunk
    } else {
        EnabledStatistics::None
    };
    WriterProperties::builder()
        .set_statistics_enabled(level)
        .build()
}

pub fn ab_schema() -> Arc<ArrowSchema> {
    Arc::new(ArrowSchema::new(vec![
        Field::new("a", DataType::Int64, true),
        Field::new("b", DataType::Utf8, true),
    ]))
}

/// `{a: int64, b: string}` with rows (1, "x"), (2, "y"), (3, "z").
pub fn ab_file(with_stats: bool) -> Bytes {
    let schema = ab_schema();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
            Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef,
        ],
    )
    .unwrap();
    write(schema, &[batch], props(with_stats))
}

/// Schema `{a: int64, b: string}` but no row groups at all.
pub fn empty_file() -> Bytes {
    write(ab_schema(), &[], props(true))
}

/// Strings only, so no numeric summary.
pub fn text_only_file() -> Bytes {
    let schema = Arc::new(ArrowSchema::new(vec![
        Field::new("city", DataType::Utf8, false),
        Field::new("code", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["Adelaide", "Brisbane"])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("SA1"), None])) as ArrayRef,
        ],
    )
    .unwrap();
    write(schema, &[batch], props(true))
}

/// Five rows split into row groups of two, with a nullable float column.
pub fn multi_row_group_file() -> Bytes {
    let schema = Arc::new(ArrowSchema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("price", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![10, 20, 30, 40, 50])) as ArrayRef,
            Arc::new(Float64Array::from(vec![
                Some(1.5),
                None,
                Some(-2.0),
                Some(4.25),
                None,
            ])) as ArrayRef,
        ],
    )
    .unwrap();
    let props = WriterProperties::builder()
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .set_max_row_group_size(2)
        .build();
    write(schema, &[batch], props)
}
