//! Parquet inspection pipeline: footer → schema → row-group statistics →
//! records and summary. Every stage runs once per call and any failure aborts
//! the whole parse with a single error.

pub mod footer;
pub mod records;
pub mod row_group;
pub mod schema;
pub mod summary;
pub mod values;

#[cfg(test)]
pub(crate) mod fixtures;

use bytes::Bytes;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::{ErrorKind, ParseError, ParseOutcome};

pub use footer::{read_footer, FileMetadata, Footer};
pub use records::{decode_table, to_records, DecodedTable, Record};
pub use row_group::{
    all_row_group_stats, first_row_group_stats, row_group_stats, ColumnStats, RowGroupMetadata,
};
pub use schema::{extract_schema, schema_entries, type_name, SchemaField, SchemaMap, TableSchema};
pub use summary::{describe, NumericSummary, SummaryStats};

/// Knobs for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub batch_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Serialize)]
pub struct ParquetReport {
    pub schema: SchemaMap,
    pub metadata: FileMetadata,
    pub row_group_metadata: RowGroupMetadata,
    pub data: Vec<Record>,
    pub summary: SummaryStats,
}

/// Either a full report or `{"error": "<message>"}`, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ParseResult {
    Parsed(Box<ParquetReport>),
    Failed { error: String },
}

impl ParseResult {
    pub fn report(&self) -> Option<&ParquetReport> {
        match self {
            ParseResult::Parsed(report) => Some(report),
            ParseResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ParseResult::Parsed(_) => None,
            ParseResult::Failed { error } => Some(error),
        }
    }
}

impl From<ParseOutcome<ParquetReport>> for ParseResult {
    fn from(outcome: ParseOutcome<ParquetReport>) -> Self {
        match outcome {
            Ok(report) => ParseResult::Parsed(Box::new(report)),
            Err(e) => ParseResult::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Parse a complete Parquet image with default options.
pub fn parse(bytes: Bytes) -> ParseResult {
    try_parse(bytes, ParseOptions::default()).into()
}

/// Parse a complete Parquet image, keeping the error kind. Panics raised by
/// the decoders are caught and reported as [`ErrorKind::Internal`].
#[instrument(level = "info", skip(bytes, opts), fields(size = bytes.len()))]
pub fn try_parse(bytes: Bytes, opts: ParseOptions) -> ParseOutcome<ParquetReport> {
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(bytes, opts)))
        .unwrap_or_else(|payload| Err(ParseError::from_panic(payload)));

    match &outcome {
        Ok(report) => debug!(
            rows = report.metadata.num_rows,
            elapsed = ?start.elapsed(),
            "parsed"
        ),
        Err(e) if e.kind() == ErrorKind::Internal => {
            warn!(error = %e, "reader fault while parsing")
        }
        Err(e) => warn!(kind = ?e.kind(), error = %e, "parse failed"),
    }
    outcome
}

fn run_pipeline(bytes: Bytes, opts: ParseOptions) -> ParseOutcome<ParquetReport> {
    let footer = read_footer(&bytes)?;
    let schema = extract_schema(&footer)?;
    let row_group_metadata = first_row_group_stats(footer.parquet())?;

    let table = decode_table(bytes, &footer, opts.batch_size)?;
    let data = to_records(&table)?;
    let summary = describe(&table)?;

    Ok(ParquetReport {
        schema: schema.map,
        metadata: footer.metadata,
        row_group_metadata,
        data,
        summary,
    })
}

/// Footer integers are signed; negative values mean a corrupt file.
pub(crate) fn non_negative(value: i64, what: &str) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("Invalid Parquet file. Negative {}: {}", what, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        ArrayRef, BinaryArray, BooleanArray, Decimal128Array, Decimal256Array, Int64Array,
        StructArray, TimestampMicrosecondArray, TimestampNanosecondArray,
    };
    use arrow::datatypes::{i256, DataType, Field, Fields, Schema as ArrowSchema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn round_trip_ab_file() {
        let result = parse(fixtures::ab_file(true));
        let report = result.report().expect("parse should succeed");

        assert_eq!(report.schema.entries(), vec![("a", "int64"), ("b", "string")]);
        assert_eq!(report.metadata.num_rows, 3);
        assert_eq!(report.data.len() as u64, report.metadata.num_rows);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["schema"], json!({"a": "int64", "b": "string"}));
        assert_eq!(
            json["data"],
            json!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}, {"a": 3, "b": "z"}])
        );
        assert_eq!(json["metadata"]["num_row_groups"], json!(1));
        assert_eq!(json["metadata"]["num_columns"], json!(2));
        assert_eq!(json["row_group_metadata"]["row_count"], json!(3));
        assert_eq!(
            json["row_group_metadata"]["columns"]["a"],
            json!({"min": 1, "max": 3, "null_count": 0})
        );
        assert_eq!(json["summary"]["a"]["50%"], json!(2.0));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn every_schema_column_has_stats_keys() {
        for bytes in [fixtures::ab_file(true), fixtures::ab_file(false)] {
            let json = serde_json::to_value(parse(bytes)).unwrap();
            let schema = json["schema"].as_object().unwrap();
            let columns = json["row_group_metadata"]["columns"].as_object().unwrap();
            assert_eq!(schema.len(), columns.len());
            for name in schema.keys() {
                let stats = columns[name].as_object().unwrap();
                for key in ["min", "max", "null_count"] {
                    assert!(stats.contains_key(key), "{} missing {}", name, key);
                }
            }
        }
    }

    #[test]
    fn statistics_absence_is_null() {
        let json = serde_json::to_value(parse(fixtures::ab_file(false))).unwrap();
        let columns = json["row_group_metadata"]["columns"].as_object().unwrap();
        for (_, stats) in columns {
            assert_eq!(stats, &json!({"min": null, "max": null, "null_count": null}));
        }
    }

    #[test]
    fn zero_row_groups() {
        let json = serde_json::to_value(parse(fixtures::empty_file())).unwrap();
        assert_eq!(
            json["row_group_metadata"],
            json!({"row_count": 0, "total_byte_size": 0, "columns": {}})
        );
        assert_eq!(json["data"], json!([]));
        assert_eq!(json["summary"], json!({}));
        assert_eq!(json["metadata"]["num_rows"], json!(0));
        assert_eq!(json["metadata"]["num_row_groups"], json!(0));
        assert_eq!(json["schema"], json!({"a": "int64", "b": "string"}));
    }

    #[test]
    fn summary_excludes_non_numeric() {
        let json = serde_json::to_value(parse(fixtures::text_only_file())).unwrap();
        assert_eq!(json["summary"], json!({}));
        assert_eq!(json["data"][1], json!({"city": "Brisbane", "code": null}));
    }

    #[test]
    fn random_bytes_yield_single_error_key() {
        let garbage: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let result = parse(Bytes::from(garbage));
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj["error"].is_string());

        let err = try_parse(Bytes::new(), ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn truncated_file_is_an_error() {
        let bytes = fixtures::ab_file(true);
        let truncated = bytes.slice(0..bytes.len() / 2);
        let result = parse(truncated);
        assert!(result.error().is_some());
    }

    #[test]
    fn temporal_and_boolean_columns() {
        let schema = Arc::new(ArrowSchema::new(vec![
            Field::new("at", DataType::Timestamp(TimeUnit::Nanosecond, None), true),
            Field::new("ok", DataType::Boolean, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(TimestampNanosecondArray::from(vec![Some(0), None])) as ArrayRef,
                Arc::new(BooleanArray::from(vec![Some(true), Some(false)])) as ArrayRef,
            ],
        )
        .unwrap();
        let bytes = fixtures::write(schema, &[batch], fixtures::props(true));
        let json = serde_json::to_value(parse(bytes)).unwrap();

        assert_eq!(
            json["schema"],
            json!({"at": "timestamp[ns]", "ok": "bool"})
        );
        assert_eq!(json["data"][0]["at"], json!("1970-01-01T00:00:00"));
        assert_eq!(json["data"][1]["at"], Value::Null);
        assert_eq!(json["data"][0]["ok"], json!(true));
        assert_eq!(json["summary"], json!({}));
        assert_eq!(
            json["row_group_metadata"]["columns"]["ok"],
            json!({"min": false, "max": true, "null_count": 0})
        );
    }

    fn parse_single_batch(fields: Vec<Field>, columns: Vec<ArrayRef>) -> Value {
        let schema = Arc::new(ArrowSchema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let bytes = fixtures::write(schema, &[batch], fixtures::props(true));
        serde_json::to_value(parse(bytes)).unwrap()
    }

    #[test]
    fn zoned_timestamps_match_statistics() {
        let at = TimestampMicrosecondArray::from(vec![1_704_067_200_000_000, 1_704_067_201_500_000])
            .with_timezone("UTC");
        let json = parse_single_batch(
            vec![Field::new(
                "at",
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
                true,
            )],
            vec![Arc::new(at) as ArrayRef],
        );

        assert!(json.get("error").is_none(), "{}", json);
        assert_eq!(json["schema"], json!({"at": "timestamp[us, tz=UTC]"}));
        assert_eq!(
            json["data"],
            json!([{"at": "2024-01-01T00:00:00Z"}, {"at": "2024-01-01T00:00:01.500Z"}])
        );
        let stats = &json["row_group_metadata"]["columns"]["at"];
        assert_eq!(stats["min"], json["data"][0]["at"]);
        assert_eq!(stats["max"], json["data"][1]["at"]);
    }

    #[test]
    fn decimal_columns_are_strings() {
        let small = Decimal128Array::from(vec![12345, -150])
            .with_precision_and_scale(9, 2)
            .unwrap();
        let wide = Decimal256Array::from(vec![i256::from_i128(12345), i256::from_i128(-150)])
            .with_precision_and_scale(50, 2)
            .unwrap();
        let json = parse_single_batch(
            vec![
                Field::new("small", DataType::Decimal128(9, 2), true),
                Field::new("wide", DataType::Decimal256(50, 2), true),
            ],
            vec![Arc::new(small) as ArrayRef, Arc::new(wide) as ArrayRef],
        );

        assert_eq!(
            json["schema"],
            json!({"small": "decimal128(9, 2)", "wide": "decimal256(50, 2)"})
        );
        assert_eq!(
            json["data"],
            json!([
                {"small": "123.45", "wide": "123.45"},
                {"small": "-1.50", "wide": "-1.50"}
            ])
        );
        for name in ["small", "wide"] {
            assert_eq!(
                json["row_group_metadata"]["columns"][name],
                json!({"min": "-1.50", "max": "123.45", "null_count": 0})
            );
        }
        assert_eq!(json["summary"], json!({}));
    }

    #[test]
    fn binary_columns_are_hex() {
        let blobs = BinaryArray::from(vec![&b"\x01\xab"[..], &b"abc"[..]]);
        let json = parse_single_batch(
            vec![Field::new("blob", DataType::Binary, true)],
            vec![Arc::new(blobs) as ArrayRef],
        );

        assert_eq!(json["schema"], json!({"blob": "binary"}));
        assert_eq!(json["data"], json!([{"blob": "01ab"}, {"blob": "616263"}]));
        assert_eq!(
            json["row_group_metadata"]["columns"]["blob"],
            json!({"min": "01ab", "max": "616263", "null_count": 0})
        );
    }

    #[test]
    fn struct_columns_report_leaf_statistics() {
        let fields = Fields::from(vec![
            Field::new("x", DataType::Int64, true),
            Field::new("y", DataType::Int64, true),
        ]);
        let strct = StructArray::new(
            fields.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
                Arc::new(Int64Array::from(vec![10, 20])) as ArrayRef,
            ],
            None,
        );
        let json = parse_single_batch(
            vec![Field::new("s", DataType::Struct(fields), true)],
            vec![Arc::new(strct) as ArrayRef],
        );

        assert_eq!(json["schema"], json!({"s": "struct<x: int64, y: int64>"}));
        assert_eq!(json["data"][1], json!({"s": {"x": 2, "y": 20}}));
        let columns = json["row_group_metadata"]["columns"].as_object().unwrap();
        assert_eq!(
            columns.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["s.x", "s.y"]
        );
        assert_eq!(columns["s.x"], json!({"min": 1, "max": 2, "null_count": 0}));
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert_eq!(non_negative(5, "rows"), Ok(5));
        assert!(non_negative(-1, "rows").unwrap_err().contains("Negative rows"));
    }
}
