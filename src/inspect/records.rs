// src/inspect/records.rs

use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use serde_json::{Map, Value};
use tracing::debug;

use super::footer::Footer;
use super::values::cell_value;
use crate::error::{ParseError, ParseOutcome};

/// One materialized row: column name → JSON scalar, in schema order.
pub type Record = Map<String, Value>;

/// Every row group of the file decoded into Arrow batches.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl DecodedTable {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// Decode all column data, reusing the already parsed footer.
pub fn decode_table(bytes: Bytes, footer: &Footer, batch_size: usize) -> ParseOutcome<DecodedTable> {
    let arrow_meta = ArrowReaderMetadata::try_new(footer.parquet_arc(), ArrowReaderOptions::new())
        .map_err(ParseError::format)?;

    let builder =
        ParquetRecordBatchReaderBuilder::new_with_metadata(bytes, arrow_meta).with_batch_size(batch_size);
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(ParseError::decode)?;

    let batches = reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(ParseError::decode)?;
    let table = DecodedTable { schema, batches };

    let declared = footer.metadata.num_rows;
    if table.num_rows() as u64 != declared {
        return Err(ParseError::Decode(format!(
            "decoded {} rows but the footer declares {}",
            table.num_rows(),
            declared
        )));
    }

    debug!(batches = table.batches.len(), rows = declared, "decoded column data");
    Ok(table)
}

/// Turn the decoded batches into row-oriented records, preserving file order.
pub fn to_records(table: &DecodedTable) -> ParseOutcome<Vec<Record>> {
    let names: Vec<&String> = table.schema.fields().iter().map(|f| f.name()).collect();
    let mut records = Vec::with_capacity(table.num_rows());

    for batch in &table.batches {
        for row in 0..batch.num_rows() {
            let mut record = Map::with_capacity(names.len());
            for (name, column) in names.iter().zip(batch.columns()) {
                let value = cell_value(column.as_ref(), row).map_err(ParseError::decode)?;
                record.insert((*name).clone(), value);
            }
            records.push(record);
        }
    }
    Ok(records)
}
