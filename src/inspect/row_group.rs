// src/inspect/row_group.rs

use half::f16;
use parquet::basic::{ConvertedType, LogicalType, TimeUnit};
use parquet::data_type::{ByteArray, FixedLenByteArray};
use parquet::file::metadata::{ColumnChunkMetaData, ParquetMetaData, RowGroupMetaData};
use parquet::file::statistics::Statistics;
use parquet::schema::types::ColumnDescriptor;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::non_negative;
use super::values::{self, text_or_null, Precision};
use crate::error::{ParseError, ParseOutcome};

/// Chunk-level statistics for one column. Every field is serialized, with
/// `null` standing for "not recorded in the file".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub null_count: Option<u64>,
}

impl ColumnStats {
    /// Marker for a chunk without any statistics.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Statistics of one row group, keyed by column path in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowGroupMetadata {
    pub row_count: u64,
    pub total_byte_size: u64,
    #[serde(serialize_with = "serialize_columns")]
    pub columns: Vec<(String, ColumnStats)>,
}

impl RowGroupMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stats)| stats)
    }
}

fn serialize_columns<S: Serializer>(
    columns: &[(String, ColumnStats)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(columns.len()))?;
    for (name, stats) in columns {
        map.serialize_entry(name, stats)?;
    }
    map.end()
}

/// Statistics of the first row group, or an empty record when the file has none.
pub fn first_row_group_stats(metadata: &ParquetMetaData) -> ParseOutcome<RowGroupMetadata> {
    Ok(row_group_stats(metadata, 0)?.unwrap_or_default())
}

/// Statistics of row group `index`; `None` when the index is past the end.
pub fn row_group_stats(
    metadata: &ParquetMetaData,
    index: usize,
) -> ParseOutcome<Option<RowGroupMetadata>> {
    if index >= metadata.num_row_groups() {
        debug!(index, row_groups = metadata.num_row_groups(), "no such row group");
        return Ok(None);
    }
    summarize_row_group(metadata.row_group(index)).map(Some)
}

/// Statistics of every row group in file order.
pub fn all_row_group_stats(metadata: &ParquetMetaData) -> ParseOutcome<Vec<RowGroupMetadata>> {
    metadata
        .row_groups()
        .iter()
        .map(summarize_row_group)
        .collect()
}

fn summarize_row_group(rg: &RowGroupMetaData) -> ParseOutcome<RowGroupMetadata> {
    let columns = rg
        .columns()
        .iter()
        .map(|chunk| (chunk.column_path().string(), chunk_stats(chunk)))
        .collect();

    Ok(RowGroupMetadata {
        row_count: non_negative(rg.num_rows(), "row group num_rows").map_err(ParseError::Format)?,
        total_byte_size: non_negative(rg.total_byte_size(), "row group total_byte_size")
            .map_err(ParseError::Format)?,
        columns,
    })
}

/// Decide once per chunk which statistics are present.
pub fn chunk_stats(chunk: &ColumnChunkMetaData) -> ColumnStats {
    let Some(stats) = chunk.statistics() else {
        return ColumnStats::absent();
    };
    let (min, max) = match min_max(stats, chunk.column_descr()) {
        Some((min, max)) => (Some(min), Some(max)),
        None => (None, None),
    };
    ColumnStats {
        min,
        max,
        null_count: stats.null_count_opt(),
    }
}

/// Min and max decoded per the column's type, only when both are set.
fn min_max(stats: &Statistics, descr: &ColumnDescriptor) -> Option<(Value, Value)> {
    match stats {
        Statistics::Boolean(s) => pair(s.min_opt(), s.max_opt(), |v| Value::Bool(*v)),
        Statistics::Int32(s) => pair(s.min_opt(), s.max_opt(), |v| int32_value(*v, descr)),
        Statistics::Int64(s) => pair(s.min_opt(), s.max_opt(), |v| int64_value(*v, descr)),
        Statistics::Int96(s) => pair(s.min_opt(), s.max_opt(), |v| {
            text_or_null(values::int96_timestamp(v.data()))
        }),
        Statistics::Float(s) => pair(s.min_opt(), s.max_opt(), |v| {
            values::float_value(*v as f64)
        }),
        Statistics::Double(s) => pair(s.min_opt(), s.max_opt(), |v| values::float_value(*v)),
        Statistics::ByteArray(s) => pair(s.min_opt(), s.max_opt(), |v| {
            byte_array_value(v, descr)
        }),
        Statistics::FixedLenByteArray(s) => pair(s.min_opt(), s.max_opt(), |v| {
            fixed_len_value(v, descr)
        }),
    }
}

fn pair<T, F>(min: Option<&T>, max: Option<&T>, render: F) -> Option<(Value, Value)>
where
    F: Fn(&T) -> Value,
{
    match (min, max) {
        (Some(min), Some(max)) => Some((render(min), render(max))),
        _ => None,
    }
}

/// `(precision, scale)` of a decimal column.
fn decimal_params(descr: &ColumnDescriptor) -> Option<(u8, i8)> {
    let (precision, scale) = match descr.logical_type() {
        Some(LogicalType::Decimal { scale, precision }) => (precision, scale),
        Some(_) => return None,
        None if descr.converted_type() == ConvertedType::DECIMAL => {
            (descr.type_precision(), descr.type_scale())
        }
        None => return None,
    };
    Some((u8::try_from(precision).ok()?, i8::try_from(scale).ok()?))
}

fn precision_of(unit: &TimeUnit) -> Precision {
    match unit {
        TimeUnit::MILLIS(_) => Precision::Millis,
        TimeUnit::MICROS(_) => Precision::Micros,
        TimeUnit::NANOS(_) => Precision::Nanos,
    }
}

fn int32_value(v: i32, descr: &ColumnDescriptor) -> Value {
    if let Some((precision, scale)) = decimal_params(descr) {
        return Value::String(values::decimal_from_i128(v as i128, precision, scale));
    }
    match (descr.logical_type(), descr.converted_type()) {
        (Some(LogicalType::Date), _) | (None, ConvertedType::DATE) => {
            text_or_null(values::date_from_days(v))
        }
        (Some(LogicalType::Time { unit, .. }), _) => {
            text_or_null(values::time_of_day(v as i64, precision_of(&unit)))
        }
        (None, ConvertedType::TIME_MILLIS) => {
            text_or_null(values::time_of_day(v as i64, Precision::Millis))
        }
        (
            Some(LogicalType::Integer {
                is_signed: false, ..
            }),
            _,
        )
        | (None, ConvertedType::UINT_8 | ConvertedType::UINT_16 | ConvertedType::UINT_32) => {
            Value::from(v as u32)
        }
        _ => Value::from(v),
    }
}

fn int64_value(v: i64, descr: &ColumnDescriptor) -> Value {
    if let Some((precision, scale)) = decimal_params(descr) {
        return Value::String(values::decimal_from_i128(v as i128, precision, scale));
    }
    match (descr.logical_type(), descr.converted_type()) {
        (
            Some(LogicalType::Timestamp {
                is_adjusted_to_u_t_c,
                unit,
            }),
            _,
        ) => text_or_null(values::timestamp(v, precision_of(&unit), is_adjusted_to_u_t_c)),
        (None, ConvertedType::TIMESTAMP_MILLIS) => {
            text_or_null(values::timestamp(v, Precision::Millis, true))
        }
        (None, ConvertedType::TIMESTAMP_MICROS) => {
            text_or_null(values::timestamp(v, Precision::Micros, true))
        }
        (Some(LogicalType::Time { unit, .. }), _) => {
            text_or_null(values::time_of_day(v, precision_of(&unit)))
        }
        (None, ConvertedType::TIME_MICROS) => {
            text_or_null(values::time_of_day(v, Precision::Micros))
        }
        (
            Some(LogicalType::Integer {
                is_signed: false, ..
            }),
            _,
        )
        | (None, ConvertedType::UINT_64) => Value::from(v as u64),
        _ => Value::from(v),
    }
}

fn decimal_bytes_value(bytes: &[u8], precision: u8, scale: i8) -> Value {
    Value::String(
        values::decimal_from_be_bytes(bytes, precision, scale)
            .unwrap_or_else(|| values::hex(bytes)),
    )
}

fn is_textual(descr: &ColumnDescriptor) -> bool {
    match descr.logical_type() {
        Some(LogicalType::String | LogicalType::Enum | LogicalType::Json) => true,
        Some(_) => false,
        None => matches!(
            descr.converted_type(),
            ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON
        ),
    }
}

fn byte_array_value(v: &ByteArray, descr: &ColumnDescriptor) -> Value {
    let bytes = v.data();
    if let Some((precision, scale)) = decimal_params(descr) {
        return decimal_bytes_value(bytes, precision, scale);
    }
    if is_textual(descr) {
        return Value::String(String::from_utf8_lossy(bytes).into_owned());
    }
    // unannotated byte arrays decode as binary, so hex like the row values
    Value::String(values::hex(bytes))
}

fn fixed_len_value(v: &FixedLenByteArray, descr: &ColumnDescriptor) -> Value {
    let bytes = v.data();
    if let Some((precision, scale)) = decimal_params(descr) {
        return decimal_bytes_value(bytes, precision, scale);
    }
    match descr.logical_type() {
        Some(LogicalType::Float16) if bytes.len() == 2 => {
            values::float_value(f16::from_le_bytes([bytes[0], bytes[1]]).to_f64())
        }
        _ => Value::String(values::hex(bytes)),
    }
}
