// src/inspect/values.rs
//
// Scalar → JSON conversion shared by statistics and records.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    i256, DataType, Date32Type, Date64Type, Decimal128Type, Decimal256Type, DecimalType,
    Float16Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    Time32MillisecondType, Time32SecondType, Time64MicrosecondType, Time64NanosecondType,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
/// Julian day number of 1970-01-01.
const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// Finite floats become numbers; NaN and ±inf become `null`.
pub fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Plain decimal string for a Parquet decimal stored as big-endian two's
/// complement. `None` when the value is wider than 256 bits.
pub fn decimal_from_be_bytes(bytes: &[u8], precision: u8, scale: i8) -> Option<String> {
    let fill = match bytes.first() {
        Some(b) if b & 0x80 != 0 => 0xFF,
        _ => 0x00,
    };
    match bytes.len() {
        0..=16 => {
            let mut buf = [fill; 16];
            buf[16 - bytes.len()..].copy_from_slice(bytes);
            Some(decimal_from_i128(i128::from_be_bytes(buf), precision, scale))
        }
        17..=32 => {
            let mut buf = [fill; 32];
            buf[32 - bytes.len()..].copy_from_slice(bytes);
            Some(Decimal256Type::format_decimal(
                i256::from_be_bytes(buf),
                precision,
                scale,
            ))
        }
        _ => None,
    }
}

pub fn decimal_from_i128(unscaled: i128, precision: u8, scale: i8) -> String {
    Decimal128Type::format_decimal(unscaled, precision, scale)
}

pub fn date_from_days(days: i32) -> Option<String> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl Precision {
    fn per_second(self) -> i64 {
        match self {
            Precision::Seconds => 1,
            Precision::Millis => 1_000,
            Precision::Micros => 1_000_000,
            Precision::Nanos => 1_000_000_000,
        }
    }
}

/// ISO 8601 timestamp. UTC-adjusted values (and any zoned Arrow timestamp,
/// which stores UTC instants) carry a trailing `Z`.
pub fn timestamp(value: i64, precision: Precision, utc: bool) -> Option<String> {
    let dt: DateTime<Utc> = match precision {
        Precision::Seconds => DateTime::<Utc>::from_timestamp(value, 0)?,
        Precision::Millis => DateTime::<Utc>::from_timestamp_millis(value)?,
        Precision::Micros => DateTime::<Utc>::from_timestamp_micros(value)?,
        Precision::Nanos => DateTime::<Utc>::from_timestamp_nanos(value),
    };
    Some(if utc {
        dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    } else {
        dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    })
}

/// Time of day since midnight.
pub fn time_of_day(value: i64, precision: Precision) -> Option<String> {
    let per_sec = precision.per_second();
    let secs = u32::try_from(value.div_euclid(per_sec)).ok()?;
    let frac = value.rem_euclid(per_sec);
    let nanos = (frac * (1_000_000_000 / per_sec)) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .map(|t| t.format("%H:%M:%S%.f").to_string())
}

/// Legacy INT96 timestamps: nanoseconds of day in the low 8 bytes,
/// Julian day in the high 4.
pub fn int96_timestamp(words: &[u32]) -> Option<String> {
    if words.len() != 3 {
        return None;
    }
    let nanos_of_day = ((words[1] as i64) << 32) | words[0] as i64;
    let days = words[2] as i64 - JULIAN_DAY_OF_EPOCH;
    let nanos = days
        .checked_mul(NANOS_PER_DAY)?
        .checked_add(nanos_of_day)?;
    timestamp(nanos, Precision::Nanos, false)
}

impl From<&TimeUnit> for Precision {
    fn from(unit: &TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => Precision::Seconds,
            TimeUnit::Millisecond => Precision::Millis,
            TimeUnit::Microsecond => Precision::Micros,
            TimeUnit::Nanosecond => Precision::Nanos,
        }
    }
}

pub(crate) fn text_or_null(s: Option<String>) -> Value {
    s.map(Value::String).unwrap_or(Value::Null)
}

fn timestamp_cell(array: &dyn Array, row: usize, unit: &TimeUnit, zoned: bool) -> Value {
    let raw = match unit {
        TimeUnit::Second => array.as_primitive::<TimestampSecondType>().value(row),
        TimeUnit::Millisecond => array.as_primitive::<TimestampMillisecondType>().value(row),
        TimeUnit::Microsecond => array.as_primitive::<TimestampMicrosecondType>().value(row),
        TimeUnit::Nanosecond => array.as_primitive::<TimestampNanosecondType>().value(row),
    };
    text_or_null(timestamp(raw, unit.into(), zoned))
}

/// JSON value of `array[row]`.
///
/// Integers and floats map to numbers, booleans to booleans, strings to
/// strings, binary to hex, nested lists/structs/maps recurse. Dates, times
/// and timestamps go through the same formatters as row-group statistics.
/// Everything else (decimal, interval, ...) uses Arrow's display formatting.
pub fn cell_value(array: &dyn Array, row: usize) -> Result<Value, ArrowError> {
    if array.data_type() == &DataType::Null || array.is_null(row) {
        return Ok(Value::Null);
    }

    let value = match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
        DataType::Int8 => Value::from(array.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => Value::from(array.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => Value::from(array.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => Value::from(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::from(array.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => Value::from(array.as_primitive::<UInt16Type>().value(row)),
        DataType::UInt32 => Value::from(array.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => Value::from(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float16 => {
            float_value(array.as_primitive::<Float16Type>().value(row).to_f64())
        }
        DataType::Float32 => float_value(array.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_value(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::String(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(array.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Value::String(array.as_string_view().value(row).to_string()),
        DataType::Binary => Value::String(hex(array.as_binary::<i32>().value(row))),
        DataType::LargeBinary => Value::String(hex(array.as_binary::<i64>().value(row))),
        DataType::BinaryView => Value::String(hex(array.as_binary_view().value(row))),
        DataType::FixedSizeBinary(_) => {
            Value::String(hex(array.as_fixed_size_binary().value(row)))
        }
        DataType::Date32 => {
            text_or_null(date_from_days(array.as_primitive::<Date32Type>().value(row)))
        }
        DataType::Date64 => {
            let millis = array.as_primitive::<Date64Type>().value(row);
            text_or_null(date_from_days(millis.div_euclid(86_400_000) as i32))
        }
        DataType::Timestamp(unit, tz) => timestamp_cell(array, row, unit, tz.is_some()),
        DataType::Time32(TimeUnit::Second) => text_or_null(time_of_day(
            array.as_primitive::<Time32SecondType>().value(row) as i64,
            Precision::Seconds,
        )),
        DataType::Time32(TimeUnit::Millisecond) => text_or_null(time_of_day(
            array.as_primitive::<Time32MillisecondType>().value(row) as i64,
            Precision::Millis,
        )),
        DataType::Time64(TimeUnit::Microsecond) => text_or_null(time_of_day(
            array.as_primitive::<Time64MicrosecondType>().value(row),
            Precision::Micros,
        )),
        DataType::Time64(TimeUnit::Nanosecond) => text_or_null(time_of_day(
            array.as_primitive::<Time64NanosecondType>().value(row),
            Precision::Nanos,
        )),
        DataType::List(_) => list_value(array.as_list::<i32>().value(row).as_ref())?,
        DataType::LargeList(_) => list_value(array.as_list::<i64>().value(row).as_ref())?,
        DataType::FixedSizeList(_, _) => {
            list_value(array.as_fixed_size_list().value(row).as_ref())?
        }
        DataType::Struct(fields) => {
            let strct = array.as_struct();
            let mut obj = Map::with_capacity(fields.len());
            for (field, child) in fields.iter().zip(strct.columns()) {
                obj.insert(field.name().clone(), cell_value(child.as_ref(), row)?);
            }
            Value::Object(obj)
        }
        DataType::Map(_, _) => {
            let entries = array.as_map().value(row);
            let keys = entries.column(0);
            let values = entries.column(1);
            let mut obj = Map::with_capacity(entries.len());
            for i in 0..entries.len() {
                let key = match cell_value(keys.as_ref(), i)? {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                obj.insert(key, cell_value(values.as_ref(), i)?);
            }
            Value::Object(obj)
        }
        DataType::Dictionary(_, _) => {
            let dict = array.as_any_dictionary();
            match cell_value(dict.keys(), row)?.as_u64() {
                Some(key) => cell_value(dict.values().as_ref(), key as usize)?,
                None => Value::Null,
            }
        }
        _ => Value::String(array_value_to_string(array, row)?),
    };
    Ok(value)
}

fn list_value(items: &dyn Array) -> Result<Value, ArrowError> {
    (0..items.len())
        .map(|i| cell_value(items, i))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
