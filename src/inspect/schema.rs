// src/inspect/schema.rs

use arrow::datatypes::{DataType, Field, IntervalUnit, Schema as ArrowSchema, SchemaRef, TimeUnit};
use parquet::arrow::parquet_to_arrow_schema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;
use tracing::debug;

use super::footer::Footer;
use crate::error::{ParseError, ParseOutcome};

/// One top-level column and its rendered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub ty: String,
}

/// Column name → type string, in declaration order.
/// Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    fields: Vec<SchemaField>,
}

impl SchemaMap {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Ordered `(name, type)` pairs.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.ty.as_str()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.ty.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for f in &self.fields {
            map.serialize_entry(&f.name, &f.ty)?;
        }
        map.end()
    }
}

/// The Arrow view of the file schema plus its rendered map.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub arrow: SchemaRef,
    pub map: SchemaMap,
}

/// Convert the footer's Parquet schema (honouring any embedded Arrow schema)
/// and render every top-level field.
pub fn extract_schema(footer: &Footer) -> ParseOutcome<TableSchema> {
    let file_meta = footer.parquet().file_metadata();
    let arrow = parquet_to_arrow_schema(file_meta.schema_descr(), file_meta.key_value_metadata())
        .map_err(ParseError::format)?;
    let arrow = Arc::new(arrow);
    let map = SchemaMap::new(schema_entries(&arrow));
    debug!(fields = map.len(), "extracted schema");
    Ok(TableSchema { arrow, map })
}

/// Walk the top-level fields in order.
pub fn schema_entries(schema: &ArrowSchema) -> Vec<SchemaField> {
    schema
        .fields()
        .iter()
        .map(|f| SchemaField {
            name: f.name().clone(),
            ty: type_name(f.data_type()),
        })
        .collect()
}

/// True for columns that take part in the numeric summary.
pub fn is_numeric(dt: &DataType) -> bool {
    dt.is_integer() || dt.is_floating()
}

fn unit_suffix(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

fn field_name(field: &Field) -> String {
    format!("{}: {}", field.name(), type_name(field.data_type()))
}

/// Render a type with Arrow's canonical (C++ `ToString`) naming,
/// e.g. `int64`, `string`, `timestamp[ns, tz=UTC]`, `list<element: int32>`.
pub fn type_name(dt: &DataType) -> String {
    match dt {
        DataType::Null => "null".into(),
        DataType::Boolean => "bool".into(),
        DataType::Int8 => "int8".into(),
        DataType::Int16 => "int16".into(),
        DataType::Int32 => "int32".into(),
        DataType::Int64 => "int64".into(),
        DataType::UInt8 => "uint8".into(),
        DataType::UInt16 => "uint16".into(),
        DataType::UInt32 => "uint32".into(),
        DataType::UInt64 => "uint64".into(),
        DataType::Float16 => "halffloat".into(),
        DataType::Float32 => "float".into(),
        DataType::Float64 => "double".into(),
        DataType::Utf8 => "string".into(),
        DataType::LargeUtf8 => "large_string".into(),
        DataType::Utf8View => "string_view".into(),
        DataType::Binary => "binary".into(),
        DataType::LargeBinary => "large_binary".into(),
        DataType::BinaryView => "binary_view".into(),
        DataType::FixedSizeBinary(n) => format!("fixed_size_binary[{}]", n),
        DataType::Date32 => "date32[day]".into(),
        DataType::Date64 => "date64[ms]".into(),
        DataType::Timestamp(unit, None) => format!("timestamp[{}]", unit_suffix(unit)),
        DataType::Timestamp(unit, Some(tz)) => {
            format!("timestamp[{}, tz={}]", unit_suffix(unit), tz)
        }
        DataType::Time32(unit) => format!("time32[{}]", unit_suffix(unit)),
        DataType::Time64(unit) => format!("time64[{}]", unit_suffix(unit)),
        DataType::Duration(unit) => format!("duration[{}]", unit_suffix(unit)),
        DataType::Interval(IntervalUnit::YearMonth) => "month_interval".into(),
        DataType::Interval(IntervalUnit::DayTime) => "day_time_interval".into(),
        DataType::Interval(IntervalUnit::MonthDayNano) => "month_day_nano_interval".into(),
        DataType::Decimal128(p, s) => format!("decimal128({}, {})", p, s),
        DataType::Decimal256(p, s) => format!("decimal256({}, {})", p, s),
        DataType::List(f) | DataType::ListView(f) => format!("list<{}>", field_name(f)),
        DataType::LargeList(f) | DataType::LargeListView(f) => {
            format!("large_list<{}>", field_name(f))
        }
        DataType::FixedSizeList(f, n) => format!("fixed_size_list<{}>[{}]", field_name(f), n),
        DataType::Struct(fields) => {
            let inner: Vec<String> = fields.iter().map(|f| field_name(f)).collect();
            format!("struct<{}>", inner.join(", "))
        }
        DataType::Map(entries, _) => match entries.data_type() {
            DataType::Struct(kv) if kv.len() == 2 => format!(
                "map<{}, {}>",
                type_name(kv[0].data_type()),
                type_name(kv[1].data_type())
            ),
            other => format!("map<{}>", type_name(other)),
        },
        DataType::Dictionary(key, value) => format!(
            "dictionary<values={}, indices={}, ordered=0>",
            type_name(value),
            type_name(key)
        ),
        // Anything newer than the names above falls back to Arrow's own rendering.
        other => other.to_string().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{fixtures, footer::read_footer};
    use arrow::datatypes::Fields;

    #[test]
    fn extracts_ab_schema_in_order() {
        let footer = read_footer(&fixtures::ab_file(true)).unwrap();
        let schema = extract_schema(&footer).unwrap();
        assert_eq!(schema.map.entries(), vec![("a", "int64"), ("b", "string")]);
        assert_eq!(
            serde_json::to_string(&schema.map).unwrap(),
            r#"{"a":"int64","b":"string"}"#
        );
    }

    #[test]
    fn renders_scalar_types() {
        assert_eq!(type_name(&DataType::Boolean), "bool");
        assert_eq!(type_name(&DataType::Float32), "float");
        assert_eq!(type_name(&DataType::Float64), "double");
        assert_eq!(type_name(&DataType::UInt16), "uint16");
        assert_eq!(type_name(&DataType::Date32), "date32[day]");
        assert_eq!(
            type_name(&DataType::Timestamp(TimeUnit::Nanosecond, None)),
            "timestamp[ns]"
        );
        assert_eq!(
            type_name(&DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))),
            "timestamp[us, tz=UTC]"
        );
        assert_eq!(type_name(&DataType::Time64(TimeUnit::Microsecond)), "time64[us]");
        assert_eq!(type_name(&DataType::Decimal128(10, 2)), "decimal128(10, 2)");
        assert_eq!(type_name(&DataType::FixedSizeBinary(16)), "fixed_size_binary[16]");
    }

    #[test]
    fn renders_nested_types() {
        let list = DataType::List(Arc::new(Field::new("element", DataType::Int32, true)));
        assert_eq!(type_name(&list), "list<element: int32>");

        let strct = DataType::Struct(Fields::from(vec![
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ]));
        assert_eq!(type_name(&strct), "struct<a: int64, b: string>");

        let entries = Field::new(
            "key_value",
            DataType::Struct(Fields::from(vec![
                Field::new("key", DataType::Utf8, false),
                Field::new("value", DataType::Float64, true),
            ])),
            false,
        );
        let map = DataType::Map(Arc::new(entries), false);
        assert_eq!(type_name(&map), "map<string, double>");

        let dict = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        assert_eq!(
            type_name(&dict),
            "dictionary<values=string, indices=int32, ordered=0>"
        );
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric(&DataType::Int8));
        assert!(is_numeric(&DataType::UInt64));
        assert!(is_numeric(&DataType::Float16));
        assert!(!is_numeric(&DataType::Decimal128(10, 2)));
        assert!(!is_numeric(&DataType::Utf8));
        assert!(!is_numeric(&DataType::Boolean));
        assert!(!is_numeric(&DataType::Date32));
    }
}
