// src/inspect/summary.rs

use arrow::array::AsArray;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::records::DecodedTable;
use super::schema::is_numeric;
use crate::error::{ParseError, ParseOutcome};

/// Descriptive statistics of one numeric column. `std` is the sample
/// standard deviation; quartiles interpolate linearly between ranks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: u64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Numeric column → summary, in schema order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    columns: Vec<(String, NumericSummary)>,
}

impl SummaryStats {
    pub fn get(&self, name: &str) -> Option<&NumericSummary> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

impl Serialize for SummaryStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, summary) in &self.columns {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

/// Summaries for every integer/float column. A table without rows has no
/// summary at all rather than a set of empty entries.
pub fn describe(table: &DecodedTable) -> ParseOutcome<SummaryStats> {
    if table.num_rows() == 0 {
        return Ok(SummaryStats::default());
    }

    let mut columns = Vec::new();
    for (idx, field) in table.schema.fields().iter().enumerate() {
        if !is_numeric(field.data_type()) {
            continue;
        }
        let mut values = Vec::with_capacity(table.num_rows());
        for batch in &table.batches {
            let floats = cast(batch.column(idx), &DataType::Float64).map_err(ParseError::decode)?;
            values.extend(
                floats
                    .as_primitive::<Float64Type>()
                    .iter()
                    .flatten()
                    .filter(|v| !v.is_nan()),
            );
        }
        columns.push((field.name().clone(), summarize(values)));
    }
    Ok(SummaryStats { columns })
}

/// Summarize non-missing values.
pub fn summarize(mut values: Vec<f64>) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary::default();
    }
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((ss / (n - 1.0)).sqrt())
    } else {
        None
    };

    NumericSummary {
        count: values.len() as u64,
        mean: Some(mean),
        std,
        min: values.first().copied(),
        p25: Some(quantile(&values, 0.25)),
        p50: Some(quantile(&values, 0.5)),
        p75: Some(quantile(&values, 0.75)),
        max: values.last().copied(),
    }
}

/// Linear interpolation between the two nearest ranks of a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
