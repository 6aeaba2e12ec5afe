//! Series Loading
//!
//! Parses the per-cultivar monthly CSV (`data/csv/{id}.csv`) and the wide
//! spider trait table (`data/csv/spider_traits.csv`) with Polars.
//!
//! Every column is read as a string and converted here. A row with a
//! non-numeric cell is skipped with a warning instead of leaking NaN into
//! charts.

use crate::chart::Metric;
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::io::Cursor;

/// Score range used by the radar chart
pub const TRAIT_SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

const SERIES_COLUMNS: [&str; 6] = ["cultivar", "month", "yield", "firmness", "size", "appearance"];

#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("CSV is missing column '{0}'")]
    MissingColumn(String),
    #[error("trait table has no trait columns")]
    NoTraitColumns,
}

/// One month of measurements
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecord {
    pub month: String,
    pub yield_value: f64,
    pub firmness: f64,
    pub size: f64,
    pub appearance: f64,
}

impl MonthlyRecord {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Yield => self.yield_value,
            Metric::Firmness => self.firmness,
            Metric::Size => self.size,
            Metric::Appearance => self.appearance,
        }
    }
}

/// Monthly measurements for one cultivar, CSV order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    pub records: Vec<MonthlyRecord>,
}

impl MonthlySeries {
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait scores of one cultivar, in table column order
#[derive(Debug, Clone, PartialEq)]
pub struct TraitScores {
    pub scores: Vec<(String, f64)>,
}

impl TraitScores {
    pub fn get(&self, trait_name: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == trait_name)
            .map(|(_, score)| *score)
    }
}

/// Wide spider table: cultivar id -> score per trait column
#[derive(Debug, Clone, Default)]
pub struct TraitTable {
    pub traits: Vec<String>,
    rows: FxHashMap<String, Vec<f64>>,
}

impl TraitTable {
    pub fn scores(&self, cultivar_id: &str) -> Option<TraitScores> {
        self.rows.get(cultivar_id).map(|values| TraitScores {
            scores: self.traits.iter().cloned().zip(values.iter().copied()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn read_all_strings(bytes: &[u8]) -> Result<DataFrame, SeriesError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;
    Ok(df)
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, SeriesError> {
    df.column(name)
        .map_err(|_| SeriesError::MissingColumn(name.to_string()))?
        .str()
        .map_err(SeriesError::Csv)
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse the monthly CSV for one cultivar
pub fn parse_series_csv(bytes: &[u8]) -> Result<MonthlySeries, SeriesError> {
    let df = read_all_strings(bytes)?;
    for name in SERIES_COLUMNS {
        string_column(&df, name)?;
    }

    let month = string_column(&df, "month")?;
    let yield_col = string_column(&df, "yield")?;
    let firmness = string_column(&df, "firmness")?;
    let size = string_column(&df, "size")?;
    let appearance = string_column(&df, "appearance")?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let label = month.get(idx).map(str::trim).unwrap_or("");
        let parsed = (
            parse_number(yield_col.get(idx)),
            parse_number(firmness.get(idx)),
            parse_number(size.get(idx)),
            parse_number(appearance.get(idx)),
        );
        match parsed {
            (Some(yield_value), Some(firmness), Some(size), Some(appearance)) if !label.is_empty() => {
                records.push(MonthlyRecord {
                    month: label.to_string(),
                    yield_value,
                    firmness,
                    size,
                    appearance,
                });
            }
            _ => {
                tracing::warn!("Skipping malformed series row {} (month '{}')", idx + 1, label);
            }
        }
    }

    Ok(MonthlySeries { records })
}

/// Parse the wide spider trait table. The first column holds the cultivar id.
pub fn parse_trait_table(bytes: &[u8]) -> Result<TraitTable, SeriesError> {
    let df = read_all_strings(bytes)?;
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    let Some((id_name, trait_names)) = names.split_first() else {
        return Err(SeriesError::NoTraitColumns);
    };
    if trait_names.is_empty() {
        return Err(SeriesError::NoTraitColumns);
    }

    let ids = string_column(&df, id_name)?;
    let columns = trait_names
        .iter()
        .map(|name| string_column(&df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = FxHashMap::default();
    for idx in 0..df.height() {
        let Some(id) = ids.get(idx).map(str::trim).filter(|s| !s.is_empty()) else {
            tracing::warn!("Skipping trait row {} without cultivar id", idx + 1);
            continue;
        };
        let scores: Option<Vec<f64>> = columns
            .iter()
            .map(|col| parse_number(col.get(idx)).filter(|v| TRAIT_SCORE_RANGE.contains(v)))
            .collect();
        match scores {
            Some(scores) => {
                rows.insert(id.to_string(), scores);
            }
            None => tracing::warn!("Skipping malformed trait row for '{}'", id),
        }
    }

    Ok(TraitTable {
        traits: trait_names.to_vec(),
        rows,
    })
}
