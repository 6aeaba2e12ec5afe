//! Chart Adapter
//!
//! Reshapes monthly series and trait scores into the row format consumed by
//! the charting frontend: one object per bucket, one key per cultivar.

use crate::series::{MonthlySeries, TraitScores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Suffix for running-sum keys
pub const CUMULATIVE_SUFFIX: &str = "Cumulative";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Yield,
    Firmness,
    Size,
    Appearance,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Yield, Metric::Firmness, Metric::Size, Metric::Appearance];

    /// Metrics charted with a running sum alongside the monthly value
    pub fn is_cumulative(self) -> bool {
        matches!(self, Metric::Yield)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Yield => "yield",
            Metric::Firmness => "firmness",
            Metric::Size => "size",
            Metric::Appearance => "appearance",
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown metric: {}", s))
    }
}

/// A series with the display name its values are keyed by
#[derive(Debug, Clone, Copy)]
pub struct LabeledSeries<'a> {
    pub name: &'a str,
    pub series: &'a MonthlySeries,
}

#[derive(Debug, Clone, Copy)]
pub struct LabeledTraits<'a> {
    pub name: &'a str,
    pub traits: &'a TraitScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub month: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarRow {
    #[serde(rename = "trait")]
    pub trait_name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

pub fn cumulative_key(name: &str) -> String {
    format!("{}{}", name, CUMULATIVE_SUFFIX)
}

/// Build chart rows for one metric.
///
/// Buckets come from the primary series. Comparison values are matched by
/// position: missing points are 0 and extra points are dropped.
pub fn build_series(
    primary: LabeledSeries<'_>,
    comparison: Option<LabeledSeries<'_>>,
    metric: Metric,
) -> Vec<ChartRow> {
    let cumulative = metric.is_cumulative();
    let comparison_values = comparison.map(|c| (c.name, c.series.values(metric)));

    let mut primary_total = 0.0;
    let mut comparison_total = 0.0;

    primary
        .series
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let mut values = BTreeMap::new();

            let value = record.value(metric);
            values.insert(primary.name.to_string(), value);
            if cumulative {
                primary_total += value;
                values.insert(cumulative_key(primary.name), primary_total);
            }

            if let Some((name, points)) = &comparison_values {
                let value = points.get(idx).copied().unwrap_or(0.0);
                values.insert(name.to_string(), value);
                if cumulative {
                    comparison_total += value;
                    values.insert(cumulative_key(name), comparison_total);
                }
            }

            ChartRow {
                month: record.month.clone(),
                values,
            }
        })
        .collect()
}

/// Build radar rows, one per trait of the primary. Traits are matched by
/// name; a trait the comparison lacks scores 0.
pub fn build_radar(primary: LabeledTraits<'_>, comparison: Option<LabeledTraits<'_>>) -> Vec<RadarRow> {
    primary
        .traits
        .scores
        .iter()
        .map(|(trait_name, score)| {
            let mut values = BTreeMap::new();
            values.insert(primary.name.to_string(), *score);
            if let Some(other) = comparison {
                values.insert(other.name.to_string(), other.traits.get(trait_name).unwrap_or(0.0));
            }
            RadarRow {
                trait_name: trait_name.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MonthlyRecord;
    use approx::assert_relative_eq;

    fn series(yields: &[f64]) -> MonthlySeries {
        let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
        MonthlySeries {
            records: yields
                .iter()
                .enumerate()
                .map(|(i, &y)| MonthlyRecord {
                    month: months[i].to_string(),
                    yield_value: y,
                    firmness: 7.0 - i as f64 * 0.1,
                    size: 25.0,
                    appearance: 4.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_cumulative_matches_total() {
        let primary = series(&[0.5, 1.25, 2.0, 0.75]);
        let rows = build_series(LabeledSeries { name: "Ruby Coast", series: &primary }, None, Metric::Yield);

        assert_eq!(rows.len(), 4);
        let last = rows.last().unwrap();
        let total: f64 = primary.values(Metric::Yield).iter().sum();
        assert_relative_eq!(last.values["Ruby CoastCumulative"], total);
        assert_relative_eq!(rows[1].values["Ruby CoastCumulative"], 1.75);
    }

    #[test]
    fn test_no_comparison_keys_without_comparison() {
        let primary = series(&[1.0, 2.0]);
        let rows = build_series(LabeledSeries { name: "A", series: &primary }, None, Metric::Yield);
        for row in &rows {
            let keys: Vec<&str> = row.values.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["A", "ACumulative"]);
        }
    }

    #[test]
    fn test_non_cumulative_metric() {
        let primary = series(&[1.0, 2.0]);
        let rows = build_series(LabeledSeries { name: "A", series: &primary }, None, Metric::Firmness);
        assert_eq!(rows[0].values.len(), 1);
        assert_relative_eq!(rows[1].values["A"], 6.9);
    }

    #[test]
    fn test_comparison_padded_and_truncated() {
        let primary = series(&[1.0, 2.0, 3.0]);
        let short = series(&[4.0]);
        let rows = build_series(
            LabeledSeries { name: "A", series: &primary },
            Some(LabeledSeries { name: "B", series: &short }),
            Metric::Yield,
        );
        assert_eq!(rows.len(), 3);
        assert_relative_eq!(rows[2].values["B"], 0.0);
        assert_relative_eq!(rows[2].values["BCumulative"], 4.0);

        let long = series(&[4.0, 5.0, 6.0, 7.0, 8.0]);
        let rows = build_series(
            LabeledSeries { name: "A", series: &primary },
            Some(LabeledSeries { name: "B", series: &long }),
            Metric::Yield,
        );
        assert_eq!(rows.len(), 3);
        assert_relative_eq!(rows[2].values["BCumulative"], 15.0);
    }

    #[test]
    fn test_row_json_shape() {
        let primary = series(&[1.5]);
        let rows = build_series(LabeledSeries { name: "A", series: &primary }, None, Metric::Yield);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json, serde_json::json!({"month": "Jan", "A": 1.5, "ACumulative": 1.5}));
    }

    #[test]
    fn test_radar_missing_trait_is_zero() {
        let a = TraitScores {
            scores: vec![("Flavor".to_string(), 4.5), ("Firmness".to_string(), 3.0)],
        };
        let b = TraitScores {
            scores: vec![("Flavor".to_string(), 3.5)],
        };
        let rows = build_radar(
            LabeledTraits { name: "A", traits: &a },
            Some(LabeledTraits { name: "B", traits: &b }),
        );
        assert_eq!(rows.len(), 2);
        assert_relative_eq!(rows[1].values["B"], 0.0);
        assert_eq!(rows[0].trait_name, "Flavor");
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Yield".parse::<Metric>(), Ok(Metric::Yield));
        assert!("sweetness".parse::<Metric>().is_err());
    }
}
