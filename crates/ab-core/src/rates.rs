//! Conversion rate rows derived from raw counts

use crate::{SourceRow, Variation, VariationKey, round3};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One display bucket (a day, or the Monday of an ISO week) with a rate per
/// variation key. Serialises flat: `{"date": "2024-01-01", "1": 3.2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub rates: BTreeMap<VariationKey, f64>,
}

impl PreparedRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rates: BTreeMap::new(),
        }
    }

    /// Builder: set the rate for one key
    pub fn with_rate(mut self, key: impl Into<VariationKey>, rate: f64) -> Self {
        self.rates.insert(key.into(), rate);
        self
    }

    pub fn rate(&self, key: &VariationKey) -> Option<f64> {
        self.rates.get(key).copied()
    }

    /// ISO date string of the bucket
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Percentage of visits that converted, rounded to 3 decimals.
/// Zero visits yield a zero rate.
pub fn conversion_rate(visits: u64, conversions: u64) -> f64 {
    if visits > 0 {
        round3(conversions as f64 / visits as f64 * 100.0)
    } else {
        0.0
    }
}

/// Rate row for a single day; every known variation gets an entry.
pub fn prepare_row(row: &SourceRow, variations: &[Variation]) -> PreparedRow {
    let rates = variations
        .iter()
        .map(|v| {
            let rate = conversion_rate(row.visits_for(&v.key), row.conversions_for(&v.key));
            (v.key.clone(), rate)
        })
        .collect();

    PreparedRow {
        date: row.date,
        rates,
    }
}

/// Daily series in input order
pub fn prepare_daily(rows: &[SourceRow], variations: &[Variation]) -> Vec<PreparedRow> {
    let daily: Vec<PreparedRow> = rows.iter().map(|r| prepare_row(r, variations)).collect();
    tracing::debug!(rows = daily.len(), variations = variations.len(), "daily rates prepared");
    daily
}
