//! Padded y-axis range for the visible series

use crate::{PreparedRow, VariationKey};
use serde::{Deserialize, Serialize};

/// Fraction of the value span added above and below the data
pub const DOMAIN_PADDING_RATIO: f64 = 0.1;

/// Value range used to scale the rate axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// Range used when there is nothing to show
    pub const FALLBACK: Domain = Domain { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Padded `[min, max]` over every finite value of the selected keys.
///
/// No values at all gives `[0, 1]`. Padding is 10% of the span, falling back
/// to 10% of the max for flat data and to 1 when everything is zero. The
/// lower bound never drops below zero.
pub fn compute_domain<'a, I>(rows: &[PreparedRow], selected: I) -> Domain
where
    I: IntoIterator<Item = &'a VariationKey>,
{
    let keys: Vec<&VariationKey> = selected.into_iter().collect();

    let (raw_min, raw_max) = rows
        .iter()
        .flat_map(|row| keys.iter().filter_map(move |key| row.rate(key)))
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });

    if !raw_min.is_finite() || !raw_max.is_finite() {
        return Domain::FALLBACK;
    }

    let mut padding = (raw_max - raw_min) * DOMAIN_PADDING_RATIO;
    if padding == 0.0 {
        padding = raw_max * DOMAIN_PADDING_RATIO;
    }
    if padding == 0.0 {
        padding = 1.0;
    }

    Domain::new((raw_min - padding).max(0.0), raw_max + padding)
}
