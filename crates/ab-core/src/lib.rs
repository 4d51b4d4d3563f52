//! # ab-core
//!
//! Core domain types for the A/B conversion dashboard.
//! Turns raw per-day visit/conversion counts into display-ready rate series:
//!
//! - `rates` - per-day conversion rate rows
//! - `weekly` - ISO-week roll-up of daily rows
//! - `domain` - padded y-axis range for the selected series
//!
//! Implements Strategy pattern for value and date formatting.

pub mod dataset;
pub mod domain;
pub mod rates;
pub mod variation;
pub mod weekly;

pub use dataset::*;
pub use domain::*;
pub use rates::*;
pub use variation::*;
pub use weekly::*;

use chrono::NaiveDate;

/// Decimal places kept on every prepared rate
pub const RATE_DECIMALS: i32 = 3;

/// Round to the fixed rate precision (3 decimal places).
pub fn round3(value: f64) -> f64 {
    let factor = 10f64.powi(RATE_DECIMALS);
    (value * factor).round() / factor
}

// ============================================================================
// STRATEGY PATTERN: Formatters
// ============================================================================

/// Strategy trait for rate formatting
pub trait RateFormatter: Send + Sync {
    fn format(&self, rate: f64) -> String;
}

/// Strategy trait for date label formatting
pub trait DateFormatter: Send + Sync {
    fn format(&self, date: NaiveDate) -> String;
}

/// Percent formatter with configurable decimals
#[derive(Debug, Clone)]
pub struct PercentFormatter {
    pub decimals: usize,
}

impl PercentFormatter {
    /// Tooltip precision (`3.25%`)
    pub fn tooltip() -> Self {
        Self { decimals: 2 }
    }

    /// Axis tick precision (`3.3%`)
    pub fn axis() -> Self {
        Self { decimals: 1 }
    }
}

impl Default for PercentFormatter {
    fn default() -> Self {
        Self::tooltip()
    }
}

impl RateFormatter for PercentFormatter {
    fn format(&self, rate: f64) -> String {
        format!("{:.prec$}%", rate, prec = self.decimals)
    }
}

/// Short month/day formatter (`Jan 5`)
#[derive(Debug, Clone, Default)]
pub struct ShortDateFormatter;

impl DateFormatter for ShortDateFormatter {
    fn format(&self, date: NaiveDate) -> String {
        date.format("%b %-d").to_string()
    }
}

/// Format an ISO date string as a short label, keeping the raw text when it
/// does not parse.
pub fn format_date_label(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => ShortDateFormatter.format(date),
        Err(_) => iso.to_string(),
    }
}

// ============================================================================
// COLOR CONSTANTS
// ============================================================================

pub mod colors {
    /// Series palette, assigned by variation index
    pub const PALETTE: [&str; 6] = [
        "#FF6B6B", "#4D96FF", "#FFD166", "#8E44AD", "#2ECC71", "#FF7AB6",
    ];

    /// Palette color for the variation at `index`, wrapping around.
    pub fn series_color(index: usize) -> &'static str {
        PALETTE[index % PALETTE.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(30.000000000000004), 30.0);
        assert_eq!(round3(33.33333), 33.333);
        assert_eq!(round3(66.66666), 66.667);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn test_percent_formatter_strategy() {
        assert_eq!(PercentFormatter::tooltip().format(3.14159), "3.14%");
        assert_eq!(PercentFormatter::axis().format(3.14159), "3.1%");
        assert_eq!(PercentFormatter { decimals: 0 }.format(12.7), "13%");
    }

    #[test]
    fn test_date_label() {
        assert_eq!(format_date_label("2024-01-05"), "Jan 5");
        assert_eq!(format_date_label("2024-11-23"), "Nov 23");
        assert_eq!(format_date_label("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(colors::series_color(0), "#FF6B6B");
        assert_eq!(colors::series_color(5), "#FF7AB6");
        assert_eq!(colors::series_color(6), "#FF6B6B");
        assert_eq!(colors::series_color(13), "#4D96FF");
    }
}
