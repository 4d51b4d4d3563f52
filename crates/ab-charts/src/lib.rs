//! # ab-charts
//!
//! D3.js-style SVG charting for conversion rate time series, built with
//! Leptos. The same layout renders into the live DOM and into a standalone
//! SVG document for PNG export.
//!
//! ## Architecture
//!
//! Uses Strategy pattern for:
//! - Scale computation (linear, point)
//! - Path generation (line, monotone curve, area)
//!
//! ## Modules
//!
//! - `chartkit` - Core primitives: scales, paths
//! - `rate_chart` - Multi-series conversion rate chart
//! - `export` - Rasterize the chart to `ab-chart.png`

pub mod chartkit;
pub mod export;
pub mod rate_chart;

pub use chartkit::*;
pub use export::*;
pub use rate_chart::*;

// Re-export colors from ab-core for convenience
pub use ab_core::colors;

/// Chart margin configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ChartMargin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub const fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    /// Standard chart margins (left axis, date labels and legend below)
    pub const fn standard() -> Self {
        Self::new(20.0, 20.0, 60.0, 56.0)
    }
}

impl Default for ChartMargin {
    fn default() -> Self {
        Self::standard()
    }
}

/// Chart dimensions with margin handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub margin: ChartMargin,
}

impl ChartDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: ChartMargin::default(),
        }
    }

    pub fn with_margin(mut self, margin: ChartMargin) -> Self {
        self.margin = margin;
        self
    }

    /// Inner width (excluding margins)
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    /// Inner height (excluding margins)
    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// SVG transform for inner chart area
    pub fn inner_transform(&self) -> String {
        format!("translate({}, {})", self.margin.left, self.margin.top)
    }

    /// ViewBox string for SVG
    pub fn viewbox(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self::new(800.0, 420.0)
    }
}
