//! # chartkit
//!
//! Core chart primitives: scales and path builders.
//! Implements Strategy pattern for flexible scale and curve behaviors.

use std::fmt::Write;

// ============================================================================
// STRATEGY PATTERN: Scale Trait
// ============================================================================

/// Strategy trait for scales (maps domain values to range values)
pub trait Scale: Send + Sync {
    /// Scale a value from domain to range
    fn scale(&self, value: f64) -> f64;
}

// ============================================================================
// LINEAR SCALE
// ============================================================================

/// Linear scale (D3-style continuous scale)
#[derive(Debug, Clone)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
        }
    }

    pub fn domain(mut self, min: f64, max: f64) -> Self {
        self.domain = (min, max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = (min, max);
        self
    }

    /// Generate "nice" tick values (rounded to clean numbers) inside the domain
    pub fn nice_ticks(&self, count: usize) -> Vec<f64> {
        let (min, max) = self.domain;
        let range = max - min;

        if range <= 0.0 || !range.is_finite() || count == 0 {
            return vec![min];
        }

        let rough_step = range / count as f64;
        let magnitude = 10.0_f64.powf(rough_step.log10().floor());
        let residual = rough_step / magnitude;

        let nice_step = if residual <= 1.0 {
            magnitude
        } else if residual <= 2.0 {
            2.0 * magnitude
        } else if residual <= 5.0 {
            5.0 * magnitude
        } else {
            10.0 * magnitude
        };

        let first = (min / nice_step).ceil() as i64;
        let last = (max / nice_step).floor() as i64;

        // Multiply from integers so ticks don't accumulate float error
        (first..=last)
            .map(|i| round_to_step(i as f64 * nice_step, nice_step))
            .collect()
    }
}

/// Drop float noise below the step's precision (0.30000000000000004 -> 0.3)
fn round_to_step(value: f64, step: f64) -> f64 {
    let decimals = (-step.log10().floor()).max(0.0) as i32 + 1;
    let factor = 10.0_f64.powi(decimals);
    (value * factor).round() / factor
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Scale for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;

        if (d_max - d_min).abs() < f64::EPSILON {
            return (r_min + r_max) / 2.0;
        }

        let normalized = (value - d_min) / (d_max - d_min);
        r_min + normalized * (r_max - r_min)
    }
}

// ============================================================================
// POINT SCALE (ordinal positions, e.g. one per date)
// ============================================================================

/// Point scale: `count` evenly spaced positions spanning the range.
/// A single point sits at the middle of the range.
#[derive(Debug, Clone)]
pub struct PointScale {
    count: usize,
    range: (f64, f64),
}

impl PointScale {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            range: (0.0, 1.0),
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = (min, max);
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance between neighbouring points
    pub fn step(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.range.1 - self.range.0) / (self.count - 1) as f64
    }

    /// Position for index
    pub fn scale(&self, index: usize) -> f64 {
        if self.count < 2 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        self.range.0 + index as f64 * self.step()
    }

    /// Index of the point closest to `position`, if there are any points
    pub fn nearest(&self, position: f64) -> Option<usize> {
        match self.count {
            0 => None,
            1 => Some(0),
            n => {
                let raw = ((position - self.range.0) / self.step()).round();
                Some(raw.clamp(0.0, (n - 1) as f64) as usize)
            }
        }
    }
}

impl Default for PointScale {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============================================================================
// STRATEGY PATTERN: Path Generator Trait
// ============================================================================

/// Strategy trait for path generation
pub trait PathGenerator: Send + Sync {
    fn generate(&self, points: &[(f64, f64)]) -> String;
}

/// Line path generator
#[derive(Debug, Clone, Default)]
pub struct LinePath;

impl PathGenerator for LinePath {
    fn generate(&self, points: &[(f64, f64)]) -> String {
        let Some((&(x, y), rest)) = points.split_first() else {
            return String::new();
        };

        let mut builder = PathBuilder::new().move_to(x, y);
        for &(x, y) in rest {
            builder = builder.line_to(x, y);
        }
        builder.build()
    }
}

/// Monotone cubic path (D3 `curveMonotoneX`).
///
/// Fritsch-Carlson tangents keep the curve from overshooting: between two
/// points it never leaves their y range. Needs strictly increasing x.
#[derive(Debug, Clone, Default)]
pub struct MonotonePath;

impl MonotonePath {
    /// Tangent at the middle of three points
    fn interior_slope((x0, y0): (f64, f64), (x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> f64 {
        let h0 = x1 - x0;
        let h1 = x2 - x1;
        if h0 == 0.0 || h1 == 0.0 {
            return 0.0;
        }
        let s0 = (y1 - y0) / h0;
        let s1 = (y2 - y1) / h1;
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        let slope = (s0.signum() + s1.signum()) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        if slope.is_finite() { slope } else { 0.0 }
    }

    /// Tangent at an end point given the neighbour's tangent
    fn end_slope((x0, y0): (f64, f64), (x1, y1): (f64, f64), neighbour: f64) -> f64 {
        let h = x1 - x0;
        if h == 0.0 {
            neighbour
        } else {
            (3.0 * (y1 - y0) / h - neighbour) / 2.0
        }
    }

    /// Tangent at every point
    pub fn tangents(points: &[(f64, f64)]) -> Vec<f64> {
        let n = points.len();
        if n < 3 {
            return vec![0.0; n];
        }

        let mut tangents = vec![0.0; n];
        for i in 1..n - 1 {
            tangents[i] = Self::interior_slope(points[i - 1], points[i], points[i + 1]);
        }
        tangents[0] = Self::end_slope(points[0], points[1], tangents[1]);
        tangents[n - 1] = Self::end_slope(points[n - 2], points[n - 1], tangents[n - 2]);
        tangents
    }
}

impl PathGenerator for MonotonePath {
    fn generate(&self, points: &[(f64, f64)]) -> String {
        if points.len() < 3 {
            return LinePath.generate(points);
        }

        let tangents = Self::tangents(points);
        let (x, y) = points[0];
        let mut builder = PathBuilder::new().move_to(x, y);

        for i in 1..points.len() {
            let (x0, y0) = points[i - 1];
            let (x1, y1) = points[i];
            let dx = (x1 - x0) / 3.0;
            builder = builder.cubic_to(
                x0 + dx,
                y0 + dx * tangents[i - 1],
                x1 - dx,
                y1 - dx * tangents[i],
                x1,
                y1,
            );
        }

        builder.build()
    }
}

// ============================================================================
// PATH BUILDER (fluent API)
// ============================================================================

/// SVG path builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    commands: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            commands: String::with_capacity(256),
        }
    }

    /// Continue an existing path
    pub fn from_path(path: String) -> Self {
        Self { commands: path }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "M{:.2},{:.2}", x, y);
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "L{:.2},{:.2}", x, y);
        self
    }

    pub fn cubic_to(mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> Self {
        let _ = write!(
            self.commands,
            "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            x1, y1, x2, y2, x, y
        );
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push('Z');
        self
    }

    pub fn build(self) -> String {
        self.commands
    }
}

// ============================================================================
// AREA PATH GENERATOR
// ============================================================================

/// Closed area: the curve from `generator`, then straight down to the
/// baseline and back to the start
pub fn area_path(points: &[(f64, f64)], baseline_y: f64, generator: &dyn PathGenerator) -> String {
    let (Some(&(first_x, _)), Some(&(last_x, _))) = (points.first(), points.last()) else {
        return String::new();
    };

    PathBuilder::from_path(generator.generate(points))
        .line_to(last_x, baseline_y)
        .line_to(first_x, baseline_y)
        .close()
        .build()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new().domain(0.0, 100.0).range(0.0, 500.0);

        assert_eq!(scale.scale(0.0), 0.0);
        assert_eq!(scale.scale(50.0), 250.0);
        assert_eq!(scale.scale(100.0), 500.0);
    }

    #[test]
    fn test_inverted_range_for_y_axis() {
        let scale = LinearScale::new().domain(0.0, 10.0).range(300.0, 0.0);
        assert_eq!(scale.scale(0.0), 300.0);
        assert_eq!(scale.scale(10.0), 0.0);
    }

    #[test]
    fn test_nice_ticks_are_clean_and_inside_domain() {
        let scale = LinearScale::new().domain(4.5, 5.5);
        assert_eq!(scale.nice_ticks(5), vec![4.6, 4.8, 5.0, 5.2, 5.4]);

        let scale = LinearScale::new().domain(0.0, 44.0);
        assert_eq!(scale.nice_ticks(5), vec![0.0, 10.0, 20.0, 30.0, 40.0]);

        let scale = LinearScale::new().domain(0.0, 1.0);
        assert_eq!(scale.nice_ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_nice_ticks_degenerate_domain() {
        let scale = LinearScale::new().domain(3.0, 3.0);
        assert_eq!(scale.nice_ticks(5), vec![3.0]);
    }

    #[test]
    fn test_point_scale() {
        let scale = PointScale::new(5).range(0.0, 400.0);
        assert_eq!(scale.step(), 100.0);
        assert_eq!(scale.scale(0), 0.0);
        assert_eq!(scale.scale(4), 400.0);
        assert_eq!(scale.nearest(140.0), Some(1));
        assert_eq!(scale.nearest(-50.0), Some(0));
        assert_eq!(scale.nearest(9000.0), Some(4));

        assert_eq!(PointScale::new(1).range(0.0, 400.0).scale(0), 200.0);
        assert_eq!(PointScale::new(0).nearest(10.0), None);
    }

    #[test]
    fn test_path_builder() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(100.0, 100.0)
            .close()
            .build();

        assert_eq!(path, "M0.00,0.00L100.00,100.00Z");
    }

    #[test]
    fn test_line_path_generator() {
        let path = LinePath.generate(&[(0.0, 0.0), (50.0, 50.0), (100.0, 0.0)]);
        assert_eq!(path, "M0.00,0.00L50.00,50.00L100.00,0.00");
        assert!(LinePath.generate(&[]).is_empty());
    }

    #[test]
    fn test_monotone_falls_back_to_line() {
        let points = [(0.0, 10.0), (10.0, 20.0)];
        assert_eq!(MonotonePath.generate(&points), LinePath.generate(&points));
    }

    #[test]
    fn test_monotone_tangents_flat_at_extrema() {
        let points = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 5.0)];
        let tangents = MonotonePath::tangents(&points);
        // Local maximum and minimum get zero slope
        assert_eq!(tangents[1], 0.0);
        assert_eq!(tangents[2], 0.0);
    }

    #[test]
    fn test_monotone_straight_line_stays_straight() {
        let points = [(0.0, 0.0), (10.0, 10.0), (20.0, 20.0)];
        let tangents = MonotonePath::tangents(&points);
        for t in tangents {
            assert!((t - 1.0).abs() < 1e-9);
        }
        let path = MonotonePath.generate(&points);
        assert!(path.starts_with("M0.00,0.00C3.33,3.33,6.67,6.67,10.00,10.00"));
    }

    #[test]
    fn test_area_path_closes_to_baseline() {
        let path = area_path(&[(0.0, 10.0), (50.0, 5.0)], 100.0, &LinePath);
        assert_eq!(path, "M0.00,10.00L50.00,5.00L50.00,100.00L0.00,100.00Z");
        assert!(area_path(&[], 100.0, &MonotonePath).is_empty());
    }
}
