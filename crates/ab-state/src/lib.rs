//! # ab-state
//!
//! View state management for the A/B conversion dashboard.
//! Every user-facing control is a validated field, persisted through a
//! key-value store, and the `Dashboard` engine derives the active rows and
//! y-axis domain from it. Leptos signals wrap the engine for the UI.

pub mod engine;
pub mod persisted;
pub mod reactive;
pub mod storage;
pub mod view;

pub use engine::*;
pub use persisted::*;
pub use reactive::*;
pub use storage::*;
pub use view::*;

use serde::{Deserialize, Serialize};

/// Zoom bounds and defaults (percent)
pub const MIN_ZOOM: u16 = 10;
pub const MAX_ZOOM: u16 = 300;
pub const DEFAULT_ZOOM: u16 = 100;
/// Slider increment
pub const ZOOM_STEP: u16 = 10;

// ============================================================================
// UI STATE
// ============================================================================

/// Row bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Day, Self::Week]
    }
}

/// How each series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Straight segments
    Line,
    /// Monotone cubic curve
    #[default]
    Smooth,
    /// Filled monotone curve
    Area,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Smooth => "smooth",
            Self::Area => "area",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "line" => Some(Self::Line),
            "smooth" => Some(Self::Smooth),
            "area" => Some(Self::Area),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Smooth => "Smooth",
            Self::Area => "Area",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Line, Self::Smooth, Self::Area]
    }
}

/// Application theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Dark => "theme-dark",
            Self::Light => "theme-light",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Light, Self::Dark]
    }

    /// Chart colors for this theme
    pub fn palette(&self) -> ThemePalette {
        match self {
            Self::Light => ThemePalette {
                background: "#ffffff",
                text: "#1f2933",
                muted: "#6b7280",
                grid: "#e5e7eb",
                axis: "#9ca3af",
            },
            Self::Dark => ThemePalette {
                background: "#141414",
                text: "#fafafa",
                muted: "#888888",
                grid: "#2a2a2a",
                axis: "#4b5563",
            },
        }
    }
}

/// Chart colors derived from the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub grid: &'static str,
    pub axis: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_strings_round_trip() {
        for g in Granularity::all() {
            assert_eq!(Granularity::parse(g.as_str()), Some(*g));
        }
        for s in LineStyle::all() {
            assert_eq!(LineStyle::parse(s.as_str()), Some(*s));
        }
        for t in Theme::all() {
            assert_eq!(Theme::parse(t.as_str()), Some(*t));
        }
        assert_eq!(Granularity::parse("month"), None);
        assert_eq!(LineStyle::parse("Smooth"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Granularity::default(), Granularity::Day);
        assert_eq!(LineStyle::default(), LineStyle::Smooth);
        assert_eq!(Theme::default(), Theme::Light);
    }
}
