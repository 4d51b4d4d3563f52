//! View state: the persisted, validated user controls

use crate::{DEFAULT_ZOOM, Granularity, LineStyle, MAX_ZOOM, MIN_ZOOM, Theme};
use ab_core::{Variation, VariationKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// ZOOM
// ============================================================================

/// Chart zoom in percent, always within `[MIN_ZOOM, MAX_ZOOM]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u16")]
pub struct Zoom(u16);

impl Zoom {
    /// Clamp any requested value into range
    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(MIN_ZOOM), i64::from(MAX_ZOOM)) as u16)
    }

    pub fn percent(&self) -> u16 {
        self.0
    }

    /// Scale factor (1.0 at 100%)
    pub fn factor(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Slider fill position in `[0, 1]`
    pub fn slider_ratio(&self) -> f64 {
        f64::from(self.0 - MIN_ZOOM) / f64::from(MAX_ZOOM - MIN_ZOOM)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

impl From<i64> for Zoom {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Zoom> for u16 {
    fn from(zoom: Zoom) -> Self {
        zoom.0
    }
}

impl std::fmt::Display for Zoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// Selected variation keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedKeys(BTreeSet<VariationKey>);

impl SelectedKeys {
    /// Every variation selected
    pub fn all_of(variations: &[Variation]) -> Self {
        Self(variations.iter().map(|v| v.key.clone()).collect())
    }

    pub fn from_keys(keys: impl IntoIterator<Item = VariationKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    pub fn contains(&self, key: &VariationKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariationKey> {
        self.0.iter()
    }

    /// Flip membership of `key`. Removing the last selected key is refused.
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, key: &VariationKey) -> bool {
        if self.0.contains(key) {
            if self.0.len() == 1 {
                return false;
            }
            self.0.remove(key)
        } else {
            self.0.insert(key.clone())
        }
    }

    /// Select the first known variation when nothing is selected.
    /// Returns whether the selection changed.
    pub fn ensure_non_empty(&mut self, variations: &[Variation]) -> bool {
        if !self.0.is_empty() {
            return false;
        }
        match variations.first() {
            Some(first) => self.0.insert(first.key.clone()),
            None => false,
        }
    }

    /// Drop keys that no known variation carries
    pub fn retain_known(&mut self, variations: &[Variation]) {
        self.0.retain(|key| variations.iter().any(|v| &v.key == key));
    }

    /// Keys as plain strings, in key order
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a SelectedKeys {
    type Item = &'a VariationKey;
    type IntoIter = std::collections::btree_set::Iter<'a, VariationKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// VIEW STATE
// ============================================================================

/// The complete set of user-controlled display parameters.
///
/// Fields are private so every change goes through a transition that keeps
/// the invariants: zoom stays clamped and the selection is never emptied by a
/// toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    granularity: Granularity,
    selected: SelectedKeys,
    zoom: Zoom,
    line_style: LineStyle,
    theme: Theme,
}

impl ViewState {
    /// Defaults: every variation selected, daily rows, 100% zoom, smooth
    /// lines, light theme.
    pub fn new(variations: &[Variation]) -> Self {
        Self {
            granularity: Granularity::default(),
            selected: SelectedKeys::all_of(variations),
            zoom: Zoom::default(),
            line_style: LineStyle::default(),
            theme: Theme::default(),
        }
    }

    pub fn from_parts(
        granularity: Granularity,
        selected: SelectedKeys,
        zoom: Zoom,
        line_style: LineStyle,
        theme: Theme,
    ) -> Self {
        Self {
            granularity,
            selected,
            zoom,
            line_style,
            theme,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn selected(&self) -> &SelectedKeys {
        &self.selected
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_selected(&self, key: &VariationKey) -> bool {
        self.selected.contains(key)
    }

    // ========================================================================
    // Transitions (each returns whether the field changed)
    // ========================================================================

    pub fn set_granularity(&mut self, granularity: Granularity) -> bool {
        let changed = self.granularity != granularity;
        self.granularity = granularity;
        changed
    }

    pub fn toggle(&mut self, key: &VariationKey) -> bool {
        self.selected.toggle(key)
    }

    pub fn set_zoom(&mut self, value: i64) -> bool {
        let zoom = Zoom::new(value);
        let changed = self.zoom != zoom;
        self.zoom = zoom;
        changed
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(i64::from(DEFAULT_ZOOM))
    }

    pub fn set_line_style(&mut self, style: LineStyle) -> bool {
        let changed = self.line_style != style;
        self.line_style = style;
        changed
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        let changed = self.theme != theme;
        self.theme = theme;
        changed
    }

    pub fn ensure_non_empty_selection(&mut self, variations: &[Variation]) -> bool {
        self.selected.ensure_non_empty(variations)
    }
}
