//! Loading and saving `ViewState` through a `StateStore`

use crate::{Granularity, LineStyle, SelectedKeys, StateStore, Theme, ViewState, Zoom};
use ab_core::{Variation, VariationKey};
use tracing::{debug, warn};

/// Storage keys, one per preference
pub mod keys {
    pub const GRANULARITY: &str = "granularity";
    pub const SELECTED_KEYS: &str = "selectedKeys";
    pub const ZOOM: &str = "zoom";
    pub const LINE_STYLE: &str = "lineStyle";
    pub const THEME: &str = "theme";

    pub const ALL: [&str; 5] = [GRANULARITY, SELECTED_KEYS, ZOOM, LINE_STYLE, THEME];
}

/// A single persisted preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Granularity,
    SelectedKeys,
    Zoom,
    LineStyle,
    Theme,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Granularity => keys::GRANULARITY,
            Self::SelectedKeys => keys::SELECTED_KEYS,
            Self::Zoom => keys::ZOOM,
            Self::LineStyle => keys::LINE_STYLE,
            Self::Theme => keys::THEME,
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Granularity,
            Self::SelectedKeys,
            Self::Zoom,
            Self::LineStyle,
            Self::Theme,
        ]
    }

    /// Serialized value of this field in `state`
    pub fn encode(&self, state: &ViewState) -> String {
        match self {
            Self::Granularity => state.granularity().as_str().to_string(),
            Self::SelectedKeys => {
                serde_json::to_string(&state.selected().to_strings()).unwrap_or_else(|_| "[]".into())
            }
            Self::Zoom => state.zoom().percent().to_string(),
            Self::LineStyle => state.line_style().as_str().to_string(),
            Self::Theme => state.theme().as_str().to_string(),
        }
    }
}

/// Read one field, logging and discarding values that do not parse
fn load_field<T>(store: &dyn StateStore, field: Field, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = store.get(field.key())?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(key = field.key(), value = %raw, "Discarding unreadable stored preference");
    }
    parsed
}

fn parse_selected(raw: &str) -> Option<SelectedKeys> {
    serde_json::from_str::<Vec<String>>(raw)
        .ok()
        .map(|keys| SelectedKeys::from_keys(keys.into_iter().map(VariationKey::new)))
}

fn parse_zoom(raw: &str) -> Option<Zoom> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.round() as i64)
        })
        .map(Zoom::new)
}

/// Restore the view state, falling back to defaults field by field.
///
/// Stored selections are filtered to known variations; if nothing known
/// remains the first variation is selected.
pub fn load_view_state(store: &dyn StateStore, variations: &[Variation]) -> ViewState {
    let defaults = ViewState::new(variations);

    let granularity = load_field(store, Field::Granularity, Granularity::parse)
        .unwrap_or(defaults.granularity());
    let zoom = load_field(store, Field::Zoom, parse_zoom).unwrap_or(defaults.zoom());
    let line_style =
        load_field(store, Field::LineStyle, LineStyle::parse).unwrap_or(defaults.line_style());
    let theme = load_field(store, Field::Theme, Theme::parse).unwrap_or(defaults.theme());

    let selected = match load_field(store, Field::SelectedKeys, parse_selected) {
        Some(mut stored) => {
            stored.retain_known(variations);
            stored.ensure_non_empty(variations);
            stored
        }
        None => defaults.selected().clone(),
    };

    let state = ViewState::from_parts(granularity, selected, zoom, line_style, theme);
    debug!(
        granularity = state.granularity().as_str(),
        selected = state.selected().len(),
        zoom = state.zoom().percent(),
        "Loaded view state"
    );
    state
}

/// Write one field. Failures are logged; the in-memory state stays current.
pub fn persist_field(store: &dyn StateStore, state: &ViewState, field: Field) {
    if let Err(e) = store.set(field.key(), &field.encode(state)) {
        warn!(key = field.key(), error = %e, "Failed to persist preference");
    }
}

/// Write every field
pub fn persist_all(store: &dyn StateStore, state: &ViewState) {
    for field in Field::all() {
        persist_field(store, state, *field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn variations() -> Vec<Variation> {
        vec![
            Variation::new("1", "Original", 0),
            Variation::new("2", "Variation A", 1),
            Variation::new("3", "Variation B", 2),
        ]
    }

    #[test]
    fn test_empty_store_gives_defaults() {
        let store = MemoryStore::new();
        let state = load_view_state(&store, &variations());
        assert_eq!(state, ViewState::new(&variations()));
    }

    #[test]
    fn test_every_field_round_trips() {
        let vars = variations();
        let mut state = ViewState::new(&vars);
        state.set_granularity(Granularity::Week);
        state.toggle(&"2".into());
        state.set_zoom(220);
        state.set_line_style(LineStyle::Area);
        state.set_theme(Theme::Dark);

        let store = MemoryStore::new();
        persist_all(&store, &state);

        assert_eq!(store.get(keys::GRANULARITY).as_deref(), Some("week"));
        assert_eq!(store.get(keys::SELECTED_KEYS).as_deref(), Some(r#"["1","3"]"#));
        assert_eq!(store.get(keys::ZOOM).as_deref(), Some("220"));
        assert_eq!(store.get(keys::LINE_STYLE).as_deref(), Some("area"));
        assert_eq!(store.get(keys::THEME).as_deref(), Some("dark"));

        assert_eq!(load_view_state(&store, &vars), state);
    }

    #[test]
    fn test_corrupt_field_falls_back_alone() {
        let store = MemoryStore::with_entries([
            (keys::GRANULARITY, "fortnight"),
            (keys::SELECTED_KEYS, "not json"),
            (keys::ZOOM, "abc"),
            (keys::LINE_STYLE, "line"),
            (keys::THEME, "dark"),
        ]);
        let state = load_view_state(&store, &variations());

        assert_eq!(state.granularity(), Granularity::Day);
        assert_eq!(state.selected().len(), 3);
        assert_eq!(state.zoom().percent(), 100);
        assert_eq!(state.line_style(), LineStyle::Line);
        assert_eq!(state.theme(), Theme::Dark);
    }

    #[test]
    fn test_stored_zoom_is_clamped() {
        let store = MemoryStore::with_entries([(keys::ZOOM, "9000")]);
        assert_eq!(load_view_state(&store, &variations()).zoom().percent(), 300);

        let store = MemoryStore::with_entries([(keys::ZOOM, "2.4")]);
        assert_eq!(load_view_state(&store, &variations()).zoom().percent(), 10);

        let store = MemoryStore::with_entries([(keys::ZOOM, " 130 ")]);
        assert_eq!(load_view_state(&store, &variations()).zoom().percent(), 130);
    }

    #[test]
    fn test_stored_selection_is_repaired() {
        let store = MemoryStore::with_entries([(keys::SELECTED_KEYS, r#"["7","8"]"#)]);
        let state = load_view_state(&store, &variations());
        assert_eq!(state.selected().to_strings(), vec!["1"]);

        let store = MemoryStore::with_entries([(keys::SELECTED_KEYS, "[]")]);
        let state = load_view_state(&store, &variations());
        assert_eq!(state.selected().to_strings(), vec!["1"]);

        let store = MemoryStore::with_entries([(keys::SELECTED_KEYS, r#"["3","99"]"#)]);
        let state = load_view_state(&store, &variations());
        assert_eq!(state.selected().to_strings(), vec!["3"]);
    }

    #[test]
    fn test_persist_single_field() {
        let store = MemoryStore::new();
        let mut state = ViewState::new(&variations());
        state.set_theme(Theme::Dark);
        persist_field(&store, &state, Field::Theme);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}
