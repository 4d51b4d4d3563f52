//! The dashboard engine: dataset-derived series plus the live view state

use crate::{
    Field, Granularity, LineStyle, SelectedKeys, StateStore, Theme, ViewState, Zoom,
    load_view_state, persist_field,
};
use ab_core::{
    Dataset, Domain, PreparedRow, Variation, VariationKey, aggregate_by_week, compute_domain,
    prepare_daily,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

// ============================================================================
// BOUNDARY TYPES
// ============================================================================

/// Discrete actions the rendering layer feeds back
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Toggle(VariationKey),
    SetGranularity(Granularity),
    SetZoom(i64),
    SetLineStyle(LineStyle),
    SetTheme(Theme),
    ResetZoom,
    RequestExport,
}

/// Side effects the rendering layer should carry out after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effects {
    /// Visible output changed
    pub redraw: bool,
    /// Scroll the chart container back to its origin
    pub scroll_to_top: bool,
    /// Rasterize the current chart
    pub export: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    fn redraw(changed: bool) -> Self {
        Self {
            redraw: changed,
            ..Self::default()
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct ChartSnapshot<'a> {
    pub rows: &'a [PreparedRow],
    pub variations: &'a [Variation],
    pub selected: &'a SelectedKeys,
    pub domain: Domain,
    pub granularity: Granularity,
    pub line_style: LineStyle,
    pub zoom: Zoom,
    pub theme: Theme,
}

impl<'a> ChartSnapshot<'a> {
    /// Selected variations in declaration order
    pub fn visible_variations(self) -> impl Iterator<Item = &'a Variation> {
        let selected = self.selected;
        self.variations
            .iter()
            .filter(move |v| selected.contains(&v.key))
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Owns the prepared series and the view state.
///
/// Daily rows are built once at construction; weekly rows on first use. The
/// domain is recomputed whenever the granularity or selection changes.
pub struct Dashboard {
    variations: Vec<Variation>,
    daily: Vec<PreparedRow>,
    weekly: OnceLock<Vec<PreparedRow>>,
    view: ViewState,
    domain: Domain,
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("variations", &self.variations.len())
            .field("days", &self.daily.len())
            .field("view", &self.view)
            .field("domain", &self.domain)
            .finish()
    }
}

impl Dashboard {
    /// Prepare the dataset and restore persisted preferences
    pub fn new(dataset: &Dataset, store: Arc<dyn StateStore>) -> Self {
        let variations = dataset.variations();
        let daily = prepare_daily(&dataset.data, &variations);
        let mut view = load_view_state(store.as_ref(), &variations);
        let repaired = view.ensure_non_empty_selection(&variations);

        // Write back a stored selection that was filtered or replaced on load
        let stored = store.get(Field::SelectedKeys.key());
        let encoded = Field::SelectedKeys.encode(&view);
        if repaired || stored.is_some_and(|raw| raw != encoded) {
            persist_field(store.as_ref(), &view, Field::SelectedKeys);
        }

        let mut dashboard = Self {
            variations,
            daily,
            weekly: OnceLock::new(),
            view,
            domain: Domain::FALLBACK,
            store,
        };
        dashboard.refresh_domain();

        info!(
            variations = dashboard.variations.len(),
            days = dashboard.daily.len(),
            granularity = dashboard.view.granularity().as_str(),
            "Dashboard ready"
        );
        dashboard
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn daily_rows(&self) -> &[PreparedRow] {
        &self.daily
    }

    pub fn weekly_rows(&self) -> &[PreparedRow] {
        self.weekly.get_or_init(|| {
            let weekly = aggregate_by_week(&self.daily);
            debug!(weeks = weekly.len(), "Aggregated weekly rows");
            weekly
        })
    }

    /// Rows for the current granularity
    pub fn rows(&self) -> &[PreparedRow] {
        match self.view.granularity() {
            Granularity::Day => self.daily_rows(),
            Granularity::Week => self.weekly_rows(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn snapshot(&self) -> ChartSnapshot<'_> {
        ChartSnapshot {
            rows: self.rows(),
            variations: &self.variations,
            selected: self.view.selected(),
            domain: self.domain,
            granularity: self.view.granularity(),
            line_style: self.view.line_style(),
            zoom: self.view.zoom(),
            theme: self.view.theme(),
        }
    }

    fn refresh_domain(&mut self) {
        self.domain = compute_domain(self.rows(), self.view.selected());
        debug!(min = self.domain.min, max = self.domain.max, "Domain recomputed");
    }

    fn persist(&self, field: Field) {
        persist_field(self.store.as_ref(), &self.view, field);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Apply one user event and report what the renderer should do
    pub fn dispatch(&mut self, event: UserEvent) -> Effects {
        debug!(?event, "Dispatching");
        match event {
            UserEvent::Toggle(key) => Effects::redraw(self.toggle(&key)),
            UserEvent::SetGranularity(g) => Effects::redraw(self.set_granularity(g)),
            UserEvent::SetZoom(v) => Effects::redraw(self.set_zoom(v)),
            UserEvent::SetLineStyle(s) => Effects::redraw(self.set_line_style(s)),
            UserEvent::SetTheme(t) => Effects::redraw(self.set_theme(t)),
            UserEvent::ResetZoom => Effects {
                redraw: self.reset_zoom(),
                scroll_to_top: true,
                export: false,
            },
            UserEvent::RequestExport => Effects {
                export: true,
                ..Effects::none()
            },
        }
    }

    pub fn set_granularity(&mut self, granularity: Granularity) -> bool {
        let changed = self.view.set_granularity(granularity);
        self.persist(Field::Granularity);
        if changed {
            self.refresh_domain();
        }
        changed
    }

    /// Flip a variation in or out of the selection; the last one stays
    pub fn toggle(&mut self, key: &VariationKey) -> bool {
        let changed = self.view.toggle(key);
        if changed {
            self.persist(Field::SelectedKeys);
            self.refresh_domain();
        } else {
            debug!(key = %key, "Refusing to deselect the last variation");
        }
        changed
    }

    pub fn set_zoom(&mut self, value: i64) -> bool {
        let changed = self.view.set_zoom(value);
        self.persist(Field::Zoom);
        changed
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.view.reset_zoom();
        self.persist(Field::Zoom);
        changed
    }

    pub fn set_line_style(&mut self, style: LineStyle) -> bool {
        let changed = self.view.set_line_style(style);
        self.persist(Field::LineStyle);
        changed
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        let changed = self.view.set_theme(theme);
        self.persist(Field::Theme);
        changed
    }

    /// Repair an empty selection. Run whenever the variation set changes.
    pub fn ensure_non_empty_selection(&mut self) -> bool {
        let changed = self.view.ensure_non_empty_selection(&self.variations);
        if changed {
            self.persist(Field::SelectedKeys);
            self.refresh_domain();
        }
        changed
    }

    /// Forget stored preferences and return to defaults
    pub fn reset_preferences(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored preferences");
        }
        self.view = ViewState::new(&self.variations);
        self.refresh_domain();
        info!("Preferences reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, keys};
    use ab_core::{SourceRow, VariationId, VariationSpec};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                VariationSpec::new(None, "Original"),
                VariationSpec::new(Some(VariationId::from(10001i64)), "Variation A"),
            ],
            vec![
                // Monday 2024-01-01
                SourceRow::new(date(1, 1)).with_counts("0", 100, 10).with_counts("10001", 100, 20),
                SourceRow::new(date(1, 2)).with_counts("0", 100, 30).with_counts("10001", 100, 40),
                // Monday 2024-01-08
                SourceRow::new(date(1, 8)).with_counts("0", 50, 5).with_counts("10001", 0, 0),
            ],
        )
    }

    fn dashboard() -> (Dashboard, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Dashboard::new(&dataset(), store.clone()), store)
    }

    #[test]
    fn test_new_prepares_daily_rows() {
        let (dash, _) = dashboard();
        assert_eq!(dash.variations().len(), 2);
        assert_eq!(dash.rows().len(), 3);
        assert_eq!(dash.rows()[0].rate(&"0".into()), Some(10.0));
        assert_eq!(dash.rows()[2].rate(&"10001".into()), Some(0.0));
        assert_eq!(dash.view().selected().len(), 2);
    }

    #[test]
    fn test_weekly_granularity_switches_rows() {
        let (mut dash, store) = dashboard();
        assert!(dash.set_granularity(Granularity::Week));

        let rows = dash.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(1, 1));
        assert_eq!(rows[0].rate(&"0".into()), Some(20.0));
        assert_eq!(rows[0].rate(&"10001".into()), Some(30.0));
        assert_eq!(rows[1].date, date(1, 8));
        assert_eq!(store.get(keys::GRANULARITY).as_deref(), Some("week"));
    }

    #[test]
    fn test_domain_follows_selection() {
        let (mut dash, _) = dashboard();
        // Both series: 0..40, padding 4
        assert_eq!(dash.domain(), Domain::new(0.0, 44.0));

        dash.toggle(&"10001".into());
        // Original only: 10..30, padding 2
        assert_eq!(dash.domain(), Domain::new(8.0, 32.0));
    }

    #[test]
    fn test_toggle_last_key_is_noop() {
        let (mut dash, store) = dashboard();
        assert!(dash.toggle(&"0".into()));
        assert_eq!(store.get(keys::SELECTED_KEYS).as_deref(), Some(r#"["10001"]"#));

        let effects = dash.dispatch(UserEvent::Toggle("10001".into()));
        assert!(!effects.redraw);
        assert_eq!(dash.view().selected().to_strings(), vec!["10001"]);
    }

    #[test]
    fn test_reset_zoom_requests_scroll() {
        let (mut dash, store) = dashboard();
        dash.dispatch(UserEvent::SetZoom(500));
        assert_eq!(dash.view().zoom().percent(), 300);
        assert_eq!(store.get(keys::ZOOM).as_deref(), Some("300"));

        let effects = dash.dispatch(UserEvent::ResetZoom);
        assert!(effects.redraw);
        assert!(effects.scroll_to_top);
        assert_eq!(dash.view().zoom().percent(), 100);
        assert_eq!(store.get(keys::ZOOM).as_deref(), Some("100"));
    }

    #[test]
    fn test_export_does_not_touch_state() {
        let (mut dash, store) = dashboard();
        let before = dash.view().clone();
        let effects = dash.dispatch(UserEvent::RequestExport);
        assert_eq!(effects, Effects { export: true, ..Effects::none() });
        assert_eq!(dash.view(), &before);
        assert!(store.is_empty());
    }

    #[test]
    fn test_preferences_survive_restart() {
        let (mut dash, store) = dashboard();
        dash.dispatch(UserEvent::SetLineStyle(LineStyle::Area));
        dash.dispatch(UserEvent::SetTheme(Theme::Dark));
        dash.dispatch(UserEvent::SetGranularity(Granularity::Week));

        let restarted = Dashboard::new(&dataset(), store);
        assert_eq!(restarted.view().line_style(), LineStyle::Area);
        assert_eq!(restarted.view().theme(), Theme::Dark);
        assert_eq!(restarted.rows().len(), 2);
    }

    #[test]
    fn test_stale_selection_repaired_on_load() {
        let store = Arc::new(MemoryStore::with_entries([(keys::SELECTED_KEYS, r#"["gone"]"#)]));
        let dash = Dashboard::new(&dataset(), store.clone());
        assert_eq!(dash.view().selected().to_strings(), vec!["0"]);
        assert_eq!(store.get(keys::SELECTED_KEYS).as_deref(), Some(r#"["0"]"#));
    }

    #[test]
    fn test_empty_stored_selection_written_back() {
        let store = Arc::new(MemoryStore::with_entries([(keys::SELECTED_KEYS, "[]")]));
        Dashboard::new(&dataset(), store.clone());
        assert_eq!(store.get(keys::SELECTED_KEYS).as_deref(), Some(r#"["0"]"#));
    }

    #[test]
    fn test_unknown_keys_dropped_from_store() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::SELECTED_KEYS,
            r#"["10001","gone"]"#,
        )]));
        let dash = Dashboard::new(&dataset(), store.clone());
        assert_eq!(dash.view().selected().to_strings(), vec!["10001"]);
        assert_eq!(store.get(keys::SELECTED_KEYS).as_deref(), Some(r#"["10001"]"#));
    }

    #[test]
    fn test_clean_load_writes_nothing() {
        let store = Arc::new(MemoryStore::with_entries([(keys::SELECTED_KEYS, r#"["10001"]"#)]));
        Dashboard::new(&dataset(), store.clone());
        assert_eq!(store.len(), 1);

        let (_, empty) = dashboard();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_reset_preferences() {
        let (mut dash, store) = dashboard();
        dash.set_theme(Theme::Dark);
        dash.set_zoom(40);
        dash.reset_preferences();

        assert!(store.is_empty());
        assert_eq!(dash.view(), &ViewState::new(dash.variations()));
    }

    #[test]
    fn test_empty_dataset() {
        let dash = Dashboard::new(&Dataset::default(), Arc::new(MemoryStore::new()));
        assert!(dash.rows().is_empty());
        assert!(dash.view().selected().is_empty());
        assert_eq!(dash.domain(), Domain::FALLBACK);
    }

    #[test]
    fn test_snapshot_visible_variations() {
        let (mut dash, _) = dashboard();
        dash.toggle(&"0".into());
        let snapshot = dash.snapshot();
        let names: Vec<&str> = snapshot.visible_variations().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Variation A"]);
        assert_eq!(snapshot.zoom.percent(), 100);
    }
}
