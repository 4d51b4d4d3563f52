//! Leptos signal wrapper around the dashboard engine

use crate::{Dashboard, Effects, Granularity, LineStyle, SelectedKeys, Theme, UserEvent, Zoom};
use ab_core::{Domain, VariationKey};
use leptos::prelude::*;

/// Reactive dashboard state shared through context
#[derive(Clone, Copy)]
pub struct DashboardState {
    /// Engine; notifies subscribers only when the visible output changes
    pub dashboard: RwSignal<Dashboard>,
    /// Bumped on every scroll-to-top request
    pub scroll_requests: RwSignal<u32>,
    /// Bumped on every export request
    pub export_requests: RwSignal<u32>,
}

impl DashboardState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: RwSignal::new(dashboard),
            scroll_requests: RwSignal::new(0),
            export_requests: RwSignal::new(0),
        }
    }

    /// Route one user event through the engine and fan out its effects
    pub fn dispatch(&self, event: UserEvent) -> Effects {
        let effects = self
            .dashboard
            .try_update_untracked(|d| d.dispatch(event))
            .unwrap_or_default();

        if effects.redraw {
            self.dashboard.notify();
        }
        if effects.scroll_to_top {
            self.scroll_requests.update(|n| *n = n.wrapping_add(1));
        }
        if effects.export {
            self.export_requests.update(|n| *n = n.wrapping_add(1));
        }
        effects
    }

    /// Clear stored preferences and redraw with defaults
    pub fn reset_preferences(&self) {
        self.dashboard.update(|d| d.reset_preferences());
    }

    /// Toggle a variation; returns whether it is selected afterwards.
    /// A refused toggle (the last selected key) returns `true`.
    pub fn toggle(&self, key: VariationKey) -> bool {
        self.dispatch(UserEvent::Toggle(key.clone()));
        self.is_selected(&key)
    }

    pub fn is_selected(&self, key: &VariationKey) -> bool {
        self.dashboard.with_untracked(|d| d.view().is_selected(key))
    }
}

/// Derived signals that only fire when their value changes
#[derive(Clone, Copy)]
pub struct DashboardComputed {
    pub granularity: Memo<Granularity>,
    pub line_style: Memo<LineStyle>,
    pub theme: Memo<Theme>,
    pub zoom: Memo<Zoom>,
    pub selected: Memo<SelectedKeys>,
    pub domain: Memo<Domain>,
    /// Rows in the active series
    pub row_count: Memo<usize>,
}

impl DashboardComputed {
    pub fn new(state: &DashboardState) -> Self {
        let dashboard = state.dashboard;

        Self {
            granularity: Memo::new(move |_| dashboard.with(|d| d.view().granularity())),
            line_style: Memo::new(move |_| dashboard.with(|d| d.view().line_style())),
            theme: Memo::new(move |_| dashboard.with(|d| d.view().theme())),
            zoom: Memo::new(move |_| dashboard.with(|d| d.view().zoom())),
            selected: Memo::new(move |_| dashboard.with(|d| d.view().selected().clone())),
            domain: Memo::new(move |_| dashboard.with(|d| d.domain())),
            row_count: Memo::new(move |_| dashboard.with(|d| d.rows().len())),
        }
    }
}

// ============================================================================
// CONTEXT HELPERS
// ============================================================================

/// Provide dashboard state to the component tree
pub fn provide_dashboard_state(dashboard: Dashboard) -> DashboardState {
    let state = DashboardState::new(dashboard);
    provide_context(state);
    provide_context(DashboardComputed::new(&state));
    state
}

/// Use dashboard state from context
pub fn use_dashboard_state() -> DashboardState {
    expect_context::<DashboardState>()
}

/// Use derived dashboard signals from context
pub fn use_dashboard_computed() -> DashboardComputed {
    expect_context::<DashboardComputed>()
}
