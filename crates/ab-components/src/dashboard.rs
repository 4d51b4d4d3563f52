//! Main dashboard layout component

use ab_charts::{ExportConfig, RateChart, RateChartConfig, export_snapshot};
use ab_state::{Theme, use_dashboard_computed, use_dashboard_state};
use leptos::prelude::*;
use tracing::warn;

use crate::Controls;

#[component]
pub fn Dashboard(
    #[prop(optional)] chart: Option<RateChartConfig>,
    #[prop(optional)] export: Option<ExportConfig>,
) -> impl IntoView {
    let state = use_dashboard_state();
    let computed = use_dashboard_computed();

    let chart = chart.unwrap_or_default();
    let export = export.unwrap_or_default();

    // Mirror the theme onto <html> so page chrome follows it
    Effect::new(move |_| apply_document_theme(computed.theme.get()));

    Effect::new(move |_| {
        if state.scroll_requests.get() > 0 {
            scroll_to_top();
        }
    });

    let export_chart = chart.clone();
    Effect::new(move |_| {
        if state.export_requests.get() > 0 {
            state
                .dashboard
                .with_untracked(|d| export_snapshot(&d.snapshot(), &export_chart, &export));
        }
    });

    view! {
        <div class=move || format!("app {}", computed.theme.get().css_class())>
            <header class="app-header">
                <h1 class="app-title">"AB Test: Conversion Rate"</h1>
            </header>

            <main class="app-main">
                <Controls />

                <section class="panel chart-panel">
                    <RateChart config=chart />
                </section>
            </main>

            <footer class="app-footer">
                <span>"Values displayed as percentages. Data source: local data.json"</span>
                <span class="row-count">
                    {move || format!("{} points", computed.row_count.get())}
                </span>
            </footer>
        </div>
    }
}

fn apply_document_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
        warn!(error = ?e, "Failed to apply theme attribute");
    }
}

fn scroll_to_top() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let options = web_sys::ScrollToOptions::new();
    options.set_top(0.0);
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}
