//! Browser entry point

use crate::config::DashboardConfig;
use ab_components::Dashboard as DashboardView;
use ab_core::Dataset;
use ab_state::{Dashboard, LocalStorageStore, provide_dashboard_state};
use leptos::prelude::*;
use std::sync::Arc;
use tracing::{error, info};

pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    info!("Starting A/B conversion dashboard");
    leptos::mount::mount_to_body(App);
}

#[component]
fn App() -> impl IntoView {
    let config = DashboardConfig::default();
    let dataset = config.load_dataset().unwrap_or_else(|e| {
        error!(error = %e, "Embedded dataset is invalid");
        Dataset::default()
    });

    provide_dashboard_state(Dashboard::new(&dataset, Arc::new(LocalStorageStore)));

    view! { <DashboardView chart=config.chart export=config.export /> }
}
