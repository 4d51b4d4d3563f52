//! Native snapshot tool
//!
//! Applies view changes to the stored preferences, the same way the browser
//! controls do, then writes the resulting chart as a PNG.

use crate::config::{DEFAULT_STORE_PATH, DashboardConfig};
use ab_charts::{ExportConfig, ExportError, RateChartLayout, export_png};
use ab_core::{DatasetError, VariationKey};
use ab_state::{Dashboard, Granularity, JsonFileStore, LineStyle, Theme, UserEvent};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Parser)]
#[command(
    name = "ab-dashboard",
    version,
    about = "Render an A/B test conversion rate chart"
)]
pub struct Cli {
    /// Dataset JSON file (defaults to the embedded sample)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Preference store file
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// Directory for the exported PNG
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Pixels per chart unit
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    #[arg(long, value_parser = parse_granularity)]
    pub granularity: Option<Granularity>,

    #[arg(long, value_parser = parse_line_style)]
    pub line_style: Option<LineStyle>,

    #[arg(long, value_parser = parse_theme)]
    pub theme: Option<Theme>,

    /// Zoom percent, clamped to the slider range
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: Option<i64>,

    /// Toggle a variation by key (repeatable)
    #[arg(long = "toggle", value_name = "KEY")]
    pub toggles: Vec<String>,

    /// Clear stored preferences first
    #[arg(long)]
    pub reset: bool,
}

impl Cli {
    pub fn config(&self) -> DashboardConfig {
        let mut config = DashboardConfig::default()
            .with_store_path(&self.store)
            .with_export(
                ExportConfig::default()
                    .with_directory(&self.out_dir)
                    .with_scale(self.scale),
            );
        if let Some(path) = &self.dataset {
            config = config.with_dataset(path);
        }
        config
    }

    /// View changes in the order they are applied
    pub fn events(&self) -> Vec<UserEvent> {
        let mut events: Vec<UserEvent> = self
            .toggles
            .iter()
            .map(|key| UserEvent::Toggle(VariationKey::new(key.as_str())))
            .collect();
        events.extend(self.granularity.map(UserEvent::SetGranularity));
        events.extend(self.line_style.map(UserEvent::SetLineStyle));
        events.extend(self.theme.map(UserEvent::SetTheme));
        events.extend(self.zoom.map(UserEvent::SetZoom));
        events
    }
}

pub fn run(cli: Cli) -> Result<PathBuf, AppError> {
    let config = cli.config();
    let dataset = config.load_dataset()?;
    let store = Arc::new(JsonFileStore::open(&config.store_path));
    let mut dashboard = Dashboard::new(&dataset, store);

    if cli.reset {
        dashboard.reset_preferences();
    }
    for event in cli.events() {
        let effects = dashboard.dispatch(event);
        debug!(?effects, "Event applied");
    }

    let snapshot = dashboard.snapshot();
    info!(
        granularity = snapshot.granularity.as_str(),
        rows = snapshot.rows.len(),
        selected = snapshot.selected.len(),
        min = snapshot.domain.min,
        max = snapshot.domain.max,
        "View ready"
    );

    let svg = RateChartLayout::compute(&snapshot, &config.chart).to_svg();
    let path = export_png(&svg, &config.export)?;
    info!(path = %path.display(), "Chart exported");
    Ok(path)
}

fn parse_granularity(s: &str) -> Result<Granularity, String> {
    Granularity::parse(s).ok_or_else(|| expected(Granularity::all().iter().map(|g| g.as_str())))
}

fn parse_line_style(s: &str) -> Result<LineStyle, String> {
    LineStyle::parse(s).ok_or_else(|| expected(LineStyle::all().iter().map(|l| l.as_str())))
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    Theme::parse(s).ok_or_else(|| expected(Theme::all().iter().map(|t| t.as_str())))
}

fn expected<'a>(names: impl Iterator<Item = &'a str>) -> String {
    format!("expected one of: {}", names.collect::<Vec<_>>().join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_state::{StateStore, keys};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ab-app-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "ab-dashboard",
            "--granularity",
            "week",
            "--line-style",
            "area",
            "--zoom",
            "-20",
            "--toggle",
            "10001",
        ])
        .unwrap();

        assert_eq!(
            cli.events(),
            vec![
                UserEvent::Toggle(VariationKey::from("10001")),
                UserEvent::SetGranularity(Granularity::Week),
                UserEvent::SetLineStyle(LineStyle::Area),
                UserEvent::SetZoom(-20),
            ]
        );
        assert_eq!(cli.store, PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_rejects_unknown_style() {
        let err = Cli::try_parse_from(["ab-dashboard", "--line-style", "curvy"]).unwrap_err();
        assert!(err.to_string().contains("expected one of: line, smooth, area"));
    }

    #[test]
    fn test_run_persists_and_exports() {
        let dir = scratch_dir("run");
        let store = dir.join("prefs.json");
        let cli = Cli::try_parse_from([
            "ab-dashboard".to_string(),
            "--store".to_string(),
            store.display().to_string(),
            "--out-dir".to_string(),
            dir.display().to_string(),
            "--scale".to_string(),
            "1".to_string(),
            "--granularity".to_string(),
            "week".to_string(),
            "--zoom".to_string(),
            "500".to_string(),
        ])
        .unwrap();

        let path = run(cli).unwrap();
        assert_eq!(path, dir.join("ab-chart.png"));
        assert!(path.exists());

        let reopened = JsonFileStore::open(&store);
        assert_eq!(reopened.get(keys::GRANULARITY).as_deref(), Some("week"));
        assert_eq!(reopened.get(keys::ZOOM).as_deref(), Some("300"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
