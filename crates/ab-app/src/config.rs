//! Application configuration

use ab_charts::{ExportConfig, RateChartConfig};
use ab_core::{Dataset, DatasetError};
use std::path::PathBuf;

/// Sample experiment bundled into the binary
pub const EMBEDDED_DATASET: &str = include_str!("../data/data.json");

/// Preference file used by native builds
pub const DEFAULT_STORE_PATH: &str = ".ab-dashboard/preferences.json";

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset file; the embedded sample when `None`
    pub dataset: Option<PathBuf>,
    /// Where preferences live outside the browser
    pub store_path: PathBuf,
    pub chart: RateChartConfig,
    pub export: ExportConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            chart: RateChartConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_dataset(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset = Some(path.into());
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    /// Load the configured dataset
    pub fn load_dataset(&self) -> Result<Dataset, DatasetError> {
        match &self.dataset {
            Some(path) => Dataset::from_path(path),
            None => Dataset::from_json(EMBEDDED_DATASET),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_core::VariationKey;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.dataset, None);
        assert_eq!(config.store_path, PathBuf::from(".ab-dashboard/preferences.json"));
        assert_eq!(config.export.file_name, "ab-chart.png");
    }

    #[test]
    fn test_embedded_dataset_loads() {
        let dataset = DashboardConfig::default().load_dataset().unwrap();
        let keys: Vec<VariationKey> = dataset.variations().into_iter().map(|v| v.key).collect();
        assert_eq!(
            keys,
            vec![
                VariationKey::from("0"),
                VariationKey::from("10001"),
                VariationKey::from("10002"),
                VariationKey::from("10003"),
            ]
        );
        assert_eq!(dataset.len(), 42);
    }

    #[test]
    fn test_missing_dataset_file() {
        let config = DashboardConfig::default().with_dataset("/nonexistent/ab/data.json");
        assert!(matches!(config.load_dataset(), Err(DatasetError::Io { .. })));
    }
}
