//! Raw experiment dataset: variations plus per-day visit/conversion counts

use crate::{Variation, VariationKey, VariationSpec, map_variations};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One calendar day of raw counts, keyed by variation key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub visits: BTreeMap<String, u64>,
    #[serde(default)]
    pub conversions: BTreeMap<String, u64>,
}

impl SourceRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            visits: BTreeMap::new(),
            conversions: BTreeMap::new(),
        }
    }

    /// Builder: record counts for one variation
    pub fn with_counts(mut self, key: &str, visits: u64, conversions: u64) -> Self {
        self.visits.insert(key.to_string(), visits);
        self.conversions.insert(key.to_string(), conversions);
        self
    }

    /// Visits for a variation (0 when absent)
    pub fn visits_for(&self, key: &VariationKey) -> u64 {
        self.visits.get(key.as_str()).copied().unwrap_or(0)
    }

    /// Conversions for a variation (0 when absent)
    pub fn conversions_for(&self, key: &VariationKey) -> u64 {
        self.conversions.get(key.as_str()).copied().unwrap_or(0)
    }
}

/// The experiment as loaded at startup; read-only afterwards
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub variations: Vec<VariationSpec>,
    #[serde(default)]
    pub data: Vec<SourceRow>,
}

impl Dataset {
    pub fn new(variations: Vec<VariationSpec>, data: Vec<SourceRow>) -> Self {
        Self { variations, data }
    }

    /// Parse the `{variations, data}` JSON document
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        tracing::info!(
            variations = dataset.variations.len(),
            days = dataset.data.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Read and parse a dataset file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Display descriptors in declaration order
    pub fn variations(&self) -> Vec<Variation> {
        map_variations(&self.variations)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
