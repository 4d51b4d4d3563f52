//! Variation identity and display descriptors

use crate::colors;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// Key used for variations declared without an id.
pub const FALLBACK_KEY: &str = "0";

/// Variation key (e.g., "1", "control")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationKey(pub String);

impl VariationKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for a variation that carries no id
    pub fn fallback() -> Self {
        Self(FALLBACK_KEY.to_string())
    }
}

impl std::fmt::Display for VariationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariationKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VariationKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for VariationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier as written in the dataset (numeric or textual)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariationId {
    Number(serde_json::Number),
    Text(String),
}

impl VariationId {
    /// String form of the id; numbers print the way `String(n)` does in a
    /// browser, so `2.0` becomes `"2"`.
    pub fn to_key(&self) -> VariationKey {
        match self {
            Self::Text(text) => VariationKey::new(text.clone()),
            Self::Number(num) => {
                if let Some(i) = num.as_i64() {
                    VariationKey::new(i.to_string())
                } else if let Some(u) = num.as_u64() {
                    VariationKey::new(u.to_string())
                } else {
                    let f = num.as_f64().unwrap_or_default();
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        VariationKey::new((f as i64).to_string())
                    } else {
                        VariationKey::new(f.to_string())
                    }
                }
            }
        }
    }
}

impl From<i64> for VariationId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for VariationId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Variation entry as declared in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VariationId>,
    pub name: String,
}

impl VariationSpec {
    pub fn new(id: Option<VariationId>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Derived key: the id's string form, or `"0"` when the id is absent.
    pub fn key(&self) -> VariationKey {
        self.id
            .as_ref()
            .map_or_else(VariationKey::fallback, VariationId::to_key)
    }
}

/// Display descriptor for one arm of the test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    pub key: VariationKey,
    pub name: String,
    pub color: &'static str,
}

impl Variation {
    pub fn new(key: impl Into<VariationKey>, name: impl Into<String>, index: usize) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            color: colors::series_color(index),
        }
    }
}

/// Build display descriptors in dataset order, assigning palette colors by
/// position.
///
/// Two variations that both omit their id share the `"0"` key; the collision
/// is reported but left in place.
pub fn map_variations(specs: &[VariationSpec]) -> Vec<Variation> {
    let mut seen = BTreeSet::new();
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let key = spec.key();
            if !seen.insert(key.clone()) {
                tracing::warn!(key = %key, name = %spec.name, "variation key collides with an earlier variation");
            }
            Variation::new(key, spec.name.clone(), index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation() {
        assert_eq!(VariationSpec::new(Some(1i64.into()), "A").key().as_str(), "1");
        assert_eq!(VariationSpec::new(Some("beta".into()), "B").key().as_str(), "beta");
        assert_eq!(VariationSpec::new(None, "C").key().as_str(), "0");
    }

    #[test]
    fn test_key_from_json_ids() {
        let specs: Vec<VariationSpec> = serde_json::from_str(
            r#"[{"id": 7, "name": "a"}, {"id": 2.0, "name": "b"}, {"id": 1.5, "name": "c"},
                {"id": null, "name": "d"}, {"name": "e"}, {"id": "x", "name": "f"}]"#,
        )
        .unwrap();
        let keys: Vec<String> = specs.iter().map(|s| s.key().0).collect();
        assert_eq!(keys, vec!["7", "2", "1.5", "0", "0", "x"]);
    }

    #[test]
    fn test_map_variations_assigns_palette() {
        let specs: Vec<VariationSpec> = (0..8)
            .map(|i| VariationSpec::new(Some(VariationId::from(i as i64 + 1)), format!("V{i}")))
            .collect();
        let variations = map_variations(&specs);

        assert_eq!(variations.len(), 8);
        assert_eq!(variations[0].color, colors::PALETTE[0]);
        assert_eq!(variations[6].color, colors::PALETTE[0]);
        assert_eq!(variations[7].color, colors::PALETTE[1]);
        assert_eq!(variations[3].key.as_str(), "4");
    }

    #[test]
    fn test_missing_ids_collide_on_fallback() {
        let specs = vec![VariationSpec::new(None, "A"), VariationSpec::new(None, "B")];
        let variations = map_variations(&specs);
        assert_eq!(variations[0].key, variations[1].key);
        assert_ne!(variations[0].color, variations[1].color);
    }
}
