//! Pipeline configuration
//!
//! The listing, search and fetch endpoints share one pipeline and differ only
//! in these flags.

use serde::{Deserialize, Serialize};

/// When population runs relative to filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateOrder {
    /// Before filtering only when a reverse join meets a non-empty filter
    #[default]
    Auto,
    /// Always before filtering
    Always,
    /// Always after filtering
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub populate_order: PopulateOrder,

    /// Turn `fields` + `query` into OR'd `contains` filters instead of scoring
    #[serde(default)]
    pub fields_as_filter: bool,

    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound applied to any requested limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Distances closer than this tie and fall through to the sort criteria
    #[serde(default = "default_distance_epsilon_km")]
    pub distance_epsilon_km: f64,

    /// Nesting depth walked when discovering searchable fields
    #[serde(default = "default_discovery_depth")]
    pub discovery_depth: usize,

    /// Default weight of nested (relation) fields in search
    #[serde(default = "default_relation_weight")]
    pub relation_weight: f64,
}

fn default_limit() -> usize {
    100
}

fn default_max_limit() -> usize {
    1000
}

fn default_distance_epsilon_km() -> f64 {
    1e-4
}

fn default_discovery_depth() -> usize {
    3
}

fn default_relation_weight() -> f64 {
    0.8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            populate_order: PopulateOrder::default(),
            fields_as_filter: false,
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            distance_epsilon_km: default_distance_epsilon_km(),
            discovery_depth: default_discovery_depth(),
            relation_weight: default_relation_weight(),
        }
    }
}

impl PipelineConfig {
    /// Plain listing with the search-as-filter shortcut
    pub fn listing() -> Self {
        Self {
            fields_as_filter: true,
            ..Default::default()
        }
    }

    /// Relevance search
    pub fn search() -> Self {
        Self {
            default_limit: 50,
            ..Default::default()
        }
    }

    /// Collection fetch with relations
    pub fn fetch() -> Self {
        Self::default()
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.max_limit = limit;
        self
    }

    pub fn with_populate_order(mut self, order: PopulateOrder) -> Self {
        self.populate_order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(PipelineConfig::listing().fields_as_filter);
        assert_eq!(PipelineConfig::search().default_limit, 50);
        assert_eq!(PipelineConfig::fetch().default_limit, 100);
        assert_eq!(PipelineConfig::fetch().populate_order, PopulateOrder::Auto);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"populate_order": "always"}"#).unwrap();
        assert_eq!(config.populate_order, PopulateOrder::Always);
        assert_eq!(config.relation_weight, 0.8);
        assert_eq!(config.discovery_depth, 3);
    }
}
