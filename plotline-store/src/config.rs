//! Store configuration.

use crate::error::StoreResult;
use plotline_model::StoryId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens to events that point at a deleted event through
/// `memory_ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRefPolicy {
    /// Referring events stay; their `memory_ref` is cleared.
    #[default]
    Detach,
    /// Referring events are deleted too, transitively.
    Cascade,
}

/// Configuration for a [`PlotStore`](crate::PlotStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Story copied into every newly registered account.
    pub template_story_id: StoryId,

    pub memory_ref_policy: MemoryRefPolicy,

    /// Tag types created alongside every new story.
    pub default_tag_types: Vec<String>,

    /// DuckDB memory cap for file-backed stores (e.g. "256MB").
    pub memory_limit: String,

    /// DuckDB worker threads for file-backed stores.
    pub threads: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            template_story_id: StoryId(1),
            memory_ref_policy: MemoryRefPolicy::Detach,
            default_tag_types: vec![
                "Character".to_string(),
                "Plot line".to_string(),
                "Location".to_string(),
            ],
            memory_limit: "256MB".to_string(),
            threads: 2,
        }
    }
}

impl StoreConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"memory_ref_policy": "cascade"}"#).unwrap();
        assert_eq!(config.memory_ref_policy, MemoryRefPolicy::Cascade);
        assert_eq!(config.template_story_id, StoryId(1));
        assert_eq!(config.default_tag_types.len(), 3);
    }
}
