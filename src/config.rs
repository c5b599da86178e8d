use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DiscrepancyError;

/// How repeated segments are treated in the error phoneme list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSetPolicy {
    /// Keep every segment, duplicates included, in op order.
    #[default]
    Preserve,
    /// Keep the first occurrence of each distinct segment.
    Dedup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub error_set: ErrorSetPolicy,
    /// Maximum turns kept by a feedback session, system prompt included.
    pub history_limit: usize,
    pub system_prompt: String,
}

impl EngineConfig {
    pub const DEFAULT_HISTORY_LIMIT: usize = 10;
    pub const DEFAULT_SYSTEM_PROMPT: &'static str =
        "You are a phonetics coach helping learners improve pronunciation.";

    pub fn load(path: &Path) -> Result<Self, DiscrepancyError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| DiscrepancyError::io("read engine config", e))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, DiscrepancyError> {
        let config: Self = serde_json::from_str(data)
            .map_err(|e| DiscrepancyError::json("parse engine config", e))?;
        if config.history_limit == 0 {
            return Err(DiscrepancyError::invalid_input(
                "history_limit must be >= 1 to retain the system prompt",
            ));
        }
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_set: ErrorSetPolicy::default(),
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
            system_prompt: Self::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}
