use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, SharedProperty};

/// Result of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub properties: Vec<SharedProperty>,
    pub matches: Vec<MatchResult>,
    pub stats: BatchStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub listings: usize,
    pub properties: usize,
    pub buyers: usize,
    pub matches: usize,
}
