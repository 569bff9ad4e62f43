use serde::{Deserialize, Serialize};

use crate::core::matcher::MatchResult;
use crate::models::domain::RankedCandidate;

/// Response for the rank endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub run_id: String,
    pub candidates: Vec<RankedCandidate>,
    pub total_candidates: usize,
    pub cancelled: bool,
    pub scorer: String,
}

impl From<MatchResult> for RankResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            run_id: result.run_id.to_string(),
            candidates: result.candidates,
            total_candidates: result.total_candidates,
            cancelled: result.cancelled,
            scorer: result.scorer.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub scorer: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
