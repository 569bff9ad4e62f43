//! hire-rank - Resume ranking engine
//!
//! Scores a batch of resumes against one job posting with exact and fuzzy
//! skill matching, TF-IDF similarity and experience classification, with an
//! optional AI opinion blended in when available.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CancelToken, EngineError, MatchResult, Matcher};
pub use models::{
    EngineConfig, ExperiencePolicy, JobRequirement, RankedCandidate, ResumeSubmission,
    ScoringWeights,
};
pub use services::{AiScorer, DisabledScorer};
