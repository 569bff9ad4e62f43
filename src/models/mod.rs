// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    default_workers, EngineConfig, ExperienceAssessment, ExperienceLabel, ExperiencePolicy,
    FuzzyThreshold, JobRequirement, MatchKind, RankedCandidate, Recommendation, ResumeDocument,
    ResumeSubmission, ScoreBreakdown, ScoredResume, ScoringIssue, ScoringWeights,
    SimilarityResult, SkillMatchResult,
};
pub use requests::{JobPayload, RankRequest};
pub use responses::{ErrorResponse, HealthResponse, RankResponse};
