// Service exports
pub mod ai;

pub use ai::{AiAssessment, AiError, AiScorer, DisabledScorer, GeminiScorer};
