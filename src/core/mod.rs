// Core algorithm exports
pub mod distance;
pub mod error;
pub mod experience;
pub mod kmp;
pub mod matcher;
pub mod scoring;
pub mod semantic;
pub mod skills;
pub mod tokenizer;

pub use distance::{edit_distance, similarity_percent};
pub use error::{EngineError, MatcherError};
pub use experience::{classify_experience, experience_adjustment};
pub use kmp::{find_phrase, kmp_find, KmpMatcher};
pub use matcher::{CancelToken, MatchResult, Matcher};
pub use scoring::{compute_breakdown, rank_candidates, rerank};
pub use semantic::{cosine_similarity, IdfTable, TermVector};
pub use skills::{match_skills, SkillMatchReport};
pub use tokenizer::{normalize, tokenize, NormalizedText};
