use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::EngineError;
use crate::core::tokenizer::{normalize, NormalizedText};

/// Experience profile a job is posted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperiencePolicy {
    Fresher,
    Experienced,
    #[default]
    Any,
}

/// Requirements of one job posting.
///
/// Skills are normalized (lowercase, punctuation collapsed, trailing `+`/`#`
/// kept so "c++", "c#" and "c" stay apart) and deduplicated in submission order. The value is immutable; editing a job means building a new
/// requirement and re-scoring.
#[derive(Debug, Clone, Serialize)]
pub struct JobRequirement {
    skills: Vec<String>,
    description_text: String,
    experience_policy: ExperiencePolicy,
}

impl JobRequirement {
    pub fn new<I, S>(
        skills: I,
        description_text: impl Into<String>,
        experience_policy: ExperiencePolicy,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();

        for raw in skills {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }

            // Skills with no alphanumeric content are kept verbatim so the
            // skill matcher can report them as rejected.
            let phrase = normalize(trimmed).joined;
            let skill = if phrase.is_empty() {
                trimmed.to_lowercase()
            } else {
                phrase
            };

            if !normalized.contains(&skill) {
                normalized.push(skill);
            }
        }

        if normalized.is_empty() {
            return Err(EngineError::InvalidJobSpec(
                "job must list at least one required skill".to_string(),
            ));
        }

        Ok(Self {
            skills: normalized,
            description_text: description_text.into(),
            experience_policy,
        })
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn description_text(&self) -> &str {
        &self.description_text
    }

    pub fn experience_policy(&self) -> ExperiencePolicy {
        self.experience_policy
    }
}

/// A resume as handed over by the text extraction layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSubmission {
    #[serde(rename = "resumeId", alias = "resume_id")]
    pub resume_id: String,
    #[serde(default)]
    pub text: String,
}

impl ResumeSubmission {
    pub fn new(resume_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            resume_id: resume_id.into(),
            text: text.into(),
        }
    }
}

/// Resume text prepared for one scoring run
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub resume_id: String,
    pub raw_text: String,
    pub normalized: NormalizedText,
}

impl ResumeDocument {
    pub fn new(resume_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized = normalize(&raw_text);
        Self {
            resume_id: resume_id.into(),
            raw_text,
            normalized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

/// Outcome of matching one required skill against one resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchResult {
    pub skill: String,
    pub matched: bool,
    #[serde(rename = "matchKind")]
    pub match_kind: MatchKind,
    #[serde(rename = "matchedToken")]
    pub matched_token: Option<String>,
    pub distance: Option<usize>,
    /// Byte offset of the match inside the normalized resume text
    pub position: Option<usize>,
    /// Edit-distance similarity in percent, for fuzzy matches
    pub similarity: Option<f64>,
}

impl SkillMatchResult {
    pub fn exact(skill: &str, position: usize) -> Self {
        Self {
            skill: skill.to_string(),
            matched: true,
            match_kind: MatchKind::Exact,
            matched_token: Some(skill.to_string()),
            distance: Some(0),
            position: Some(position),
            similarity: Some(100.0),
        }
    }

    pub fn fuzzy(
        skill: &str,
        token: String,
        distance: usize,
        position: usize,
        similarity: f64,
    ) -> Self {
        Self {
            skill: skill.to_string(),
            matched: true,
            match_kind: MatchKind::Fuzzy,
            matched_token: Some(token),
            distance: Some(distance),
            position: Some(position),
            similarity: Some(similarity),
        }
    }

    pub fn unmatched(skill: &str) -> Self {
        Self {
            skill: skill.to_string(),
            matched: false,
            match_kind: MatchKind::None,
            matched_token: None,
            distance: None,
            position: None,
            similarity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLabel {
    Fresher,
    Experienced,
}

/// Experience classification with the signals it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAssessment {
    pub label: ExperienceLabel,
    #[serde(rename = "yearsDetected")]
    pub years_detected: Option<f64>,
    #[serde(rename = "employmentEntries")]
    pub employment_entries: usize,
    #[serde(rename = "graduationYear")]
    pub graduation_year: Option<i32>,
}

impl ExperienceAssessment {
    pub fn fresher() -> Self {
        Self {
            label: ExperienceLabel::Fresher,
            years_detected: None,
            employment_entries: 0,
            graduation_year: None,
        }
    }

    pub fn describe(&self) -> String {
        match (self.label, self.years_detected) {
            (ExperienceLabel::Experienced, Some(years)) if years > 0.0 => {
                format!("Experienced ({} years)", years)
            }
            (ExperienceLabel::Experienced, _) => format!(
                "Experienced ({} prior roles)",
                self.employment_entries
            ),
            (ExperienceLabel::Fresher, _) => match self.graduation_year {
                Some(year) => format!("Fresher (graduated {})", year),
                None => "Fresher".to_string(),
            },
        }
    }
}

/// Every component of a candidate's score.
///
/// `final_score` is a pure function of the other fields:
/// `base_score` when `ai_score` is absent, otherwise the AI blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "skillCoverage")]
    pub skill_coverage: f64,
    #[serde(rename = "semanticScore")]
    pub semantic_score: f64,
    #[serde(rename = "experienceAdjustment")]
    pub experience_adjustment: f64,
    #[serde(rename = "baseScore")]
    pub base_score: f64,
    #[serde(rename = "aiScore")]
    pub ai_score: Option<f64>,
    #[serde(rename = "finalScore")]
    pub final_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    HighlyRecommended,
    Recommended,
    Maybe,
    NotRecommended,
}

impl Recommendation {
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= 0.75 {
            Recommendation::HighlyRecommended
        } else if final_score >= 0.60 {
            Recommendation::Recommended
        } else if final_score >= 0.40 {
            Recommendation::Maybe
        } else {
            Recommendation::NotRecommended
        }
    }
}

/// Non-fatal conditions met while scoring one resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringIssue {
    EmptyResumeText,
    SkillRejected { skill: String, reason: String },
    AiUnavailable { reason: String },
    WorkerFailed { reason: String },
}

/// A fully scored resume, before rank assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResume {
    #[serde(rename = "resumeId")]
    pub resume_id: String,
    #[serde(rename = "submissionIndex")]
    pub submission_index: usize,
    pub breakdown: ScoreBreakdown,
    pub experience: ExperienceAssessment,
    #[serde(rename = "skillMatches")]
    pub skill_matches: Vec<SkillMatchResult>,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "aiExplanation")]
    pub ai_explanation: Option<String>,
    pub issues: Vec<ScoringIssue>,
}

impl ScoredResume {
    pub fn matched_skills(&self) -> Vec<String> {
        self.skill_matches
            .iter()
            .filter(|m| m.matched)
            .map(|m| m.skill.clone())
            .collect()
    }

    pub fn missing_skills(&self) -> Vec<String> {
        self.skill_matches
            .iter()
            .filter(|m| !m.matched)
            .map(|m| m.skill.clone())
            .collect()
    }
}

/// Ranked output record handed to persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(rename = "resumeId")]
    pub resume_id: String,
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
    pub recommendation: Recommendation,
    pub experience: ExperienceAssessment,
    #[serde(rename = "skillMatches")]
    pub skill_matches: Vec<SkillMatchResult>,
    #[serde(rename = "matchedSkills")]
    pub matched_skills: Vec<String>,
    #[serde(rename = "missingSkills")]
    pub missing_skills: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "aiExplanation")]
    pub ai_explanation: Option<String>,
    pub issues: Vec<ScoringIssue>,
    #[serde(rename = "submissionIndex")]
    pub submission_index: usize,
}

/// Scoring weights
///
/// `skill_weight` and `semantic_weight` form the algorithmic blend and must sum
/// to 1. `experience_bonus` is the penalty applied when a candidate's
/// experience label does not fit the job's policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill_weight: f64,
    pub semantic_weight: f64,
    pub ai_weight: f64,
    pub experience_bonus: f64,
    pub fuzzy_discount: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_weight: 0.6,
            semantic_weight: 0.4,
            ai_weight: 0.3,
            experience_bonus: 0.1,
            fuzzy_discount: 0.8,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), EngineError> {
        let unit = [
            ("skill_weight", self.skill_weight),
            ("semantic_weight", self.semantic_weight),
            ("ai_weight", self.ai_weight),
            ("experience_bonus", self.experience_bonus),
            ("fuzzy_discount", self.fuzzy_discount),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let blend = self.skill_weight + self.semantic_weight;
        if (blend - 1.0).abs() > 1e-6 {
            return Err(EngineError::InvalidConfig(format!(
                "skill_weight + semantic_weight must sum to 1, got {}",
                blend
            )));
        }

        Ok(())
    }
}

/// Acceptance threshold for fuzzy skill matches:
/// `max(min_distance, floor(chars(skill) * distance_ratio))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyThreshold {
    pub distance_ratio: f64,
    pub min_distance: usize,
}

impl Default for FuzzyThreshold {
    fn default() -> Self {
        Self {
            distance_ratio: 0.2,
            min_distance: 1,
        }
    }
}

impl FuzzyThreshold {
    pub fn for_skill(&self, skill: &str) -> usize {
        let len = skill.chars().count() as f64;
        let scaled = (len * self.distance_ratio).floor() as usize;
        scaled.max(self.min_distance)
    }
}

/// Runtime configuration of one ranking engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub fuzzy: FuzzyThreshold,
    pub sublinear_tf: bool,
    pub workers: usize,
    pub ai_timeout: Duration,
    pub ai_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            fuzzy: FuzzyThreshold::default(),
            sublinear_tf: false,
            workers: default_workers(),
            ai_timeout: Duration::from_millis(5000),
            ai_concurrency: 8,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.weights.validate()?;

        if !(0.0..=1.0).contains(&self.fuzzy.distance_ratio) {
            return Err(EngineError::InvalidConfig(format!(
                "fuzzy_distance_threshold must be within [0, 1], got {}",
                self.fuzzy.distance_ratio
            )));
        }
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker pool needs at least one thread".to_string(),
            ));
        }
        if self.ai_concurrency == 0 {
            return Err(EngineError::InvalidConfig(
                "ai max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.ai_timeout.is_zero() {
            return Err(EngineError::InvalidConfig(
                "ai_timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Number of CPU cores, falling back to one
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
