use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::EngineError;
use crate::models::domain::{ExperiencePolicy, JobRequirement, ResumeSubmission};

/// Job posting as submitted over HTTP
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobPayload {
    #[validate(length(min = 1))]
    #[serde(alias = "required_skills")]
    pub skills: Vec<String>,
    #[serde(default)]
    #[serde(alias = "description_text")]
    pub description: String,
    #[serde(default)]
    #[serde(rename = "experiencePolicy", alias = "experience_policy")]
    pub experience_policy: ExperiencePolicy,
}

impl JobPayload {
    /// Normalize into a requirement; fails when no usable skill remains
    pub fn to_requirement(&self) -> Result<JobRequirement, EngineError> {
        JobRequirement::new(
            self.skills.iter().map(String::as_str),
            self.description.as_str(),
            self.experience_policy,
        )
    }
}

/// Request to rank a batch of resumes against one job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(nested)]
    pub job: JobPayload,
    #[serde(default)]
    #[validate(custom(function = "validate_resume_ids"))]
    pub resumes: Vec<ResumeSubmission>,
}

fn validate_resume_ids(resumes: &[ResumeSubmission]) -> Result<(), validator::ValidationError> {
    if resumes.iter().any(|r| r.resume_id.trim().is_empty()) {
        let mut error = validator::ValidationError::new("empty_resume_id");
        error.message = Some("every resume needs a non-empty resumeId".into());
        return Err(error);
    }
    Ok(())
}
