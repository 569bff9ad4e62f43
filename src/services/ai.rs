use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::JobRequirement;

/// Default REST endpoint of the generative model API
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const MAX_RESUME_CHARS: usize = 4000;
const MAX_DESCRIPTION_CHARS: usize = 1500;

static RE_FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Errors that can occur when asking the AI scorer for an opinion.
///
/// None of these are fatal: every variant sends the candidate down the
/// algorithmic fallback path.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI scoring is disabled")]
    Disabled,

    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed AI response: {0}")]
    Malformed(String),
}

/// AI opinion on one resume, normalized to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    pub score: f64,
    pub explanation: Option<String>,
}

/// Optional external scorer consulted per resume.
///
/// Chosen once when the engine is built; the ranking path never inspects
/// which implementation it holds.
#[async_trait]
pub trait AiScorer: Send + Sync {
    /// Short backend name for logs and responses
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        job: &JobRequirement,
        resume_text: &str,
    ) -> Result<AiAssessment, AiError>;
}

/// Stand-in used when no AI backend is configured; always fails, so every
/// candidate takes the algorithmic path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledScorer;

#[async_trait]
impl AiScorer for DisabledScorer {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn score(
        &self,
        _job: &JobRequirement,
        _resume_text: &str,
    ) -> Result<AiAssessment, AiError> {
        Err(AiError::Disabled)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// JSON body the model is asked to produce
#[derive(Debug, Deserialize)]
struct AiReply {
    overall_score: f64,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    ai_summary: Option<String>,
}

/// Generative-model scorer speaking the `generateContent` REST API
pub struct GeminiScorer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiScorer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl AiScorer for GeminiScorer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn score(
        &self,
        job: &JobRequirement,
        resume_text: &str,
    ) -> Result<AiAssessment, AiError> {
        let prompt = build_prompt(job, resume_text);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 1024,
            },
        };

        tracing::debug!("Requesting AI score from {}", self.url());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(format!("unreadable response body: {}", e)))?;

        let text = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| AiError::Malformed("response has no text part".to_string()))?;

        parse_ai_reply(&text)
    }
}

/// Prompt sent to the model for one resume
pub fn build_prompt(job: &JobRequirement, resume_text: &str) -> String {
    format!(
        r#"You are an experienced technical recruiter. Evaluate how well the candidate fits the job.

JOB DESCRIPTION:
{description}

REQUIRED SKILLS: {skills}

RESUME:
{resume}

Respond with JSON only:
{{
    "overall_score": <number 0-100>,
    "ai_summary": "<one or two sentences>",
    "reasoning": "<why this score>"
}}"#,
        description = truncate_chars(job.description_text(), MAX_DESCRIPTION_CHARS),
        skills = job.skills().join(", "),
        resume = truncate_chars(resume_text, MAX_RESUME_CHARS),
    )
}

/// Parse the model's reply; the JSON may sit inside a ```json fence or be
/// surrounded by prose.
pub fn parse_ai_reply(text: &str) -> Result<AiAssessment, AiError> {
    let json = match RE_FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        Some(fenced) => fenced.as_str(),
        None => {
            let start = text.find('{');
            let end = text.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => &text[s..=e],
                _ => return Err(AiError::Malformed("no JSON object in reply".to_string())),
            }
        }
    };

    let reply: AiReply = serde_json::from_str(json)
        .map_err(|e| AiError::Malformed(format!("invalid JSON: {}", e)))?;

    if !reply.overall_score.is_finite() || !(0.0..=100.0).contains(&reply.overall_score) {
        return Err(AiError::Malformed(format!(
            "overall_score {} outside 0-100",
            reply.overall_score
        )));
    }

    let explanation = match (reply.ai_summary, reply.reasoning) {
        (Some(summary), Some(reasoning)) => Some(format!("{} {}", summary, reasoning)),
        (summary, reasoning) => summary.or(reasoning),
    };

    Ok(AiAssessment {
        score: reply.overall_score / 100.0,
        explanation,
    })
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
