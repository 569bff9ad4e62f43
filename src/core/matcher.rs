use chrono::{Datelike, Utc};
use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Notify, Semaphore};
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::core::error::EngineError;
use crate::core::experience::{classify_experience, experience_adjustment};
use crate::core::scoring::{
    apply_ai_score, compute_breakdown, is_valid_ai_score, rank_candidates,
    strengths_and_weaknesses, summarize,
};
use crate::core::semantic::{cosine_similarity, IdfTable, TermVector};
use crate::core::skills::{match_skills, SkillMatchReport};
use crate::core::tokenizer::normalize;
use crate::models::{
    EngineConfig, ExperienceAssessment, FuzzyThreshold, JobRequirement, RankedCandidate,
    ResumeDocument, ResumeSubmission, ScoredResume, ScoringIssue, ScoringWeights,
};
use crate::services::ai::{AiAssessment, AiError, AiScorer, DisabledScorer};

/// Result of one ranking run
#[derive(Debug)]
pub struct MatchResult {
    pub run_id: Uuid,
    pub candidates: Vec<RankedCandidate>,
    pub total_candidates: usize,
    pub cancelled: bool,
    pub scorer: &'static str,
}

/// Cooperative cancellation for a running batch.
///
/// Checked between resumes while preparing them. Resumes prepared before the
/// flag was raised are still scored and ranked; AI replies still pending at
/// that point are dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.flag.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.flag.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.0.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Per-resume work done before the corpus-wide IDF table exists
#[derive(Debug, Clone)]
pub struct PreparedResume {
    pub index: usize,
    pub document: ResumeDocument,
    pub skills: SkillMatchReport,
    pub experience: ExperienceAssessment,
    pub issues: Vec<ScoringIssue>,
}

impl PreparedResume {
    /// Stand-in for a resume whose worker died; scores as if it had no text
    fn failed(index: usize, resume_id: String, job: &JobRequirement, reason: String) -> Self {
        let document = ResumeDocument::new(resume_id, String::new());
        let skills = match_skills(job.skills(), &document.normalized, &FuzzyThreshold::default());
        Self {
            index,
            document,
            skills,
            experience: ExperienceAssessment::fresher(),
            issues: vec![ScoringIssue::WorkerFailed { reason }],
        }
    }
}

/// Tokenize, match skills and classify experience for one resume
pub fn prepare_resume(
    index: usize,
    submission: ResumeSubmission,
    job: &JobRequirement,
    fuzzy: &FuzzyThreshold,
) -> PreparedResume {
    let document = ResumeDocument::new(submission.resume_id, submission.text);
    let mut issues = Vec::new();

    if document.is_empty() {
        issues.push(ScoringIssue::EmptyResumeText);
    }

    let skills = match_skills(job.skills(), &document.normalized, fuzzy);
    for (skill, e) in &skills.rejected {
        issues.push(ScoringIssue::SkillRejected {
            skill: skill.clone(),
            reason: e.to_string(),
        });
    }

    let experience = if document.is_empty() {
        ExperienceAssessment::fresher()
    } else {
        classify_experience(&document.raw_text)
    };

    PreparedResume {
        index,
        document,
        skills,
        experience,
        issues,
    }
}

/// Combine the prepared signals, the semantic score and an optional AI opinion
pub fn score_prepared(
    prepared: PreparedResume,
    job: &JobRequirement,
    weights: &ScoringWeights,
    semantic_score: f64,
    ai: Option<AiAssessment>,
) -> ScoredResume {
    let adjustment = experience_adjustment(
        job.experience_policy(),
        prepared.experience.label,
        weights.experience_bonus,
    );

    let ai_score = ai.as_ref().map(|a| a.score);
    let breakdown = compute_breakdown(
        weights,
        &prepared.skills,
        semantic_score,
        adjustment,
        ai_score,
    );
    let summary = summarize(&prepared.skills, &prepared.experience);
    let (strengths, weaknesses) = strengths_and_weaknesses(
        &prepared.skills,
        breakdown.skill_coverage,
        &prepared.experience,
        Utc::now().year(),
    );

    ScoredResume {
        resume_id: prepared.document.resume_id,
        submission_index: prepared.index,
        breakdown,
        experience: prepared.experience,
        skill_matches: prepared.skills.results,
        summary,
        strengths,
        weaknesses,
        ai_explanation: ai.and_then(|a| a.explanation),
        issues: prepared.issues,
    }
}

/// In-flight AI call; aborted if dropped before it is awaited
struct AiCall(JoinHandle<Result<AiAssessment, AiError>>);

impl AiCall {
    async fn outcome(&mut self) -> Result<AiAssessment, AiError> {
        match (&mut self.0).await {
            Ok(result) => result,
            Err(e) => Err(AiError::Malformed(format!("AI task failed: {}", e))),
        }
    }

    /// Reply of the call, or `None` if the run is cancelled first
    async fn until_cancelled(
        mut self,
        cancel: CancelToken,
    ) -> Option<Result<AiAssessment, AiError>> {
        tokio::select! {
            biased;
            outcome = self.outcome() => Some(outcome),
            _ = cancel.cancelled() => None,
        }
    }
}

impl Drop for AiCall {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Main ranking orchestrator - implements the batch scoring pipeline
///
/// # Pipeline Stages
/// 1. AI calls are started for every non-empty resume and run in the background
/// 2. Worker pool: tokenize, exact/fuzzy skill matching, experience classification
/// 3. Barrier: one IDF table over the job description and all resumes
/// 4. Worker pool: cosine similarity and composite score, never waiting on AI
/// 5. AI join: blend each reply into its score, or fall back to the base score
/// 6. Ranking
#[derive(Clone)]
pub struct Matcher {
    config: EngineConfig,
    scorer: Arc<dyn AiScorer>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("config", &self.config)
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

impl Matcher {
    pub fn new(config: EngineConfig, scorer: Arc<dyn AiScorer>) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config, scorer })
    }

    /// Default configuration, no AI backend
    pub fn with_default_weights() -> Self {
        Self {
            config: EngineConfig::default(),
            scorer: Arc::new(DisabledScorer),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Score and rank every resume submitted for one job
    pub async fn rank(&self, job: &JobRequirement, resumes: Vec<ResumeSubmission>) -> MatchResult {
        self.rank_with_cancel(job, resumes, &CancelToken::new()).await
    }

    pub async fn rank_with_cancel(
        &self,
        job: &JobRequirement,
        resumes: Vec<ResumeSubmission>,
        cancel: &CancelToken,
    ) -> MatchResult {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("rank", %run_id, resumes = resumes.len());

        self.run(run_id, job, resumes, cancel).instrument(span).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        job: &JobRequirement,
        resumes: Vec<ResumeSubmission>,
        cancel: &CancelToken,
    ) -> MatchResult {
        let started = Instant::now();
        let total_candidates = resumes.len();
        let job = Arc::new(job.clone());
        let workers = self.config.workers;
        let fuzzy = self.config.fuzzy;

        info!(
            "Ranking {} resumes against {} required skills (scorer: {})",
            total_candidates,
            job.skills().len(),
            self.scorer.name()
        );

        // Stage 1: AI calls run alongside all algorithmic work
        let ai_permits = Arc::new(Semaphore::new(self.config.ai_concurrency));
        let mut ai_calls: Vec<Option<AiCall>> = resumes
            .iter()
            .map(|r| self.spawn_ai_call(&job, r, &ai_permits))
            .collect();

        // Stage 2: per-resume text work on the blocking pool
        let prepared: Vec<PreparedResume> = stream::iter(resumes.into_iter().enumerate())
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|(index, submission)| {
                let job = Arc::clone(&job);
                let resume_id = submission.resume_id.clone();
                async move {
                    let worker_job = Arc::clone(&job);
                    let handle = task::spawn_blocking(move || {
                        prepare_resume(index, submission, &worker_job, &fuzzy)
                    });
                    match handle.await {
                        Ok(prepared) => prepared,
                        Err(e) => {
                            error!("Worker failed while preparing resume {}: {}", resume_id, e);
                            PreparedResume::failed(index, resume_id, &job, e.to_string())
                        }
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await;

        // Stage 3: barrier - IDF needs every document of the batch
        let job_tokens = normalize(job.description_text()).tokens;
        let idf = Arc::new(IdfTable::build(
            std::iter::once(job_tokens.as_slice()).chain(
                prepared
                    .iter()
                    .map(|p| p.document.normalized.tokens.as_slice()),
            ),
            self.config.sublinear_tf,
        ));
        let job_vector = Arc::new(idf.vectorize(&job_tokens));

        debug!(
            "IDF table built over {} documents, {} terms",
            idf.document_count(),
            idf.vocabulary_len()
        );

        // Stage 4: similarity and composite score for every prepared resume
        let weights = self.config.weights;
        let mut scored: Vec<ScoredResume> = stream::iter(prepared)
            .map(|prepared| {
                let job = Arc::clone(&job);
                let idf = Arc::clone(&idf);
                let job_vector = Arc::clone(&job_vector);
                async move { score_algorithmic(prepared, job, idf, job_vector, weights).await }
            })
            .buffered(workers)
            .collect()
            .await;

        // Stage 5: AI replies, joined only after all algorithmic work is done
        let pending: Vec<Option<AiCall>> = scored
            .iter()
            .map(|s| ai_calls.get_mut(s.submission_index).and_then(Option::take))
            .collect();
        // Calls for resumes never prepared are aborted here.
        drop(ai_calls);

        let replies = future::join_all(pending.into_iter().map(|call| {
            let cancel = cancel.clone();
            async move {
                match call {
                    Some(call) => call.until_cancelled(cancel).await,
                    None => None,
                }
            }
        }))
        .await;

        for (resume, reply) in scored.iter_mut().zip(replies) {
            apply_ai_reply(resume, reply, weights.ai_weight);
        }

        let cancelled = cancel.is_cancelled() || scored.len() < total_candidates;
        if cancelled {
            warn!(
                "Ranking cancelled after {} of {} resumes",
                scored.len(),
                total_candidates
            );
        }

        // Stage 6: ranking
        let candidates = rank_candidates(scored);

        info!(
            "Ranked {} candidates in {:?}",
            candidates.len(),
            started.elapsed()
        );

        MatchResult {
            run_id,
            candidates,
            total_candidates,
            cancelled,
            scorer: self.scorer.name(),
        }
    }

    fn spawn_ai_call(
        &self,
        job: &Arc<JobRequirement>,
        resume: &ResumeSubmission,
        permits: &Arc<Semaphore>,
    ) -> Option<AiCall> {
        if !resume.text.chars().any(char::is_alphanumeric) {
            return None;
        }

        let scorer = Arc::clone(&self.scorer);
        let job = Arc::clone(job);
        let permits = Arc::clone(permits);
        let text = resume.text.clone();
        let deadline = self.config.ai_timeout;

        // The deadline starts once a permit is held, so queued calls keep
        // their full budget.
        let handle = tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Err(AiError::Disabled),
            };

            match tokio::time::timeout(deadline, scorer.score(&job, &text)).await {
                Ok(result) => result,
                Err(_) => Err(AiError::Timeout(deadline)),
            }
        });

        Some(AiCall(handle))
    }
}

async fn score_algorithmic(
    prepared: PreparedResume,
    job: Arc<JobRequirement>,
    idf: Arc<IdfTable>,
    job_vector: Arc<TermVector>,
    weights: ScoringWeights,
) -> ScoredResume {
    let index = prepared.index;
    let resume_id = prepared.document.resume_id.clone();
    let tokens = prepared.document.normalized.tokens.clone();

    let semantic = task::spawn_blocking(move || {
        cosine_similarity(&job_vector, &idf.vectorize(&tokens))
    })
    .await;

    let (semantic_score, prepared) = match semantic {
        Ok(score) => (score, prepared),
        Err(e) => {
            error!("Worker failed while scoring resume {}: {}", resume_id, e);
            (
                0.0,
                PreparedResume::failed(index, resume_id.clone(), &job, e.to_string()),
            )
        }
    };

    debug!("Resume {} scored (semantic {:.3})", resume_id, semantic_score);

    score_prepared(prepared, &job, &weights, semantic_score, None)
}

/// Blend one AI reply into a scored resume, recording why it was not used
fn apply_ai_reply(
    resume: &mut ScoredResume,
    reply: Option<Result<AiAssessment, AiError>>,
    ai_weight: f64,
) {
    match reply {
        None | Some(Err(AiError::Disabled)) => {}
        Some(Ok(assessment)) if is_valid_ai_score(assessment.score) => {
            apply_ai_score(&mut resume.breakdown, assessment.score, ai_weight);
            resume.ai_explanation = assessment.explanation;
        }
        Some(Ok(assessment)) => {
            warn!(
                "AI score {} for resume {} out of range, using algorithmic score",
                assessment.score, resume.resume_id
            );
            resume.issues.push(ScoringIssue::AiUnavailable {
                reason: format!("score {} outside [0, 1]", assessment.score),
            });
        }
        Some(Err(e)) => {
            warn!(
                "AI scoring unavailable for resume {}, using algorithmic score: {}",
                resume.resume_id, e
            );
            resume.issues.push(ScoringIssue::AiUnavailable {
                reason: e.to_string(),
            });
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExperienceLabel, ExperiencePolicy, MatchKind};

    fn create_job() -> JobRequirement {
        JobRequirement::new(
            ["python", "sql", "docker"],
            "Backend developer building REST APIs in Python with SQL databases and Docker",
            ExperiencePolicy::Any,
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_resume_collects_signals() {
        let job = create_job();
        let prepared = prepare_resume(
            0,
            ResumeSubmission::new("r1", "Python developer, 3 years of experience with Postgre SQL"),
            &job,
            &FuzzyThreshold::default(),
        );

        assert_eq!(prepared.skills.results[0].match_kind, MatchKind::Exact);
        assert_eq!(prepared.skills.results[2].match_kind, MatchKind::None);
        assert_eq!(prepared.experience.label, ExperienceLabel::Experienced);
        assert!(prepared.issues.is_empty());
    }

    #[test]
    fn test_prepare_empty_resume_flags_issue() {
        let job = create_job();
        let prepared = prepare_resume(
            3,
            ResumeSubmission::new("blank", "   "),
            &job,
            &FuzzyThreshold::default(),
        );

        assert_eq!(prepared.index, 3);
        assert_eq!(prepared.issues, vec![ScoringIssue::EmptyResumeText]);
    }

    #[tokio::test]
    async fn test_rank_orders_by_score() {
        let matcher = Matcher::with_default_weights();
        let job = create_job();

        let resumes = vec![
            ResumeSubmission::new("weak", "Carpenter with woodworking background"),
            ResumeSubmission::new(
                "strong",
                "Backend developer: Python, SQL and Docker. Built REST APIs.",
            ),
        ];

        let result = matcher.rank(&job, resumes).await;

        assert_eq!(result.total_candidates, 2);
        assert!(!result.cancelled);
        assert_eq!(result.candidates[0].resume_id, "strong");
        assert_eq!(result.candidates[0].rank, 1);
        assert_eq!(result.candidates[1].rank, 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_nothing() {
        let matcher = Matcher::with_default_weights();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = matcher
            .rank_with_cancel(
                &create_job(),
                vec![ResumeSubmission::new("r1", "python")],
                &cancel,
            )
            .await;

        assert!(result.cancelled);
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let cancel = CancelToken::new();
        let waiter = tokio::spawn({
            let cancel = cancel.clone();
            async move { cancel.cancelled().await }
        });

        tokio::task::yield_now().await;
        cancel.cancel();
        waiter.await.unwrap();

        // Already cancelled: resolves immediately.
        cancel.cancelled().await;
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.weights.skill_weight = 0.9;
        assert!(Matcher::new(config, Arc::new(DisabledScorer)).is_err());
    }
}
