use std::cmp::Ordering;

use crate::core::skills::SkillMatchReport;
use crate::models::{
    ExperienceAssessment, ExperienceLabel, RankedCandidate, Recommendation, ScoreBreakdown,
    ScoredResume, ScoringWeights,
};

/// Fraction of required skills found, fuzzy matches discounted
///
/// `(exact + fuzzy * fuzzy_discount) / total`
#[inline]
pub fn skill_coverage(exact: usize, fuzzy: usize, total: usize, fuzzy_discount: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let effective = exact as f64 + fuzzy as f64 * fuzzy_discount;
    (effective / total as f64).clamp(0.0, 1.0)
}

/// Algorithmic score (0-1)
///
/// Scoring formula:
/// score = (
///     skill_coverage * skill_weight +
///     semantic_score * semantic_weight +
///     experience_adjustment            # 0 or -experience_bonus
/// )
#[inline]
pub fn base_score(
    weights: &ScoringWeights,
    coverage: f64,
    semantic: f64,
    experience_adjustment: f64,
) -> f64 {
    let score = weights.skill_weight * coverage
        + weights.semantic_weight * semantic
        + experience_adjustment;

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Blend an AI opinion into the base score.
///
/// Missing or out-of-range AI scores leave the base score untouched, and so
/// does a zero AI weight.
#[inline]
pub fn blend_ai(base: f64, ai_score: Option<f64>, ai_weight: f64) -> f64 {
    match ai_score {
        Some(ai) if is_valid_ai_score(ai) && ai_weight > 0.0 => {
            ((1.0 - ai_weight) * base + ai_weight * ai).clamp(0.0, 1.0)
        }
        _ => base,
    }
}

#[inline]
pub fn is_valid_ai_score(score: f64) -> bool {
    score.is_finite() && (0.0..=1.0).contains(&score)
}

/// Assemble the full breakdown for one resume
pub fn compute_breakdown(
    weights: &ScoringWeights,
    skills: &SkillMatchReport,
    semantic_score: f64,
    experience_adjustment: f64,
    ai_score: Option<f64>,
) -> ScoreBreakdown {
    let coverage = skill_coverage(
        skills.exact_count(),
        skills.fuzzy_count(),
        skills.results.len(),
        weights.fuzzy_discount,
    );
    let semantic_score = semantic_score.clamp(0.0, 1.0);
    let base = base_score(weights, coverage, semantic_score, experience_adjustment);
    let ai_score = ai_score.filter(|s| is_valid_ai_score(*s));

    ScoreBreakdown {
        skill_coverage: coverage,
        semantic_score,
        experience_adjustment,
        base_score: base,
        ai_score,
        final_score: blend_ai(base, ai_score, weights.ai_weight),
    }
}

/// Fold a late AI opinion into a breakdown computed without one.
///
/// Invalid scores are ignored, leaving the breakdown untouched.
pub fn apply_ai_score(breakdown: &mut ScoreBreakdown, ai_score: f64, ai_weight: f64) {
    if !is_valid_ai_score(ai_score) {
        return;
    }
    breakdown.ai_score = Some(ai_score);
    breakdown.final_score = blend_ai(breakdown.base_score, Some(ai_score), ai_weight);
}

/// One-line algorithmic explanation of a score
pub fn summarize(skills: &SkillMatchReport, experience: &ExperienceAssessment) -> String {
    let matched = skills.exact_count() + skills.fuzzy_count();
    let total = skills.results.len();

    let mut summary = format!("{}/{} required skills matched", matched, total);
    if skills.fuzzy_count() > 0 {
        summary.push_str(&format!(" ({} fuzzy)", skills.fuzzy_count()));
    }

    let missing: Vec<&str> = skills
        .results
        .iter()
        .filter(|r| !r.matched)
        .map(|r| r.skill.as_str())
        .collect();
    if !missing.is_empty() {
        summary.push_str("; missing: ");
        summary.push_str(&missing.join(", "));
    }

    summary.push_str("; ");
    summary.push_str(&experience.describe());
    summary
}

/// Short strength and weakness notes for a recruiter.
///
/// `current_year` decides whether a fresher's graduation counts as recent
/// (within two years).
pub fn strengths_and_weaknesses(
    skills: &SkillMatchReport,
    coverage: f64,
    experience: &ExperienceAssessment,
    current_year: i32,
) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    let matched = skills.exact_count() + skills.fuzzy_count();
    let total = skills.results.len();

    if coverage >= 0.7 {
        strengths.push(format!(
            "Strong skill match: {}/{} required skills",
            matched, total
        ));
    } else if coverage >= 0.5 {
        strengths.push(format!("Good skill foundation: {} core skills", matched));
    } else {
        weaknesses.push(format!(
            "Limited skill match: only {}/{} required skills",
            matched, total
        ));
    }

    match (experience.label, experience.years_detected, experience.graduation_year) {
        (ExperienceLabel::Experienced, Some(years), _) if years >= 3.0 => {
            strengths.push(format!("Solid {} years of professional experience", years));
        }
        (ExperienceLabel::Experienced, Some(years), _) if years > 0.0 => {
            strengths.push(format!("{} years of relevant experience", years));
        }
        (ExperienceLabel::Fresher, _, Some(year)) if current_year - year <= 2 => {
            strengths.push(format!("Fresh talent with recent education ({})", year));
        }
        (ExperienceLabel::Fresher, _, Some(year)) => {
            weaknesses.push(format!(
                "Graduated in {} with no mentioned experience",
                year
            ));
        }
        _ => {}
    }

    let missing: Vec<&str> = skills
        .results
        .iter()
        .filter(|r| !r.matched)
        .map(|r| r.skill.as_str())
        .collect();
    if !missing.is_empty() {
        let shown: Vec<&str> = missing.iter().take(3).copied().collect();
        weaknesses.push(format!(
            "Missing {} skills: {}",
            missing.len(),
            shown.join(", ")
        ));
    }

    (strengths, weaknesses)
}

/// Order candidates: final score descending, then skill coverage descending,
/// then submission order. Deterministic, so re-ranking is idempotent.
pub fn compare_scored(a: &ScoredResume, b: &ScoredResume) -> Ordering {
    rank_order(
        (&a.breakdown, a.submission_index),
        (&b.breakdown, b.submission_index),
    )
}

fn rank_order(a: (&ScoreBreakdown, usize), b: (&ScoreBreakdown, usize)) -> Ordering {
    b.0.final_score
        .total_cmp(&a.0.final_score)
        .then_with(|| b.0.skill_coverage.total_cmp(&a.0.skill_coverage))
        .then_with(|| a.1.cmp(&b.1))
}

/// Sort scored resumes and assign 1-based ranks
pub fn rank_candidates(mut scored: Vec<ScoredResume>) -> Vec<RankedCandidate> {
    scored.sort_by(compare_scored);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let matched_skills = s.matched_skills();
            let missing_skills = s.missing_skills();
            RankedCandidate {
                resume_id: s.resume_id,
                rank: i + 1,
                recommendation: Recommendation::from_score(s.breakdown.final_score),
                breakdown: s.breakdown,
                experience: s.experience,
                skill_matches: s.skill_matches,
                matched_skills,
                missing_skills,
                summary: s.summary,
                strengths: s.strengths,
                weaknesses: s.weaknesses,
                ai_explanation: s.ai_explanation,
                issues: s.issues,
                submission_index: s.submission_index,
            }
        })
        .collect()
}

/// Re-rank already ranked candidates (e.g. after merging two pages)
pub fn rerank(mut ranked: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    ranked.sort_by(|a, b| {
        rank_order(
            (&a.breakdown, a.submission_index),
            (&b.breakdown, b.submission_index),
        )
    });
    for (i, candidate) in ranked.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    ranked
}
