use crate::core::distance::{edit_distance_chars, similarity_percent};
use crate::core::error::MatcherError;
use crate::core::kmp::find_phrase;
use crate::core::tokenizer::{normalize, NormalizedText};
use crate::models::{FuzzyThreshold, SkillMatchResult};

/// Skill matching outcome for one resume
#[derive(Debug, Clone, Default)]
pub struct SkillMatchReport {
    pub results: Vec<SkillMatchResult>,
    /// Skills that could not be searched at all, with the reason
    pub rejected: Vec<(String, MatcherError)>,
}

impl SkillMatchReport {
    pub fn exact_count(&self) -> usize {
        self.count(crate::models::MatchKind::Exact)
    }

    pub fn fuzzy_count(&self) -> usize {
        self.count(crate::models::MatchKind::Fuzzy)
    }

    fn count(&self, kind: crate::models::MatchKind) -> usize {
        self.results.iter().filter(|r| r.match_kind == kind).count()
    }
}

/// Match every required skill against one resume.
///
/// Exact phrase search runs first; the edit-distance scan only runs for skills
/// it could not resolve. A malformed skill is reported unmatched and does not
/// affect the others.
pub fn match_skills(
    skills: &[String],
    resume: &NormalizedText,
    threshold: &FuzzyThreshold,
) -> SkillMatchReport {
    let mut report = SkillMatchReport::default();

    for skill in skills {
        match match_skill(skill, resume, threshold) {
            Ok(result) => report.results.push(result),
            Err(e) => {
                tracing::warn!("Skill '{}' rejected: {}", skill, e);
                report.results.push(SkillMatchResult::unmatched(skill));
                report.rejected.push((skill.clone(), e));
            }
        }
    }

    report
}

/// Match one skill: exact first, then fuzzy
pub fn match_skill(
    skill: &str,
    resume: &NormalizedText,
    threshold: &FuzzyThreshold,
) -> Result<SkillMatchResult, MatcherError> {
    let phrase = normalize(skill).joined;
    if phrase.is_empty() {
        return Err(MatcherError::MalformedSkill(skill.to_string()));
    }

    if let Some(position) = find_phrase(&resume.joined, &phrase)? {
        return Ok(SkillMatchResult::exact(&phrase, position));
    }

    let max_distance = threshold.for_skill(&phrase);
    match closest_window(&phrase, resume, max_distance) {
        Some(candidate) if candidate.distance == 0 => {
            Ok(SkillMatchResult::exact(&phrase, candidate.position))
        }
        Some(candidate) => {
            let similarity = similarity_percent(&phrase, &candidate.text);
            Ok(SkillMatchResult::fuzzy(
                &phrase,
                candidate.text,
                candidate.distance,
                candidate.position,
                similarity,
            ))
        }
        None => Ok(SkillMatchResult::unmatched(&phrase)),
    }
}

/// Closest resume token window to a skill phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyCandidate {
    pub text: String,
    pub distance: usize,
    pub position: usize,
}

/// Scan every contiguous window of resume tokens with the same token count as
/// `phrase` and return the one with the smallest edit distance, if it is within
/// `max_distance`. Equal distances keep the earliest window.
///
/// A window never matches when its `+`/`#` suffixes differ from the phrase's
/// ("c#" is not a typo of "c++"), or when the edit would rewrite every
/// character of the phrase.
pub fn closest_window(
    phrase: &str,
    resume: &NormalizedText,
    max_distance: usize,
) -> Option<FuzzyCandidate> {
    let width = phrase.split(' ').count();
    if width == 0 || resume.tokens.len() < width {
        return None;
    }

    let target: Vec<char> = phrase.chars().collect();
    let target_symbols = suffix_symbols(phrase);
    let max_distance = max_distance.min(target.len().saturating_sub(1));
    let offsets = resume.token_offsets();
    let mut best: Option<FuzzyCandidate> = None;

    for start in 0..=(resume.tokens.len() - width) {
        let window = resume.tokens[start..start + width].join(" ");
        let chars: Vec<char> = window.chars().collect();

        // Length difference is a lower bound on the distance.
        if chars.len().abs_diff(target.len()) > max_distance {
            continue;
        }

        if suffix_symbols(&window) != target_symbols {
            continue;
        }

        let distance = edit_distance_chars(&target, &chars);
        if distance > max_distance {
            continue;
        }

        let better = best.as_ref().map_or(true, |b| distance < b.distance);
        if better {
            best = Some(FuzzyCandidate {
                text: window,
                distance,
                position: offsets[start],
            });
            if distance == 0 {
                break;
            }
        }
    }

    best
}

fn suffix_symbols(text: &str) -> String {
    text.chars().filter(|c| *c == '+' || *c == '#').collect()
}
