use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ExperienceAssessment, ExperienceLabel, ExperiencePolicy};

static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{1,2}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\s*(?:of\s+)?(?:professional\s+|industry\s+|work\s+|relevant\s+)?(?:experience|exp)\b",
    )
    .unwrap()
});

static RE_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:19|20)\d{2})\s*(?:-|–|—|to)\s*((?:19|20)\d{2}|present|current|now)\b")
        .unwrap()
});

static RE_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:engineer|developer|analyst|manager|consultant|architect|administrator|scientist|designer|programmer|lead)\b",
    )
    .unwrap()
});

static RE_WORKED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:worked|working|employed)\s+(?:at|as|for|with)\b").unwrap());

static RE_NOT_EMPLOYMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:intern|internship|trainee|university|college|school|institute|bachelor|master|b\.?\s?tech|m\.?\s?tech|b\.?\s?sc|m\.?\s?sc|degree)\b",
    )
    .unwrap()
});

static RE_EDUCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:university|college|institute|school|bachelor|master|b\.?\s?tech|m\.?\s?tech|b\.?\s?sc|m\.?\s?sc|bca|mca|mba|phd|degree)\b",
    )
    .unwrap()
});

static RE_GRADUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:graduat(?:ed|ion|ing)|passing|pass\s*out|completed|class\s+of|batch\s+of)\D{0,12}((?:19|20)\d{2})\b",
    )
    .unwrap()
});

const MAX_PLAUSIBLE_YEARS: f64 = 50.0;
const GRADUATION_YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2035;

/// Classify a resume as Fresher or Experienced.
///
/// Explicit "N years of experience" phrases win; otherwise dated job-title
/// lines count as prior employment. With neither signal the candidate is a
/// Fresher. Graduation year is recorded but never changes the label.
pub fn classify_experience(raw_text: &str) -> ExperienceAssessment {
    let lowered = raw_text.to_lowercase();

    let years_detected = detect_years(&lowered);
    let employment_entries = count_employment_entries(&lowered);
    let graduation_year = detect_graduation_year(&lowered);

    let label = match years_detected {
        Some(years) if years > 0.0 => ExperienceLabel::Experienced,
        _ if employment_entries > 0 => ExperienceLabel::Experienced,
        _ => ExperienceLabel::Fresher,
    };

    ExperienceAssessment {
        label,
        years_detected,
        employment_entries,
        graduation_year,
    }
}

/// Largest plausible "N years of experience" value
pub fn detect_years(lowered: &str) -> Option<f64> {
    RE_YEARS
        .captures_iter(lowered)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .filter(|years| (0.0..=MAX_PLAUSIBLE_YEARS).contains(years))
        .fold(None, |acc: Option<f64>, years| {
            Some(acc.map_or(years, |a| a.max(years)))
        })
}

/// Lines that look like a prior job: a role title next to a date range, or an
/// explicit "worked at/as" phrase. Education and internship lines are skipped.
pub fn count_employment_entries(lowered: &str) -> usize {
    lowered
        .lines()
        .filter(|line| !RE_NOT_EMPLOYMENT.is_match(line))
        .filter(|line| {
            (RE_ROLE.is_match(line) && RE_DATE_RANGE.is_match(line)) || RE_WORKED.is_match(line)
        })
        .count()
}

/// Most recent graduation year mentioned
pub fn detect_graduation_year(lowered: &str) -> Option<i32> {
    let explicit = RE_GRADUATION
        .captures_iter(lowered)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok());

    // "B.Tech, XYZ University, 2019 - 2023": the end of the range.
    let ranges = lowered
        .lines()
        .filter(|line| RE_EDUCATION.is_match(line))
        .flat_map(|line| RE_DATE_RANGE.captures_iter(line).collect::<Vec<_>>())
        .filter_map(|caps| caps.get(2)?.as_str().parse::<i32>().ok());

    explicit
        .chain(ranges)
        .filter(|year| GRADUATION_YEAR_RANGE.contains(year))
        .max()
}

/// Adjustment applied to a candidate's base score.
///
/// Zero when the label fits the job's policy or the policy is `Any`; minus
/// `penalty` otherwise. Never a rejection.
pub fn experience_adjustment(
    policy: ExperiencePolicy,
    label: ExperienceLabel,
    penalty: f64,
) -> f64 {
    match (policy, label) {
        (ExperiencePolicy::Any, _) => 0.0,
        (ExperiencePolicy::Experienced, ExperienceLabel::Experienced) => 0.0,
        (ExperiencePolicy::Fresher, ExperienceLabel::Fresher) => 0.0,
        _ => -penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_years() {
        let assessment = classify_experience("Backend engineer with 5+ years of experience in Go");
        assert_eq!(assessment.label, ExperienceLabel::Experienced);
        assert_eq!(assessment.years_detected, Some(5.0));
    }

    #[test]
    fn test_fractional_and_max_years() {
        let text = "2.5 yrs exp in QA. Overall 4 years of professional experience.";
        assert_eq!(detect_years(&text.to_lowercase()), Some(4.0));
    }

    #[test]
    fn test_implausible_years_ignored() {
        assert_eq!(detect_years("99 years of experience"), None);
    }

    #[test]
    fn test_employment_entries_without_years() {
        let text = "EXPERIENCE\nSoftware Engineer, Acme Corp, 2019 - present\nData Analyst, Initech 2016 to 2019";
        let assessment = classify_experience(text);
        assert_eq!(assessment.employment_entries, 2);
        assert_eq!(assessment.label, ExperienceLabel::Experienced);
        assert_eq!(assessment.years_detected, None);
    }

    #[test]
    fn test_default_is_fresher() {
        let text = "B.Tech Computer Science, ABC University, 2020 - 2024\nSummer intern, XYZ Labs 2023 - 2023\nSkills: python, sql";
        let assessment = classify_experience(text);
        assert_eq!(assessment.label, ExperienceLabel::Fresher);
        assert_eq!(assessment.employment_entries, 0);
        assert_eq!(assessment.graduation_year, Some(2024));
    }

    #[test]
    fn test_graduation_phrases() {
        assert_eq!(detect_graduation_year("class of 2023"), Some(2023));
        assert_eq!(detect_graduation_year("graduated: 2021, passing 2019"), Some(2021));
        assert_eq!(detect_graduation_year("born 1990"), None);
    }

    #[test]
    fn test_adjustment_matrix() {
        use ExperienceLabel::*;
        assert_eq!(experience_adjustment(ExperiencePolicy::Any, Fresher, 0.1), 0.0);
        assert_eq!(experience_adjustment(ExperiencePolicy::Experienced, Experienced, 0.1), 0.0);
        assert_eq!(experience_adjustment(ExperiencePolicy::Fresher, Fresher, 0.1), 0.0);
        assert_eq!(experience_adjustment(ExperiencePolicy::Experienced, Fresher, 0.1), -0.1);
        assert_eq!(experience_adjustment(ExperiencePolicy::Fresher, Experienced, 0.1), -0.1);
    }
}
