// Unit tests for the hire-rank core API

use hire_rank::core::{
    distance::{edit_distance, similarity_percent},
    experience::{classify_experience, experience_adjustment},
    kmp::{find_phrase, KmpMatcher},
    scoring::{base_score, blend_ai, compute_breakdown, rank_candidates, rerank, skill_coverage},
    semantic::{cosine_similarity, IdfTable},
    skills::{match_skill, match_skills},
    tokenizer::{normalize, tokenize},
};
use hire_rank::models::{
    ExperienceAssessment, ExperienceLabel, ExperiencePolicy, FuzzyThreshold, JobRequirement,
    MatchKind, ScoreBreakdown, ScoredResume, ScoringWeights,
};

fn scored(id: &str, index: usize, final_score: f64, coverage: f64) -> ScoredResume {
    ScoredResume {
        resume_id: id.to_string(),
        submission_index: index,
        breakdown: ScoreBreakdown {
            skill_coverage: coverage,
            semantic_score: 0.0,
            experience_adjustment: 0.0,
            base_score: final_score,
            ai_score: None,
            final_score,
        },
        experience: ExperienceAssessment::fresher(),
        skill_matches: vec![],
        summary: String::new(),
        strengths: vec![],
        weaknesses: vec![],
        ai_explanation: None,
        issues: vec![],
    }
}

#[test]
fn test_normalize_keeps_language_suffixes() {
    let text = normalize("Shipped C++ and C# services, some C");
    assert_eq!(text.tokens, vec!["shipped", "c++", "and", "c#", "services", "some", "c"]);

    let resume = normalize("Expert in C# and .NET");
    let threshold = FuzzyThreshold::default();
    assert_eq!(match_skill("c++", &resume, &threshold).unwrap().match_kind, MatchKind::None);
    assert_eq!(match_skill("c#", &resume, &threshold).unwrap().match_kind, MatchKind::Exact);
}

#[test]
fn test_normalize_lowercases_and_splits() {
    let text = normalize("Built REST-APIs in Python3, (Django)!");
    assert_eq!(text.tokens, vec!["built", "rest", "apis", "in", "python3", "django"]);
    assert_eq!(text.joined, "built rest apis in python3 django");
}

#[test]
fn test_kmp_all_occurrences() {
    let matcher = KmpMatcher::new("aa").unwrap();
    assert_eq!(matcher.find_all("aaaa"), vec![0, 1, 2]);
    assert_eq!(matcher.find_first("baab"), Some(1));
    assert_eq!(matcher.find_first("abab"), None);
}

#[test]
fn test_phrase_search_respects_token_boundaries() {
    let text = normalize("JavaScript and TypeScript developer, some Java");
    assert_eq!(find_phrase(&text.joined, "java").unwrap(), Some(41));
    assert_eq!(find_phrase(&text.joined, "script").unwrap(), None);
}

#[test]
fn test_edit_distance_symmetric() {
    assert_eq!(edit_distance("flaw", "lawn"), 2);
    assert_eq!(edit_distance("lawn", "flaw"), 2);
    assert_eq!(edit_distance("", "abc"), 3);
    assert_eq!(similarity_percent("", ""), 100.0);
    assert_eq!(similarity_percent("abcd", "abcx"), 75.0);
}

#[test]
fn test_verbatim_skill_is_exact_with_zero_distance() {
    let resume = normalize("Experienced with Kubernetes, Terraform and Go.");
    let threshold = FuzzyThreshold::default();

    for skill in ["kubernetes", "Terraform", "go"] {
        let result = match_skill(skill, &resume, &threshold).unwrap();
        assert_eq!(result.match_kind, MatchKind::Exact, "{}", skill);
        assert_eq!(result.distance, Some(0));
        assert!(result.matched);
    }
}

#[test]
fn test_single_edit_on_long_skill_is_fuzzy_and_closest() {
    // "pythn" is one edit from "python", "pyth" is two.
    let resume = normalize("pyth scripts and pythn tooling");
    let result = match_skill("python", &resume, &FuzzyThreshold::default()).unwrap();

    assert_eq!(result.match_kind, MatchKind::Fuzzy);
    assert_eq!(result.matched_token.as_deref(), Some("pythn"));
    assert_eq!(result.distance, Some(1));
}

#[test]
fn test_short_skill_beyond_threshold_is_unmatched() {
    let resume = normalize("Expert in Rust");
    let result = match_skill("go", &resume, &FuzzyThreshold::default()).unwrap();
    assert_eq!(result.match_kind, MatchKind::None);
    assert!(!result.matched);
}

#[test]
fn test_match_skills_keeps_job_order() {
    let job = JobRequirement::new(["Docker", "python", "SQL"], "", ExperiencePolicy::Any).unwrap();
    let resume = normalize("Python and Postgre SQL");
    let report = match_skills(job.skills(), &resume, &FuzzyThreshold::default());

    let skills: Vec<&str> = report.results.iter().map(|r| r.skill.as_str()).collect();
    assert_eq!(skills, vec!["docker", "python", "sql"]);
    assert_eq!(report.exact_count(), 2);
    assert_eq!(report.fuzzy_count(), 0);
}

#[test]
fn test_experience_classification() {
    let experienced = classify_experience("Senior engineer with 6+ years of experience in Go");
    assert_eq!(experienced.label, ExperienceLabel::Experienced);
    assert_eq!(experienced.years_detected, Some(6.0));

    let fresher = classify_experience("B.Tech in Computer Science, graduated 2024. Seeking first role.");
    assert_eq!(fresher.label, ExperienceLabel::Fresher);
    assert_eq!(fresher.graduation_year, Some(2024));
}

#[test]
fn test_experience_penalty_only_on_mismatch() {
    assert_eq!(
        experience_adjustment(ExperiencePolicy::Experienced, ExperienceLabel::Fresher, 0.1),
        -0.1
    );
    assert_eq!(
        experience_adjustment(ExperiencePolicy::Fresher, ExperienceLabel::Fresher, 0.1),
        0.0
    );
    assert_eq!(
        experience_adjustment(ExperiencePolicy::Any, ExperienceLabel::Fresher, 0.1),
        0.0
    );
}

#[test]
fn test_cosine_symmetry_over_shared_table() {
    let job = tokenize("We need engineers who build REST APIs and backend services");
    let resume = tokenize("Developed backend services and REST APIs for payments");
    let other = tokenize("Graphic designer");
    let table = IdfTable::build([job.as_slice(), resume.as_slice(), other.as_slice()], false);

    let job_vector = table.vectorize(&job);
    let resume_vector = table.vectorize(&resume);
    let forward = cosine_similarity(&job_vector, &resume_vector);
    let backward = cosine_similarity(&resume_vector, &job_vector);

    assert_eq!(forward.to_bits(), backward.to_bits());
    assert!(forward > 0.0);
    assert_eq!(cosine_similarity(&job_vector, &table.vectorize(&other)), 0.0);
}

#[test]
fn test_composite_formula() {
    let weights = ScoringWeights::default();
    let coverage = skill_coverage(2, 1, 4, weights.fuzzy_discount);
    assert!((coverage - 0.7).abs() < 1e-12);

    let base = base_score(&weights, coverage, 0.5, 0.0);
    assert!((base - (0.6 * 0.7 + 0.4 * 0.5)).abs() < 1e-12);

    let blended = blend_ai(base, Some(0.9), weights.ai_weight);
    assert!((blended - (0.7 * base + 0.3 * 0.9)).abs() < 1e-12);
}

#[test]
fn test_zero_ai_weight_final_equals_base() {
    let weights = ScoringWeights {
        ai_weight: 0.0,
        ..ScoringWeights::default()
    };
    let resume = normalize("python sql");
    let skills = vec!["python".to_string(), "docker".to_string()];
    let report = match_skills(&skills, &resume, &FuzzyThreshold::default());

    let breakdown = compute_breakdown(&weights, &report, 0.37, 0.0, Some(0.99));
    assert_eq!(breakdown.final_score.to_bits(), breakdown.base_score.to_bits());
}

#[test]
fn test_tie_broken_by_coverage_regardless_of_order() {
    let ranked = rank_candidates(vec![scored("b", 0, 0.5, 0.4), scored("a", 1, 0.5, 0.8)]);
    assert_eq!(ranked[0].resume_id, "a");

    let ranked = rank_candidates(vec![scored("a", 0, 0.5, 0.8), scored("b", 1, 0.5, 0.4)]);
    assert_eq!(ranked[0].resume_id, "a");
}

#[test]
fn test_ranking_idempotent() {
    let ranked = rank_candidates(vec![
        scored("x", 0, 0.3, 0.1),
        scored("y", 1, 0.3, 0.1),
        scored("z", 2, 0.9, 0.5),
        scored("w", 3, 0.3, 0.6),
    ]);
    let first: Vec<(String, usize)> = ranked.iter().map(|r| (r.resume_id.clone(), r.rank)).collect();
    let second: Vec<(String, usize)> = rerank(ranked)
        .iter()
        .map(|r| (r.resume_id.clone(), r.rank))
        .collect();

    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
        vec!["z", "w", "x", "y"]
    );
}

#[test]
fn test_weights_validation() {
    assert!(ScoringWeights::default().validate().is_ok());

    let unbalanced = ScoringWeights {
        skill_weight: 0.7,
        ..ScoringWeights::default()
    };
    assert!(unbalanced.validate().is_err());

    let out_of_range = ScoringWeights {
        ai_weight: 1.5,
        ..ScoringWeights::default()
    };
    assert!(out_of_range.validate().is_err());
}
