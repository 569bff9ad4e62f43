// Criterion benchmarks for hire-rank

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hire_rank::core::{
    distance::edit_distance,
    kmp::{find_phrase, KmpMatcher},
    semantic::IdfTable,
    tokenizer::{normalize, tokenize},
    Matcher,
};
use hire_rank::models::{EngineConfig, ExperiencePolicy, JobRequirement, ResumeSubmission};
use std::sync::Arc;

const RESUME: &str = "Senior backend engineer with 6 years of experience building REST APIs \
    in Python and Go. Worked at Acme Corp as platform engineer (2019 - 2024), running \
    Kubernetes clusters, PostgreSQL and Redis. Led migration of payment services to Docker \
    and AWS, mentored junior developers and owned CI pipelines.";

fn create_resume(id: usize) -> ResumeSubmission {
    let extra = match id % 3 {
        0 => "Machine learning with PyTorch and pandas.",
        1 => "Frontend work in React and TypeScript.",
        _ => "Data engineering with Spark and Airflow.",
    };
    ResumeSubmission::new(format!("resume-{}", id), format!("{} {}", RESUME, extra))
}

fn create_job() -> JobRequirement {
    JobRequirement::new(
        ["python", "kubernetes", "postgresql", "docker", "machine learning", "terraform"],
        "Backend engineer to build REST services in Python on Kubernetes with PostgreSQL",
        ExperiencePolicy::Experienced,
    )
    .unwrap()
}

fn bench_kmp(c: &mut Criterion) {
    let text = normalize(RESUME).joined;
    let matcher = KmpMatcher::new("engineer").unwrap();

    c.bench_function("kmp_find_all", |b| {
        b.iter(|| matcher.find_all(black_box(&text)));
    });

    c.bench_function("find_phrase_miss", |b| {
        b.iter(|| find_phrase(black_box(&text), black_box("machine learning")));
    });
}

fn bench_edit_distance(c: &mut Criterion) {
    c.bench_function("edit_distance", |b| {
        b.iter(|| edit_distance(black_box("kubernetes"), black_box("kubernets")));
    });
}

fn bench_idf_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("idf_build");

    for resume_count in [10, 100, 1000].iter() {
        let corpus: Vec<Vec<String>> = (0..*resume_count)
            .map(|i| tokenize(&create_resume(i).text))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("documents", resume_count),
            resume_count,
            |b, _| {
                b.iter(|| IdfTable::build(corpus.iter().map(Vec::as_slice), false));
            },
        );
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let matcher = Arc::new(Matcher::with_default_weights());
    let job = create_job();

    let mut group = c.benchmark_group("ranking");

    for resume_count in [10, 100, 500].iter() {
        let resumes: Vec<ResumeSubmission> = (0..*resume_count).map(create_resume).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", resume_count),
            resume_count,
            |b, _| {
                b.iter(|| {
                    runtime.block_on(matcher.rank(black_box(&job), black_box(resumes.clone())))
                });
            },
        );
    }

    group.finish();

    let config = EngineConfig {
        workers: 1,
        ..EngineConfig::default()
    };
    let single = Matcher::new(config, Arc::new(hire_rank::DisabledScorer)).unwrap();
    let resumes: Vec<ResumeSubmission> = (0..100).map(create_resume).collect();

    c.bench_function("rank_100_single_worker", |b| {
        b.iter(|| runtime.block_on(single.rank(&job, resumes.clone())));
    });
}

criterion_group!(
    benches,
    bench_kmp,
    bench_edit_distance,
    bench_idf_build,
    bench_ranking
);

criterion_main!(benches);
