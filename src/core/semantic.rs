use std::collections::{BTreeMap, BTreeSet};

use crate::models::SimilarityResult;

/// Inverse document frequency table for one job-level scoring run.
///
/// Built once from the job description plus every resume in the batch, then
/// shared read-only by all workers. Tables from different runs are not
/// comparable and must not be reused across jobs.
#[derive(Debug, Clone)]
pub struct IdfTable {
    idf: BTreeMap<String, f64>,
    documents: usize,
    sublinear_tf: bool,
}

impl IdfTable {
    /// `idf(t) = ln((1 + N) / (1 + df(t))) + 1`
    pub fn build<'a, I>(corpus: I, sublinear_tf: bool) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut documents = 0;

        for tokens in corpus {
            documents += 1;
            let unique: BTreeSet<&String> = tokens.iter().collect();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let idf = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let weight = smoothed_idf(documents, df);
                (term, weight)
            })
            .collect();

        Self {
            idf,
            documents,
            sublinear_tf,
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// IDF of a term; terms outside the corpus get the df = 0 weight
    pub fn idf(&self, term: &str) -> f64 {
        self.idf
            .get(term)
            .copied()
            .unwrap_or_else(|| smoothed_idf(self.documents, 0))
    }

    /// Sparse TF-IDF vector of a token sequence
    pub fn vectorize(&self, tokens: &[String]) -> TermVector {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        let weights: BTreeMap<String, f64> = counts
            .into_iter()
            .map(|(term, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (term.to_string(), tf * self.idf(term))
            })
            .collect();

        TermVector::new(weights)
    }

    pub fn similarity(&self, a: &[String], b: &[String]) -> SimilarityResult {
        SimilarityResult {
            score: cosine_similarity(&self.vectorize(a), &self.vectorize(b)),
        }
    }
}

fn smoothed_idf(documents: usize, df: usize) -> f64 {
    ((1.0 + documents as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// Sparse term-weight vector with its Euclidean norm precomputed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
    norm: f64,
}

impl TermVector {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Cosine similarity clamped to [0, 1]; 0 when either vector has zero norm.
///
/// The dot product walks both vectors in term order, so the result is
/// bit-for-bit symmetric in its arguments.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.norm == 0.0 || b.norm == 0.0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut left = a.weights.iter().peekable();
    let mut right = b.weights.iter().peekable();

    while let (Some(&(lt, lw)), Some(&(rt, rw))) = (left.peek(), right.peek()) {
        match lt.cmp(rt) {
            std::cmp::Ordering::Less => {
                left.next();
            }
            std::cmp::Ordering::Greater => {
                right.next();
            }
            std::cmp::Ordering::Equal => {
                dot += lw * rw;
                left.next();
                right.next();
            }
        }
    }

    (dot / (a.norm * b.norm)).clamp(0.0, 1.0)
}
