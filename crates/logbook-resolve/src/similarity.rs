//! Field-wise fuzzy similarity between two records.
//!
//! Each normalized field pair is scored with a partial ratio and the
//! record score is the mean over all pairs, in `[0, 100]`.

use logbook_core::Fields;
use rapidfuzz::distance::indel;

use crate::error::{ResolveError, Result};
use crate::pairing::{FieldPair, FieldPairer};

/// Best match of the shorter string against any same-length window of the
/// longer one, as a percentage.
///
/// Windows are measured in characters; each window is scored with the
/// Indel ratio `2 * matches / (len(a) + len(b))`, so a transposed letter
/// costs one match rather than two substitutions. Two empty strings score
/// 100, one empty string against a non-empty one scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let width = short.chars().count();
    let bounds: Vec<usize> = long
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(long.len()))
        .collect();

    let mut best = 0.0_f64;
    for start in 0..bounds.len() - width {
        let window = &long[bounds[start]..bounds[start + width]];
        let score = indel::normalized_similarity(short.chars(), window.chars());
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }

    best * 100.0
}

/// Per-field breakdown of a record comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub left: String,
    pub right: String,
    pub score: f64,
}

/// Scores record pairs using a configured [`FieldPairer`].
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    pairer: FieldPairer,
}

impl Scorer {
    pub fn new(pairer: FieldPairer) -> Self {
        Self { pairer }
    }

    pub fn pairer(&self) -> &FieldPairer {
        &self.pairer
    }

    pub fn field_scores<A, B>(&self, a: &A, b: &B) -> Vec<FieldScore>
    where
        A: Fields + ?Sized,
        B: Fields + ?Sized,
    {
        self.pairer
            .pairs(a, b)
            .into_iter()
            .map(|(left, right): FieldPair| {
                let score = partial_ratio(&left, &right);
                FieldScore { left, right, score }
            })
            .collect()
    }

    /// Mean partial ratio over all field pairs.
    pub fn score<A, B>(&self, a: &A, b: &B) -> Result<f64>
    where
        A: Fields + ?Sized,
        B: Fields + ?Sized,
    {
        let scores = self.field_scores(a, b);
        if scores.is_empty() {
            return Err(ResolveError::NoComparableFields);
        }
        let total: f64 = scores.iter().map(|s| s.score).sum();
        Ok(total / scores.len() as f64)
    }
}

/// Similarity of two records with the standard normalizer and an empty
/// placeholder of `""`.
pub fn similarity<A, B>(a: &A, b: &B) -> Result<f64>
where
    A: Fields + ?Sized,
    B: Fields + ?Sized,
{
    Scorer::default().score(a, b)
}
