use logbook_core::{DEFAULT_THRESHOLD, Fields};

use crate::error::{ResolveError, Result};
use crate::similarity::Scorer;

/// Thresholds record similarity into a duplicate verdict.
#[derive(Debug, Clone)]
pub struct Classifier {
    scorer: Scorer,
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            scorer: Scorer::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Classifier {
    pub fn new(threshold: f64) -> Result<Self> {
        Ok(Self {
            scorer: Scorer::default(),
            threshold: check_threshold(threshold)?,
        })
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score and verdict together.
    pub fn classify<A, B>(&self, a: &A, b: &B) -> Result<(f64, bool)>
    where
        A: Fields + ?Sized,
        B: Fields + ?Sized,
    {
        let score = self.scorer.score(a, b)?;
        Ok((score, score > self.threshold))
    }

    /// True iff the records score strictly above the threshold.
    pub fn is_duplicate<A, B>(&self, a: &A, b: &B) -> Result<bool>
    where
        A: Fields + ?Sized,
        B: Fields + ?Sized,
    {
        Ok(self.classify(a, b)?.1)
    }
}

fn check_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ResolveError::InvalidThreshold(threshold))
    }
}

pub fn is_duplicate<A, B>(a: &A, b: &B, threshold: f64) -> Result<bool>
where
    A: Fields + ?Sized,
    B: Fields + ?Sized,
{
    Classifier::new(threshold)?.is_duplicate(a, b)
}
