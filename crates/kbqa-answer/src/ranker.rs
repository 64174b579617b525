//! Relation ranking
//!
//! Converts classifier scores, position-aligned with a fixed relation
//! vocabulary, into the top-k relation identifiers.

use std::cmp::Ordering;
use std::collections::HashSet;

use kbqa_core::{KbqaError, RankedRelations, Result};

/// Top-k selector over a fixed relation vocabulary
#[derive(Debug, Clone)]
pub struct RelationRanker {
    vocabulary: Vec<String>,
    top_k: usize,
}

impl RelationRanker {
    /// Create a ranker; the vocabulary must be non-empty and duplicate-free
    pub fn new(vocabulary: Vec<String>, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(KbqaError::Configuration(
                "top_k must be at least 1".to_string(),
            ));
        }
        if vocabulary.is_empty() {
            return Err(KbqaError::Configuration(
                "relation vocabulary is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = vocabulary.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(KbqaError::Configuration(format!(
                "relation {dup} appears twice in the vocabulary"
            )));
        }

        Ok(Self { vocabulary, top_k })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank one score vector.
    ///
    /// Equal scores keep vocabulary order; NaN ranks below every number.
    pub fn rank(&self, scores: &[f32]) -> Result<RankedRelations> {
        if scores.len() != self.vocabulary.len() {
            return Err(KbqaError::Configuration(format!(
                "score vector has {} entries but the relation vocabulary has {}",
                scores.len(),
                self.vocabulary.len()
            )));
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable sort
        order.sort_by(|&a, &b| descending(scores[a], scores[b]));
        order.truncate(self.top_k);

        Ok(RankedRelations::new(
            order.into_iter().map(|i| self.vocabulary[i].as_str()),
        ))
    }

    /// Rank every question of a batch, preserving batch order
    pub fn rank_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<RankedRelations>> {
        batch
            .iter()
            .enumerate()
            .map(|(i, scores)| self.rank(scores).map_err(|e| e.in_question(i)))
            .collect()
    }
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
