//! KBQA Answer - Answer generation from retrieved triplets
//!
//! Turns relation classifier scores and the triplets retrieved around the
//! question entity into a display answer: the top-k relations are tried in
//! rank order against the triplets, and the first matching object is
//! rendered as an entity name or a spelled-out date.

use kbqa_core::{Result, TripletGroup};

/// Trait for batch answer parsers
pub trait AnswerParser: Send + Sync {
    /// One display string per question, in input order
    fn parse(&self, relation_scores: &[Vec<f32>], triplets: &[TripletGroup])
        -> Result<Vec<String>>;
}

pub mod diagnostics;
pub mod format;
pub mod parser;
pub mod ranker;
pub mod resolver;

pub use format::{ObjectFormatter, ObjectKind};
pub use parser::KbAnswerParser;
pub use ranker::RelationRanker;
pub use resolver::{Answer, AnswerResolver};
