//! Batch answer parser
//!
//! Ranks relation scores, optionally logs the ranked relations, then
//! resolves every question against its retrieved triplets.

use rayon::prelude::*;

use kbqa_core::{
    KbqaError, KnowledgeBase, MalformedDatePolicy, ParserConfig, RankedRelations, Result,
    TripletGroup, NOT_FOUND,
};

use crate::diagnostics;
use crate::format::ObjectFormatter;
use crate::ranker::RelationRanker;
use crate::resolver::AnswerResolver;
use crate::AnswerParser;

/// Answer parser for questions over Wikidata-style triplets
#[derive(Debug, Clone)]
pub struct KbAnswerParser {
    ranker: RelationRanker,
    resolver: AnswerResolver,
    debug: bool,
    malformed_dates: MalformedDatePolicy,
}

impl KbAnswerParser {
    /// Load the lookup tables named in the configuration and build the parser
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        config.validate()?;
        let knowledge_base = KnowledgeBase::load(config)?;
        Self::new(config, knowledge_base)
    }

    /// Build the parser over already loaded tables
    pub fn new(config: &ParserConfig, knowledge_base: KnowledgeBase) -> Result<Self> {
        let ranker = RelationRanker::new(config.relation_vocabulary.clone(), config.top_k)?;
        if config.entity_prefix.is_empty() {
            return Err(KbqaError::Configuration(
                "entity prefix must not be empty".to_string(),
            ));
        }

        let resolver = AnswerResolver::new(
            knowledge_base,
            ObjectFormatter::new(config.entity_prefix.clone()),
        );

        Ok(Self {
            ranker,
            resolver,
            debug: config.debug,
            malformed_dates: config.malformed_dates,
        })
    }

    pub fn ranker(&self) -> &RelationRanker {
        &self.ranker
    }

    pub fn resolver(&self) -> &AnswerResolver {
        &self.resolver
    }

    /// Resolve a batch sequentially
    pub fn parse_batch(
        &self,
        relation_scores: &[Vec<f32>],
        triplets: &[TripletGroup],
    ) -> Result<Vec<String>> {
        let ranked = self.prepare(relation_scores, triplets)?;
        tracing::debug!("Resolving {} questions", ranked.len());

        ranked
            .iter()
            .zip(triplets)
            .enumerate()
            .map(|(index, (relations, group))| self.answer(index, relations, group))
            .collect()
    }

    /// Resolve a batch on the rayon pool.
    ///
    /// Output order and content match `parse_batch`, including which
    /// question an error is reported for (the lowest failing index).
    pub fn parse_batch_parallel(
        &self,
        relation_scores: &[Vec<f32>],
        triplets: &[TripletGroup],
    ) -> Result<Vec<String>> {
        let ranked = self.prepare(relation_scores, triplets)?;
        tracing::debug!("Resolving {} questions in parallel", ranked.len());

        let answers: Vec<Result<String>> = ranked
            .par_iter()
            .zip(triplets.par_iter())
            .enumerate()
            .map(|(index, (relations, group))| self.answer(index, relations, group))
            .collect();

        answers.into_iter().collect()
    }

    fn prepare(
        &self,
        relation_scores: &[Vec<f32>],
        triplets: &[TripletGroup],
    ) -> Result<Vec<RankedRelations>> {
        if relation_scores.len() != triplets.len() {
            return Err(KbqaError::Configuration(format!(
                "{} score vectors but {} triplet groups",
                relation_scores.len(),
                triplets.len()
            )));
        }

        let ranked = self.ranker.rank_batch(relation_scores)?;
        if self.debug {
            diagnostics::log_ranked_relations(
                &ranked,
                self.resolver.knowledge_base().relation_descriptions(),
            );
        }

        Ok(ranked)
    }

    fn answer(
        &self,
        index: usize,
        relations: &RankedRelations,
        group: &TripletGroup,
    ) -> Result<String> {
        match self.resolver.resolve(relations, group) {
            Err(e @ KbqaError::MalformedDate { .. })
                if self.malformed_dates == MalformedDatePolicy::NotFound =>
            {
                tracing::warn!(question = index, "Answering {}: {}", NOT_FOUND, e);
                Ok(NOT_FOUND.to_string())
            }
            other => other.map_err(|e| e.in_question(index)),
        }
    }
}

impl AnswerParser for KbAnswerParser {
    fn parse(
        &self,
        relation_scores: &[Vec<f32>],
        triplets: &[TripletGroup],
    ) -> Result<Vec<String>> {
        self.parse_batch(relation_scores, triplets)
    }
}
