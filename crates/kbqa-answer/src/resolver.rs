//! Answer resolution
//!
//! Picks the triplet whose relation ranks highest among the predicted
//! relations. Ties on the relation go to the triplet retrieved first.

use std::collections::HashMap;

use serde::Serialize;

use kbqa_core::{KnowledgeBase, RankedRelations, Result, Triplet, TripletGroup};

use crate::format::ObjectFormatter;

/// Resolved answer with the triplet it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Relation of the matched triplet
    pub relation: Option<String>,
    /// Raw object of the matched triplet
    pub object: Option<String>,
    /// Display text
    pub text: String,
}

/// Resolves one question's answer against its candidate triplets
#[derive(Debug, Clone)]
pub struct AnswerResolver {
    knowledge_base: KnowledgeBase,
    formatter: ObjectFormatter,
}

impl AnswerResolver {
    pub fn new(knowledge_base: KnowledgeBase, formatter: ObjectFormatter) -> Self {
        Self {
            knowledge_base,
            formatter,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn formatter(&self) -> &ObjectFormatter {
        &self.formatter
    }

    /// First triplet in (relation rank, retrieval order) priority
    pub fn find_match<'a>(ranked: &RankedRelations, group: &'a TripletGroup) -> Option<&'a Triplet> {
        let ranks: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(rank, relation)| (relation, rank))
            .collect();

        group
            .iter()
            .enumerate()
            .filter_map(|(position, triplet)| {
                ranks
                    .get(triplet.relation.as_str())
                    .map(|&rank| ((rank, position), triplet))
            })
            .min_by_key(|(priority, _)| *priority)
            .map(|(_, triplet)| triplet)
    }

    /// Raw object of the matching triplet
    pub fn find_object<'a>(ranked: &RankedRelations, group: &'a TripletGroup) -> Option<&'a str> {
        Self::find_match(ranked, group).map(|t| t.object.as_str())
    }

    /// Display text for one question
    pub fn resolve(&self, ranked: &RankedRelations, group: &TripletGroup) -> Result<String> {
        let object = Self::find_object(ranked, group);
        self.formatter
            .format(object, self.knowledge_base.entity_names())
    }

    /// Display text together with the matched relation and object
    pub fn resolve_detailed(&self, ranked: &RankedRelations, group: &TripletGroup) -> Result<Answer> {
        let matched = Self::find_match(ranked, group);
        let text = self.formatter.format(
            matched.map(|t| t.object.as_str()),
            self.knowledge_base.entity_names(),
        )?;

        Ok(Answer {
            relation: matched.map(|t| t.relation.clone()),
            object: matched.map(|t| t.object.clone()),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::{EntityNameTable, EntityRecord, NOT_FOUND};
    use std::sync::Arc;

    fn resolver() -> AnswerResolver {
        let names: EntityNameTable = [
            ("Q42", EntityRecord::new("Douglas Adams")),
            ("Q350", EntityRecord::new("Cambridge")),
            ("Q84", EntityRecord::new("London")),
        ]
        .into_iter()
        .collect();

        AnswerResolver::new(
            KnowledgeBase::new(Arc::new(names), None),
            ObjectFormatter::default(),
        )
    }

    fn group(entities: &[&[(&str, &str)]]) -> TripletGroup {
        TripletGroup::new(
            entities
                .iter()
                .map(|triplets| triplets.iter().map(|(r, o)| Triplet::new(*r, *o)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_empty_group_not_found() {
        let ranked = RankedRelations::new(["P19", "P20"]);
        assert_eq!(resolver().resolve(&ranked, &TripletGroup::default()).unwrap(), NOT_FOUND);
        assert_eq!(resolver().resolve(&ranked, &group(&[&[], &[]])).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_no_matching_relation() {
        let ranked = RankedRelations::new(["P69"]);
        let triplets = group(&[&[("P19", "Q350")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_higher_ranked_relation_wins() {
        let ranked = RankedRelations::new(["P20", "P19"]);
        let triplets = group(&[&[("P19", "Q350"), ("P20", "Q84")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), "London");

        let ranked = RankedRelations::new(["P19", "P20"]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), "Cambridge");
    }

    #[test]
    fn test_higher_ranked_relation_wins_across_entities() {
        let ranked = RankedRelations::new(["P20", "P19"]);
        let triplets = group(&[&[("P19", "Q350")], &[("P20", "Q84")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), "London");
    }

    #[test]
    fn test_same_relation_first_triplet_wins() {
        let ranked = RankedRelations::new(["P19"]);
        let triplets = group(&[&[("P31", "Q5"), ("P19", "Q84")], &[("P19", "Q350")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), "London");
    }

    #[test]
    fn test_match_on_unknown_entity_does_not_fall_through() {
        let ranked = RankedRelations::new(["P19", "P20"]);
        let triplets = group(&[&[("P19", "Q999"), ("P20", "Q84")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_date_object() {
        let ranked = RankedRelations::new(["P569"]);
        let triplets = group(&[&[("P569", "1952-03-11")]]);
        assert_eq!(resolver().resolve(&ranked, &triplets).unwrap(), "11 March 1952");
    }

    #[test]
    fn test_malformed_date_surfaces() {
        let ranked = RankedRelations::new(["P569"]);
        let triplets = group(&[&[("P569", "1952-02-31")]]);
        assert!(resolver().resolve(&ranked, &triplets).unwrap_err().is_malformed_date());
    }

    #[test]
    fn test_resolve_detailed() {
        let ranked = RankedRelations::new(["P20", "P19"]);
        let triplets = group(&[&[("P19", "Q350"), ("P20", "Q84")]]);
        let answer = resolver().resolve_detailed(&ranked, &triplets).unwrap();

        assert_eq!(answer.relation.as_deref(), Some("P20"));
        assert_eq!(answer.object.as_deref(), Some("Q84"));
        assert_eq!(answer.text, "London");

        let missing = resolver()
            .resolve_detailed(&RankedRelations::new(["P6"]), &triplets)
            .unwrap();
        assert_eq!(missing.relation, None);
        assert_eq!(missing.text, NOT_FOUND);
    }

    #[test]
    fn test_find_object() {
        let ranked = RankedRelations::new(["P20"]);
        let triplets = group(&[&[("P19", "Q5"), ("P20", "1980-01-01")]]);
        assert_eq!(
            AnswerResolver::find_object(&ranked, &triplets),
            Some("1980-01-01")
        );
    }
}
