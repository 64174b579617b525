//! Ranked relation diagnostics
//!
//! Observation only: nothing here feeds back into answer resolution.

use kbqa_core::{RankedRelations, RelationDescriptionTable};

/// Human-readable labels for ranked relations, falling back to the raw id
pub fn describe_relations<'a>(
    ranked: &'a RankedRelations,
    descriptions: Option<&'a RelationDescriptionTable>,
) -> Vec<&'a str> {
    ranked
        .iter()
        .map(|relation| match descriptions {
            Some(table) => table.describe(relation),
            None => relation,
        })
        .collect()
}

/// Emit the top-k relations of every question as debug events
pub fn log_ranked_relations(
    batch: &[RankedRelations],
    descriptions: Option<&RelationDescriptionTable>,
) {
    for (question, ranked) in batch.iter().enumerate() {
        let described = describe_relations(ranked, descriptions);
        tracing::debug!(question, relations = ?described, "Top-k relations extracted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_with_table() {
        let table: RelationDescriptionTable = [("P19", "place of birth"), ("P20", "place of death")]
            .into_iter()
            .collect();
        let ranked = RankedRelations::new(["P20", "P569", "P19"]);

        assert_eq!(
            describe_relations(&ranked, Some(&table)),
            vec!["place of death", "P569", "place of birth"]
        );
    }

    #[test]
    fn test_describe_without_table() {
        let ranked = RankedRelations::new(["P20", "P19"]);
        assert_eq!(describe_relations(&ranked, None), vec!["P20", "P19"]);
    }
}
