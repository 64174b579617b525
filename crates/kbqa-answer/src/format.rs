//! Object formatting
//!
//! Renders a matched triplet object as display text: entity ids become
//! entity names, ISO dates become "DD Month YYYY", everything else is
//! "Not Found".

use std::num::IntErrorKind;

use chrono::NaiveDate;

use kbqa_core::{EntityNameTable, KbqaError, Result, NOT_FOUND};

/// Syntactic category of a triplet object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Knowledge-base entity reference (e.g. "Q42")
    Entity,
    /// Two hyphens and a leading year above 1000 (e.g. "1952-03-11")
    Date,
    /// Anything else
    Literal,
}

/// Formats matched objects for display
#[derive(Debug, Clone)]
pub struct ObjectFormatter {
    entity_prefix: String,
}

impl ObjectFormatter {
    /// Create a formatter recognizing entities by the given prefix
    pub fn new(entity_prefix: impl Into<String>) -> Self {
        Self {
            entity_prefix: entity_prefix.into(),
        }
    }

    pub fn entity_prefix(&self) -> &str {
        &self.entity_prefix
    }

    /// Classify an object by its shape alone
    pub fn classify(&self, object: &str) -> ObjectKind {
        if object.starts_with(self.entity_prefix.as_str()) {
            ObjectKind::Entity
        } else if is_date_shaped(object) {
            ObjectKind::Date
        } else {
            ObjectKind::Literal
        }
    }

    /// Display text for a matched object (`None` when nothing matched)
    pub fn format(&self, object: Option<&str>, names: &EntityNameTable) -> Result<String> {
        let Some(object) = object else {
            return Ok(NOT_FOUND.to_string());
        };

        match self.classify(object) {
            ObjectKind::Entity => Ok(names.name(object).unwrap_or(NOT_FOUND).to_string()),
            ObjectKind::Date => format_date(object),
            ObjectKind::Literal => Ok(NOT_FOUND.to_string()),
        }
    }
}

impl Default for ObjectFormatter {
    fn default() -> Self {
        Self::new("Q")
    }
}

fn is_date_shaped(object: &str) -> bool {
    if object.matches('-').count() != 2 {
        return false;
    }

    let year = object.split('-').next().unwrap_or_default();
    match year.parse::<i64>() {
        Ok(year) => year > 1000,
        // All-digit years too long for i64 are still far above 1000
        Err(e) => *e.kind() == IntErrorKind::PosOverflow,
    }
}

/// Render an ISO `YYYY-MM-DD` date as `DD Month YYYY`
pub fn format_date(value: &str) -> Result<String> {
    let malformed = |reason: String| KbqaError::MalformedDate {
        value: value.to_string(),
        reason,
    };

    let year = value.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("year must have four digits".to_string()));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| malformed(e.to_string()))?;
    Ok(date.format("%d %B %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::EntityRecord;

    fn names() -> EntityNameTable {
        [("Q42", EntityRecord::new("Douglas Adams"))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_entity_name() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.format(Some("Q42"), &names()).unwrap(), "Douglas Adams");
    }

    #[test]
    fn test_unknown_entity() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.format(Some("Q999"), &names()).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_absent_object() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.format(None, &names()).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_date() {
        let formatter = ObjectFormatter::default();
        assert_eq!(
            formatter.format(Some("1952-03-11"), &names()).unwrap(),
            "11 March 1952"
        );
        assert_eq!(
            formatter.format(Some("1980-01-01"), &names()).unwrap(),
            "01 January 1980"
        );
    }

    #[test]
    fn test_small_year_is_not_a_date() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.classify("12-03-11"), ObjectKind::Literal);
        assert_eq!(formatter.format(Some("12-03-11"), &names()).unwrap(), NOT_FOUND);
        assert_eq!(formatter.format(Some("1000-01-01"), &names()).unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_non_numeric_lead_is_literal() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.classify("abc-def-ghi"), ObjectKind::Literal);
        assert_eq!(formatter.classify("-5-3"), ObjectKind::Literal);
        assert_eq!(formatter.classify(""), ObjectKind::Literal);
        assert_eq!(formatter.classify("1952-03"), ObjectKind::Literal);
        assert_eq!(
            formatter.format(Some("http://example.org"), &names()).unwrap(),
            NOT_FOUND
        );
    }

    #[test]
    fn test_malformed_date() {
        let formatter = ObjectFormatter::default();
        let err = formatter.format(Some("1999-02-30"), &names()).unwrap_err();
        assert!(err.is_malformed_date());

        assert!(format_date("1952-13-01").is_err());
        assert!(format_date("1952-03-xx").is_err());
        assert!(format_date("01952-03-11").is_err());
    }

    #[test]
    fn test_oversized_year_is_malformed() {
        let formatter = ObjectFormatter::default();
        assert_eq!(formatter.classify("99999999999999999999-01-01"), ObjectKind::Date);

        let err = formatter
            .format(Some("99999999999999999999-01-01"), &names())
            .unwrap_err();
        assert!(err.is_malformed_date());

        assert!(formatter
            .format(Some("12345-01-01"), &names())
            .unwrap_err()
            .is_malformed_date());
    }

    #[test]
    fn test_custom_entity_prefix() {
        let formatter = ObjectFormatter::new("wd:");
        let names: EntityNameTable = [("wd:Q64", EntityRecord::new("Berlin"))]
            .into_iter()
            .collect();

        assert_eq!(formatter.classify("Q64"), ObjectKind::Literal);
        assert_eq!(formatter.format(Some("wd:Q64"), &names).unwrap(), "Berlin");
    }
}
