//! A single annotated text fragment and its wire representation.

use crate::category::SemanticCategory;
use crate::concept::{sort_concepts, Concept};
use crate::{CoreError, CoreResult};
use nlp_types::{Polarity, Span};
use serde::Deserialize;
use serde_json::{json, Value};

/// A fragment of the document that matched one or more concepts.
///
/// The concept list is always held in canonical order, so two mentions built from the same
/// concepts compare equal regardless of the order the server returned them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    span: Span,
    text: String,
    category: SemanticCategory,
    polarity: Polarity,
    concepts: Vec<Concept>,
}

impl Mention {
    pub fn new(
        span: Span,
        text: impl Into<String>,
        category: SemanticCategory,
        polarity: Polarity,
        concepts: Vec<Concept>,
    ) -> Self {
        Self {
            span,
            text: text.into(),
            category,
            polarity,
            concepts: sort_concepts(concepts),
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn begin(&self) -> usize {
        self.span.begin()
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> SemanticCategory {
        self.category
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Copy of this mention with different offsets.
    pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Wire form: `begin, end, text, polarity, conceptAttributes, type`.
    pub fn as_json(&self) -> Value {
        let concepts: Vec<Value> = self.concepts.iter().map(Concept::as_json).collect();
        json!({
            "begin": self.span.begin(),
            "end": self.span.end(),
            "text": self.text,
            "polarity": self.polarity.to_wire(),
            "conceptAttributes": concepts,
            "type": self.category.as_wire(),
        })
    }

    /// Build a mention from its wire record.
    ///
    /// `location` names the record in error messages, e.g. `SignSymptomMention[2]`.
    pub(crate) fn from_wire(wire: MentionWire, location: &str) -> CoreResult<Self> {
        let label = wire
            .kind
            .ok_or_else(|| CoreError::malformed(location, "missing mention type"))?;
        let category = SemanticCategory::from_wire(&label).ok_or_else(|| {
            CoreError::malformed(location, format!("unrecognized mention type '{label}'"))
        })?;

        let raw_polarity = wire
            .polarity
            .ok_or_else(|| CoreError::malformed(location, "missing polarity"))?;
        let polarity = Polarity::from_wire(raw_polarity).ok_or_else(|| {
            CoreError::malformed(location, format!("unknown polarity {raw_polarity}"))
        })?;

        let span = Span::new(wire.begin, wire.end)
            .map_err(|e| CoreError::malformed(location, e.to_string()))?;

        Ok(Self::new(span, wire.text, category, polarity, wire.concepts))
    }
}

/// Wire representation of one mention as emitted by cTAKES REST.
///
/// Unknown keys are tolerated; the server adds fields between releases.
#[derive(Debug, Deserialize)]
pub(crate) struct MentionWire {
    begin: usize,
    end: usize,
    text: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    polarity: Option<i64>,
    #[serde(rename = "conceptAttributes", default)]
    concepts: Vec<Concept>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> MentionWire {
        serde_json::from_str(json).expect("wire record")
    }

    #[test]
    fn builds_from_wire_record() {
        let mention = Mention::from_wire(
            wire(
                r#"{"begin": 4, "end": 9, "text": "fever", "type": "SignSymptomMention",
                    "polarity": -1, "conceptAttributes": [{"cui": "C0015967", "code": "386661006",
                    "codingScheme": "SNOMEDCT_US", "tui": "T184"}]}"#,
            ),
            "SignSymptomMention[0]",
        )
        .expect("valid mention");

        assert_eq!(mention.span().key(), (4, 9));
        assert_eq!(mention.text(), "fever");
        assert_eq!(mention.category(), SemanticCategory::SignSymptom);
        assert_eq!(mention.polarity(), Polarity::Negated);
        assert_eq!(mention.concepts().len(), 1);
    }

    #[test]
    fn missing_concept_list_is_empty() {
        let mention = Mention::from_wire(
            wire(r#"{"begin": 0, "end": 3, "text": "arm", "type": "AnatomicalSiteMention", "polarity": 0}"#),
            "AnatomicalSiteMention[0]",
        )
        .expect("valid mention");
        assert!(mention.concepts().is_empty());
    }

    #[test]
    fn rejects_unknown_polarity() {
        let err = Mention::from_wire(
            wire(r#"{"begin": 0, "end": 3, "text": "arm", "type": "AnatomicalSiteMention", "polarity": 1}"#),
            "AnatomicalSiteMention[7]",
        )
        .expect_err("polarity 1 is not a cTAKES value");
        match err {
            CoreError::MalformedAnnotation { location, reason } => {
                assert_eq!(location, "AnatomicalSiteMention[7]");
                assert!(reason.contains("unknown polarity 1"));
            }
            other => panic!("expected MalformedAnnotation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_and_unknown_type() {
        let missing = Mention::from_wire(
            wire(r#"{"begin": 0, "end": 3, "text": "arm", "polarity": 0}"#),
            "X[0]",
        )
        .expect_err("type is required");
        assert!(missing.to_string().contains("missing mention type"));

        let unknown = Mention::from_wire(
            wire(r#"{"begin": 0, "end": 3, "text": "arm", "type": "LabMention", "polarity": 0}"#),
            "X[0]",
        )
        .expect_err("type must be known");
        assert!(unknown.to_string().contains("LabMention"));
    }

    #[test]
    fn rejects_inverted_span() {
        let err = Mention::from_wire(
            wire(r#"{"begin": 9, "end": 3, "text": "arm", "type": "ProcedureMention", "polarity": 0}"#),
            "ProcedureMention[0]",
        )
        .expect_err("end before begin");
        assert!(matches!(err, CoreError::MalformedAnnotation { .. }));
    }

    #[test]
    fn as_json_uses_wire_field_order() {
        let mention = Mention::new(
            Span::new(1, 2).expect("span"),
            "x",
            SemanticCategory::CustomDict,
            Polarity::Positive,
            vec![],
        );
        assert_eq!(
            mention.as_json().to_string(),
            r#"{"begin":1,"end":2,"text":"x","polarity":0,"conceptAttributes":[],"type":"IdentifiedAnnotation"}"#
        );
    }
}
