//! # cTAKES Core
//!
//! Pure data operations on cTAKES REST responses:
//! - Parsing the response JSON into an [`AnnotationIndex`] with canonically ordered concepts
//! - Reconciling UTF-16 offsets into scalar-character offsets of the source document
//! - Mapping cNLP transformer statuses onto [`Polarity`]
//!
//! **No transport concerns**: HTTP clients, servers, and FHIR rendering belong in `api-rest`,
//! `cli`, and `fhir`.

pub mod annotation;
pub mod category;
pub mod concept;
pub mod config;
pub mod constants;
pub mod error;
pub mod mention;
pub mod negation;
pub mod reconcile;

pub use annotation::AnnotationIndex;
pub use category::SemanticCategory;
pub use concept::{sort_concepts, Concept};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use mention::Mention;
pub use negation::{
    list_polarity, map_polarity, PolarityRequest, PolarityResponse, TransformerModel,
};
pub use nlp_types::{Polarity, PolarityEncoding, Span};
pub use reconcile::{document_text, reconcile, IndexReconciler};

use serde_json::Value;

/// Parse a cTAKES response for `document` and reconcile its offsets.
///
/// When [`CoreConfig::verify_spans`] is set, every reconciled mention is checked against the
/// document text before the index is returned.
///
/// # Errors
///
/// Returns whatever parsing, reconciliation, or verification reports; see [`CoreError`].
pub fn extract(document: &str, response: &str, config: &CoreConfig) -> CoreResult<AnnotationIndex> {
    let index = AnnotationIndex::parse(response)?;
    finish(document, index, config)
}

/// Same as [`extract`], for a response that is already decoded.
pub fn extract_value(
    document: &str,
    response: Value,
    config: &CoreConfig,
) -> CoreResult<AnnotationIndex> {
    let index = AnnotationIndex::from_value(response)?;
    finish(document, index, config)
}

fn finish(document: &str, index: AnnotationIndex, config: &CoreConfig) -> CoreResult<AnnotationIndex> {
    let reconciler = IndexReconciler::new(document);
    let index = reconciler.fix(index)?;
    if config.verify_spans() {
        reconciler.verify(&index)?;
    }
    tracing::info!(
        mentions = index.len(),
        verified = config.verify_spans(),
        "extracted annotations"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCUMENT: &str = "patient feels 🤒 with fever";
    const RESPONSE: &str = r#"{"SignSymptomMention":[{"begin":22,"end":27,"text":"fever","polarity":0,"type":"SignSymptomMention","conceptAttributes":[{"code":"386661006","cui":"C0015967","codingScheme":"SNOMEDCT_US","tui":"T184"}]}]}"#;

    #[test]
    fn extract_parses_and_reconciles() {
        let index = extract(DOCUMENT, RESPONSE, &CoreConfig::default()).expect("extract");
        let mentions = index.all_mentions(None);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].span().key(), (21, 26));
        assert_eq!(document_text(DOCUMENT, mentions[0].span()), "fever");
    }

    #[test]
    fn extract_verifies_when_configured() {
        let response = RESPONSE.replace(r#""text":"fever""#, r#""text":"Fever""#);

        let err = extract(DOCUMENT, &response, &CoreConfig::default())
            .expect_err("mention text disagrees with document");
        assert!(matches!(err, CoreError::ReconciliationMismatch { .. }));

        let index = extract(DOCUMENT, &response, &CoreConfig::new(false))
            .expect("verification disabled");
        assert_eq!(index.texts(None), vec!["Fever"]);
    }

    #[test]
    fn extract_value_accepts_decoded_json() {
        let value: Value = serde_json::from_str(RESPONSE).expect("json");
        let index = extract_value(DOCUMENT, value, &CoreConfig::default()).expect("extract");
        assert_eq!(index.concept_ids(None), vec![Some("C0015967")]);

        let err = extract_value(DOCUMENT, json!([1, 2]), &CoreConfig::default())
            .expect_err("arrays are not responses");
        assert!(matches!(err, CoreError::MalformedAnnotation { .. }));
    }
}
