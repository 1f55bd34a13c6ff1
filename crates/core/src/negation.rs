//! Polarity from the cNLP transformer services.
//!
//! cTAKES has built-in negation detection, but the cNLP transformer models do better. A caller
//! sends the document and a list of `(begin, end)` spans, and the service answers with one
//! status per span: `{"statuses": [..]}`. Each model uses its own integer convention, so each
//! carries an explicit [`PolarityEncoding`].
//!
//! Only the request body and the response mapping live here; posting the request belongs to
//! the transport layer.

use crate::constants::{DEFAULT_CNLP_NEGATION_URL, DEFAULT_CNLP_TERM_EXISTS_URL};
use crate::{CoreError, CoreResult};
use nlp_types::{Polarity, PolarityEncoding, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Transformer model used to classify spans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformerModel {
    /// Negation model: `-1` not negated, `1` negated.
    #[default]
    Negation,
    /// Term-exists model: `1` exists, `-1` does not.
    #[serde(rename = "termexists")]
    TermExists,
}

impl TransformerModel {
    /// Model slug, as used in the service URL path.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Negation => "negation",
            Self::TermExists => "termexists",
        }
    }

    /// Status table for this model.
    pub fn encoding(&self) -> PolarityEncoding {
        match self {
            Self::Negation => PolarityEncoding::new(-1, 1),
            Self::TermExists => PolarityEncoding::new(1, -1),
        }
    }

    /// Default local endpoint for this model.
    pub fn default_url(&self) -> &'static str {
        match self {
            Self::Negation => DEFAULT_CNLP_NEGATION_URL,
            Self::TermExists => DEFAULT_CNLP_TERM_EXISTS_URL,
        }
    }
}

impl fmt::Display for TransformerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TransformerModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negation" => Ok(Self::Negation),
            "termexists" | "term_exists" | "term-exists" => Ok(Self::TermExists),
            other => Err(CoreError::InvalidInput(format!(
                "transformer model '{other}' not recognized"
            ))),
        }
    }
}

/// Request body for a transformer service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PolarityRequest<'a> {
    pub doc_text: &'a str,
    pub entities: Vec<(usize, usize)>,
}

impl<'a> PolarityRequest<'a> {
    pub fn new(doc_text: &'a str, spans: &[Span]) -> Self {
        Self {
            doc_text,
            entities: spans.iter().map(Span::key).collect(),
        }
    }
}

/// Response body of a transformer service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PolarityResponse {
    pub statuses: Vec<i64>,
}

impl PolarityResponse {
    /// Parse a response from JSON text.
    pub fn parse(json_text: &str) -> CoreResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            CoreError::malformed(
                format!("polarity response {path}"),
                err.into_inner().to_string(),
            )
        })
    }
}

/// Map statuses onto polarities, positionally aligned with `spans`.
///
/// # Errors
///
/// - [`CoreError::SpanCountMismatch`] if the service returned a different number of statuses
///   than spans were sent.
/// - [`CoreError::UnknownStatus`] if a status is outside the model's table.
pub fn list_polarity(
    spans: &[Span],
    response: &PolarityResponse,
    model: TransformerModel,
) -> CoreResult<Vec<Polarity>> {
    if spans.len() != response.statuses.len() {
        return Err(CoreError::SpanCountMismatch {
            spans: spans.len(),
            statuses: response.statuses.len(),
        });
    }

    let encoding = model.encoding();
    response
        .statuses
        .iter()
        .map(|&status| {
            encoding.decode(status).ok_or(CoreError::UnknownStatus {
                model: model.slug(),
                status,
            })
        })
        .collect()
}

/// Same as [`list_polarity`], keyed by span.
///
/// A span sent twice keeps the polarity of its last occurrence.
pub fn map_polarity(
    spans: &[Span],
    response: &PolarityResponse,
    model: TransformerModel,
) -> CoreResult<BTreeMap<Span, Polarity>> {
    let polarities = list_polarity(spans, response, model)?;
    tracing::debug!(model = model.slug(), spans = spans.len(), "mapped polarity statuses");
    Ok(spans.iter().copied().zip(polarities).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(usize, usize)]) -> Vec<Span> {
        pairs
            .iter()
            .map(|&(b, e)| Span::new(b, e).expect("span"))
            .collect()
    }

    #[test]
    fn negation_model_uses_double_negative_statuses() {
        let spans = spans(&[(3, 5), (8, 13)]);
        let response = PolarityResponse::parse(r#"{"statuses": [1, -1]}"#).expect("parse");

        let mapped = map_polarity(&spans, &response, TransformerModel::Negation).expect("map");
        assert_eq!(mapped[&spans[0]], Polarity::Negated);
        assert_eq!(mapped[&spans[1]], Polarity::Positive);
    }

    #[test]
    fn term_exists_model_uses_its_own_table() {
        let spans = spans(&[(3, 5), (8, 13)]);
        let response = PolarityResponse {
            statuses: vec![1, -1],
        };

        let listed = list_polarity(&spans, &response, TransformerModel::TermExists).expect("list");
        assert_eq!(listed, vec![Polarity::Positive, Polarity::Negated]);
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let spans = spans(&[(0, 1), (2, 3), (4, 5)]);
        let response = PolarityResponse {
            statuses: vec![1, -1],
        };

        let err = list_polarity(&spans, &response, TransformerModel::Negation)
            .expect_err("3 spans, 2 statuses");
        match err {
            CoreError::SpanCountMismatch { spans, statuses } => {
                assert_eq!(spans, 3);
                assert_eq!(statuses, 2);
            }
            other => panic!("expected SpanCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_status_names_the_model() {
        let spans = spans(&[(0, 1)]);
        let response = PolarityResponse { statuses: vec![0] };

        let err = list_polarity(&spans, &response, TransformerModel::Negation)
            .expect_err("0 is not a negation status");
        match err {
            CoreError::UnknownStatus { model, status } => {
                assert_eq!(model, "negation");
                assert_eq!(status, 0);
            }
            other => panic!("expected UnknownStatus, got {other:?}"),
        }
    }

    #[test]
    fn request_body_matches_service_shape() {
        let body = PolarityRequest::new("patient denies cough", &spans(&[(15, 20)]));
        assert_eq!(
            serde_json::to_string(&body).expect("serialize"),
            r#"{"doc_text":"patient denies cough","entities":[[15,20]]}"#
        );
    }

    #[test]
    fn response_schema_errors_are_malformed() {
        let err = PolarityResponse::parse(r#"{"statuses": ["yes"]}"#).expect_err("strings");
        assert!(matches!(err, CoreError::MalformedAnnotation { .. }));
    }

    #[test]
    fn model_parses_from_slug() {
        assert_eq!("negation".parse::<TransformerModel>().expect("slug"), TransformerModel::Negation);
        assert_eq!(
            "termexists".parse::<TransformerModel>().expect("slug"),
            TransformerModel::TermExists
        );
        assert!("sentiment".parse::<TransformerModel>().is_err());
        assert_eq!(
            TransformerModel::TermExists.default_url(),
            "http://localhost:8000/termexists/process"
        );
    }
}
