//! FHIR extensions carrying NLP provenance.
//!
//! Every projected resource carries:
//! - `modifierExtension`: `nlp-source` (algorithm + version) and `nlp-polarity`
//! - `extension`: `derivation-reference` pointing at the source document and the mention span
//!
//! Offsets are scalar-character indexes into the document, i.e. the reconciled span.

use crate::datatypes::Reference;
use nlp_types::{Polarity, Span};
use serde::{Deserialize, Serialize};

/// FHIR `derivation-reference` extension URL.
pub const DERIVATION_REFERENCE_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/derivation-reference";

/// SMART-on-FHIR `nlp-source` extension URL.
pub const NLP_SOURCE_URL: &str =
    "http://fhir-registry.smarthealthit.org/StructureDefinition/nlp-source";

/// SMART-on-FHIR `nlp-polarity` extension URL.
pub const NLP_POLARITY_URL: &str =
    "http://fhir-registry.smarthealthit.org/StructureDefinition/nlp-polarity";

/// Algorithm name recorded when the caller does not supply one.
pub const DEFAULT_ALGORITHM: &str = "ctakes-fhir";

/// A FHIR extension: a URL plus either one `value[x]` or nested extensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Extension {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Extension {
    fn bare(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            value_string: None,
            value_integer: None,
            value_boolean: None,
            value_reference: None,
            extension: Vec::new(),
        }
    }

    pub fn string(url: &str, value: impl Into<String>) -> Self {
        Self {
            value_string: Some(value.into()),
            ..Self::bare(url)
        }
    }

    pub fn integer(url: &str, value: i64) -> Self {
        Self {
            value_integer: Some(value),
            ..Self::bare(url)
        }
    }

    pub fn boolean(url: &str, value: bool) -> Self {
        Self {
            value_boolean: Some(value),
            ..Self::bare(url)
        }
    }

    pub fn reference(value: Reference) -> Self {
        Self {
            value_reference: Some(value),
            ..Self::bare("reference")
        }
    }

    pub fn nested(url: &str, values: Vec<Extension>) -> Self {
        Self {
            extension: values,
            ..Self::bare(url)
        }
    }
}

/// Name and version of the NLP engine that produced a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NlpSource {
    pub algorithm: String,
    pub version: String,
}

impl Default for NlpSource {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl NlpSource {
    pub fn new(algorithm: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            version: version.into(),
        }
    }

    /// Build a source from optional overrides; blank values fall back to the defaults.
    pub fn from_env_values(algorithm: Option<String>, version: Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |value: Option<String>, fallback: String| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };
        Self {
            algorithm: pick(algorithm, defaults.algorithm),
            version: pick(version, defaults.version),
        }
    }

    pub fn as_extension(&self) -> Extension {
        Extension::nested(
            NLP_SOURCE_URL,
            vec![
                Extension::string("algorithm", &self.algorithm),
                Extension::string("version", &self.version),
            ],
        )
    }
}

/// `nlp-polarity` extension; `true` when the concept is asserted.
pub fn polarity_extension(polarity: Polarity) -> Extension {
    Extension::boolean(NLP_POLARITY_URL, polarity.is_positive())
}

/// `modifierExtension` list: source first, then polarity when known.
pub fn modifier_extensions(source: &NlpSource, polarity: Option<Polarity>) -> Vec<Extension> {
    let mut extensions = vec![source.as_extension()];
    extensions.extend(polarity.map(polarity_extension));
    extensions
}

/// `derivation-reference` extension for a mention span in `document`.
///
/// Offset and length are always present, including when zero.
pub fn derivation_extension(document: &Reference, span: Span) -> Extension {
    Extension::nested(
        DERIVATION_REFERENCE_URL,
        vec![
            Extension::reference(document.clone()),
            Extension::integer("offset", saturating_i64(span.begin())),
            Extension::integer("length", saturating_i64(span.len())),
        ],
    )
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_extension_shape() {
        let source = NlpSource::new("ctakes", "4.0.0");
        assert_eq!(
            serde_json::to_value(source.as_extension()).expect("serialize"),
            json!({
                "url": NLP_SOURCE_URL,
                "extension": [
                    {"url": "algorithm", "valueString": "ctakes"},
                    {"url": "version", "valueString": "4.0.0"},
                ],
            })
        );
    }

    #[test]
    fn derivation_reference_shape() {
        let document = Reference::document("ABCD").expect("valid id");
        let span = Span::new(20, 25).expect("span");
        assert_eq!(
            serde_json::to_value(derivation_extension(&document, span)).expect("serialize"),
            json!({
                "url": DERIVATION_REFERENCE_URL,
                "extension": [
                    {"url": "reference", "valueReference": {"reference": "DocumentReference/ABCD"}},
                    {"url": "offset", "valueInteger": 20},
                    {"url": "length", "valueInteger": 5},
                ],
            })
        );
    }

    #[test]
    fn derivation_keeps_zero_offset() {
        let document = Reference::document("ABCD").expect("valid id");
        let extension = derivation_extension(&document, Span::new(0, 0).expect("span"));
        let values: Vec<Option<i64>> = extension.extension.iter().map(|e| e.value_integer).collect();
        assert_eq!(values, vec![None, Some(0), Some(0)]);
    }

    #[test]
    fn modifier_extensions_skip_unknown_polarity() {
        let source = NlpSource::default();
        assert_eq!(modifier_extensions(&source, None).len(), 1);

        let negated = modifier_extensions(&source, Some(Polarity::Negated));
        assert_eq!(negated[1].url, NLP_POLARITY_URL);
        assert_eq!(negated[1].value_boolean, Some(false));
    }

    #[test]
    fn source_overrides_ignore_blank_values() {
        let source = NlpSource::from_env_values(Some("  ".into()), Some("9.9".into()));
        assert_eq!(source.algorithm, DEFAULT_ALGORITHM);
        assert_eq!(source.version, "9.9");
    }
}
