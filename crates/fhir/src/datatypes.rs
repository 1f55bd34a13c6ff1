//! FHIR general-purpose datatypes used by the projected resources.

use crate::{FhirError, FhirResult};
use nlp_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A code defined by a terminology system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Coding {
    pub fn new(system: Option<&str>, code: Option<&str>) -> Self {
        Self {
            system: system.map(str::to_owned),
            code: code.map(str::to_owned),
        }
    }
}

/// A set of codings plus the text they were derived from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A literal `Type/id` reference to another resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Reference `resource_type/id`.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if `id` is empty or whitespace.
    pub fn to(resource_type: &str, id: &str) -> FhirResult<Self> {
        let id = NonEmptyText::new(id).map_err(|_| {
            FhirError::InvalidInput(format!("missing {resource_type} id"))
        })?;
        Ok(Self {
            reference: format!("{resource_type}/{id}"),
        })
    }

    pub fn patient(id: &str) -> FhirResult<Self> {
        Self::to("Patient", id)
    }

    pub fn encounter(id: &str) -> FhirResult<Self> {
        Self::to("Encounter", id)
    }

    pub fn document(id: &str) -> FhirResult<Self> {
        Self::to("DocumentReference", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_renders_type_and_id() {
        let reference = Reference::patient("1234").expect("valid id");
        assert_eq!(reference.reference, "Patient/1234");
        assert_eq!(
            Reference::document("ABCD").expect("valid id").reference,
            "DocumentReference/ABCD"
        );
    }

    #[test]
    fn reference_rejects_blank_id() {
        let err = Reference::encounter("  ").expect_err("blank id");
        match err {
            FhirError::InvalidInput(msg) => assert!(msg.contains("Encounter")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn coding_omits_absent_system() {
        let coding = Coding::new(None, Some("foobar"));
        assert_eq!(
            serde_json::to_string(&coding).expect("serialize"),
            r#"{"code":"foobar"}"#
        );
    }
}
