//! FHIR resource wire models produced from NLP mentions.
//!
//! Responsibilities:
//! - Define strict wire structs for the four projected resource types
//! - Tag them with `resourceType` through [`NlpResource`]
//! - Parse resources back with path-reporting schema errors, and render them as JSON or YAML
//!
//! Notes:
//! - Unknown keys are rejected on parse (`deny_unknown_fields`)
//! - Field order on output follows FHIR convention: id, extensions, then resource content

use crate::datatypes::{CodeableConcept, Reference};
use crate::extension::Extension;
use crate::{FhirError, FhirResult};
use nlp_uuid::ResourceId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Status codes
// ============================================================================

/// `Observation.status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Corrected,
    Cancelled,
    EnteredInError,
    Unknown,
}

/// `MedicationStatement.status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationStatementStatus {
    Active,
    Completed,
    EnteredInError,
    Intended,
    Stopped,
    OnHold,
    Unknown,
    NotTaken,
}

/// `Procedure.status` (FHIR event status).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Preparation,
    InProgress,
    NotDone,
    OnHold,
    Stopped,
    Completed,
    EnteredInError,
    Unknown,
}

// ============================================================================
// Resources
// ============================================================================

/// A clinical condition, problem or diagnosis (cTAKES `DiseaseDisorderMention`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Condition {
    pub id: ResourceId,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub verification_status: CodeableConcept,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub encounter: Reference,
}

/// A measurement or finding (cTAKES `SignSymptomMention`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Observation {
    pub id: ResourceId,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub status: ObservationStatus,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub encounter: Reference,
}

/// A medication being consumed by the patient (cTAKES `MedicationMention`).
///
/// R4 names the encounter link `context`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MedicationStatement {
    pub id: ResourceId,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub status: MedicationStatementStatus,
    pub medication_codeable_concept: CodeableConcept,
    pub subject: Reference,
    pub context: Reference,
}

/// An action performed on the patient (cTAKES `ProcedureMention`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Procedure {
    pub id: ResourceId,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub status: EventStatus,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub encounter: Reference,
}

/// Any resource the projector can produce, tagged by `resourceType`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "resourceType")]
pub enum NlpResource {
    Condition(Condition),
    Observation(Observation),
    MedicationStatement(MedicationStatement),
    Procedure(Procedure),
}

impl From<Condition> for NlpResource {
    fn from(value: Condition) -> Self {
        Self::Condition(value)
    }
}

impl From<Observation> for NlpResource {
    fn from(value: Observation) -> Self {
        Self::Observation(value)
    }
}

impl From<MedicationStatement> for NlpResource {
    fn from(value: MedicationStatement) -> Self {
        Self::MedicationStatement(value)
    }
}

impl From<Procedure> for NlpResource {
    fn from(value: Procedure) -> Self {
        Self::Procedure(value)
    }
}

impl NlpResource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Condition(_) => "Condition",
            Self::Observation(_) => "Observation",
            Self::MedicationStatement(_) => "MedicationStatement",
            Self::Procedure(_) => "Procedure",
        }
    }

    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Condition(r) => &r.id,
            Self::Observation(r) => &r.id,
            Self::MedicationStatement(r) => &r.id,
            Self::Procedure(r) => &r.id,
        }
    }

    /// Replace the generated id with a caller-chosen one.
    pub fn set_id(&mut self, id: ResourceId) {
        match self {
            Self::Condition(r) => r.id = id,
            Self::Observation(r) => r.id = id,
            Self::MedicationStatement(r) => r.id = id,
            Self::Procedure(r) => r.id = id,
        }
    }

    /// Parse a resource from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface the path to the failing field (e.g.
    /// `code.coding[0].system`) when the JSON does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON,
    /// - `resourceType` is missing or not one of the projected types,
    /// - any field has an unexpected type or any unknown key is present.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(value)
    }

    /// Same as [`NlpResource::parse`], for an already-decoded value.
    pub fn from_value(value: Value) -> FhirResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(FhirError::Translation(
                "FHIR resource must be a JSON object".into(),
            ));
        };
        let resource_type = match map.remove("resourceType") {
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(FhirError::Translation(
                    "resourceType must be a string".into(),
                ))
            }
            None => return Err(FhirError::Translation("missing resourceType".into())),
        };
        let body = Value::Object(map);

        let resource = match resource_type.as_str() {
            "Condition" => Self::Condition(from_body(&resource_type, body)?),
            "Observation" => Self::Observation(from_body(&resource_type, body)?),
            "MedicationStatement" => Self::MedicationStatement(from_body(&resource_type, body)?),
            "Procedure" => Self::Procedure(from_body(&resource_type, body)?),
            other => {
                return Err(FhirError::InvalidInput(format!(
                    "unsupported resourceType '{other}'"
                )))
            }
        };
        Ok(resource)
    }

    pub fn as_json(&self) -> FhirResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn render_json(&self) -> FhirResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_yaml(&self) -> FhirResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn from_body<T: DeserializeOwned>(resource_type: &str, body: Value) -> FhirResult<T> {
    serde_path_to_error::deserialize(body).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path.as_str()
        };
        FhirError::Translation(format!(
            "{resource_type} schema mismatch at {path}: {source}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Coding;

    fn procedure() -> Procedure {
        Procedure {
            id: ResourceId::parse("proc-1").expect("valid id"),
            extension: vec![],
            modifier_extension: vec![Extension::boolean("polarity", true)],
            status: EventStatus::Unknown,
            code: CodeableConcept {
                coding: vec![Coding::new(Some("http://www.ama-assn.org/go/cpt"), Some("99213"))],
                text: Some("office visit".into()),
            },
            subject: Reference::patient("1234").expect("valid id"),
            encounter: Reference::encounter("5678").expect("valid id"),
        }
    }

    #[test]
    fn resource_type_is_the_first_key() {
        let resource = NlpResource::from(procedure());
        let rendered = serde_json::to_string(&resource).expect("serialize");
        assert!(rendered.starts_with(r#"{"resourceType":"Procedure","id":"proc-1""#));
        assert!(rendered.contains(r#""status":"unknown""#));
    }

    #[test]
    fn round_trips_json_text() {
        let resource = NlpResource::from(procedure());
        let rendered = resource.render_json().expect("render");
        let reparsed = NlpResource::parse(&rendered).expect("reparse");
        assert_eq!(resource, reparsed);
    }

    #[test]
    fn renders_yaml() {
        let yaml = NlpResource::from(procedure()).render_yaml().expect("render");
        assert!(yaml.starts_with("resourceType: Procedure\n"));
        assert!(yaml.contains("reference: Patient/1234"));
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let mut value = NlpResource::from(procedure()).as_json().expect("json");
        value["unexpected_key"] = Value::Bool(true);

        let err = NlpResource::from_value(value).expect_err("should reject unknown key");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("unexpected_key")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn schema_errors_report_the_path() {
        let mut value = NlpResource::from(procedure()).as_json().expect("json");
        value["code"]["coding"][0]["system"] = Value::from(7);

        let err = NlpResource::from_value(value).expect_err("system must be a string");
        match err {
            FhirError::Translation(msg) => {
                assert!(msg.contains("Procedure schema mismatch at code.coding[0].system"))
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unsupported_resource_types() {
        let err = NlpResource::parse(r#"{"resourceType": "Patient", "id": "p1"}"#)
            .expect_err("Patient is not projected");
        assert!(matches!(err, FhirError::InvalidInput(_)));

        let err = NlpResource::parse(r#"{"id": "p1"}"#).expect_err("no resourceType");
        assert!(matches!(err, FhirError::Translation(_)));

        let err = NlpResource::parse("not json").expect_err("not json");
        assert!(matches!(err, FhirError::Json(_)));
    }

    #[test]
    fn rejects_invalid_ids() {
        let mut value = NlpResource::from(procedure()).as_json().expect("json");
        value["id"] = Value::from("has spaces");
        let err = NlpResource::from_value(value).expect_err("invalid id syntax");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("id")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn set_id_overrides_generated_id() {
        let mut resource = NlpResource::from(procedure());
        resource.set_id(ResourceId::parse("override").expect("valid id"));
        assert_eq!(resource.id().as_str(), "override");
        assert_eq!(resource.resource_type(), "Procedure");
    }
}
