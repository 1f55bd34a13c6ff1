//! FHIR projection of cTAKES annotations.
//!
//! This crate provides **wire models** and **translation helpers** that turn reconciled
//! [`ctakes_core::Mention`]s into FHIR R4 resources:
//! - `Condition`, `Observation`, `MedicationStatement` and `Procedure` resources
//! - NLP provenance extensions (`nlp-source`, `nlp-polarity`, `derivation-reference`)
//! - A `collection` [`Bundle`] for bulk output
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR REST transport)
//! - serialisation/deserialisation as JSON or YAML
//! - translation between annotation primitives and wire structs

pub mod bundle;
pub mod datatypes;
pub mod extension;
pub mod projector;
pub mod resource;
pub mod vocab;

// Re-export facades
pub use bundle::Bundle;
pub use projector::FhirProjector;
pub use resource::NlpResource;

// Re-export public wire types
pub use datatypes::{CodeableConcept, Coding, Reference};
pub use extension::{Extension, NlpSource};
pub use resource::{
    Condition, EventStatus, MedicationStatement, MedicationStatementStatus, Observation,
    ObservationStatus, Procedure,
};
pub use vocab::Vocab;

pub use nlp_uuid::ResourceId;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
