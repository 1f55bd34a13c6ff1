//! Opaque identifiers for generated FHIR resources.
//!
//! Every resource projected from an NLP mention needs a logical id. Callers that track their
//! own ids may override it; everyone else gets a random RFC 4122 version 4 UUID in its
//! hyphenated form (for example `0f8fad5b-d9cb-469f-a165-70867728950e`), which is a valid FHIR
//! `id`.

mod resource_id;

pub use resource_id::{ResourceId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
