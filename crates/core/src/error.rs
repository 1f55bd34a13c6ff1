use nlp_types::Span;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("malformed annotation at {location}: {reason}")]
    MalformedAnnotation { location: String, reason: String },

    #[error(
        "reconciled span {span} does not match document text: expected {expected:?}, found {actual:?}"
    )]
    ReconciliationMismatch {
        span: Span,
        expected: String,
        actual: String,
    },

    #[error("span count mismatch: {spans} spans but {statuses} statuses")]
    SpanCountMismatch { spans: usize, statuses: usize },

    #[error("{model} model returned unknown status {status}")]
    UnknownStatus { model: &'static str, status: i64 },

    #[error("offset {offset} cannot be reconciled: {reason}")]
    InvalidOffset { offset: usize, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAnnotation {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
