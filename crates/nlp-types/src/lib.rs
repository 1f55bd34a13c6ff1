//! Value primitives shared by the annotation model and the FHIR projector.
//!
//! - [`NonEmptyText`] for identifiers that must carry content (resource ids)
//! - [`Span`] for half-open character ranges into a source document
//! - [`Polarity`] and [`PolarityEncoding`] for NLP negation status and its integer wire forms

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Errors raised when constructing a [`Span`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    /// `end` was smaller than `begin`.
    #[error("span end {end} precedes begin {begin}")]
    Inverted { begin: usize, end: usize },
}

/// Half-open character range `[begin, end)` into a source document.
///
/// Which indexing scheme the offsets use (UTF-16 code units or scalar characters) depends on
/// whether the owning annotation has been reconciled against its document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "SpanWire")]
pub struct Span {
    begin: usize,
    end: usize,
}

#[derive(serde::Deserialize)]
struct SpanWire {
    begin: usize,
    end: usize,
}

impl TryFrom<SpanWire> for Span {
    type Error = SpanError;

    fn try_from(wire: SpanWire) -> Result<Self, Self::Error> {
        Span::new(wire.begin, wire.end)
    }
}

impl Span {
    /// Creates a span, rejecting `end < begin`.
    pub fn new(begin: usize, end: usize) -> Result<Self, SpanError> {
        if end < begin {
            return Err(SpanError::Inverted { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of index units covered by the span.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The span as a `(begin, end)` pair.
    pub fn key(&self) -> (usize, usize) {
        (self.begin, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.begin, self.end)
    }
}

// ============================================================================
// Polarity
// ============================================================================

/// Whether a mention is asserted or negated ("patient denies cough").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negated,
}

impl Polarity {
    /// Decodes the cTAKES integer form (`0` positive, `-1` negated).
    pub fn from_wire(value: i64) -> Option<Self> {
        PolarityEncoding::CTAKES.decode(value)
    }

    /// Encodes to the cTAKES integer form.
    pub fn to_wire(self) -> i64 {
        PolarityEncoding::CTAKES.encode(self)
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negated => "negated",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Polarity`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown polarity: {0}")]
pub struct ParsePolarityError(pub String);

impl FromStr for Polarity {
    type Err = ParsePolarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(Self::Positive),
            "negated" | "neg" => Ok(Self::Negated),
            _ => Err(ParsePolarityError(s.to_owned())),
        }
    }
}

/// Integer encoding of [`Polarity`] used by one upstream service.
///
/// Upstream services disagree on the sign convention, so every integration carries its own
/// table instead of assuming a universal one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolarityEncoding {
    positive: i64,
    negated: i64,
}

impl PolarityEncoding {
    /// cTAKES REST annotations: `0` positive, `-1` negated.
    pub const CTAKES: Self = Self::new(0, -1);

    pub const fn new(positive: i64, negated: i64) -> Self {
        Self { positive, negated }
    }

    /// Returns `None` for values outside the table.
    pub fn decode(&self, value: i64) -> Option<Polarity> {
        if value == self.positive {
            Some(Polarity::Positive)
        } else if value == self.negated {
            Some(Polarity::Negated)
        } else {
            None
        }
    }

    pub fn encode(&self, polarity: Polarity) -> i64 {
        match polarity {
            Polarity::Positive => self.positive,
            Polarity::Negated => self.negated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  1234 ").expect("should accept content");
        assert_eq!(text.as_str(), "1234");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn span_rejects_inverted_range() {
        let err = Span::new(10, 4).expect_err("end before begin");
        assert_eq!(err, SpanError::Inverted { begin: 10, end: 4 });

        let span = Span::new(4, 10).expect("valid span");
        assert_eq!(span.len(), 6);
        assert_eq!(span.key(), (4, 10));
        assert!(Span::new(3, 3).expect("empty span").is_empty());
    }

    #[test]
    fn span_deserialize_enforces_invariant() {
        let ok: Span = serde_json::from_str(r#"{"begin": 1, "end": 2}"#).expect("valid");
        assert_eq!(ok.key(), (1, 2));

        let err = serde_json::from_str::<Span>(r#"{"begin": 5, "end": 2}"#)
            .expect_err("inverted span must fail");
        assert!(err.to_string().contains("precedes"));
    }

    #[test]
    fn ctakes_polarity_encoding_is_zero_and_minus_one() {
        assert_eq!(Polarity::from_wire(0), Some(Polarity::Positive));
        assert_eq!(Polarity::from_wire(-1), Some(Polarity::Negated));
        assert_eq!(Polarity::from_wire(1), None);
        assert_eq!(Polarity::Positive.to_wire(), 0);
        assert_eq!(Polarity::Negated.to_wire(), -1);
    }

    #[test]
    fn custom_encoding_tables_are_independent() {
        let negation_model = PolarityEncoding::new(-1, 1);
        assert_eq!(negation_model.decode(-1), Some(Polarity::Positive));
        assert_eq!(negation_model.decode(1), Some(Polarity::Negated));
        assert_eq!(negation_model.decode(0), None);
        assert_eq!(negation_model.encode(Polarity::Negated), 1);
    }

    #[test]
    fn polarity_parses_from_text() {
        assert_eq!("positive".parse::<Polarity>(), Ok(Polarity::Positive));
        assert_eq!("NEG".parse::<Polarity>(), Ok(Polarity::Negated));
        assert!("maybe".parse::<Polarity>().is_err());
    }
}
