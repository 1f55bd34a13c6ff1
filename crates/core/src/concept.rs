//! UMLS concepts attached to a mention.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A coded UMLS reference.
///
/// - `concept_id`: CUI, the Concept Unique Identifier
/// - `type_id`: TUI, the semantic Type Unique Identifier
/// - `source_vocab`: SAB, the source vocabulary abbreviation (`codingScheme` on the wire)
/// - `vocab_code`: the code within that vocabulary
///
/// Every field is optional because the server omits whatever it does not know.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    #[serde(rename = "code", default)]
    pub vocab_code: Option<String>,

    #[serde(rename = "cui", default)]
    pub concept_id: Option<String>,

    #[serde(rename = "codingScheme", default)]
    pub source_vocab: Option<String>,

    #[serde(rename = "tui", default)]
    pub type_id: Option<String>,
}

impl Concept {
    pub fn new(
        concept_id: Option<String>,
        type_id: Option<String>,
        source_vocab: Option<String>,
        vocab_code: Option<String>,
    ) -> Self {
        Self {
            vocab_code,
            concept_id,
            source_vocab,
            type_id,
        }
    }

    /// Wire form with every key present; absent fields become `null`.
    pub fn as_json(&self) -> Value {
        json!({
            "code": self.vocab_code,
            "cui": self.concept_id,
            "codingScheme": self.source_vocab,
            "tui": self.type_id,
        })
    }

    /// Structural sort key: the four fields as a 4-space indented JSON object in the fixed
    /// order `code, cui, codingScheme, tui`. Strings are ASCII-only: anything outside
    /// printable ASCII is written as `\uXXXX` UTF-16 escapes.
    pub fn canonical_key(&self) -> String {
        fn field(value: &Option<String>) -> String {
            match value {
                Some(s) => ascii_escape(&Value::String(s.clone()).to_string()),
                None => Value::Null.to_string(),
            }
        }

        format!(
            "{{\n    \"code\": {},\n    \"cui\": {},\n    \"codingScheme\": {},\n    \"tui\": {}\n}}",
            field(&self.vocab_code),
            field(&self.concept_id),
            field(&self.source_vocab),
            field(&self.type_id),
        )
    }
}

/// Rewrite every char of serialized JSON outside `' '..='~'` as lowercase `\uXXXX` escapes.
fn ascii_escape(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if (' '..='~').contains(&c) {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units).iter() {
            out.push_str(&format!("\\u{unit:04x}"));
        }
    }
    out
}

/// Sort concepts into canonical order.
///
/// The server does not return concepts in a stable order, so two otherwise identical responses
/// may list them differently. Sorting by [`Concept::canonical_key`] makes any permutation of
/// the same multiset come out identical.
pub fn sort_concepts(mut concepts: Vec<Concept>) -> Vec<Concept> {
    concepts.sort_by_cached_key(Concept::canonical_key);
    concepts
}
