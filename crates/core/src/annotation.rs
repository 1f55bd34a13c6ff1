//! The annotation index: every mention of one cTAKES response, grouped by category.
//!
//! Responsibilities:
//! - Parse the loosely-typed server JSON into [`Mention`]s, failing fast on malformed records
//! - Serialize back to the exact wire shape (round-trip law)
//! - Answer polarity/category filtered queries in a deterministic order
//!
//! Notes:
//! - Category order is the order the categories first appear in the response
//! - Mention order within a category is the order the server returned them in

use crate::category::SemanticCategory;
use crate::concept::Concept;
use crate::mention::{Mention, MentionWire};
use crate::{CoreError, CoreResult};
use nlp_types::{Polarity, Span};
use serde::Serialize;
use serde_json::{Map, Value};

/// Mentions of one response, keyed by semantic category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationIndex {
    groups: Vec<(SemanticCategory, Vec<Mention>)>,
}

impl AnnotationIndex {
    /// Parse a cTAKES REST response from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedAnnotation`] if the text is not a JSON object, a category
    /// label is unknown, or any mention record is malformed. One bad record fails the whole
    /// response; nothing is silently dropped.
    pub fn parse(json_text: &str) -> CoreResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let root: Map<String, Value> =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
                let path = err.path().to_string();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_owned()
                } else {
                    path
                };
                CoreError::malformed(path, err.into_inner().to_string())
            })?;
        deserializer
            .end()
            .map_err(|err| CoreError::malformed("<root>", err.to_string()))?;
        Self::from_map(root)
    }

    /// Parse an already-decoded response.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(CoreError::malformed(
                "<root>",
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    fn from_map(root: Map<String, Value>) -> CoreResult<Self> {
        let mut index = Self::default();

        for (label, records) in root {
            let category = SemanticCategory::from_wire(&label).ok_or_else(|| {
                CoreError::malformed(&label, format!("unrecognized category label '{label}'"))
            })?;

            let wires: Vec<MentionWire> =
                serde_path_to_error::deserialize(records).map_err(|err| {
                    let path = err.path().to_string();
                    CoreError::malformed(
                        format!("{label}{}", path_suffix(&path)),
                        err.into_inner().to_string(),
                    )
                })?;

            let mut mentions = Vec::with_capacity(wires.len());
            for (idx, wire) in wires.into_iter().enumerate() {
                let location = format!("{label}[{idx}]");
                let mention = Mention::from_wire(wire, &location)?;
                // Projection and regrouping key on the mention's own type.
                if mention.category() != category {
                    return Err(CoreError::malformed(
                        location,
                        format!(
                            "mention type '{}' does not match category '{label}'",
                            mention.category().as_wire()
                        ),
                    ));
                }
                mentions.push(mention);
            }
            index.push_group(category, mentions);
        }

        tracing::debug!(
            categories = index.groups.len(),
            mentions = index.len(),
            "parsed annotation response"
        );
        Ok(index)
    }

    fn push_group(&mut self, category: SemanticCategory, mentions: Vec<Mention>) {
        match self.groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => existing.extend(mentions),
            None => self.groups.push((category, mentions)),
        }
    }

    /// Build an index from mentions grouped by their own category, in first-seen order.
    pub fn from_mentions(mentions: impl IntoIterator<Item = Mention>) -> Self {
        let mut index = Self::default();
        for mention in mentions {
            let category = mention.category();
            index.push_group(category, vec![mention]);
        }
        index
    }

    /// Serialize to the cTAKES wire shape.
    pub fn as_json(&self) -> Value {
        let mut root = Map::new();
        for (category, mentions) in &self.groups {
            let records: Vec<Value> = mentions.iter().map(Mention::as_json).collect();
            root.insert(category.as_wire().to_owned(), Value::Array(records));
        }
        Value::Object(root)
    }

    /// Categories present in the index, in index order.
    pub fn categories(&self) -> impl Iterator<Item = SemanticCategory> + '_ {
        self.groups.iter().map(|(c, _)| *c)
    }

    /// Total number of mentions across all categories.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, m)| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every mention, optionally restricted to one polarity.
    pub fn all_mentions(&self, polarity: Option<Polarity>) -> Vec<&Mention> {
        self.select(None, polarity)
    }

    /// Mentions of one category, optionally restricted to one polarity.
    pub fn mentions_of(
        &self,
        category: SemanticCategory,
        polarity: Option<Polarity>,
    ) -> Vec<&Mention> {
        self.select(Some(category), polarity)
    }

    fn select(
        &self,
        category: Option<SemanticCategory>,
        polarity: Option<Polarity>,
    ) -> Vec<&Mention> {
        self.groups
            .iter()
            .filter(|(c, _)| category.map_or(true, |wanted| *c == wanted))
            .flat_map(|(_, mentions)| mentions.iter())
            .filter(|m| polarity.map_or(true, |wanted| m.polarity() == wanted))
            .collect()
    }

    /// Concepts of every selected mention, concatenated.
    pub fn all_concepts(&self, polarity: Option<Polarity>) -> Vec<&Concept> {
        self.all_mentions(polarity)
            .into_iter()
            .flat_map(|m| m.concepts().iter())
            .collect()
    }

    /// CUIs of every selected concept.
    pub fn concept_ids(&self, polarity: Option<Polarity>) -> Vec<Option<&str>> {
        self.all_concepts(polarity)
            .into_iter()
            .map(|c| c.concept_id.as_deref())
            .collect()
    }

    /// TUIs of every selected concept.
    pub fn type_ids(&self, polarity: Option<Polarity>) -> Vec<Option<&str>> {
        self.all_concepts(polarity)
            .into_iter()
            .map(|c| c.type_id.as_deref())
            .collect()
    }

    /// Vocabulary codes of every selected concept.
    pub fn vocab_codes(&self, polarity: Option<Polarity>) -> Vec<Option<&str>> {
        self.all_concepts(polarity)
            .into_iter()
            .map(|c| c.vocab_code.as_deref())
            .collect()
    }

    /// Text of every selected mention.
    pub fn texts(&self, polarity: Option<Polarity>) -> Vec<&str> {
        self.all_mentions(polarity)
            .into_iter()
            .map(Mention::text)
            .collect()
    }

    /// Span of every selected mention.
    pub fn spans(&self, polarity: Option<Polarity>) -> Vec<Span> {
        self.all_mentions(polarity)
            .into_iter()
            .map(Mention::span)
            .collect()
    }

    /// Rebuild the index with every mention passed through `f`, keeping all ordering.
    pub(crate) fn try_map_mentions<F>(self, mut f: F) -> CoreResult<Self>
    where
        F: FnMut(Mention) -> CoreResult<Mention>,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for (category, mentions) in self.groups {
            let mapped = mentions
                .into_iter()
                .map(&mut f)
                .collect::<CoreResult<Vec<_>>>()?;
            groups.push((category, mapped));
        }
        Ok(Self { groups })
    }
}

impl Serialize for AnnotationIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_json().serialize(serializer)
    }
}

fn path_suffix(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else if path.starts_with('[') {
        path.to_owned()
    } else {
        format!(".{path}")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
