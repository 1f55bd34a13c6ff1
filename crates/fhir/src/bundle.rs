//! `collection` Bundle wrapping a batch of projected resources.

use crate::resource::NlpResource;
use crate::FhirResult;
use nlp_uuid::ResourceId;
use serde::Serialize;

/// Bundle type; only `collection` is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Collection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    pub resource: NlpResource,
}

/// A FHIR Bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "resourceType", rename = "Bundle")]
pub struct Bundle {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: BundleType,
    pub total: usize,
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Wrap `resources` in a `collection` bundle with a fresh id, keeping their order.
    pub fn collection(resources: impl IntoIterator<Item = NlpResource>) -> Self {
        let entry: Vec<BundleEntry> = resources
            .into_iter()
            .map(|resource| BundleEntry { resource })
            .collect();
        Self {
            id: ResourceId::new(),
            kind: BundleType::Collection,
            total: entry.len(),
            entry,
        }
    }

    pub fn resources(&self) -> impl Iterator<Item = &NlpResource> {
        self.entry.iter().map(|e| &e.resource)
    }

    pub fn render_json(&self) -> FhirResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_yaml(&self) -> FhirResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
