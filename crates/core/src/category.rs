//! Semantic categories of cTAKES annotations and their wire labels.

use crate::constants::{IDENTIFIED_ANNOTATION_LABEL, MENTION_SUFFIX};
use std::fmt;

/// Kind of clinical mention, grouped the way cTAKES groups UMLS semantic types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticCategory {
    DiseaseDisorder,
    SignSymptom,
    AnatomicalSite,
    Medication,
    Procedure,
    /// Hits from a custom dictionary, labelled `IdentifiedAnnotation` on the wire.
    CustomDict,
}

impl SemanticCategory {
    pub const ALL: [SemanticCategory; 6] = [
        Self::DiseaseDisorder,
        Self::SignSymptom,
        Self::AnatomicalSite,
        Self::Medication,
        Self::Procedure,
        Self::CustomDict,
    ];

    /// Translate a wire label (for example `SignSymptomMention`) into a category.
    ///
    /// Returns `None` for labels that do not name a known category, including bare names
    /// without the `Mention` suffix.
    pub fn from_wire(label: &str) -> Option<Self> {
        if label == IDENTIFIED_ANNOTATION_LABEL {
            return Some(Self::CustomDict);
        }

        match label.strip_suffix(MENTION_SUFFIX)? {
            "DiseaseDisorder" => Some(Self::DiseaseDisorder),
            "SignSymptom" => Some(Self::SignSymptom),
            "AnatomicalSite" => Some(Self::AnatomicalSite),
            "Medication" => Some(Self::Medication),
            "Procedure" => Some(Self::Procedure),
            _ => None,
        }
    }

    /// The label cTAKES uses for this category.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::DiseaseDisorder => "DiseaseDisorderMention",
            Self::SignSymptom => "SignSymptomMention",
            Self::AnatomicalSite => "AnatomicalSiteMention",
            Self::Medication => "MedicationMention",
            Self::Procedure => "ProcedureMention",
            Self::CustomDict => IDENTIFIED_ANNOTATION_LABEL,
        }
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
