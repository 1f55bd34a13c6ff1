//! Projection of annotation mentions onto FHIR resources.
//!
//! A [`FhirProjector`] is bound to one patient, encounter and source document. Each mention
//! becomes one resource with a random id, the mention's concepts as a `CodeableConcept`, and
//! NLP provenance extensions.
//!
//! Category mapping:
//! - `SignSymptom` → `Observation` (`preliminary`)
//! - `DiseaseDisorder` → `Condition` (verification status `unconfirmed`)
//! - `Medication` → `MedicationStatement` (`unknown`)
//! - `Procedure` → `Procedure` (`unknown`)
//! - `AnatomicalSite` and `CustomDict` have no resource mapping

use crate::datatypes::{CodeableConcept, Coding, Reference};
use crate::extension::{derivation_extension, modifier_extensions, Extension, NlpSource};
use crate::resource::{
    Condition, EventStatus, MedicationStatement, MedicationStatementStatus, NlpResource,
    Observation, ObservationStatus, Procedure,
};
use crate::vocab::{vocab_url, Vocab};
use crate::FhirResult;
use ctakes_core::{AnnotationIndex, Mention, SemanticCategory};
use nlp_types::Polarity;
use nlp_uuid::ResourceId;

const CONDITION_VER_STATUS_URL: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";

/// Order in which bulk projection walks the categories.
const PROJECTION_ORDER: [SemanticCategory; 4] = [
    SemanticCategory::SignSymptom,
    SemanticCategory::Medication,
    SemanticCategory::DiseaseDisorder,
    SemanticCategory::Procedure,
];

/// Builds FHIR resources for mentions of one document.
#[derive(Clone, Debug)]
pub struct FhirProjector {
    subject: Reference,
    encounter: Reference,
    document: Reference,
    source: NlpSource,
}

impl FhirProjector {
    /// Bind a projector to a patient, encounter and `DocumentReference`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::InvalidInput`] if any id is empty or whitespace.
    pub fn new(subject_id: &str, encounter_id: &str, docref_id: &str) -> FhirResult<Self> {
        Ok(Self {
            subject: Reference::patient(subject_id)?,
            encounter: Reference::encounter(encounter_id)?,
            document: Reference::document(docref_id)?,
            source: NlpSource::default(),
        })
    }

    /// Record a different NLP engine in the `nlp-source` extension.
    pub fn with_source(mut self, source: NlpSource) -> Self {
        self.source = source;
        self
    }

    pub fn source(&self) -> &NlpSource {
        &self.source
    }

    /// The mention's concepts as codings, with the mention text as display text.
    ///
    /// Each concept contributes its source-vocabulary code followed by its UMLS CUI. A code
    /// from an unknown vocabulary is kept without a `system`.
    pub fn concept(mention: &Mention) -> CodeableConcept {
        let mut coding = Vec::with_capacity(mention.concepts().len() * 2);
        for concept in mention.concepts() {
            let system = concept.source_vocab.as_deref().and_then(vocab_url);
            coding.push(Coding::new(system, concept.vocab_code.as_deref()));
            coding.push(Coding::new(
                Some(Vocab::Umls.url()),
                concept.concept_id.as_deref(),
            ));
        }
        CodeableConcept {
            coding,
            text: Some(mention.text().to_owned()),
        }
    }

    fn provenance(&self, mention: &Mention) -> (Vec<Extension>, Vec<Extension>) {
        let extension = vec![derivation_extension(&self.document, mention.span())];
        let modifier = modifier_extensions(&self.source, Some(mention.polarity()));
        (extension, modifier)
    }

    pub fn condition(&self, mention: &Mention) -> Condition {
        let (extension, modifier_extension) = self.provenance(mention);
        Condition {
            id: ResourceId::new(),
            extension,
            modifier_extension,
            verification_status: CodeableConcept {
                coding: vec![Coding::new(
                    Some(CONDITION_VER_STATUS_URL),
                    Some("unconfirmed"),
                )],
                text: Some("Unconfirmed".into()),
            },
            code: Self::concept(mention),
            subject: self.subject.clone(),
            encounter: self.encounter.clone(),
        }
    }

    pub fn observation(&self, mention: &Mention) -> Observation {
        let (extension, modifier_extension) = self.provenance(mention);
        Observation {
            id: ResourceId::new(),
            extension,
            modifier_extension,
            status: ObservationStatus::Preliminary,
            code: Self::concept(mention),
            subject: self.subject.clone(),
            encounter: self.encounter.clone(),
        }
    }

    pub fn medication(&self, mention: &Mention) -> MedicationStatement {
        let (extension, modifier_extension) = self.provenance(mention);
        MedicationStatement {
            id: ResourceId::new(),
            extension,
            modifier_extension,
            status: MedicationStatementStatus::Unknown,
            medication_codeable_concept: Self::concept(mention),
            subject: self.subject.clone(),
            context: self.encounter.clone(),
        }
    }

    pub fn procedure(&self, mention: &Mention) -> Procedure {
        let (extension, modifier_extension) = self.provenance(mention);
        Procedure {
            id: ResourceId::new(),
            extension,
            modifier_extension,
            status: EventStatus::Unknown,
            code: Self::concept(mention),
            subject: self.subject.clone(),
            encounter: self.encounter.clone(),
        }
    }

    /// Resource for a mention according to its category; `None` if the category has no mapping.
    pub fn project(&self, mention: &Mention) -> Option<NlpResource> {
        let resource: NlpResource = match mention.category() {
            SemanticCategory::SignSymptom => self.observation(mention).into(),
            SemanticCategory::Medication => self.medication(mention).into(),
            SemanticCategory::DiseaseDisorder => self.condition(mention).into(),
            SemanticCategory::Procedure => self.procedure(mention).into(),
            SemanticCategory::AnatomicalSite | SemanticCategory::CustomDict => return None,
        };
        Some(resource)
    }

    /// Every positive mention of `index` that maps to a resource.
    pub fn project_index(&self, index: &AnnotationIndex) -> Vec<NlpResource> {
        self.project_index_with(index, Some(Polarity::Positive))
    }

    /// Every mention of `index` with the given polarity (`None` for both) that maps to a
    /// resource, in the order SignSymptom, Medication, DiseaseDisorder, Procedure.
    pub fn project_index_with(
        &self,
        index: &AnnotationIndex,
        polarity: Option<Polarity>,
    ) -> Vec<NlpResource> {
        let resources: Vec<NlpResource> = PROJECTION_ORDER
            .iter()
            .flat_map(|&category| index.mentions_of(category, polarity))
            .filter_map(|mention| self.project(mention))
            .collect();
        tracing::debug!(
            resources = resources.len(),
            polarity = polarity.map(|p| p.as_str()).unwrap_or("any"),
            "projected annotation index"
        );
        resources
    }
}
