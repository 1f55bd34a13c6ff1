//! Terminology systems for UMLS source vocabularies.
//!
//! See <https://build.fhir.org/terminologies-systems.html>.

/// A UMLS source vocabulary with a known FHIR system URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vocab {
    SnomedCtUs,
    RxNorm,
    Loinc,
    Cpt,
    MedRt,
    NdfRt,
    Ndc,
    Cvx,
    Icd9,
    Icd10,
    Umls,
}

impl Vocab {
    /// Look up a vocabulary by its UMLS source abbreviation (SAB).
    ///
    /// Custom and unrecognized abbreviations return `None`.
    pub fn from_sab(sab: &str) -> Option<Self> {
        let vocab = match sab {
            "SNOMEDCT_US" => Self::SnomedCtUs,
            "RXNORM" => Self::RxNorm,
            // LNC is the UMLS abbreviation for LOINC.
            "LOINC" | "LNC" => Self::Loinc,
            "CPT" => Self::Cpt,
            "MEDRT" => Self::MedRt,
            "NDFRT" => Self::NdfRt,
            "NDC" => Self::Ndc,
            "CVX" => Self::Cvx,
            "ICD9" => Self::Icd9,
            "ICD10" => Self::Icd10,
            "UMLS" => Self::Umls,
            _ => return None,
        };
        Some(vocab)
    }

    /// FHIR `system` value for this vocabulary.
    pub fn url(&self) -> &'static str {
        match self {
            Self::SnomedCtUs => "http://snomed.info/sct",
            Self::RxNorm => "http://www.nlm.nih.gov/research/umls/rxnorm",
            Self::Loinc => "http://loinc.org",
            Self::Cpt => "http://www.ama-assn.org/go/cpt",
            Self::MedRt => "http://va.gov/terminology/medrt",
            Self::NdfRt => "http://hl7.org/fhir/ndfrt",
            Self::Ndc => "http://hl7.org/fhir/sid/ndc",
            Self::Cvx => "http://hl7.org/fhir/sid/cvx",
            Self::Icd9 => "ICD-9",
            Self::Icd10 => "ICD-10",
            Self::Umls => "http://terminology.hl7.org/CodeSystem/umls",
        }
    }
}

/// System URL for a SAB, or `None` when it is custom or unknown.
pub fn vocab_url(sab: &str) -> Option<&'static str> {
    Vocab::from_sab(sab).map(|v| v.url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_abbreviations_resolve() {
        assert_eq!(vocab_url("SNOMEDCT_US"), Some("http://snomed.info/sct"));
        assert_eq!(vocab_url("LNC"), vocab_url("LOINC"));
        assert_eq!(vocab_url("ICD10"), Some("ICD-10"));
        assert_eq!(
            Vocab::Umls.url(),
            "http://terminology.hl7.org/CodeSystem/umls"
        );
    }

    #[test]
    fn unknown_abbreviations_have_no_system() {
        assert_eq!(vocab_url("custom"), None);
        assert_eq!(vocab_url(""), None);
        assert_eq!(vocab_url("snomedct_us"), None);
    }
}
