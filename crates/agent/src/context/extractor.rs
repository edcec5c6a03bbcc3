//! Entity extraction: find the doctor a message is about.
//!
//! Two greedy passes, first hit wins:
//!
//! 1. a doctor named in the message (any name token, case-insensitive);
//! 2. a specialty keyword, scanned in [`SPECIALTY_KEYWORDS`] order, resolved
//!    to the first doctor with that specialty.
//!
//! A message naming two specialties resolves to whichever keyword comes
//! first in the table, not first in the message.

use carebot_knowledge::{Doctor, DoctorMatch, KnowledgeBase, Specialty};
use serde::Serialize;
use tracing::debug;

/// Keyword → specialty table, scanned in declaration order.
pub const SPECIALTY_KEYWORDS: &[(&str, Specialty)] = &[
    ("penyakit dalam", Specialty::PenyakitDalam),
    ("anak", Specialty::Anak),
    ("jantung", Specialty::JantungDanPembuluhDarah),
    ("kandungan", Specialty::KandunganDanKebidanan),
    ("kebidanan", Specialty::KandunganDanKebidanan),
    ("bedah", Specialty::BedahUmum),
    ("kulit", Specialty::KulitDanKelamin),
    ("kelamin", Specialty::KulitDanKelamin),
    ("saraf", Specialty::Saraf),
    ("mata", Specialty::Mata),
];

/// How a context was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Name,
    Keyword(&'static str),
}

/// Doctor and facility details relevant to the current message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedContext {
    pub doctor: Doctor,
    pub facility: String,
    pub facility_address: String,
    pub facility_phone: String,
    pub matched_by: MatchSource,
}

impl ExtractedContext {
    fn from_match(m: DoctorMatch<'_>, matched_by: MatchSource) -> Self {
        Self {
            doctor: m.doctor.clone(),
            facility: m.facility.name.clone(),
            facility_address: m.facility.address.clone(),
            facility_phone: m.facility.phone.clone(),
            matched_by,
        }
    }
}

pub struct EntityExtractor<'a> {
    knowledge: &'a KnowledgeBase,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(knowledge: &'a KnowledgeBase) -> Self {
        Self { knowledge }
    }

    /// Extract doctor context from `query`. `None` is a normal outcome.
    pub fn extract(&self, query: &str) -> Option<ExtractedContext> {
        if let Some(m) = self.knowledge.find_doctor_by_name(query) {
            return Some(ExtractedContext::from_match(m, MatchSource::Name));
        }

        let lowered = query.to_lowercase();
        for &(keyword, specialty) in SPECIALTY_KEYWORDS {
            if !lowered.contains(keyword) {
                continue;
            }
            if let Some(m) = self.knowledge.find_doctor_by_specialty(specialty) {
                debug!(keyword, specialty = %specialty, doctor = %m.doctor.name, "Doctor matched by specialty keyword");
                return Some(ExtractedContext::from_match(m, MatchSource::Keyword(keyword)));
            }
        }

        None
    }
}
