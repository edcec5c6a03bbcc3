//! The read-only knowledge base and its loader.
//!
//! Lookups are plain case-insensitive substring matches in catalog order.
//! There is no ranking: the first facility-then-doctor hit wins.

use crate::model::{Doctor, Facility, Specialty};
use carebot_core::error::KnowledgeError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const BUNDLED_CATALOG: &str = include_str!("../data/default_catalog.toml");

/// A doctor together with the facility that lists them.
#[derive(Debug, Clone, Copy)]
pub struct DoctorMatch<'a> {
    pub facility: &'a Facility,
    pub doctor: &'a Doctor,
}

/// On-disk catalog layout.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    facilities: Vec<Facility>,
}

/// In-memory catalog of facilities, doctors and schedules.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    facilities: Vec<Facility>,
}

impl KnowledgeBase {
    /// Build a knowledge base from already-constructed facilities.
    pub fn new(facilities: Vec<Facility>) -> Result<Self, KnowledgeError> {
        validate(&facilities)?;
        Ok(Self { facilities })
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_toml_str(BUNDLED_CATALOG)
    }

    /// Parse and validate a TOML catalog.
    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| KnowledgeError::Parse(e.to_string()))?;
        Self::new(file.facilities)
    }

    /// Load a TOML catalog from disk.
    pub fn load_from(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let kb = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            facilities = kb.facilities.len(),
            doctors = kb.doctor_count(),
            "Loaded knowledge catalog"
        );
        Ok(kb)
    }

    /// All facilities in insertion order.
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Exact-name facility lookup.
    pub fn facility(&self, name: &str) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.name == name)
    }

    pub fn doctor_count(&self) -> usize {
        self.facilities.iter().map(|f| f.doctors.len()).sum()
    }

    fn doctors(&self) -> impl Iterator<Item = DoctorMatch<'_>> {
        self.facilities.iter().flat_map(|facility| {
            facility
                .doctors
                .iter()
                .map(move |doctor| DoctorMatch { facility, doctor })
        })
    }

    /// Find the first doctor any of whose name tokens occurs in `query`.
    ///
    /// Tokens are the whitespace-separated pieces of the full name, so
    /// honorifics such as "Dr." count too.
    pub fn find_doctor_by_name(&self, query: &str) -> Option<DoctorMatch<'_>> {
        let query = query.to_lowercase();
        let hit = self.doctors().find(|m| {
            m.doctor
                .name
                .to_lowercase()
                .split_whitespace()
                .any(|token| query.contains(token))
        });
        if let Some(m) = &hit {
            debug!(doctor = %m.doctor.name, facility = %m.facility.name, "Doctor matched by name");
        }
        hit
    }

    /// First doctor with `specialty`, whether or not they are available.
    pub fn find_doctor_by_specialty(&self, specialty: Specialty) -> Option<DoctorMatch<'_>> {
        self.doctors().find(|m| m.doctor.specialty == specialty)
    }

    /// Facility directory rendered for the prompt. Deterministic.
    pub fn render_summary(&self) -> String {
        self.facilities
            .iter()
            .map(|facility| {
                let mut out = format!(
                    "{}:\n  Alamat: {}\n  Telepon: {}\n  Dokter:\n",
                    facility.name, facility.address, facility.phone
                );
                for doctor in &facility.doctors {
                    out.push_str(&format!(
                        "    - {} ({})\n      Jadwal: {}\n",
                        doctor.name,
                        doctor.specialty,
                        doctor.schedule_line()
                    ));
                }
                out
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn validate(facilities: &[Facility]) -> Result<(), KnowledgeError> {
    if facilities.is_empty() {
        return Err(KnowledgeError::Validation(
            "catalog must contain at least one facility".into(),
        ));
    }

    let mut facility_names = HashSet::new();
    for facility in facilities {
        for (field, value) in [
            ("name", &facility.name),
            ("address", &facility.address),
            ("phone", &facility.phone),
        ] {
            if value.trim().is_empty() {
                return Err(KnowledgeError::Validation(format!(
                    "facility '{}' has an empty {field}",
                    facility.name
                )));
            }
        }

        if !facility_names.insert(facility.name.as_str()) {
            return Err(KnowledgeError::Validation(format!(
                "duplicate facility '{}'",
                facility.name
            )));
        }

        let mut doctor_names = HashSet::new();
        for doctor in &facility.doctors {
            if doctor.name.trim().is_empty() {
                return Err(KnowledgeError::Validation(format!(
                    "facility '{}' lists a doctor with an empty name",
                    facility.name
                )));
            }
            if !doctor_names.insert(doctor.name.as_str()) {
                return Err(KnowledgeError::Validation(format!(
                    "duplicate doctor '{}' in facility '{}'",
                    doctor.name, facility.name
                )));
            }
        }
    }

    Ok(())
}
