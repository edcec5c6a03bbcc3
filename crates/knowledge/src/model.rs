//! Catalog records: facilities, doctors and the fixed specialty set.

use serde::{Deserialize, Serialize};

/// Canonical medical specialization labels.
///
/// The serialized form is the Indonesian label used in catalog files and
/// in prompts. Unknown labels fail catalog parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "Penyakit Dalam")]
    PenyakitDalam,
    #[serde(rename = "Anak")]
    Anak,
    #[serde(rename = "Jantung dan Pembuluh Darah")]
    JantungDanPembuluhDarah,
    #[serde(rename = "Kandungan dan Kebidanan")]
    KandunganDanKebidanan,
    #[serde(rename = "Bedah Umum")]
    BedahUmum,
    #[serde(rename = "Kulit dan Kelamin")]
    KulitDanKelamin,
    #[serde(rename = "Saraf")]
    Saraf,
    #[serde(rename = "Mata")]
    Mata,
}

impl Specialty {
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::PenyakitDalam => "Penyakit Dalam",
            Specialty::Anak => "Anak",
            Specialty::JantungDanPembuluhDarah => "Jantung dan Pembuluh Darah",
            Specialty::KandunganDanKebidanan => "Kandungan dan Kebidanan",
            Specialty::BedahUmum => "Bedah Umum",
            Specialty::KulitDanKelamin => "Kulit dan Kelamin",
            Specialty::Saraf => "Saraf",
            Specialty::Mata => "Mata",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named clinician with one specialty and a weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,

    pub specialty: Specialty,

    /// Ordered "Day: HH:MM-HH:MM" entries
    #[serde(default)]
    pub schedule: Vec<String>,

    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Doctor {
    /// Schedule entries joined for display ("Senin: 09:00-13:00, Rabu: ...").
    pub fn schedule_line(&self) -> String {
        self.schedule.join(", ")
    }

    pub fn availability_label(&self) -> &'static str {
        if self.available {
            "Tersedia"
        } else {
            "Tidak Tersedia"
        }
    }
}

/// A healthcare site with contact details and its doctors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub address: String,
    pub phone: String,

    /// Doctors in catalog order
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

impl Facility {
    /// First doctor with `specialty` that is currently taking patients.
    pub fn available_doctor(&self, specialty: Specialty) -> Option<&Doctor> {
        self.doctors
            .iter()
            .find(|d| d.specialty == specialty && d.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(name: &str, specialty: Specialty, available: bool) -> Doctor {
        Doctor {
            name: name.into(),
            specialty,
            schedule: vec!["Senin: 09:00-13:00".into(), "Rabu: 14:00-18:00".into()],
            available,
        }
    }

    #[test]
    fn specialty_serializes_as_label() {
        #[derive(Serialize, Deserialize)]
        struct Row {
            specialty: Specialty,
        }

        let row: Row = toml::from_str("specialty = \"Kulit dan Kelamin\"").unwrap();
        assert_eq!(row.specialty, Specialty::KulitDanKelamin);
        assert_eq!(row.specialty.to_string(), "Kulit dan Kelamin");

        let text = toml::to_string(&Row { specialty: Specialty::JantungDanPembuluhDarah }).unwrap();
        assert!(text.contains(Specialty::JantungDanPembuluhDarah.label()));

        assert!(toml::from_str::<Row>("specialty = \"Gigi\"").is_err());
    }

    #[test]
    fn schedule_and_availability_rendering() {
        let d = doctor("Dr. A", Specialty::Mata, false);
        assert_eq!(d.schedule_line(), "Senin: 09:00-13:00, Rabu: 14:00-18:00");
        assert_eq!(d.availability_label(), "Tidak Tersedia");
        assert_eq!(doctor("Dr. B", Specialty::Mata, true).availability_label(), "Tersedia");
    }

    #[test]
    fn available_doctor_skips_unavailable() {
        let facility = Facility {
            name: "RS Test".into(),
            address: "Jl. Test".into(),
            phone: "021".into(),
            doctors: vec![
                doctor("Dr. Off", Specialty::Saraf, false),
                doctor("Dr. On", Specialty::Saraf, true),
            ],
        };
        assert_eq!(facility.available_doctor(Specialty::Saraf).unwrap().name, "Dr. On");
        assert!(facility.available_doctor(Specialty::Anak).is_none());
    }
}
