//! Specialty defaults and industry benchmarks.
//!
//! In production these figures come from the planning backend; the values here
//! are the fallbacks the UI ships with. All amounts are man-won.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialty {
    #[serde(alias = "internalMedicine", alias = "internal_medicine")]
    InternalMedicine,
    Dermatology,
    Orthopedics,
    Pediatrics,
    Dental,
    Ophthalmology,
    #[serde(alias = "ent")]
    Otolaryngology,
    #[serde(alias = "familyMedicine", alias = "family_medicine")]
    FamilyMedicine,
}

impl Specialty {
    pub const ALL: [Specialty; 8] = [
        Specialty::InternalMedicine,
        Specialty::Dermatology,
        Specialty::Orthopedics,
        Specialty::Pediatrics,
        Specialty::Dental,
        Specialty::Ophthalmology,
        Specialty::Otolaryngology,
        Specialty::FamilyMedicine,
    ];

    pub fn preset(self) -> SpecialtyPreset {
        let (avg_revenue_per_patient, variable_cost_ratio_percent, typical_daily_patients) =
            match self {
                Specialty::InternalMedicine => (4.5, 25.0, 40),
                Specialty::Dermatology => (8.0, 35.0, 30),
                Specialty::Orthopedics => (6.0, 30.0, 45),
                Specialty::Pediatrics => (3.0, 20.0, 50),
                Specialty::Dental => (12.0, 40.0, 20),
                Specialty::Ophthalmology => (7.0, 35.0, 35),
                Specialty::Otolaryngology => (3.5, 20.0, 55),
                Specialty::FamilyMedicine => (3.8, 22.0, 40),
            };
        SpecialtyPreset {
            specialty: self,
            avg_revenue_per_patient,
            variable_cost_ratio_percent,
            typical_daily_patients,
        }
    }

    pub fn benchmark(self) -> IndustryBenchmark {
        let (opening_cost_total, monthly_fixed_total) = match self {
            Specialty::InternalMedicine => (45_000.0, 2_100.0),
            Specialty::Dermatology => (60_000.0, 2_600.0),
            Specialty::Orthopedics => (70_000.0, 3_200.0),
            Specialty::Pediatrics => (35_000.0, 1_800.0),
            Specialty::Dental => (55_000.0, 2_500.0),
            Specialty::Ophthalmology => (80_000.0, 3_000.0),
            Specialty::Otolaryngology => (40_000.0, 1_900.0),
            Specialty::FamilyMedicine => (38_000.0, 1_850.0),
        };
        IndustryBenchmark {
            specialty: self,
            opening_cost_total,
            monthly_fixed_total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyPreset {
    pub specialty: Specialty,
    pub avg_revenue_per_patient: f64,
    pub variable_cost_ratio_percent: f64,
    pub typical_daily_patients: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmark {
    pub specialty: Specialty,
    pub opening_cost_total: f64,
    pub monthly_fixed_total: f64,
}
