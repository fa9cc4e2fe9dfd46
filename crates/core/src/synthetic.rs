//! Synthetic patient records for ER rush simulation.
//!
//! Batches are produced through the generative backend capability; the rule
//! backend generates them from a seeded RNG so simulations are reproducible.

use crate::intake::Gender;
use crate::urgency::RiskLevel;

/// One synthetic patient record.
///
/// Vitals stay inside the simulation ranges (systolic 70-200, diastolic
/// 40-120, heart rate 40-200, temperature 35.0-42.0 °C) so generated batches
/// always pass intake validation when replayed through the pipeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticPatient {
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: Vec<String>,
    pub blood_pressure_systolic: i32,
    pub blood_pressure_diastolic: i32,
    pub heart_rate: i32,
    pub temperature: f64,
    pub pre_existing_conditions: Vec<String>,
    /// Optional label for training data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl SyntheticPatient {
    /// True when every vital lies inside the simulation ranges.
    pub fn vitals_in_range(&self) -> bool {
        (1..=120).contains(&self.age)
            && (70..=200).contains(&self.blood_pressure_systolic)
            && (40..=120).contains(&self.blood_pressure_diastolic)
            && (40..=200).contains(&self.heart_rate)
            && (35.0..=42.0).contains(&self.temperature)
    }
}
