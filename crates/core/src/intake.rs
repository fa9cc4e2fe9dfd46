//! Patient intake data and validation.
//!
//! This module contains the intake record created by form submission and the
//! range checks applied to it before any pipeline stage runs. The numeric
//! ranges match the intake form's own limits, so a value outside them is a
//! malformed submission rather than a clinically extreme patient.

use crate::{TriageError, TriageResult};
use triage_types::NonEmptyText;

/// Patient gender as captured by the intake form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Lowercase key used when partitioning fairness predictions by gender.
    pub fn monitor_key(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// One patient intake event, as submitted by the intake form.
///
/// Ephemeral: consumed by one triage decision and never stored by this crate.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientIntake {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    pub age: u32,
    pub gender: Gender,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub heart_rate: i32,
    /// Body temperature in degrees Celsius.
    pub temperature: f64,
    /// Free-text symptom description, possibly comma-separated.
    #[schema(value_type = String)]
    pub symptoms: NonEmptyText,
    #[serde(default)]
    pub pre_existing_conditions: Option<String>,
    /// Explicit consent to processing. Must be `true` for triage to proceed.
    pub consent_given: bool,
}

impl PatientIntake {
    /// Validates all numeric fields against the intake form's ranges.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> TriageResult<()> {
        if self.age > 120 {
            return Err(TriageError::InvalidInput(format!(
                "age must be between 0 and 120, got {}",
                self.age
            )));
        }
        if !(50..=250).contains(&self.systolic_bp) {
            return Err(TriageError::InvalidInput(format!(
                "systolic blood pressure must be between 50 and 250 mmHg, got {}",
                self.systolic_bp
            )));
        }
        if !(30..=150).contains(&self.diastolic_bp) {
            return Err(TriageError::InvalidInput(format!(
                "diastolic blood pressure must be between 30 and 150 mmHg, got {}",
                self.diastolic_bp
            )));
        }
        if !(30..=200).contains(&self.heart_rate) {
            return Err(TriageError::InvalidInput(format!(
                "heart rate must be between 30 and 200 bpm, got {}",
                self.heart_rate
            )));
        }
        if !(35.0..=42.0).contains(&self.temperature) {
            return Err(TriageError::InvalidInput(format!(
                "temperature must be between 35.0 and 42.0 °C, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Pre-existing conditions with the form's convention of "None" for absent.
    pub fn conditions_or_none(&self) -> String {
        match &self.pre_existing_conditions {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => "None".to_string(),
        }
    }

    /// Splits the free-text symptom field into trimmed display entries.
    pub fn symptom_list(&self) -> Vec<String> {
        self.symptoms
            .as_str()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Shared fixture for pipeline tests across this crate.
#[cfg(test)]
pub(crate) fn sample_intake() -> PatientIntake {
    PatientIntake {
        name: NonEmptyText::new("Jo Bloggs").expect("non-empty"),
        age: 58,
        gender: Gender::Female,
        systolic_bp: 150,
        diastolic_bp: 95,
        heart_rate: 102,
        temperature: 37.9,
        symptoms: NonEmptyText::new("chest pain, shortness of breath").expect("non-empty"),
        pre_existing_conditions: Some("hypertension".into()),
        consent_given: true,
    }
}
