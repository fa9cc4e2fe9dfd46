//! Generative backend capability interface.
//!
//! The classifier, explanation composer and synthetic-data generator all
//! delegate content generation to an external structured-output model. That
//! model is reached exclusively through the [`GenerativeBackend`] trait so
//! the decision pipeline stays testable with a deterministic implementation
//! and no vendor SDK is wired into the core logic.
//!
//! A backend returning `Ok(None)` means "the model produced no usable
//! output"; each call site treats that as a hard failure rather than
//! substituting defaults.

use crate::assessment::RiskAssessment;
use crate::synthetic::SyntheticPatient;
use crate::urgency::RiskLevel;
use crate::PatientIntake;

/// Failure inside a backend implementation (transport, decode, model error).
///
/// The message is preserved verbatim when mapped onto the pipeline's error
/// taxonomy so no cause text is swallowed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Structured prompt for one risk classification.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    pub age: u32,
    pub gender: String,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub heart_rate: i32,
    pub temperature: f64,
    pub symptoms: String,
    /// Comma-separated pre-existing conditions, "None" when absent.
    pub pre_existing_conditions: String,
}

impl From<&PatientIntake> for ClassificationRequest {
    fn from(intake: &PatientIntake) -> Self {
        Self {
            age: intake.age,
            gender: intake.gender.to_string(),
            systolic_bp: intake.systolic_bp,
            diastolic_bp: intake.diastolic_bp,
            heart_rate: intake.heart_rate,
            temperature: intake.temperature,
            symptoms: intake.symptoms.as_str().to_string(),
            pre_existing_conditions: intake.conditions_or_none(),
        }
    }
}

/// Structured prompt for one narrative explanation.
///
/// Carries both the raw confidence fraction and the display percentage; the
/// percentage is what the narrative must state.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRequest {
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
    pub symptoms: String,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub heart_rate: i32,
    pub temperature: f64,
    pub pre_existing_conditions: String,
    pub risk_level: RiskLevel,
    pub urgency_index: u8,
    pub recommended_department: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Key contributing factors, highest impact first.
    pub top_factors: Vec<String>,
}

impl ExplanationRequest {
    /// Confidence as a whole display percentage, `round(confidence * 100)`.
    pub fn confidence_percentage(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Capability interface for the external structured-output model.
///
/// Implementations are expected to be at-most-once and synchronous from the
/// caller's perspective: no retries happen here or above, and a timeout is
/// the caller's responsibility.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Classifies one patient's risk. `Ok(None)` means no usable model output.
    async fn classify(&self, request: &ClassificationRequest)
        -> BackendResult<Option<RiskAssessment>>;

    /// Produces a clinical narrative for one decision bundle.
    async fn narrate(&self, request: &ExplanationRequest) -> BackendResult<Option<String>>;

    /// Generates a batch of synthetic patients for rush simulation.
    async fn synthesise(&self, count: usize) -> BackendResult<Option<Vec<SyntheticPatient>>>;
}
