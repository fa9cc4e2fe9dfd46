#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("triage rejected: {compliance_status}")]
    ConsentWithheld {
        /// The compliance status produced by the regulatory check, starting
        /// with "Critical Violation".
        compliance_status: String,
    },
    #[error("failed to classify patient risk: {0}")]
    ClassificationFailed(String),
    #[error("failed to generate explanation: {0}")]
    GenerationFailed(String),
    #[error("failed to generate synthetic patients: {0}")]
    SynthesisFailed(String),
    #[error("failed to serialize triage record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TriageError {
    /// True when the error is a policy rejection rather than a system fault.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, TriageError::ConsentWithheld { .. })
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
