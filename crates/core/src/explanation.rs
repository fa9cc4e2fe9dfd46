//! Narrative explanation composition.
//!
//! Turns a full decision bundle into a natural-language narrative for
//! clinical display by delegating to the generative backend. The backend
//! producing no output is a hard `GenerationFailed`; no fallback narrative is
//! fabricated here. Callers that prioritise availability may catch the error
//! and degrade the narrative field themselves.

use crate::backend::{ExplanationRequest, GenerativeBackend};
use crate::{TriageError, TriageResult};

/// Composes the clinical narrative for one decision bundle.
///
/// # Errors
///
/// Returns `TriageError::GenerationFailed` with the backend's cause text when
/// the backend errors, or with a fixed message when it returns no output.
pub async fn compose(
    backend: &dyn GenerativeBackend,
    request: &ExplanationRequest,
) -> TriageResult<String> {
    let narrative = backend
        .narrate(request)
        .await
        .map_err(|e| TriageError::GenerationFailed(e.to_string()))?;

    match narrative {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TriageError::GenerationFailed(
            "No output from AI model.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::RiskAssessment;
    use crate::backend::{BackendError, BackendResult, ClassificationRequest};
    use crate::synthetic::SyntheticPatient;
    use crate::urgency::RiskLevel;

    struct CannedBackend {
        narrative: Option<String>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl GenerativeBackend for CannedBackend {
        async fn classify(
            &self,
            _request: &ClassificationRequest,
        ) -> BackendResult<Option<RiskAssessment>> {
            Ok(None)
        }

        async fn narrate(&self, _request: &ExplanationRequest) -> BackendResult<Option<String>> {
            if self.fail {
                return Err(BackendError::new("model endpoint unreachable"));
            }
            Ok(self.narrative.clone())
        }

        async fn synthesise(&self, _count: usize) -> BackendResult<Option<Vec<SyntheticPatient>>> {
            Ok(None)
        }
    }

    fn request() -> ExplanationRequest {
        ExplanationRequest {
            patient_id: "p-1".into(),
            age: 58,
            gender: "Female".into(),
            symptoms: "chest pain".into(),
            systolic_bp: 150,
            diastolic_bp: 95,
            heart_rate: 102,
            temperature: 37.9,
            pre_existing_conditions: "hypertension".into(),
            risk_level: RiskLevel::Medium,
            urgency_index: 67,
            recommended_department: "Cardiology".into(),
            confidence: 0.82,
            top_factors: vec!["Chest pain".into()],
        }
    }

    #[tokio::test]
    async fn test_compose_returns_backend_narrative() {
        let backend = CannedBackend {
            narrative: Some("The patient presents with...".into()),
            fail: false,
        };
        let text = compose(&backend, &request()).await.expect("should compose");
        assert_eq!(text, "The patient presents with...");
    }

    #[tokio::test]
    async fn test_compose_fails_on_missing_output() {
        let backend = CannedBackend {
            narrative: None,
            fail: false,
        };
        let err = compose(&backend, &request())
            .await
            .expect_err("should fail on no output");
        assert!(matches!(err, TriageError::GenerationFailed(msg) if msg.contains("No output")));
    }

    #[tokio::test]
    async fn test_compose_preserves_backend_cause_text() {
        let backend = CannedBackend {
            narrative: None,
            fail: true,
        };
        let err = compose(&backend, &request())
            .await
            .expect_err("should surface backend error");
        assert!(
            matches!(err, TriageError::GenerationFailed(msg) if msg.contains("model endpoint unreachable"))
        );
    }

    #[test]
    fn test_confidence_percentage_rounds() {
        let mut req = request();
        req.confidence = 0.825;
        assert_eq!(req.confidence_percentage(), 83);
        req.confidence = 0.0;
        assert_eq!(req.confidence_percentage(), 0);
        req.confidence = 1.2;
        assert_eq!(req.confidence_percentage(), 100);
    }
}
