//! Triage pipeline orchestration.
//!
//! Sequences the decision stages for one intake event and assembles the
//! final record: validation, consent gate, risk classification, department
//! allocation, compliance annotation and the single-record fairness probe.
//! The service is stateless across requests; every invocation operates on its
//! own input and produces its own record, and nothing partial escapes on
//! error.
//!
//! The consent gate deliberately runs before classification so a
//! non-consenting patient's data never reaches the generative backend.

use crate::allocation::{self, ResourceSnapshot};
use crate::assessment::{DepartmentFitScore, TopFactor};
use crate::backend::{ClassificationRequest, ExplanationRequest, GenerativeBackend};
use crate::compliance;
use crate::config::CoreConfig;
use crate::fairness::{self, FairnessReport, PredictionLog};
use crate::intake::{Gender, PatientIntake};
use crate::synthetic::SyntheticPatient;
use crate::urgency::RiskLevel;
use crate::waittime::WaitTimeEstimator;
use crate::{TriageError, TriageResult};
use std::sync::Arc;

/// The final assembled decision bundle for one patient intake event.
///
/// Field names follow the document-store schema consumed by the dashboards.
/// Created once per triage event and never mutated by this crate; downstream
/// status transitions belong to the storage collaborator.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriageRecord {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_existing_conditions: Option<String>,

    pub risk_level: RiskLevel,
    pub urgency_index: u8,
    pub ai_explanation: String,
    /// The classifier's risk probability, reused as the confidence score.
    pub confidence: f64,
    pub top_factors: Vec<TopFactor>,
    pub department_fit_scores: Vec<DepartmentFitScore>,
    pub model_version: String,

    pub assigned_department: String,
    #[serde(rename = "rerouting_reason", default, skip_serializing_if = "Option::is_none")]
    pub rerouting_reason: Option<String>,

    #[serde(rename = "compliance_status")]
    pub compliance_status: String,

    #[serde(rename = "fairness_warning", default, skip_serializing_if = "Option::is_none")]
    pub fairness_warning: Option<String>,

    /// Queue status at creation; always "Waiting".
    pub status: String,
    /// Estimated wait in minutes.
    pub wait_time: u32,
    #[schema(value_type = String)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Pure triage decision operations - no storage or HTTP concerns
#[derive(Clone)]
pub struct TriageService {
    cfg: Arc<CoreConfig>,
    backend: Arc<dyn GenerativeBackend>,
    wait_times: Arc<dyn WaitTimeEstimator>,
}

impl TriageService {
    /// Creates a new instance of TriageService.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Configuration resolved at startup (jurisdiction, thresholds).
    /// * `backend` - The generative capability used for classification,
    ///   narration and synthetic data.
    /// * `wait_times` - Wait-time estimate collaborator.
    pub fn new(
        cfg: Arc<CoreConfig>,
        backend: Arc<dyn GenerativeBackend>,
        wait_times: Arc<dyn WaitTimeEstimator>,
    ) -> Self {
        Self {
            cfg,
            backend,
            wait_times,
        }
    }

    /// Runs the full triage pipeline for one intake event.
    ///
    /// # Errors
    ///
    /// * `TriageError::InvalidInput` - a field failed validation; no stage ran.
    /// * `TriageError::ConsentWithheld` - consent absent; the pipeline stops
    ///   before any data reaches the classification backend.
    /// * `TriageError::ClassificationFailed` - the backend errored or returned
    ///   no usable output; the cause text is preserved.
    pub async fn triage(
        &self,
        intake: &PatientIntake,
        resources: &ResourceSnapshot,
    ) -> TriageResult<TriageRecord> {
        intake.validate()?;

        // Consent gate first: a violation is a policy rejection, not a fault.
        let compliance_result =
            compliance::check(intake.consent_given, self.cfg.jurisdiction());
        if compliance_result.is_violation() {
            tracing::info!("triage rejected: consent not provided");
            return Err(TriageError::ConsentWithheld {
                compliance_status: compliance_result.compliance_status,
            });
        }

        let classification_request = ClassificationRequest::from(intake);
        let assessment = self
            .backend
            .classify(&classification_request)
            .await
            .map_err(|e| TriageError::ClassificationFailed(e.to_string()))?
            .ok_or_else(|| {
                TriageError::ClassificationFailed("No output from AI model.".to_string())
            })?
            .sanitise();

        let allocation = allocation::allocate(&assessment.department_fit_scores, resources);

        // Single-record probe against the configured threshold; only the
        // first finding's warning is carried onto the record.
        let fairness_report = fairness::monitor(
            &[PredictionLog {
                patient_id: "pending".to_string(),
                age: intake.age,
                gender: intake.gender.monitor_key().to_string(),
                risk_level: assessment.risk_level,
                urgency_index: assessment.urgency_index,
            }],
            self.cfg.deviation_threshold(),
        );
        let fairness_warning = fairness_report
            .bias_details
            .first()
            .map(|detail| detail.warning.clone());

        let wait_time = self.wait_times.estimate(&allocation.recommended_department);

        let record = TriageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: intake.name.as_str().to_string(),
            age: intake.age,
            gender: intake.gender,
            symptoms: intake.symptom_list(),
            pre_existing_conditions: intake.pre_existing_conditions.clone(),
            risk_level: assessment.risk_level,
            urgency_index: assessment.urgency_index,
            ai_explanation: assessment.explanation,
            confidence: assessment.risk_probability,
            top_factors: assessment.top_factors,
            department_fit_scores: assessment.department_fit_scores,
            model_version: assessment.model_version,
            assigned_department: allocation.recommended_department,
            rerouting_reason: allocation.rerouted_reason,
            compliance_status: compliance_result.compliance_status,
            fairness_warning,
            status: "Waiting".to_string(),
            wait_time,
            created_at: chrono::Utc::now(),
        };

        tracing::info!(
            risk_level = %record.risk_level,
            urgency_index = record.urgency_index,
            department = %record.assigned_department,
            "triage record assembled"
        );

        Ok(record)
    }

    /// Composes a narrative explanation for a completed decision bundle.
    ///
    /// Invoked by a separate caller from [`TriageService::triage`]; an
    /// explanation failure never invalidates an assembled record.
    pub async fn explain(&self, request: &ExplanationRequest) -> TriageResult<String> {
        crate::explanation::compose(self.backend.as_ref(), request).await
    }

    /// Generates a batch of synthetic patients through the backend.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::SynthesisFailed` when the backend errors or
    /// produces no output.
    pub async fn synthesise_patients(&self, count: usize) -> TriageResult<Vec<SyntheticPatient>> {
        if count == 0 {
            return Err(TriageError::InvalidInput(
                "number of patients must be at least 1".into(),
            ));
        }
        self.backend
            .synthesise(count)
            .await
            .map_err(|e| TriageError::SynthesisFailed(e.to_string()))?
            .ok_or_else(|| TriageError::SynthesisFailed("No output from AI model.".to_string()))
    }

    /// Runs the fairness monitor over a batch of logged predictions with the
    /// configured deviation threshold.
    pub fn fairness_report(&self, predictions: &[PredictionLog]) -> FairnessReport {
        fairness::monitor(predictions, self.cfg.deviation_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::RiskAssessment;
    use crate::backend::{BackendError, BackendResult};
    use crate::intake::sample_intake;
    use crate::rules::RuleBackend;
    use crate::waittime::FixedWaitTimeEstimator;

    fn service_with(backend: Arc<dyn GenerativeBackend>) -> TriageService {
        TriageService::new(
            Arc::new(CoreConfig::default()),
            backend,
            Arc::new(FixedWaitTimeEstimator(12)),
        )
    }

    fn rule_service() -> TriageService {
        service_with(Arc::new(RuleBackend::new()))
    }

    /// Backend that fails or returns nothing, for error-path tests.
    struct BrokenBackend {
        error: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl GenerativeBackend for BrokenBackend {
        async fn classify(
            &self,
            _request: &ClassificationRequest,
        ) -> BackendResult<Option<RiskAssessment>> {
            match self.error {
                Some(message) => Err(BackendError::new(message)),
                None => Ok(None),
            }
        }

        async fn narrate(&self, _request: &ExplanationRequest) -> BackendResult<Option<String>> {
            Ok(None)
        }

        async fn synthesise(&self, _count: usize) -> BackendResult<Option<Vec<SyntheticPatient>>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_triage_assembles_complete_record() {
        let record = rule_service()
            .triage(&sample_intake(), &ResourceSnapshot::default())
            .await
            .expect("should triage");

        assert_eq!(record.name, "Jo Bloggs");
        assert_eq!(record.status, "Waiting");
        assert_eq!(record.wait_time, 12);
        assert!(!record.assigned_department.is_empty());
        assert!(record.compliance_status.contains("HIPAA"));
        assert_eq!(
            record.risk_level,
            RiskLevel::from_urgency(f64::from(record.urgency_index))
        );
        assert!(record.department_fit_scores.len() >= 3);
        assert_eq!(
            record.symptoms,
            vec!["chest pain".to_string(), "shortness of breath".to_string()]
        );
    }

    #[tokio::test]
    async fn test_triage_rejects_invalid_intake_before_any_stage() {
        let mut intake = sample_intake();
        intake.heart_rate = 500;
        let err = rule_service()
            .triage(&intake, &ResourceSnapshot::default())
            .await
            .expect_err("should reject invalid vitals");
        assert!(matches!(err, TriageError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_triage_short_circuits_on_missing_consent() {
        let mut intake = sample_intake();
        intake.consent_given = false;

        // A broken backend proves classification is never reached: the
        // consent gate must fire first.
        let err = service_with(Arc::new(BrokenBackend {
            error: Some("must not be called"),
        }))
        .triage(&intake, &ResourceSnapshot::default())
        .await
        .expect_err("should reject without consent");

        match err {
            TriageError::ConsentWithheld { compliance_status } => {
                assert!(compliance_status.starts_with("Critical Violation"));
            }
            other => panic!("expected ConsentWithheld, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_triage_propagates_classifier_failure_with_cause() {
        let err = service_with(Arc::new(BrokenBackend {
            error: Some("model endpoint unreachable"),
        }))
        .triage(&sample_intake(), &ResourceSnapshot::default())
        .await
        .expect_err("should fail");
        assert!(
            matches!(err, TriageError::ClassificationFailed(msg) if msg.contains("model endpoint unreachable"))
        );
    }

    #[tokio::test]
    async fn test_triage_fails_hard_on_missing_classifier_output() {
        let err = service_with(Arc::new(BrokenBackend { error: None }))
            .triage(&sample_intake(), &ResourceSnapshot::default())
            .await
            .expect_err("should fail");
        assert!(
            matches!(err, TriageError::ClassificationFailed(msg) if msg.contains("No output"))
        );
    }

    #[tokio::test]
    async fn test_triage_reroutes_against_constrained_snapshot() {
        let resources = ResourceSnapshot {
            cardiology_beds_available: 0,
            emergency_slots_available: 0,
            neurologist_on_duty: false,
            general_physicians_available: 0,
            icu_beds_available: 0,
        };
        let record = rule_service()
            .triage(&sample_intake(), &resources)
            .await
            .expect("should still triage");
        assert_eq!(record.assigned_department, allocation::FALLBACK_DEPARTMENT);
        assert!(record.rerouting_reason.is_some());
    }

    #[tokio::test]
    async fn test_triage_assembly_is_idempotent_modulo_varying_fields() {
        let service = rule_service();
        let intake = sample_intake();
        let first = service
            .triage(&intake, &ResourceSnapshot::default())
            .await
            .expect("first");
        let second = service
            .triage(&intake, &ResourceSnapshot::default())
            .await
            .expect("second");

        let strip = |record: &TriageRecord| {
            let mut value = serde_json::to_value(record).expect("serialize");
            let map = value.as_object_mut().expect("object");
            map.remove("id");
            map.remove("createdAt");
            map.remove("waitTime");
            value
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[tokio::test]
    async fn test_explain_round_trips_through_backend() {
        let service = rule_service();
        let record = service
            .triage(&sample_intake(), &ResourceSnapshot::default())
            .await
            .expect("triage");
        let request = ExplanationRequest {
            patient_id: record.id.clone(),
            age: record.age,
            gender: record.gender.to_string(),
            symptoms: record.symptoms.join(", "),
            systolic_bp: 150,
            diastolic_bp: 95,
            heart_rate: 102,
            temperature: 37.9,
            pre_existing_conditions: "hypertension".into(),
            risk_level: record.risk_level,
            urgency_index: record.urgency_index,
            recommended_department: record.assigned_department.clone(),
            confidence: record.confidence,
            top_factors: record.top_factors.iter().map(|f| f.factor.clone()).collect(),
        };
        let narrative = service.explain(&request).await.expect("should explain");
        assert!(narrative.contains(&record.assigned_department));
    }

    #[tokio::test]
    async fn test_synthesise_patients_validates_count() {
        let err = rule_service()
            .synthesise_patients(0)
            .await
            .expect_err("should reject zero");
        assert!(matches!(err, TriageError::InvalidInput(_)));

        let patients = rule_service()
            .synthesise_patients(3)
            .await
            .expect("should generate");
        assert_eq!(patients.len(), 3);
    }

    #[tokio::test]
    async fn test_record_serializes_with_document_field_names() {
        let record = rule_service()
            .triage(&sample_intake(), &ResourceSnapshot::default())
            .await
            .expect("triage");
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("aiExplanation").is_some());
        assert!(json.get("assignedDepartment").is_some());
        assert!(json.get("compliance_status").is_some());
        assert!(json.get("waitTime").is_some());
    }
}
