//! # Triage Core
//!
//! Core decision logic for the hospital triage system.
//!
//! This crate contains the pure triage pipeline: urgency scoring, risk
//! classification, resource-aware department allocation, regulatory
//! compliance annotation, fairness monitoring and final record assembly.
//!
//! **No API concerns**: HTTP servers, authentication and persistence belong
//! to the collaborators wired up in `triage-run`. The generative model is
//! reached only through the [`backend::GenerativeBackend`] trait so the
//! pipeline is testable with a deterministic implementation.

pub mod allocation;
pub mod assessment;
pub mod backend;
pub mod compliance;
pub mod config;
pub mod error;
pub mod explanation;
pub mod fairness;
pub mod intake;
pub mod orchestrator;
pub mod rules;
pub mod synthetic;
pub mod urgency;
pub mod waittime;

pub use allocation::{AllocationResult, ResourceSnapshot};
pub use assessment::{DepartmentFitScore, RiskAssessment, TopFactor};
pub use backend::{ClassificationRequest, ExplanationRequest, GenerativeBackend};
pub use compliance::{ComplianceResult, Jurisdiction};
pub use config::CoreConfig;
pub use error::{TriageError, TriageResult};
pub use fairness::{BiasDetail, FairnessReport, PredictionLog};
pub use intake::{Gender, PatientIntake};
pub use orchestrator::{TriageRecord, TriageService};
pub use rules::RuleBackend;
pub use synthetic::SyntheticPatient;
pub use urgency::RiskLevel;
pub use waittime::{FixedWaitTimeEstimator, RandomWaitTimeEstimator, WaitTimeEstimator};
