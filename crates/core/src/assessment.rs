//! Risk assessment schema.
//!
//! This module defines the structured output of the risk classification stage
//! and the sanitisation applied to it before anything downstream trusts it.
//! A generative backend gives no validation guarantees, so numeric fields are
//! clamped into their declared domains and the ranked lists re-sorted here.

use crate::urgency::RiskLevel;

/// One contributing factor to a risk assessment, with its relative impact.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct TopFactor {
    pub factor: String,
    pub value: f64,
}

/// Suitability score for one department, in `[0, 1]`.
///
/// The descending order of these entries is the allocation search order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct DepartmentFitScore {
    pub department: String,
    pub score: f64,
}

/// The structured result of classifying one patient intake.
///
/// Immutable once produced; the orchestrator copies its fields into the final
/// triage record. `risk_level` is always exactly the banding of
/// `urgency_index` — [`RiskAssessment::sanitise`] re-derives it to enforce
/// the invariant.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Risk probability in `[0, 1]`; doubles as the model confidence score.
    pub risk_probability: f64,
    /// Urgency index in `0..=100`.
    pub urgency_index: u8,
    pub risk_level: RiskLevel,
    /// Natural-language explanation of the assessment.
    pub explanation: String,
    /// Contributing factors, descending by value.
    pub top_factors: Vec<TopFactor>,
    /// Department fit scores, descending by score. At least three entries.
    pub department_fit_scores: Vec<DepartmentFitScore>,
    /// Version tag of the model that produced this assessment.
    pub model_version: String,
}

impl RiskAssessment {
    /// Clamps numeric fields into their domains, re-sorts both ranked lists
    /// descending and re-derives the risk level from the urgency index.
    ///
    /// Applied to every assessment returned by a generative backend; the
    /// rule backend also runs through it so both paths share one contract.
    pub fn sanitise(mut self) -> Self {
        self.risk_probability = clamp_unit(self.risk_probability);
        self.risk_level = RiskLevel::from_urgency(f64::from(self.urgency_index));

        for fit in &mut self.department_fit_scores {
            fit.score = clamp_unit(fit.score);
        }
        self.department_fit_scores
            .sort_by(|a, b| b.score.total_cmp(&a.score));
        self.top_factors.sort_by(|a, b| b.value.total_cmp(&a.value));

        self
    }

    /// Names of the top factors, highest impact first, for prompt embedding.
    pub fn top_factor_names(&self) -> Vec<String> {
        self.top_factors.iter().map(|f| f.factor.clone()).collect()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsorted_assessment() -> RiskAssessment {
        RiskAssessment {
            risk_probability: 1.7,
            urgency_index: 67,
            // Deliberately inconsistent with the urgency index.
            risk_level: RiskLevel::Critical,
            explanation: "elevated vitals".into(),
            top_factors: vec![
                TopFactor {
                    factor: "Fever".into(),
                    value: 10.0,
                },
                TopFactor {
                    factor: "Chest pain".into(),
                    value: 40.0,
                },
            ],
            department_fit_scores: vec![
                DepartmentFitScore {
                    department: "General Medicine".into(),
                    score: 0.3,
                },
                DepartmentFitScore {
                    department: "Cardiology".into(),
                    score: 1.4,
                },
                DepartmentFitScore {
                    department: "Emergency".into(),
                    score: 0.7,
                },
            ],
            model_version: "test".into(),
        }
    }

    #[test]
    fn test_sanitise_clamps_probabilities() {
        let assessment = unsorted_assessment().sanitise();
        assert_eq!(assessment.risk_probability, 1.0);
        assert!(assessment
            .department_fit_scores
            .iter()
            .all(|f| (0.0..=1.0).contains(&f.score)));
    }

    #[test]
    fn test_sanitise_rederives_risk_level_from_urgency() {
        let assessment = unsorted_assessment().sanitise();
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_sanitise_sorts_rankings_descending() {
        let assessment = unsorted_assessment().sanitise();
        assert_eq!(assessment.department_fit_scores[0].department, "Cardiology");
        assert_eq!(
            assessment.department_fit_scores[2].department,
            "General Medicine"
        );
        assert_eq!(assessment.top_factors[0].factor, "Chest pain");
    }

    #[test]
    fn test_sanitise_zeroes_nan_probability() {
        let mut assessment = unsorted_assessment();
        assessment.risk_probability = f64::NAN;
        let assessment = assessment.sanitise();
        assert_eq!(assessment.risk_probability, 0.0);
    }

    #[test]
    fn test_assessment_serializes_with_document_field_names() {
        let json = serde_json::to_value(unsorted_assessment().sanitise()).expect("serialize");
        assert!(json.get("riskProbability").is_some());
        assert!(json.get("departmentFitScores").is_some());
        assert!(json.get("modelVersion").is_some());
    }
}
