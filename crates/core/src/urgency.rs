//! Urgency index computation.
//!
//! This module contains the fixed-weight formula that combines a risk
//! probability, a vital-instability score and a symptom-severity score into a
//! bounded 0-100 urgency index, plus the three-tier risk banding derived from
//! it. The formula weights are load-bearing: downstream records written by
//! earlier deployments used the same weights, so they must not change.

/// Three-tier risk classification derived from the urgency index.
///
/// Banding is inclusive to the lower band: an urgency of exactly 40 is `Low`
/// and exactly 70 is `Medium`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    Critical,
}

impl RiskLevel {
    /// Derives the risk level from an urgency value.
    ///
    /// Accepts the raw (possibly fractional) urgency so that boundary values
    /// such as 40.01 band correctly.
    pub fn from_urgency(urgency: f64) -> Self {
        if urgency <= 40.0 {
            RiskLevel::Low
        } else if urgency <= 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Critical
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::Critical => "Critical",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = crate::TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "Critical" => Ok(RiskLevel::Critical),
            other => Err(crate::TriageError::InvalidInput(format!(
                "unknown risk level: {}",
                other
            ))),
        }
    }
}

/// Computes the urgency index and risk level for one patient.
///
/// `urgency = 0.5 * risk_probability * 100 + 0.3 * vital_instability + 0.2 * symptom_severity`,
/// clamped to `[0, 100]`. The integer index is the ceiling of the clamped
/// value; because the band boundaries (40 and 70) are integers, the ceiling
/// bands identically to the raw value, which keeps the invariant that the
/// risk level is exactly the banding of the stored index.
///
/// # Arguments
///
/// * `risk_probability` - Probability of risk in `[0, 1]`.
/// * `vital_instability` - Vital-sign instability score in `[0, 100]`.
/// * `symptom_severity` - Symptom severity score in `[0, 100]`.
///
/// Input-range validation is the caller's responsibility; out-of-range inputs
/// still produce a clamped, in-domain result.
pub fn score(risk_probability: f64, vital_instability: f64, symptom_severity: f64) -> (u8, RiskLevel) {
    let raw = 0.5 * risk_probability * 100.0 + 0.3 * vital_instability + 0.2 * symptom_severity;
    let clamped = raw.clamp(0.0, 100.0);
    let index = clamped.ceil() as u8;
    (index, RiskLevel::from_urgency(clamped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_matches_reference_formula() {
        // 0.5*80 + 0.3*50 + 0.2*60 = 40 + 15 + 12 = 67
        let (index, level) = score(0.8, 50.0, 60.0);
        assert_eq!(index, 67);
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_banding_boundaries_are_inclusive_low() {
        assert_eq!(RiskLevel::from_urgency(40.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_urgency(40.01), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_urgency(70.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_urgency(70.01), RiskLevel::Critical);
    }

    #[test]
    fn test_score_clamps_into_domain() {
        let (index, level) = score(2.0, 200.0, 200.0);
        assert_eq!(index, 100);
        assert_eq!(level, RiskLevel::Critical);

        let (index, level) = score(-1.0, -50.0, -50.0);
        assert_eq!(index, 0);
        assert_eq!(level, RiskLevel::Low);
    }

    #[test]
    fn test_score_extremes() {
        let (index, level) = score(0.0, 0.0, 0.0);
        assert_eq!(index, 0);
        assert_eq!(level, RiskLevel::Low);

        let (index, level) = score(1.0, 100.0, 100.0);
        assert_eq!(index, 100);
        assert_eq!(level, RiskLevel::Critical);
    }

    #[test]
    fn test_ceiling_preserves_banding() {
        // 0.5 * 0.802 * 100 = 40.1: the raw value is just past the Low band
        // boundary; the ceiled index must band the same way as the raw value.
        let (index, level) = score(0.802, 0.0, 0.0);
        assert_eq!(index, 41);
        assert_eq!(level, RiskLevel::from_urgency(f64::from(index)));
    }

    #[test]
    fn test_risk_level_round_trips_display() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::Critical] {
            let parsed: RiskLevel = level.to_string().parse().expect("should parse");
            assert_eq!(parsed, level);
        }
    }
}
