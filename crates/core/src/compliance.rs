//! Regulatory compliance annotation.
//!
//! Maps the consent flag and the deployment jurisdiction onto a compliance
//! status and the applicable data-retention policy. Absent consent is a hard
//! violation and must block the pipeline; the orchestrator checks it before
//! any patient data reaches the classification backend.

/// Status string prefix identifying a consent violation.
const VIOLATION_STATUS: &str = "Critical Violation: Consent not provided.";

/// Deployment jurisdiction consulted for the retention policy.
///
/// Resolved once at startup from configuration and passed in explicitly;
/// unknown values fall through to the USA default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Jurisdiction {
    Eu,
    India,
    Usa,
}

impl Jurisdiction {
    /// Parses a deployment-country setting, case-insensitively.
    ///
    /// Never fails: anything other than "EU" or "INDIA" is the USA default.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "EU" => Jurisdiction::Eu,
            "INDIA" => Jurisdiction::India,
            _ => Jurisdiction::Usa,
        }
    }

    fn regulation(&self) -> &'static str {
        match self {
            Jurisdiction::Eu => "GDPR",
            Jurisdiction::India => "DISHA",
            Jurisdiction::Usa => "HIPAA",
        }
    }

    fn retention_policy(&self) -> &'static str {
        match self {
            Jurisdiction::Eu => "5-year retention under GDPR.",
            Jurisdiction::India => "10-year retention as per local law.",
            Jurisdiction::Usa => "7-year retention under HIPAA.",
        }
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Jurisdiction::Usa
    }
}

/// Outcome of the regulatory check.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ComplianceResult {
    pub compliance_status: String,
    pub retention_policy: String,
}

impl ComplianceResult {
    /// True when the check found a blocking violation.
    pub fn is_violation(&self) -> bool {
        self.compliance_status.starts_with("Critical Violation")
    }
}

/// Performs the regulatory check for one triage event.
///
/// With consent absent the result is the fixed violation status with an
/// "N/A" retention policy, regardless of jurisdiction. With consent given
/// the status names the regulation the deployment is compliant with.
pub fn check(consent_given: bool, jurisdiction: Jurisdiction) -> ComplianceResult {
    if !consent_given {
        return ComplianceResult {
            compliance_status: VIOLATION_STATUS.to_string(),
            retention_policy: "N/A".to_string(),
        };
    }

    ComplianceResult {
        compliance_status: format!(
            "Compliance checks passed. {} compliant.",
            jurisdiction.regulation()
        ),
        retention_policy: jurisdiction.retention_policy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_flags_missing_consent_regardless_of_jurisdiction() {
        for jurisdiction in [Jurisdiction::Eu, Jurisdiction::India, Jurisdiction::Usa] {
            let result = check(false, jurisdiction);
            assert!(result.compliance_status.starts_with("Critical Violation"));
            assert_eq!(result.retention_policy, "N/A");
            assert!(result.is_violation());
        }
    }

    #[test]
    fn test_check_maps_jurisdictions_to_regulations() {
        let eu = check(true, Jurisdiction::Eu);
        assert_eq!(
            eu.compliance_status,
            "Compliance checks passed. GDPR compliant."
        );
        assert_eq!(eu.retention_policy, "5-year retention under GDPR.");

        let india = check(true, Jurisdiction::India);
        assert!(india.compliance_status.contains("DISHA"));
        assert_eq!(india.retention_policy, "10-year retention as per local law.");

        let usa = check(true, Jurisdiction::Usa);
        assert!(usa.compliance_status.contains("HIPAA"));
        assert_eq!(usa.retention_policy, "7-year retention under HIPAA.");
        assert!(!usa.is_violation());
    }

    #[test]
    fn test_jurisdiction_parsing_is_case_insensitive_with_default() {
        assert_eq!(Jurisdiction::from_setting("eu"), Jurisdiction::Eu);
        assert_eq!(Jurisdiction::from_setting(" India "), Jurisdiction::India);
        assert_eq!(Jurisdiction::from_setting("USA"), Jurisdiction::Usa);
        assert_eq!(Jurisdiction::from_setting("Atlantis"), Jurisdiction::Usa);
        assert_eq!(Jurisdiction::from_setting(""), Jurisdiction::Usa);
    }
}
