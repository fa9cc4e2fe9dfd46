//! Department resource allocation.
//!
//! Walks the ranked department fit scores in order and selects the first
//! department whose live resource is available. Allocation never fails: when
//! nothing specialised has capacity the patient is routed to the fallback
//! observation area with a stated reason.

use crate::assessment::DepartmentFitScore;

/// Sentinel department used when no ranked department has capacity.
pub const FALLBACK_DEPARTMENT: &str = "General Observation";

/// Point-in-time snapshot of hospital resource availability.
///
/// Read-only to this crate; mutated externally by admin actions. The default
/// mirrors a quiet ward and is used when the caller supplies no snapshot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ResourceSnapshot {
    pub cardiology_beds_available: u32,
    pub emergency_slots_available: u32,
    pub neurologist_on_duty: bool,
    pub general_physicians_available: u32,
    pub icu_beds_available: u32,
}

impl Default for ResourceSnapshot {
    fn default() -> Self {
        Self {
            cardiology_beds_available: 5,
            emergency_slots_available: 2,
            neurologist_on_duty: true,
            general_physicians_available: 10,
            icu_beds_available: 1,
        }
    }
}

impl ResourceSnapshot {
    /// Availability predicate for one department name.
    ///
    /// Matching is case-insensitive over the fixed set {Emergency, Cardiology,
    /// Neurology, General Medicine, ICU}; departments outside the set have no
    /// specific resource constraint and are treated as available.
    fn is_available(&self, department: &str) -> bool {
        match department.to_lowercase().as_str() {
            "emergency" => self.emergency_slots_available > 0,
            "cardiology" => self.cardiology_beds_available > 0,
            "neurology" => self.neurologist_on_duty,
            "general medicine" => self.general_physicians_available > 0,
            "icu" => self.icu_beds_available > 0,
            _ => true,
        }
    }
}

/// Outcome of the allocation stage.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub recommended_department: String,
    /// Present iff the chosen department differs from the top-ranked one, or
    /// the fallback path was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerouted_reason: Option<String>,
}

/// Selects the first available department in rank order.
///
/// Deterministic: no tie-breaking is needed because the first match wins.
/// An empty ranking list takes the fallback path rather than failing.
pub fn allocate(
    ranked_fit_scores: &[DepartmentFitScore],
    resources: &ResourceSnapshot,
) -> AllocationResult {
    let first_choice = ranked_fit_scores.first().map(|f| f.department.as_str());

    let selected = ranked_fit_scores
        .iter()
        .find(|fit| resources.is_available(&fit.department))
        .map(|fit| fit.department.clone());

    match selected {
        Some(department) => {
            let rerouted_reason = match first_choice {
                Some(first) if first != department => Some(format!(
                    "Re-routed from {} to {} due to capacity constraints.",
                    first, department
                )),
                _ => None,
            };
            AllocationResult {
                recommended_department: department,
                rerouted_reason,
            }
        }
        None => AllocationResult {
            recommended_department: FALLBACK_DEPARTMENT.to_string(),
            rerouted_reason: Some(format!(
                "No high-priority specialized departments were available. Patient routed to {}.",
                FALLBACK_DEPARTMENT
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(department: &str, score: f64) -> DepartmentFitScore {
        DepartmentFitScore {
            department: department.into(),
            score,
        }
    }

    #[test]
    fn test_allocate_picks_top_ranked_when_available() {
        let result = allocate(
            &[fit("Cardiology", 0.9), fit("Emergency", 0.7)],
            &ResourceSnapshot::default(),
        );
        assert_eq!(result.recommended_department, "Cardiology");
        assert!(result.rerouted_reason.is_none());
    }

    #[test]
    fn test_allocate_reroutes_when_top_ranked_is_full() {
        let resources = ResourceSnapshot {
            cardiology_beds_available: 0,
            emergency_slots_available: 3,
            ..ResourceSnapshot::default()
        };
        let result = allocate(&[fit("Cardiology", 0.9), fit("Emergency", 0.7)], &resources);
        assert_eq!(result.recommended_department, "Emergency");
        let reason = result.rerouted_reason.expect("should state a reason");
        assert!(reason.contains("Cardiology"));
        assert!(reason.contains("Emergency"));
    }

    #[test]
    fn test_allocate_matches_department_names_case_insensitively() {
        let resources = ResourceSnapshot {
            cardiology_beds_available: 0,
            ..ResourceSnapshot::default()
        };
        let result = allocate(&[fit("CARDIOLOGY", 0.9), fit("emergency", 0.7)], &resources);
        assert_eq!(result.recommended_department, "emergency");
    }

    #[test]
    fn test_allocate_treats_unmapped_departments_as_available() {
        let resources = ResourceSnapshot {
            cardiology_beds_available: 0,
            ..ResourceSnapshot::default()
        };
        let result = allocate(
            &[fit("Cardiology", 0.9), fit("Orthopedics", 0.5)],
            &resources,
        );
        assert_eq!(result.recommended_department, "Orthopedics");
    }

    #[test]
    fn test_allocate_falls_back_when_nothing_is_available() {
        let resources = ResourceSnapshot {
            cardiology_beds_available: 0,
            emergency_slots_available: 0,
            neurologist_on_duty: false,
            general_physicians_available: 0,
            icu_beds_available: 0,
        };
        let result = allocate(
            &[fit("Cardiology", 0.9), fit("Emergency", 0.7), fit("ICU", 0.5)],
            &resources,
        );
        assert_eq!(result.recommended_department, FALLBACK_DEPARTMENT);
        assert!(result.rerouted_reason.expect("reason").contains("No high-priority"));
    }

    #[test]
    fn test_allocate_handles_empty_ranking() {
        let result = allocate(&[], &ResourceSnapshot::default());
        assert_eq!(result.recommended_department, FALLBACK_DEPARTMENT);
        assert!(result.rerouted_reason.is_some());
    }
}
