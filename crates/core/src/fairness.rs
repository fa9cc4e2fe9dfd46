//! Fairness monitoring over prediction batches.
//!
//! Partitions logged predictions by gender and by age group, compares each
//! group's critical-risk proportion against a single global baseline, and
//! flags groups whose absolute deviation exceeds the configured threshold.
//!
//! Output ordering is deterministic: all gender findings precede all
//! age-group findings, and within each partitioning groups appear in
//! first-seen input order.

use crate::urgency::RiskLevel;
use triage_types::Percentage;

/// One logged prediction with the demographics needed for monitoring.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionLog {
    pub patient_id: String,
    pub age: u32,
    /// Raw gender key (conventionally lowercase: "male", "female", "other").
    pub gender: String,
    pub risk_level: RiskLevel,
    pub urgency_index: u8,
}

/// One flagged demographic group.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BiasDetail {
    /// e.g. "gender:male" or "age_group:child".
    pub demographic_group: String,
    pub metric: String,
    pub group_value: f64,
    pub overall_average: f64,
    /// Absolute deviation from the overall average, in percentage points,
    /// rounded to 2 decimals.
    pub deviation_percentage: f64,
    pub warning: String,
}

/// The monitoring outcome for one batch of predictions.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FairnessReport {
    pub is_bias_detected: bool,
    pub bias_details: Vec<BiasDetail>,
}

/// Age bucket used for the age-group partitioning.
fn age_group(age: u32) -> &'static str {
    if age <= 12 {
        "child"
    } else if age <= 17 {
        "teen"
    } else if age <= 35 {
        "young_adult"
    } else if age <= 64 {
        "adult"
    } else {
        "senior"
    }
}

/// Critical-risk proportion per group, in first-seen input order.
///
/// Group counts are tiny (a handful of genders, five age buckets) so a
/// linear-scan Vec keeps insertion order without pulling in an ordered map.
fn group_proportions<'a, K>(
    predictions: &'a [PredictionLog],
    key: impl Fn(&'a PredictionLog) -> K,
) -> Vec<(K, f64)>
where
    K: PartialEq,
{
    let mut counts: Vec<(K, usize, usize)> = Vec::new();
    for prediction in predictions {
        let group = key(prediction);
        let critical = usize::from(prediction.risk_level == RiskLevel::Critical);
        match counts.iter_mut().find(|(k, _, _)| *k == group) {
            Some((_, criticals, total)) => {
                *criticals += critical;
                *total += 1;
            }
            None => counts.push((group, critical, 1)),
        }
    }
    counts
        .into_iter()
        .map(|(group, criticals, total)| (group, criticals as f64 / total as f64))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn detail_for(group_label: String, group_name: &str, proportion: f64, overall: f64) -> BiasDetail {
    let deviation = (proportion - overall).abs() * 100.0;
    BiasDetail {
        demographic_group: group_label,
        metric: "critical_risk_proportion".to_string(),
        group_value: proportion,
        overall_average: overall,
        deviation_percentage: round2(deviation),
        warning: format!(
            "Potential bias detected for {}: Critical risk proportion ({:.2}%) deviates significantly from overall average ({:.2}%).",
            group_name,
            proportion * 100.0,
            overall * 100.0
        ),
    }
}

/// Monitors one batch of predictions for demographic bias.
///
/// An empty batch reports no bias (and performs no division). A single
/// record is a valid batch and may trivially trigger a flag when its group's
/// proportion deviates from the global average by more than the threshold.
pub fn monitor(predictions: &[PredictionLog], deviation_threshold: Percentage) -> FairnessReport {
    if predictions.is_empty() {
        return FairnessReport {
            is_bias_detected: false,
            bias_details: Vec::new(),
        };
    }

    let total_critical = predictions
        .iter()
        .filter(|p| p.risk_level == RiskLevel::Critical)
        .count();
    let overall = total_critical as f64 / predictions.len() as f64;

    let mut bias_details = Vec::new();

    for (gender, proportion) in group_proportions(predictions, |p| p.gender.as_str()) {
        let deviation = (proportion - overall).abs() * 100.0;
        if deviation > deviation_threshold.value() {
            bias_details.push(detail_for(
                format!("gender:{}", gender),
                &format!("gender '{}'", gender),
                proportion,
                overall,
            ));
        }
    }

    for (bucket, proportion) in group_proportions(predictions, |p| age_group(p.age)) {
        let deviation = (proportion - overall).abs() * 100.0;
        if deviation > deviation_threshold.value() {
            bias_details.push(detail_for(
                format!("age_group:{}", bucket),
                &format!("age group '{}'", bucket),
                proportion,
                overall,
            ));
        }
    }

    if !bias_details.is_empty() {
        tracing::warn!(
            detail_count = bias_details.len(),
            "fairness monitor flagged demographic deviation"
        );
    }

    FairnessReport {
        is_bias_detected: !bias_details.is_empty(),
        bias_details,
    }
}
