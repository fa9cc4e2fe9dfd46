//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process
//! startup and then passed into core services. The intent is to avoid reading
//! process-wide environment variables during request handling, which can lead
//! to inconsistent behaviour in multi-threaded runtimes and test harnesses.

use crate::compliance::Jurisdiction;
use std::time::Duration;
use triage_types::Percentage;

/// Default fairness deviation threshold, in percentage points.
pub const DEFAULT_DEVIATION_THRESHOLD: f64 = 15.0;

/// Default upper bound on one generative backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    jurisdiction: Jurisdiction,
    deviation_threshold: Percentage,
    backend_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` when the timeout is zero.
    pub fn new(
        jurisdiction: Jurisdiction,
        deviation_threshold: Percentage,
        backend_timeout: Duration,
    ) -> crate::TriageResult<Self> {
        if backend_timeout.is_zero() {
            return Err(crate::TriageError::InvalidInput(
                "backend timeout cannot be zero".into(),
            ));
        }

        Ok(Self {
            jurisdiction,
            deviation_threshold,
            backend_timeout,
        })
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    pub fn deviation_threshold(&self) -> Percentage {
        self.deviation_threshold
    }

    pub fn backend_timeout(&self) -> Duration {
        self.backend_timeout
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            jurisdiction: Jurisdiction::default(),
            deviation_threshold: Percentage::new(DEFAULT_DEVIATION_THRESHOLD)
                .expect("default threshold is in range"),
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }
}

/// Parse the deviation threshold from an optional configuration value.
///
/// If `value` is `None` or empty/whitespace, returns the default threshold.
pub fn deviation_threshold_from_env_value(
    value: Option<String>,
) -> crate::TriageResult<Percentage> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let parsed = match value {
        Some(v) => v.parse::<f64>().map_err(|e| {
            crate::TriageError::InvalidInput(format!("invalid deviation threshold: {}", e))
        })?,
        None => DEFAULT_DEVIATION_THRESHOLD,
    };

    Percentage::new(parsed)
        .map_err(|e| crate::TriageError::InvalidInput(format!("invalid deviation threshold: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_timeout() {
        let err = CoreConfig::new(
            Jurisdiction::Usa,
            Percentage::new(15.0).expect("valid"),
            Duration::ZERO,
        )
        .expect_err("should reject zero timeout");
        assert!(matches!(err, crate::TriageError::InvalidInput(msg) if msg.contains("timeout")));
    }

    #[test]
    fn test_default_uses_usa_and_fifteen_percent() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.jurisdiction(), Jurisdiction::Usa);
        assert_eq!(cfg.deviation_threshold().value(), 15.0);
    }

    #[test]
    fn test_deviation_threshold_from_env_value() {
        assert_eq!(
            deviation_threshold_from_env_value(None).expect("default").value(),
            15.0
        );
        assert_eq!(
            deviation_threshold_from_env_value(Some("  ".into()))
                .expect("default on blank")
                .value(),
            15.0
        );
        assert_eq!(
            deviation_threshold_from_env_value(Some("20".into()))
                .expect("parsed")
                .value(),
            20.0
        );
        let err = deviation_threshold_from_env_value(Some("not-a-number".into()))
            .expect_err("should reject junk");
        assert!(matches!(err, crate::TriageError::InvalidInput(_)));
        let err = deviation_threshold_from_env_value(Some("250".into()))
            .expect_err("should reject out of range");
        assert!(matches!(err, crate::TriageError::InvalidInput(_)));
    }
}
