/// Health check response body.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error response body returned by REST handlers.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Simple health service usable by any API surface
///
/// This service provides a standardised way to check the health status of the
/// triage system. It can be used both as a static utility and as an
/// instantiated service.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    ///
    /// # Returns
    /// A new `HealthService` instance.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// This is the preferred method for health checks as it doesn't require
    /// instantiating the service.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Triage service is alive".into(),
        }
    }

    /// Instance method for compatibility
    ///
    /// This method is provided for backward compatibility but delegates
    /// to the static `check_health()` method.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health_instance(&self) -> HealthRes {
        Self::check_health()
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(!res.message.is_empty());
    }
}
