//! # API Shared
//!
//! Shared utilities and definitions for the triage APIs.
//!
//! Contains:
//! - Common response types (`HealthRes`, `ErrorRes`)
//! - Shared services like `HealthService`
//!
//! Used by the REST binary for common functionality.

pub mod health;

pub use health::{ErrorRes, HealthRes, HealthService};
