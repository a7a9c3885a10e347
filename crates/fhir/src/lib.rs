//! FHIR wire/boundary support for the CDS Hooks service.
//!
//! This crate provides **wire models** and **translation helpers** for the FHIR resources the
//! service reads from an EHR's FHIR server:
//! - Immunization search results (`Bundle` of `Immunization` resources)
//!
//! This crate focuses on:
//! - serialisation/deserialisation of FHIR JSON
//! - translation between wire structs and flat domain types
//!
//! Transport (HTTP, auth headers, timeouts) lives in `cds-core`.

pub mod immunization;

// Re-export facades
pub use immunization::Immunization;

// Re-export public domain-level types
pub use immunization::{ImmunizationBundle, ImmunizationEntry};

/// Media type requested from FHIR servers.
pub const FHIR_JSON_MEDIA_TYPE: &str = "application/json+fhir";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
