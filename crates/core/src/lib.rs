//! # CDS Core
//!
//! Business logic for the CDS Hooks immunization service:
//! - Runtime configuration resolved once at startup (`config`)
//! - The static discovery document (`discovery`)
//! - The `patient-view` pipeline: FHIR search, ordering, card rendering (`immunization`)
//! - Markdown table rendering for card details (`markdown`)
//!
//! **No HTTP server concerns**: routing, headers and status codes belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod immunization;
pub mod markdown;

pub use config::CoreConfig;
pub use constants::*;
pub use error::{CdsError, CdsResult};
pub use immunization::{ImmunizationLookup, ImmunizationService};
