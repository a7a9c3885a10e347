//! # API Shared
//!
//! Shared wire definitions for the CDS Hooks service.
//!
//! Contains:
//! - CDS Hooks request/response types (`hooks` module)
//! - Authorization header utilities (`auth` module)
//!
//! Used by `cds-core` and `api-rest`. Types derive `utoipa::ToSchema` so the REST crate can
//! publish them in its OpenAPI document.

pub mod auth;
pub mod hooks;

pub use auth::{AuthError, TokenClaims};
pub use hooks::*;
