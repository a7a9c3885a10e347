//! CDS Hooks wire types.
//!
//! Field names follow the CDS Hooks JSON contract (`fhirServer`, `patientId`, ...); Rust-side
//! names are snake_case.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discovery entry describing one hook this service answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceDescriptor {
    pub hook: String,
    pub title: String,
    pub description: String,
    pub id: String,
}

/// Body of the discovery endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Services {
    pub services: Vec<ServiceDescriptor>,
}

/// Inbound hook invocation sent by the EHR.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HookRequest {
    pub hook: String,

    #[serde(rename = "hookInstance", default, skip_serializing_if = "Option::is_none")]
    pub hook_instance: Option<String>,

    /// Base URL of the EHR's FHIR server.
    #[serde(rename = "fhirServer")]
    pub fhir_server: String,

    /// OAuth token the EHR grants for calls back to `fhir_server`.
    #[serde(
        rename = "fhirAuthorization",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fhir_authorization: Option<FhirAuthorization>,

    pub context: HookContext,
}

/// `context` object of a `patient-view` invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HookContext {
    #[serde(rename = "patientId")]
    pub patient_id: String,

    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Access token for the FHIR server, as passed in `fhirAuthorization`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FhirAuthorization {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

// Keep the token out of logs.
impl std::fmt::Debug for FhirAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FhirAuthorization")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("subject", &self.subject)
            .finish()
    }
}

/// Urgency of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Info,
    Warning,
    Critical,
}

/// Where the information on a card comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CardSource {
    pub label: String,
    pub url: String,
}

/// A single advisory shown to the clinician.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub summary: String,
    /// GitHub-flavoured markdown.
    pub detail: String,
    pub source: CardSource,
    pub indicator: Indicator,
}

/// Body of every `patient-view` answer, including the empty one returned on failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CardsResponse {
    pub cards: Vec<Card>,
}

impl CardsResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Error body for validation failures and unimplemented routes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
