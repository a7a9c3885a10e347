//! # API REST
//!
//! REST surface of the CDS Hooks immunization service.
//!
//! Handles:
//! - the route table (discovery, `patient-view`, CORS preflight, 501 fallback)
//! - response headers required by browser-hosted EHR sandboxes
//! - Authorization header extraction and request validation (400s)
//! - the optional OpenAPI document
//!
//! Uses `cds-core` for the pipeline and `api-shared` for wire types.

#![warn(rust_2018_idioms)]

use api_shared::auth::{credential_from_header, decode_unverified, AuthError};
use api_shared::{
    Card, CardSource, CardsResponse, ErrorRes, FhirAuthorization, HookContext, HookRequest,
    Indicator, ServiceDescriptor, Services,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::Json,
    routing::{get, post},
    Router,
};
use cds_core::immunization::validate_hook;
use cds_core::{CdsResult, CoreConfig, ImmunizationService, PATIENT_SERVICE_ID};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;

/// Discovery endpoint.
pub const CDS_SERVICES_PATH: &str = "/test1/cds-services";

/// OpenAPI document, served only when enabled in [`CoreConfig`].
pub const OPENAPI_PATH: &str = "/test1/api-docs/openapi.json";

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str =
    "Content-Type, Authorization, Origin, Accept, Content-Location, Location, X-Requested-With";

/// Path of the `patient-view` service.
pub fn patient_service_path() -> String {
    format!("{CDS_SERVICES_PATH}/{PATIENT_SERVICE_ID}")
}

/// Application state shared across REST API handlers
///
/// Both fields are immutable handles; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    immunization_service: ImmunizationService,
}

impl AppState {
    /// Build the state from configuration resolved at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be built.
    pub fn new(cfg: Arc<CoreConfig>) -> CdsResult<Self> {
        Ok(Self {
            immunization_service: ImmunizationService::new(cfg.clone())?,
            cfg,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(discovery, patient_view, patient_view_preflight),
    components(schemas(
        Services,
        ServiceDescriptor,
        HookRequest,
        HookContext,
        FhirAuthorization,
        CardsResponse,
        Card,
        CardSource,
        Indicator,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Build the immutable route table.
///
/// Every response, including 4xx/5xx and the fallback, carries the CORS headers.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route(
            CDS_SERVICES_PATH,
            get(discovery).options(discovery).fallback(not_implemented),
        )
        .route(
            &patient_service_path(),
            post(patient_view)
                .options(patient_view_preflight)
                .fallback(not_implemented),
        );

    if state.cfg.openapi_enabled() {
        app = app.route(OPENAPI_PATH, get(openapi_json).fallback(not_implemented));
    }

    app.fallback(not_implemented)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("access-control-allow-method"),
                    HeaderValue::from_static(ALLOW_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOW_HEADERS),
                )),
        )
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/test1/cds-services",
    responses(
        (status = 200, description = "CDS Hooks discovery document", body = Services)
    )
)]
/// CDS Hooks discovery endpoint
///
/// Also bound to OPTIONS. Headers and query are ignored.
#[axum::debug_handler]
async fn discovery(State(_state): State<AppState>, method: Method) -> Json<Services> {
    tracing::info!(%method, "discovery requested");
    Json(cds_core::discovery::services())
}

#[utoipa::path(
    options,
    path = "/test1/cds-services/patientService",
    responses(
        (status = 200, description = "CORS preflight acknowledgement")
    )
)]
async fn patient_view_preflight() -> StatusCode {
    tracing::info!("patient-view preflight");
    StatusCode::OK
}

#[utoipa::path(
    post,
    path = "/test1/cds-services/patientService",
    request_body = HookRequest,
    responses(
        (status = 200, description = "Zero or one immunization card", body = CardsResponse),
        (status = 400, description = "Bad request", body = ErrorRes)
    )
)]
/// `patient-view` hook invocation
///
/// Validates the caller's Authorization header and the hook name, then fetches the patient's
/// immunizations from `fhirServer` and renders them as a single card.
///
/// # Returns
/// * `Ok(Json<CardsResponse>)` - one card, or no cards if there are no records or the FHIR
///   server could not be read
/// * `Err((StatusCode, Json<ErrorRes>))` - validation failure
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the Authorization header is missing or has no credential,
/// - the body is not a valid hook request,
/// - `hook` is not `patient-view`.
#[axum::debug_handler]
async fn patient_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CardsResponse>, ApiError> {
    let credential = authorization_credential(&headers).map_err(|e| {
        tracing::warn!("patient-view rejected: {e}");
        bad_request(e.to_string())
    })?;

    match decode_unverified(credential) {
        Ok(claims) => tracing::debug!(
            iss = claims.iss.as_deref().unwrap_or("-"),
            sub = claims.sub.as_deref().unwrap_or("-"),
            aud = ?claims.aud,
            "caller token (unverified)"
        ),
        Err(e) => tracing::warn!("could not decode caller token: {e}"),
    }

    let req: HookRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("invalid hook request body: {e}");
        bad_request(format!("invalid hook request: {e}"))
    })?;

    validate_hook(&req).map_err(|e| {
        tracing::warn!("patient-view rejected: {e}");
        bad_request(e.to_string())
    })?;

    Ok(Json(state.immunization_service.cards_or_empty(&req).await))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Catch-all for unmatched paths and unbound methods.
async fn not_implemented(method: Method, uri: Uri) -> ApiError {
    tracing::warn!(
        %method,
        path = uri.path(),
        query = uri.query().unwrap_or(""),
        "no handler for request"
    );
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorRes::new(format!(
            "{method} {} is not implemented",
            uri.path()
        ))),
    )
}

// Helper functions

fn authorization_credential(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| AuthError::InvalidHeader))
        .transpose()?;
    credential_from_header(value)
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorRes::new(message)))
}
