use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CdsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported hook: '{0}'")]
    UnsupportedHook(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("FHIR request failed: {0}")]
    Upstream(#[source] reqwest::Error),
    #[error("FHIR request timed out after {0:?}")]
    UpstreamTimeout(Duration),
    #[error("FHIR server answered {status} for {url}")]
    UpstreamStatus { status: u16, url: String },
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("failed to load collation data: {0}")]
    Collation(String),
}

pub type CdsResult<T> = std::result::Result<T, CdsError>;
