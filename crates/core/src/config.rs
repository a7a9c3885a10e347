//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables.

use crate::constants::{DEFAULT_FHIR_TIMEOUT_SECS, DEFAULT_REST_ADDR};
use crate::{CdsError, CdsResult};
use std::net::SocketAddr;
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: SocketAddr,
    fhir_timeout: Duration,
    openapi_enabled: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CdsError::InvalidInput` if `fhir_timeout` is zero.
    pub fn new(
        rest_addr: SocketAddr,
        fhir_timeout: Duration,
        openapi_enabled: bool,
    ) -> CdsResult<Self> {
        if fhir_timeout.is_zero() {
            return Err(CdsError::InvalidInput(
                "FHIR timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            rest_addr,
            fhir_timeout,
            openapi_enabled,
        })
    }

    pub fn rest_addr(&self) -> SocketAddr {
        self.rest_addr
    }

    pub fn fhir_timeout(&self) -> Duration {
        self.fhir_timeout
    }

    pub fn openapi_enabled(&self) -> bool {
        self.openapi_enabled
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            rest_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            fhir_timeout: Duration::from_secs(DEFAULT_FHIR_TIMEOUT_SECS),
            openapi_enabled: false,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the REST bind address from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_REST_ADDR`].
pub fn rest_addr_from_env_value(value: Option<String>) -> CdsResult<SocketAddr> {
    let value = non_blank(value).unwrap_or_else(|| DEFAULT_REST_ADDR.to_string());
    value
        .parse()
        .map_err(|e| CdsError::InvalidInput(format!("invalid REST address '{value}': {e}")))
}

/// Parse the outbound FHIR timeout (whole seconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of
/// [`DEFAULT_FHIR_TIMEOUT_SECS`] seconds.
pub fn fhir_timeout_from_env_value(value: Option<String>) -> CdsResult<Duration> {
    let Some(value) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_FHIR_TIMEOUT_SECS));
    };

    let secs: u64 = value
        .parse()
        .map_err(|e| CdsError::InvalidInput(format!("invalid FHIR timeout '{value}': {e}")))?;
    if secs == 0 {
        return Err(CdsError::InvalidInput(
            "FHIR timeout must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

/// Parse the OpenAPI toggle from an optional string value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` (case-insensitive). Absent means off.
pub fn openapi_enabled_from_env_value(value: Option<String>) -> CdsResult<bool> {
    let Some(value) = non_blank(value) else {
        return Ok(false);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CdsError::InvalidInput(format!(
            "invalid OpenAPI toggle '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        assert_eq!(
            rest_addr_from_env_value(None).unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            fhir_timeout_from_env_value(Some("  ".into())).unwrap(),
            Duration::from_secs(10)
        );
        assert!(!openapi_enabled_from_env_value(None).unwrap());
    }

    #[test]
    fn parses_explicit_values() {
        assert_eq!(
            rest_addr_from_env_value(Some("127.0.0.1:8080".into())).unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            fhir_timeout_from_env_value(Some("3".into())).unwrap(),
            Duration::from_secs(3)
        );
        assert!(openapi_enabled_from_env_value(Some("TRUE".into())).unwrap());
        assert!(!openapi_enabled_from_env_value(Some("off".into())).unwrap());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(rest_addr_from_env_value(Some("localhost".into())).is_err());
        assert!(fhir_timeout_from_env_value(Some("0".into())).is_err());
        assert!(fhir_timeout_from_env_value(Some("ten".into())).is_err());
        assert!(openapi_enabled_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        assert!(CoreConfig::new(addr, Duration::ZERO, false).is_err());
        let cfg = CoreConfig::new(addr, Duration::from_secs(2), true).unwrap();
        assert_eq!(cfg.fhir_timeout(), Duration::from_secs(2));
        assert!(cfg.openapi_enabled());
    }
}
