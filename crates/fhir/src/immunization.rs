//! FHIR-aligned Immunization search wire models and translation helpers.
//!
//! This module reads the search-set `Bundle` returned by
//! `GET {base}/Immunization?patient={id}` and flattens it into the fields the
//! service renders: the vaccine name and the optional expiration date.
//!
//! Responsibilities:
//! - Define flat domain-level types for use by the pipeline
//! - Define a lenient wire model (FHIR servers add many fields we do not read)
//! - Validate the bundle shape and report the failing path on mismatch
//!
//! Notes:
//! - Entries whose resource is not an `Immunization` (for example an `OperationOutcome`
//!   carried with `search.mode = outcome`) are skipped
//! - An `Immunization` without `vaccineCode.text` is a schema error

use crate::FhirError;
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Flat view of an Immunization search result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImmunizationBundle {
    /// Number of matches reported by the server, if it reported one.
    pub total: Option<u64>,

    /// Immunization entries in server order.
    pub entries: Vec<ImmunizationEntry>,
}

impl ImmunizationBundle {
    /// True when the server explicitly reported zero matches.
    pub fn reports_no_matches(&self) -> bool {
        self.total == Some(0)
    }
}

/// One immunization, reduced to the fields the card shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmunizationEntry {
    /// Human readable vaccine name (`vaccineCode.text`).
    pub vaccine: String,

    /// `expirationDate` exactly as sent by the server, if any.
    pub expiration_date: Option<String>,
}

// ============================================================================
// Public Immunization operations
// ============================================================================

/// Immunization resource operations.
///
/// This is a zero-sized type used for namespacing immunization-related operations.
pub struct Immunization;

impl Immunization {
    /// Resource type name used in search URLs.
    pub const RESOURCE_TYPE: &'static str = "Immunization";

    /// Parse an Immunization search `Bundle` from JSON bytes.
    ///
    /// This uses `serde_path_to_error` to surface the path (e.g. `entry[0].resource.vaccineCode`)
    /// to the failing field when the JSON does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the body is not JSON (`InvalidJson`),
    /// - any read field has an unexpected type (`Translation`),
    /// - an Immunization entry has no `vaccineCode.text` (`Translation`),
    /// - `resourceType` is present and is not `"Bundle"` (`InvalidInput`).
    pub fn parse_search_bundle(json: &[u8]) -> Result<ImmunizationBundle, FhirError> {
        let mut deserializer = serde_json::Deserializer::from_slice(json);

        let wire = match serde_path_to_error::deserialize::<_, BundleWire>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                if source.is_syntax() || source.is_eof() {
                    return Err(FhirError::InvalidJson(source));
                }
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };
        deserializer.end()?;

        if let Some(resource_type) = wire.resource_type.as_deref() {
            if resource_type != "Bundle" {
                return Err(FhirError::InvalidInput(format!(
                    "Expected resourceType 'Bundle', got '{resource_type}'"
                )));
            }
        }

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a search-set bundle.
///
/// Unknown keys are accepted: servers add `link`, `meta`, `search` and so on.
#[derive(Clone, Debug, Deserialize)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: Option<String>,

    total: Option<u64>,

    #[serde(default)]
    entry: Vec<EntryWire>,
}

#[derive(Clone, Debug, Deserialize)]
struct EntryWire {
    resource: ResourceWire,
}

#[derive(Clone, Debug, Deserialize)]
struct ResourceWire {
    #[serde(rename = "resourceType")]
    resource_type: Option<String>,

    #[serde(rename = "vaccineCode")]
    vaccine_code: Option<CodeableConceptWire>,

    #[serde(rename = "expirationDate")]
    expiration_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct CodeableConceptWire {
    text: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: BundleWire) -> Result<ImmunizationBundle, FhirError> {
    let mut entries = Vec::with_capacity(wire.entry.len());

    for (index, entry) in wire.entry.into_iter().enumerate() {
        let resource = entry.resource;

        if let Some(resource_type) = resource.resource_type.as_deref() {
            if resource_type != Immunization::RESOURCE_TYPE {
                continue;
            }
        }

        let vaccine = resource
            .vaccine_code
            .and_then(|code| code.text)
            .ok_or_else(|| {
                FhirError::Translation(format!(
                    "Bundle schema mismatch at entry[{index}].resource: missing vaccineCode.text"
                ))
            })?;

        entries.push(ImmunizationEntry {
            vaccine,
            expiration_date: resource.expiration_date,
        });
    }

    Ok(ImmunizationBundle {
        total: wire.total,
        entries,
    })
}
