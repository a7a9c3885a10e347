//! Constants used throughout the CDS core crate.
//!
//! Service identity, card wording and configuration defaults live here so the discovery
//! document and the cards stay consistent.

/// The only hook this service answers.
pub const PATIENT_VIEW_HOOK: &str = "patient-view";

/// Service id; also the last path segment of the service URL.
pub const PATIENT_SERVICE_ID: &str = "patientService";

/// Discovery title.
pub const PATIENT_SERVICE_TITLE: &str = "Immunization history";

/// Discovery description.
pub const PATIENT_SERVICE_DESCRIPTION: &str =
    "Displays the patient's immunization records and when each one expires";

/// Summary line of the immunization card.
pub const CARD_SUMMARY: &str = "Immunization history";

/// Source label of the immunization card.
pub const CARD_SOURCE_LABEL: &str = "Patient immunization records";

/// Source link of the immunization card.
pub const CARD_SOURCE_URL: &str = "https://www.hl7.org/fhir/immunization.html";

/// Table cell text for immunizations without an `expirationDate`.
pub const NO_EXPIRATION_TEXT: &str = "Does not expire";

/// Column headers of the immunization table.
pub const TABLE_HEADERS: [&str; 2] = ["Vaccination", "Expiration Date"];

/// Default REST bind address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default budget for the outbound FHIR call, in seconds.
pub const DEFAULT_FHIR_TIMEOUT_SECS: u64 = 10;
