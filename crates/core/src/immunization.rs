//! The `patient-view` pipeline: fetch immunizations, order them, render one card.
//!
//! ```text
//! validate_hook ─▶ lookup ─▶ sort_by_vaccine ─▶ immunization_card ─▶ CardsResponse
//!                    │              │
//!                    └──── error ───┴──▶ CardsResponse::empty()
//! ```
//!
//! A bundle reporting `total == 0` is not an error: it is [`ImmunizationLookup::NoRecords`] and
//! renders as zero cards.

use crate::config::CoreConfig;
use crate::constants::{CARD_SOURCE_LABEL, CARD_SOURCE_URL, CARD_SUMMARY, PATIENT_VIEW_HOOK};
use crate::markdown::immunization_table;
use crate::{CdsError, CdsResult};
use api_shared::{Card, CardSource, CardsResponse, HookRequest, Indicator};
use fhir::{Immunization, ImmunizationEntry, FHIR_JSON_MEDIA_TYPE};
use icu_collator::{Collator, CollatorOptions};
use reqwest::header::ACCEPT;
use std::sync::Arc;

/// Result of an immunization search that reached the FHIR server and parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImmunizationLookup {
    /// Entries in server order. May be empty when the server omitted `total`.
    Found(Vec<ImmunizationEntry>),
    /// The server reported `total == 0`.
    NoRecords,
}

/// Reject invocations for any hook other than `patient-view`.
pub fn validate_hook(req: &HookRequest) -> CdsResult<()> {
    if req.hook != PATIENT_VIEW_HOOK {
        return Err(CdsError::UnsupportedHook(req.hook.clone()));
    }
    Ok(())
}

/// Stable ascending sort by vaccine name using Unicode root collation.
///
/// Case and accents are secondary to the base letters, so `apple` sorts before `Banana`.
/// Entries with equal names keep their relative order.
pub fn sort_by_vaccine(entries: &mut [ImmunizationEntry]) -> CdsResult<()> {
    let collator = Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|e| CdsError::Collation(e.to_string()))?;
    entries.sort_by(|a, b| collator.compare(&a.vaccine, &b.vaccine));
    Ok(())
}

/// Build the advisory card for already-ordered entries. No entries, no card.
pub fn immunization_card(entries: &[ImmunizationEntry]) -> Option<Card> {
    if entries.is_empty() {
        return None;
    }

    Some(Card {
        summary: CARD_SUMMARY.into(),
        detail: immunization_table(entries),
        source: CardSource {
            label: CARD_SOURCE_LABEL.into(),
            url: CARD_SOURCE_URL.into(),
        },
        indicator: Indicator::Info,
    })
}

/// Turn a lookup outcome into the response body.
pub fn cards_for(lookup: ImmunizationLookup) -> CdsResult<CardsResponse> {
    let mut entries = match lookup {
        ImmunizationLookup::NoRecords => {
            tracing::info!("no immunization record found");
            return Ok(CardsResponse::empty());
        }
        ImmunizationLookup::Found(entries) => entries,
    };

    sort_by_vaccine(&mut entries)?;

    Ok(CardsResponse {
        cards: immunization_card(&entries).into_iter().collect(),
    })
}

/// Fetches immunizations from the EHR's FHIR server and renders them as cards.
///
/// Holds no per-request state; cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct ImmunizationService {
    cfg: Arc<CoreConfig>,
    client: reqwest::Client,
}

impl ImmunizationService {
    /// Creates a service whose outbound calls are bounded by `cfg.fhir_timeout()`.
    ///
    /// # Errors
    ///
    /// Returns `CdsError::HttpClient` if the TLS backend cannot be initialised.
    pub fn new(cfg: Arc<CoreConfig>) -> CdsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.fhir_timeout())
            .build()
            .map_err(CdsError::HttpClient)?;
        Ok(Self { cfg, client })
    }

    /// Search `GET {fhir_server}/Immunization?patient={patient_id}`.
    ///
    /// `access_token`, when given, is sent as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns a `CdsError` if:
    /// - the request cannot be sent or times out,
    /// - the server answers with a non-2xx status,
    /// - the body is not a well-formed Immunization search bundle.
    pub async fn lookup(
        &self,
        fhir_server: &str,
        patient_id: &str,
        access_token: Option<&str>,
    ) -> CdsResult<ImmunizationLookup> {
        let url = format!(
            "{}/{}",
            fhir_server.trim_end_matches('/'),
            Immunization::RESOURCE_TYPE
        );
        tracing::debug!(%url, patient_id, "searching immunizations");

        let mut request = self
            .client
            .get(&url)
            .query(&[("patient", patient_id)])
            .header(ACCEPT, FHIR_JSON_MEDIA_TYPE);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.upstream_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CdsError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await.map_err(|e| self.upstream_error(e))?;
        let bundle = Immunization::parse_search_bundle(&body)?;

        if bundle.reports_no_matches() {
            return Ok(ImmunizationLookup::NoRecords);
        }
        Ok(ImmunizationLookup::Found(bundle.entries))
    }

    /// Run fetch, ordering and rendering for an already-validated request.
    pub async fn try_cards(&self, req: &HookRequest) -> CdsResult<CardsResponse> {
        let access_token = req
            .fhir_authorization
            .as_ref()
            .map(|auth| auth.access_token.as_str());
        let lookup = self
            .lookup(&req.fhir_server, &req.context.patient_id, access_token)
            .await?;
        cards_for(lookup)
    }

    /// Like [`Self::try_cards`], but any failure is logged and answered with no cards.
    ///
    /// CDS clients only branch on the `cards` array, so upstream trouble must not surface as
    /// an error status.
    pub async fn cards_or_empty(&self, req: &HookRequest) -> CardsResponse {
        match self.try_cards(req).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!(
                    fhir_server = %req.fhir_server,
                    hook_instance = req.hook_instance.as_deref().unwrap_or("-"),
                    "patient-view failed, returning no cards: {e}"
                );
                CardsResponse::empty()
            }
        }
    }

    fn upstream_error(&self, err: reqwest::Error) -> CdsError {
        if err.is_timeout() {
            CdsError::UpstreamTimeout(self.cfg.fhir_timeout())
        } else {
            CdsError::Upstream(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::HookContext;
    use std::time::Duration;

    fn entry(vaccine: &str, expiration_date: Option<&str>) -> ImmunizationEntry {
        ImmunizationEntry {
            vaccine: vaccine.into(),
            expiration_date: expiration_date.map(Into::into),
        }
    }

    fn request(hook: &str, fhir_server: &str) -> HookRequest {
        HookRequest {
            hook: hook.into(),
            hook_instance: None,
            fhir_server: fhir_server.into(),
            fhir_authorization: None,
            context: HookContext {
                patient_id: "1288992".into(),
                user_id: None,
            },
        }
    }

    #[test]
    fn validate_hook_accepts_only_patient_view() {
        assert!(validate_hook(&request("patient-view", "http://fhir.example")).is_ok());

        let err = validate_hook(&request("order-select", "http://fhir.example"))
            .expect_err("should reject other hooks");
        assert!(matches!(err, CdsError::UnsupportedHook(hook) if hook == "order-select"));

        assert!(validate_hook(&request("Patient-View", "http://fhir.example")).is_err());
    }

    #[test]
    fn sorts_case_insensitively_before_tertiary_differences() {
        let mut entries = vec![
            entry("Varicella", None),
            entry("apple", None),
            entry("Banana", None),
            entry("Éclair", None),
            entry("Zoster", None),
        ];
        sort_by_vaccine(&mut entries).expect("sort");

        let names: Vec<&str> = entries.iter().map(|e| e.vaccine.as_str()).collect();
        assert_eq!(names, vec!["apple", "Banana", "Éclair", "Varicella", "Zoster"]);
    }

    #[test]
    fn sort_is_stable_for_equal_names() {
        let mut entries = vec![
            entry("Flu", Some("2024-01-01")),
            entry("Covid", None),
            entry("Flu", Some("2023-01-01")),
        ];
        sort_by_vaccine(&mut entries).expect("sort");

        assert_eq!(
            entries,
            vec![
                entry("Covid", None),
                entry("Flu", Some("2024-01-01")),
                entry("Flu", Some("2023-01-01")),
            ]
        );
    }

    #[test]
    fn no_records_renders_no_cards() {
        let cards = cards_for(ImmunizationLookup::NoRecords).expect("cards");
        assert!(cards.cards.is_empty());
    }

    #[test]
    fn found_but_empty_renders_no_cards() {
        let cards = cards_for(ImmunizationLookup::Found(vec![])).expect("cards");
        assert!(cards.cards.is_empty());
    }

    #[test]
    fn renders_single_sorted_card() {
        let lookup = ImmunizationLookup::Found(vec![
            entry("MMR", None),
            entry("Flu", Some("2025-01-01")),
        ]);
        let cards = cards_for(lookup).expect("cards");

        assert_eq!(cards.cards.len(), 1);
        let card = &cards.cards[0];
        assert_eq!(card.indicator, Indicator::Info);
        assert_eq!(card.summary, CARD_SUMMARY);
        assert_eq!(card.source.label, CARD_SOURCE_LABEL);
        assert_eq!(card.source.url, CARD_SOURCE_URL);

        let rows: Vec<&str> = card.detail.lines().skip(2).collect();
        assert_eq!(
            rows,
            vec!["| Flu | 2025-01-01 |", "| MMR | Does not expire |"]
        );
    }

    #[tokio::test]
    async fn unreachable_server_yields_empty_cards() {
        let cfg = Arc::new(
            CoreConfig::new(
                "127.0.0.1:0".parse().unwrap(),
                Duration::from_secs(2),
                false,
            )
            .unwrap(),
        );
        let service = ImmunizationService::new(cfg).expect("service");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let req = request("patient-view", &format!("http://{addr}/fhir"));
        assert!(service.try_cards(&req).await.is_err());
        assert_eq!(service.cards_or_empty(&req).await, CardsResponse::empty());
    }

    #[tokio::test]
    async fn invalid_server_url_yields_empty_cards() {
        let service = ImmunizationService::new(Arc::new(CoreConfig::default())).expect("service");
        let req = request("patient-view", "not a url");
        assert_eq!(service.cards_or_empty(&req).await, CardsResponse::empty());
    }
}
