use std::num::NonZeroUsize;
use std::sync::Mutex;

use log::{debug, warn};
use lru::LruCache;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Announcement, Config, ROA};
use crate::settings::EditorSettings;
use crate::shared::{ROAValidity, ASN};

const VALIDATE_ROA_PATH: &str = "/api/validate-roa";

#[derive(Debug, Error)]
pub enum RoaLookupError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server answered {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    prefix: &'a str,
    origin: ASN,
    roas: &'a [ROA],
}

/// Client for the simulator's ROA validation endpoint.
///
/// Lookups never fail from the caller's point of view: anything that goes
/// wrong is logged and reported as [`ROAValidity::Unknown`].
pub struct RoaClient {
    http: Client,
    endpoint: String,
    cache: Mutex<LruCache<String, ROAValidity>>,
}

impl RoaClient {
    pub fn new(settings: &EditorSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.request_timeout()).build()?;
        let capacity = NonZeroUsize::new(settings.roa_cache_size).unwrap_or(NonZeroUsize::MIN);
        Ok(RoaClient {
            http,
            endpoint: format!(
                "{}{}",
                settings.api_base_url.trim_end_matches('/'),
                VALIDATE_ROA_PATH
            ),
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// One lookup per announcement, issued in order. Without any ROA data
    /// every announcement is Unknown.
    pub fn validate_config(&self, config: &Config) -> Vec<ROAValidity> {
        let announcements = config.announcements.as_deref().unwrap_or_default();
        match config.roas.as_deref() {
            Some(roas) => announcements
                .iter()
                .map(|ann| self.validate(ann, roas))
                .collect(),
            None => vec![ROAValidity::Unknown; announcements.len()],
        }
    }

    pub fn validate(&self, ann: &Announcement, roas: &[ROA]) -> ROAValidity {
        let Some(origin) = ann.origin() else {
            debug!("Announcement {:?} has no origin", ann.prefix);
            return ROAValidity::Unknown;
        };
        if ann.network().is_none() {
            debug!("Announcement prefix {:?} does not parse", ann.prefix);
            return ROAValidity::Unknown;
        }

        let request = ValidationRequest {
            prefix: ann.prefix.trim(),
            origin,
            roas,
        };
        let body = match serde_json::to_string(&request) {
            Ok(body) => body,
            Err(err) => {
                warn!("Cannot encode ROA validation request: {}", err);
                return ROAValidity::Unknown;
            }
        };

        if let Some(validity) = self.cached(&body) {
            return validity;
        }

        match self.request(body.clone()) {
            Ok(validity) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.put(body, validity);
                }
                validity
            }
            Err(err) => {
                warn!("ROA validation for {} from AS {} failed: {}", request.prefix, origin, err);
                ROAValidity::Unknown
            }
        }
    }

    fn cached(&self, body: &str) -> Option<ROAValidity> {
        self.cache.lock().ok()?.get(body).copied()
    }

    fn request(&self, body: String) -> Result<ROAValidity, RoaLookupError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(RoaLookupError::Status {
                status,
                detail: error_detail(&text),
            });
        }

        let label: String = serde_json::from_str(&text)?;
        Ok(ROAValidity::from_label(&label).unwrap_or_else(|| {
            warn!("Unrecognized ROA validity {:?}", label);
            ROAValidity::Unknown
        }))
    }
}

/// Pulls `detail[0].msg` out of a validation error body, if present.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/detail/0/msg")
                .and_then(|msg| msg.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
