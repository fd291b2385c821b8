//! REST client for the rental backend's agency listing.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::error::BackendError;
use crate::models::Agency;

const AGENCIES_PATH: &str = "agences/";

/// Listing payload: either a bare array or a paginated envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AgencyListing {
    Plain(Vec<Agency>),
    Paginated { results: Vec<Agency> },
}

impl AgencyListing {
    fn into_agencies(self) -> Vec<Agency> {
        match self {
            AgencyListing::Plain(agencies) => agencies,
            AgencyListing::Paginated { results } => results,
        }
    }
}

/// Parse an agency listing body
pub fn parse_agency_listing(body: &str) -> Result<Vec<Agency>, BackendError> {
    let listing: AgencyListing = serde_json::from_str(body)?;
    Ok(listing.into_agencies())
}

/// Backend client
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        // Without a trailing slash, Url::join would drop the last path segment
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let client = reqwest::Client::builder()
            .user_agent("vitarenta-locator/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn agencies_url(&self) -> Result<Url, BackendError> {
        Ok(self.base_url.join(AGENCIES_PATH)?)
    }

    /// Fetch every agency
    pub async fn list_agencies(&self) -> Result<Vec<Agency>, BackendError> {
        let url = self.agencies_url()?;
        debug!("Fetching agencies from {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Agency listing failed with {}: {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let agencies = parse_agency_listing(&body)?;
        info!("Fetched {} agencies", agencies.len());
        Ok(agencies)
    }
}
