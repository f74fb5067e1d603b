//! Media bridge HTTP client
//!
//! Speaks the bridge's conference/endpoint allocation protocol over JSON.
//! The base URL is the conferences collection, e.g.
//! `http://smb:8080/conferences/`.

use super::error::SmbError;
use crate::domain::shared::result::Result;
use crate::domain::smb::{ConferenceEndpointState, RelayType, SmbClient, SmbEndpointDescription};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-APIkey";

/// reqwest-backed [`SmbClient`]
#[derive(Clone)]
pub struct SmbHttpClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct AllocatedConference {
    id: String,
}

#[derive(Debug, Serialize)]
struct ConfigureRequest<'a> {
    action: &'static str,
    #[serde(flatten)]
    description: &'a SmbEndpointDescription,
}

impl SmbHttpClient {
    pub fn new(request_timeout: Duration) -> std::result::Result<Self, SmbError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    fn authorize(request: RequestBuilder, api_key: &str) -> RequestBuilder {
        if api_key.is_empty() {
            request
        } else {
            request.header(API_KEY_HEADER, api_key)
        }
    }

    fn conferences_url(base_url: &str) -> String {
        if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        }
    }

    fn endpoint_url(base_url: &str, conference_id: &str, endpoint_id: &str) -> String {
        format!(
            "{}{}/{}",
            Self::conferences_url(base_url),
            conference_id,
            endpoint_id
        )
    }

    /// Turn a non-success response into [`SmbError::Status`], keeping the
    /// body (JSON or text) for diagnostics
    async fn check(response: Response) -> std::result::Result<Response, SmbError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let body = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value.to_string(),
            Err(_) => body,
        };
        Err(SmbError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn list_conferences(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> std::result::Result<Vec<String>, SmbError> {
        let request = self.client.get(Self::conferences_url(base_url));
        let response = Self::check(Self::authorize(request, api_key).send().await?).await?;
        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| SmbError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SmbClient for SmbHttpClient {
    async fn allocate_conference(&self, base_url: &str, api_key: &str) -> Result<String> {
        let request = self
            .client
            .post(Self::conferences_url(base_url))
            .json(&json!({}));
        let response = Self::check(Self::authorize(request, api_key).send().await.map_err(SmbError::from)?)
            .await?;
        let conference: AllocatedConference = response
            .json()
            .await
            .map_err(|e| SmbError::Decode(e.to_string()))?;

        debug!("Allocated conference {} on {}", conference.id, base_url);
        Ok(conference.id)
    }

    async fn allocate_endpoint(
        &self,
        base_url: &str,
        conference_id: &str,
        endpoint_id: &str,
        audio: bool,
        data: bool,
        ice_controlling: bool,
        relay_type: RelayType,
        idle_timeout_secs: u32,
        api_key: &str,
    ) -> Result<SmbEndpointDescription> {
        let mut body = json!({
            "action": "allocate",
            "bundle-transport": {
                "ice-controlling": ice_controlling,
                "ice": true,
                "dtls": true,
                "sdes": false
            },
            "idleTimeout": idle_timeout_secs
        });
        if audio {
            body["audio"] = json!({ "relay-type": relay_type.as_str() });
        }
        if data {
            body["data"] = json!({});
        }

        let request = self
            .client
            .post(Self::endpoint_url(base_url, conference_id, endpoint_id))
            .json(&body);
        let response = Self::check(Self::authorize(request, api_key).send().await.map_err(SmbError::from)?)
            .await?;
        let description: SmbEndpointDescription = response
            .json()
            .await
            .map_err(|e| SmbError::Decode(e.to_string()))?;

        debug!(
            "Allocated endpoint {} in conference {} on {}",
            endpoint_id, conference_id, base_url
        );
        Ok(description)
    }

    async fn configure_endpoint(
        &self,
        base_url: &str,
        conference_id: &str,
        endpoint_id: &str,
        description: &SmbEndpointDescription,
        api_key: &str,
    ) -> Result<()> {
        let body = ConfigureRequest {
            action: "configure",
            description,
        };
        let request = self
            .client
            .post(Self::endpoint_url(base_url, conference_id, endpoint_id))
            .json(&body);
        Self::check(Self::authorize(request, api_key).send().await.map_err(SmbError::from)?).await?;

        debug!(
            "Configured endpoint {} in conference {} on {}",
            endpoint_id, conference_id, base_url
        );
        Ok(())
    }

    async fn get_conferences(&self, base_url: &str, api_key: &str) -> Vec<String> {
        match self.list_conferences(base_url, api_key).await {
            Ok(conferences) => conferences,
            Err(e) => {
                warn!("Failed to list conferences on {}: {}", base_url, e);
                Vec::new()
            }
        }
    }

    async fn get_conference_detail(
        &self,
        base_url: &str,
        conference_id: &str,
        api_key: &str,
    ) -> Result<Vec<ConferenceEndpointState>> {
        let url = format!("{}{}", Self::conferences_url(base_url), conference_id);
        let request = self.client.get(url);
        let response = Self::check(Self::authorize(request, api_key).send().await.map_err(SmbError::from)?)
            .await?;
        let endpoints = response
            .json()
            .await
            .map_err(|e| SmbError::Decode(e.to_string()))?;
        Ok(endpoints)
    }
}
