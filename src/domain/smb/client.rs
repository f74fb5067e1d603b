//! Media bridge protocol port

use crate::domain::shared::result::Result;
use crate::domain::smb::endpoint::SmbEndpointDescription;
use serde::{Deserialize, Serialize};

/// How the bridge relays media to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelayType {
    SsrcRewrite,
    Forwarder,
    Mixed,
}

impl RelayType {
    pub fn as_str(&self) -> &str {
        match self {
            RelayType::SsrcRewrite => "ssrc-rewrite",
            RelayType::Forwarder => "forwarder",
            RelayType::Mixed => "mixed",
        }
    }
}

/// Per-endpoint state reported by the bridge for one conference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceEndpointState {
    pub id: String,
    #[serde(default)]
    pub dtls_state: Option<String>,
    #[serde(default)]
    pub ice_state: Option<String>,
    #[serde(default)]
    pub is_active_talker: bool,
    #[serde(default)]
    pub is_dominant_speaker: bool,
}

/// Allocation and configuration of conferences/endpoints on one bridge
///
/// Every operation takes the bridge base URL and API key so one client can
/// serve several bridge deployments.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SmbClient: Send + Sync {
    /// Allocate a new conference, returning its id
    async fn allocate_conference(&self, base_url: &str, api_key: &str) -> Result<String>;

    /// Allocate an endpoint inside a conference
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<SmbEndpointDescription>;

    /// Push the negotiated remote parameters of an endpoint
    async fn configure_endpoint(
        &self,
        base_url: &str,
        conference_id: &str,
        endpoint_id: &str,
        description: &SmbEndpointDescription,
        api_key: &str,
    ) -> Result<()>;

    /// Ids of the conferences live on the bridge; empty on any failure
    async fn get_conferences(&self, base_url: &str, api_key: &str) -> Vec<String>;

    /// Endpoint states of one conference
    async fn get_conference_detail(
        &self,
        base_url: &str,
        conference_id: &str,
        api_key: &str,
    ) -> Result<Vec<ConferenceEndpointState>>;
}
