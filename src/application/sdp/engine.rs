//! SDP engine - offer/answer negotiation against bridge endpoints

use super::inbound::{endpoint_from_client_answer, endpoint_from_client_offer};
use super::offer::{create_offer, MediaStreamDescriptor};
use super::whip::create_whip_whep_answer;
use crate::domain::shared::result::Result;
use crate::domain::smb::{SmbClient, SmbEndpointDescription};
use crate::infrastructure::protocols::webrtc::SessionDescription;
use std::sync::Arc;
use tracing::debug;

/// Where an endpoint lives on the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointLocation {
    pub base_url: String,
    pub api_key: String,
    pub conference_id: String,
    pub endpoint_id: String,
}

/// Negotiates client SDP against bridge endpoints and pushes the result to
/// the bridge
#[derive(Clone)]
pub struct SdpEngine {
    smb: Arc<dyn SmbClient>,
}

impl SdpEngine {
    pub fn new(smb: Arc<dyn SmbClient>) -> Self {
        Self { smb }
    }

    /// Offer made by the bridge endpoint, rendered as SDP text
    pub fn offer(
        &self,
        endpoint: &SmbEndpointDescription,
        audio_streams: &[MediaStreamDescriptor],
    ) -> Result<String> {
        Ok(create_offer(endpoint, audio_streams)?.to_sdp_string())
    }

    /// Answer a client offer on behalf of the bridge
    ///
    /// Configures the endpoint with the client's parameters, then returns
    /// the answer built from the endpoint as allocated.
    pub async fn configure_from_client_offer(
        &self,
        location: &EndpointLocation,
        endpoint: &SmbEndpointDescription,
        offer_sdp: &str,
    ) -> Result<String> {
        let offer = SessionDescription::parse(offer_sdp)?;
        let configured = endpoint_from_client_offer(endpoint, &offer)?;

        self.smb
            .configure_endpoint(
                &location.base_url,
                &location.conference_id,
                &location.endpoint_id,
                &configured,
                &location.api_key,
            )
            .await?;
        debug!(
            "Configured endpoint {} from client offer",
            location.endpoint_id
        );

        Ok(create_whip_whep_answer(&offer, endpoint)?.to_sdp_string())
    }

    /// Apply a client's answer to a bridge offer and configure the endpoint
    ///
    /// Returns the description that was pushed.
    pub async fn handle_answer_from_endpoint(
        &self,
        location: &EndpointLocation,
        endpoint: &SmbEndpointDescription,
        answer_sdp: &str,
    ) -> Result<SmbEndpointDescription> {
        let answer = SessionDescription::parse(answer_sdp)?;
        let configured = endpoint_from_client_answer(endpoint, &answer)?;

        self.smb
            .configure_endpoint(
                &location.base_url,
                &location.conference_id,
                &location.endpoint_id,
                &configured,
                &location.api_key,
            )
            .await?;
        debug!(
            "Configured endpoint {} from client answer",
            location.endpoint_id
        );

        Ok(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sdp::fixtures::{bridge_endpoint, WHIP_OFFER};
    use crate::domain::shared::error::DomainError;
    use crate::domain::smb::MockSmbClient;
    use crate::infrastructure::protocols::webrtc::SdpMedia;
    use mockall::predicate::eq;

    fn location() -> EndpointLocation {
        EndpointLocation {
            base_url: "http://smb:8080/conferences/".to_string(),
            api_key: String::new(),
            conference_id: "conf-1".to_string(),
            endpoint_id: "ep-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_configure_from_client_offer_pushes_client_transport() {
        let mut smb = MockSmbClient::new();
        smb.expect_configure_endpoint()
            .with(
                eq("http://smb:8080/conferences/"),
                eq("conf-1"),
                eq("ep-1"),
                mockall::predicate::function(|desc: &SmbEndpointDescription| {
                    desc.ice().map(|ice| ice.ufrag == "clientUfrag").unwrap_or(false)
                        && desc.data.is_none()
                }),
                eq(""),
            )
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));

        let engine = SdpEngine::new(Arc::new(smb));
        let answer = engine
            .configure_from_client_offer(&location(), &bridge_endpoint(), WHIP_OFFER)
            .await
            .unwrap();

        let parsed = SessionDescription::parse(&answer).unwrap();
        assert_eq!(
            parsed.media[0].transport().ice_ufrag.as_deref(),
            Some("smbUfrag")
        );
    }

    #[tokio::test]
    async fn test_bad_sdp_never_reaches_bridge() {
        let mut smb = MockSmbClient::new();
        smb.expect_configure_endpoint().times(0);

        let engine = SdpEngine::new(Arc::new(smb));
        let result = engine
            .handle_answer_from_endpoint(&location(), &bridge_endpoint(), "not sdp")
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_offer_without_audio_ssrc_never_reaches_bridge() {
        let mut smb = MockSmbClient::new();
        smb.expect_configure_endpoint().times(0);
        let offer: String = WHIP_OFFER
            .split_inclusive("\r\n")
            .filter(|line| !line.starts_with("a=ssrc"))
            .collect();

        let engine = SdpEngine::new(Arc::new(smb));
        let result = engine
            .configure_from_client_offer(&location(), &bridge_endpoint(), &offer)
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_bridge_failure_propagates() {
        let mut smb = MockSmbClient::new();
        smb.expect_configure_endpoint().returning(|_, _, _, _, _| {
            Err(DomainError::Upstream {
                status: 500,
                body: "boom".to_string(),
            })
        });

        let engine = SdpEngine::new(Arc::new(smb));
        let result = engine
            .configure_from_client_offer(&location(), &bridge_endpoint(), WHIP_OFFER)
            .await;
        assert!(matches!(result, Err(DomainError::Upstream { status: 500, .. })));
    }
}
