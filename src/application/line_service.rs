//! Lines and their shared conferences
//!
//! A line keeps one bridge conference for as long as the bridge reports it
//! alive. Conference creation for lines goes through the admission queue so
//! concurrent requests never allocate twice.

use crate::application::admission_queue::ConferenceQueue;
use crate::application::sdp::{EndpointLocation, SdpEngine};
use crate::domain::line::{Line, LineRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{EndpointId, LineId};
use crate::domain::smb::{ConferenceEndpointState, RelayType, SmbClient};
use std::sync::Arc;
use tracing::{debug, info};

/// Bridge deployment serving lines
#[derive(Debug, Clone)]
pub struct LineBridge {
    pub url: String,
    pub api_key: String,
    pub endpoint_idle_timeout_secs: u32,
}

/// Result of a WHIP ingest
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSession {
    pub line_id: LineId,
    pub endpoint_id: EndpointId,
    pub answer_sdp: String,
}

#[derive(Clone)]
pub struct LineService {
    lines: Arc<dyn LineRepository>,
    smb: Arc<dyn SmbClient>,
    sdp: SdpEngine,
    queue: Arc<ConferenceQueue>,
    bridge: LineBridge,
}

impl LineService {
    pub fn new(lines: Arc<dyn LineRepository>, smb: Arc<dyn SmbClient>, bridge: LineBridge) -> Self {
        Self {
            lines,
            sdp: SdpEngine::new(smb.clone()),
            smb,
            queue: Arc::new(ConferenceQueue::new()),
            bridge,
        }
    }

    pub async fn create_line(&self, name: &str) -> Result<Line> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Line name must not be empty"));
        }
        let line = Line::new(name);
        self.lines.save(&line).await?;
        info!("Created line {} ({})", line.id, line.name);
        Ok(line)
    }

    pub async fn get_line(&self, line_id: &LineId) -> Result<Line> {
        self.lines
            .find_by_id(line_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Line {}", line_id)))
    }

    /// Conference serving the line, allocated if the stored one is gone
    pub async fn get_or_create_conference(&self, line_id: &LineId) -> Result<String> {
        self.queue
            .enqueue(move || async move {
                let line = self.get_line(line_id).await?;
                let live = self
                    .smb
                    .get_conferences(&self.bridge.url, &self.bridge.api_key)
                    .await;

                if line.has_conference() && live.contains(&line.smb_conference_id) {
                    debug!("Reusing conference {} for line {}", line.smb_conference_id, line_id);
                    return Ok(line.smb_conference_id);
                }

                let conference_id = self
                    .smb
                    .allocate_conference(&self.bridge.url, &self.bridge.api_key)
                    .await?;
                self.lines.set_conference(line_id, &conference_id).await?;
                info!("Allocated conference {} for line {}", conference_id, line_id);
                Ok(conference_id)
            })
            .await
    }

    /// Endpoint states of the line's conference; empty without one
    pub async fn participants(&self, line_id: &LineId) -> Result<Vec<ConferenceEndpointState>> {
        let line = self.get_line(line_id).await?;
        if !line.has_conference() {
            return Ok(Vec::new());
        }
        self.smb
            .get_conference_detail(&self.bridge.url, &line.smb_conference_id, &self.bridge.api_key)
            .await
    }

    /// Publish a WHIP client into the line's conference
    pub async fn ingest(&self, line_id: &LineId, offer_sdp: &str) -> Result<IngestSession> {
        let conference_id = self.get_or_create_conference(line_id).await?;
        let endpoint_id = EndpointId::new();

        let endpoint = self
            .smb
            .allocate_endpoint(
                &self.bridge.url,
                &conference_id,
                endpoint_id.as_str(),
                true,
                false,
                false,
                RelayType::SsrcRewrite,
                self.bridge.endpoint_idle_timeout_secs,
                &self.bridge.api_key,
            )
            .await?;

        let location = EndpointLocation {
            base_url: self.bridge.url.clone(),
            api_key: self.bridge.api_key.clone(),
            conference_id,
            endpoint_id: endpoint_id.to_string(),
        };
        let answer_sdp = self
            .sdp
            .configure_from_client_offer(&location, &endpoint, offer_sdp)
            .await?;

        metrics::counter!("whip_ingests_total").increment(1);
        info!(
            conference_id = %location.conference_id,
            "WHIP ingest {} joined line {}",
            endpoint_id,
            line_id
        );
        Ok(IngestSession {
            line_id: *line_id,
            endpoint_id,
            answer_sdp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sdp::fixtures::{bridge_endpoint, WHIP_OFFER};
    use crate::domain::smb::MockSmbClient;
    use crate::infrastructure::persistence::InMemoryLineRepository;

    fn bridge() -> LineBridge {
        LineBridge {
            url: "http://smb:8080/conferences/".to_string(),
            api_key: String::new(),
            endpoint_idle_timeout_secs: 60,
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_allocate_once() {
        let live = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let mut smb = MockSmbClient::new();
        let listed = live.clone();
        smb.expect_get_conferences()
            .returning(move |_, _| listed.lock().unwrap().clone());
        let allocated = live.clone();
        smb.expect_allocate_conference()
            .times(1)
            .returning(move |_, _| {
                allocated.lock().unwrap().push("conf-line".to_string());
                Ok("conf-line".to_string())
            });
        let lines = Arc::new(InMemoryLineRepository::new());
        let service = LineService::new(lines.clone(), Arc::new(smb), bridge());
        let line = service.create_line("studio").await.unwrap();

        let (a, b) = tokio::join!(
            service.get_or_create_conference(&line.id),
            service.get_or_create_conference(&line.id)
        );
        assert_eq!(a.unwrap(), "conf-line");
        assert_eq!(b.unwrap(), "conf-line");
        assert_eq!(
            lines.find_by_id(&line.id).await.unwrap().unwrap().smb_conference_id,
            "conf-line"
        );
    }

    #[tokio::test]
    async fn test_live_conference_is_reused() {
        let mut smb = MockSmbClient::new();
        smb.expect_get_conferences()
            .returning(|_, _| vec!["conf-live".to_string()]);
        smb.expect_allocate_conference().times(0);
        let lines = Arc::new(InMemoryLineRepository::new());
        let service = LineService::new(lines.clone(), Arc::new(smb), bridge());
        let line = service.create_line("studio").await.unwrap();
        lines.set_conference(&line.id, "conf-live").await.unwrap();

        let conference = service.get_or_create_conference(&line.id).await.unwrap();
        assert_eq!(conference, "conf-live");
    }

    #[tokio::test]
    async fn test_participants_without_conference() {
        let mut smb = MockSmbClient::new();
        smb.expect_get_conference_detail().times(0);
        let service = LineService::new(Arc::new(InMemoryLineRepository::new()), Arc::new(smb), bridge());
        let line = service.create_line("studio").await.unwrap();

        assert!(service.participants(&line.id).await.unwrap().is_empty());
        assert!(matches!(
            service.participants(&LineId::new()).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ingest_allocates_receive_endpoint() {
        let mut smb = MockSmbClient::new();
        smb.expect_get_conferences().returning(|_, _| Vec::new());
        smb.expect_allocate_conference()
            .returning(|_, _| Ok("conf-line".to_string()));
        smb.expect_allocate_endpoint()
            .withf(|_, conf, _, audio, data, controlling, relay, _, _| {
                conf == "conf-line"
                    && *audio
                    && !*data
                    && !*controlling
                    && *relay == RelayType::SsrcRewrite
            })
            .times(1)
            .returning(|_, _, _, _, _, _, _, _, _| {
                let mut endpoint = bridge_endpoint();
                endpoint.data = None;
                Ok(endpoint)
            });
        smb.expect_configure_endpoint()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        let service = LineService::new(Arc::new(InMemoryLineRepository::new()), Arc::new(smb), bridge());
        let line = service.create_line("studio").await.unwrap();

        let session = service.ingest(&line.id, WHIP_OFFER).await.unwrap();
        assert!(session.answer_sdp.contains("a=recvonly"));
        assert!(session.answer_sdp.contains("a=ice-ufrag:smbUfrag"));
        assert_eq!(service.get_line(&line.id).await.unwrap().smb_conference_id, "conf-line");
    }
}
