//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use intercom::domain::smb::{
    ConferenceEndpointState, RelayType, SmbClient, SmbEndpointDescription,
};
use intercom::Result;
use serde_json::json;
use std::sync::Mutex;

/// Endpoint as the bridge returns it from an allocation
pub fn bridge_endpoint(with_data: bool) -> SmbEndpointDescription {
    let mut endpoint = json!({
        "bundle-transport": {
            "dtls": { "setup": "actpass", "type": "sha-256", "hash": "AB:CD:EF:01" },
            "ice": {
                "ufrag": "smbUfrag",
                "pwd": "smbPassword",
                "candidates": [{
                    "generation": 0, "component": 1, "protocol": "udp", "port": 10000,
                    "ip": "192.0.2.10", "foundation": "1", "priority": 2130706431,
                    "type": "host"
                }, {
                    "generation": 0, "component": 1, "protocol": "udp", "port": 10001,
                    "ip": "203.0.113.7", "rel-addr": "192.0.2.10", "rel-port": 10000,
                    "foundation": "2", "priority": 1694498815, "type": "srflx"
                }]
            },
            "rtcp-mux": true
        },
        "audio": {
            "ssrcs": [1111],
            "payload-type": {
                "id": 111, "name": "opus", "clockrate": 48000, "channels": 2,
                "parameters": { "minptime": "10", "useinbandfec": "1" }
            },
            "rtp-hdrexts": [{ "id": 1, "uri": "urn:ietf:params:rtp-hdrext:ssrc-audio-level" }]
        }
    });
    if with_data {
        endpoint["data"] = json!({ "port": 5000 });
    }
    serde_json::from_value(endpoint).expect("valid endpoint description")
}

/// Browser answer to a bridge offer: data channel then one audio track
pub const CLIENT_ANSWER: &str = "v=0\r\n\
o=- 7 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1\r\n\
a=msid-semantic: WMS local\r\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:browserUfrag\r\n\
a=ice-pwd:browserPassword\r\n\
a=fingerprint:sha-256 12:34:56\r\n\
a=setup:active\r\n\
a=mid:0\r\n\
a=sctp-port:5000\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:browserUfrag\r\n\
a=ice-pwd:browserPassword\r\n\
a=fingerprint:sha-256 12:34:56\r\n\
a=setup:active\r\n\
a=mid:1\r\n\
a=sendrecv\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=ssrc:7777 cname:browser\r\n\
a=ssrc:7777 msid:local mic\r\n";

/// WHIP offer with session-level ICE, opus + PCMU audio and VP8 video
pub const WHIP_OFFER: &str = "v=0\r\n\
o=- 4215775240449105457 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1\r\n\
a=msid-semantic: WMS stream\r\n\
a=ice-ufrag:clientUfrag\r\n\
a=ice-pwd:clientPassword\r\n\
a=fingerprint:sha-256 11:22:33:44\r\n\
a=setup:actpass\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111 0\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:0\r\n\
a=sendonly\r\n\
a=msid:stream audiotrack\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=fmtp:111 minptime=10;useinbandfec=1\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=ssrc:3333 cname:client\r\n\
a=ssrc:3333 msid:stream audiotrack\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:1\r\n\
a=sendonly\r\n\
a=msid:stream videotrack\r\n\
a=rtcp-mux\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=rtcp-fb:96 nack\r\n\
a=rtpmap:97 rtx/90000\r\n\
a=fmtp:97 apt=96\r\n\
a=ssrc-group:FID 4444 5555\r\n\
a=ssrc:4444 cname:client\r\n\
a=ssrc:4444 msid:stream videotrack\r\n\
a=ssrc:5555 cname:client\r\n\
a=ssrc:5555 msid:stream videotrack\r\n";

#[derive(Debug, Clone)]
pub struct ConfiguredEndpoint {
    pub conference_id: String,
    pub endpoint_id: String,
    pub description: SmbEndpointDescription,
}

/// In-process media bridge that remembers what it was asked to do
#[derive(Default)]
pub struct FakeSmb {
    conferences: Mutex<Vec<String>>,
    allocated_endpoints: Mutex<Vec<(String, String, RelayType)>>,
    configured: Mutex<Vec<ConfiguredEndpoint>>,
}

impl FakeSmb {
    pub fn conferences(&self) -> Vec<String> {
        self.conferences.lock().unwrap().clone()
    }

    pub fn allocated_endpoints(&self) -> Vec<(String, String, RelayType)> {
        self.allocated_endpoints.lock().unwrap().clone()
    }

    pub fn configured(&self) -> Vec<ConfiguredEndpoint> {
        self.configured.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmbClient for FakeSmb {
    async fn allocate_conference(&self, _base_url: &str, _api_key: &str) -> Result<String> {
        let mut conferences = self.conferences.lock().unwrap();
        let id = format!("conf-{}", conferences.len() + 1);
        conferences.push(id.clone());
        Ok(id)
    }

    async fn allocate_endpoint(
        &self,
        _base_url: &str,
        conference_id: &str,
        endpoint_id: &str,
        _audio: bool,
        data: bool,
        _ice_controlling: bool,
        relay_type: RelayType,
        _idle_timeout_secs: u32,
        _api_key: &str,
    ) -> Result<SmbEndpointDescription> {
        self.allocated_endpoints.lock().unwrap().push((
            conference_id.to_string(),
            endpoint_id.to_string(),
            relay_type,
        ));
        Ok(bridge_endpoint(data))
    }

    async fn configure_endpoint(
        &self,
        _base_url: &str,
        conference_id: &str,
        endpoint_id: &str,
        description: &SmbEndpointDescription,
        _api_key: &str,
    ) -> Result<()> {
        self.configured.lock().unwrap().push(ConfiguredEndpoint {
            conference_id: conference_id.to_string(),
            endpoint_id: endpoint_id.to_string(),
            description: description.clone(),
        });
        Ok(())
    }

    async fn get_conferences(&self, _base_url: &str, _api_key: &str) -> Vec<String> {
        self.conferences()
    }

    async fn get_conference_detail(
        &self,
        _base_url: &str,
        conference_id: &str,
        _api_key: &str,
    ) -> Result<Vec<ConferenceEndpointState>> {
        Ok(self
            .configured()
            .into_iter()
            .filter(|c| c.conference_id == conference_id)
            .map(|c| ConferenceEndpointState {
                id: c.endpoint_id,
                dtls_state: Some("CONNECTED".to_string()),
                ice_state: Some("CONNECTED".to_string()),
                is_active_talker: false,
                is_dominant_speaker: false,
            })
            .collect())
    }
}
