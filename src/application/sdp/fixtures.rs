//! Shared test inputs

use crate::domain::smb::{
    SmbAudio, SmbBundleTransport, SmbCandidate, SmbData, SmbDtls, SmbEndpointDescription, SmbIce,
    SmbPayloadType, SmbRtpHeaderExtension,
};
use serde_json::json;

/// Endpoint as the bridge returns it from an audio+data allocation
pub fn bridge_endpoint() -> SmbEndpointDescription {
    let mut parameters = serde_json::Map::new();
    parameters.insert("minptime".to_string(), json!("10"));
    parameters.insert("useinbandfec".to_string(), json!("1"));

    SmbEndpointDescription {
        bundle_transport: Some(SmbBundleTransport {
            ice: Some(SmbIce {
                ufrag: "smbUfrag".to_string(),
                pwd: "smbPassword".to_string(),
                candidates: vec![SmbCandidate {
                    generation: 0,
                    component: 1,
                    protocol: "udp".to_string(),
                    port: 10000,
                    ip: "192.0.2.10".to_string(),
                    rel_port: None,
                    rel_addr: None,
                    foundation: "1".to_string(),
                    priority: 2130706431,
                    candidate_type: "host".to_string(),
                    network: None,
                }],
            }),
            dtls: Some(SmbDtls {
                setup: "actpass".to_string(),
                hash_type: "sha-256".to_string(),
                hash: "AB:CD:EF".to_string(),
            }),
            rtcp_mux: Some(true),
        }),
        audio: Some(SmbAudio {
            ssrcs: vec![1111],
            payload_type: SmbPayloadType {
                id: 111,
                name: "opus".to_string(),
                clockrate: 48000,
                channels: Some(2),
                parameters,
                rtcp_fbs: Vec::new(),
            },
            rtp_hdrexts: vec![SmbRtpHeaderExtension {
                id: 1,
                uri: "urn:ietf:params:rtp-hdrext:ssrc-audio-level".to_string(),
            }],
        }),
        video: None,
        data: Some(SmbData { port: 5000 }),
    }
}

/// Chrome-style WHIP offer: opus and PCMU audio, VP8 with RTX and H264
/// video, session-level ICE credentials
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
a=candidate:842163049 1 udp 1677729535 198.51.100.2 46154 typ srflx raddr 192.168.1.5 rport 46154 generation 0 network-id 1\r\n\
a=mid:0\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=sendonly\r\n\
a=msid:stream audiotrack\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=rtcp-fb:111 transport-cc\r\n\
a=fmtp:111 minptime=10;useinbandfec=1\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=ssrc:3333 cname:client\r\n\
a=ssrc:3333 msid:stream audiotrack\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97 102\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:1\r\n\
a=extmap:2 urn:ietf:params:rtp-hdrext:toffset\r\n\
a=extmap:3 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time\r\n\
a=extmap:10 urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id\r\n\
a=sendonly\r\n\
a=msid:stream videotrack\r\n\
a=rtcp-mux\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=rtcp-fb:96 nack\r\n\
a=rtpmap:97 rtx/90000\r\n\
a=fmtp:97 apt=96\r\n\
a=rtpmap:102 H264/90000\r\n\
a=fmtp:102 profile-level-id=42e01f\r\n\
a=ssrc-group:FID 4444 5555\r\n\
a=ssrc:4444 cname:client\r\n\
a=ssrc:4444 msid:stream videotrack\r\n\
a=ssrc:5555 cname:client\r\n\
a=ssrc:5555 msid:stream videotrack\r\n";
