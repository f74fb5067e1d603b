//! Endpoint description as exchanged with the media bridge
//!
//! Field names follow the bridge's kebab-case JSON. Every record is a plain
//! value: engines clone what they need and never mutate a borrowed
//! description.

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The bridge's view of one media endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbEndpointDescription {
    #[serde(
        rename = "bundle-transport",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bundle_transport: Option<SmbBundleTransport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<SmbAudio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<SmbVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SmbData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbBundleTransport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice: Option<SmbIce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtls: Option<SmbDtls>,
    #[serde(rename = "rtcp-mux", default, skip_serializing_if = "Option::is_none")]
    pub rtcp_mux: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbIce {
    pub ufrag: String,
    pub pwd: String,
    #[serde(default)]
    pub candidates: Vec<SmbCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmbCandidate {
    #[serde(default)]
    pub generation: u32,
    pub component: u32,
    pub protocol: String,
    pub port: u16,
    pub ip: String,
    #[serde(rename = "rel-port", default, skip_serializing_if = "Option::is_none")]
    pub rel_port: Option<u16>,
    #[serde(rename = "rel-addr", default, skip_serializing_if = "Option::is_none")]
    pub rel_addr: Option<String>,
    pub foundation: String,
    pub priority: u64,
    #[serde(rename = "type")]
    pub candidate_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbDtls {
    pub setup: String,
    #[serde(rename = "type")]
    pub hash_type: String,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbAudio {
    #[serde(default)]
    pub ssrcs: Vec<u32>,
    #[serde(rename = "payload-type")]
    pub payload_type: SmbPayloadType,
    #[serde(rename = "rtp-hdrexts", default)]
    pub rtp_hdrexts: Vec<SmbRtpHeaderExtension>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbPayloadType {
    pub id: u8,
    pub name: String,
    pub clockrate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    #[serde(rename = "rtcp-fbs", default, skip_serializing_if = "Vec::is_empty")]
    pub rtcp_fbs: Vec<SmbRtcpFeedback>,
}

impl SmbPayloadType {
    /// Parameters rendered as an fmtp config (`key=value;key=value`), or
    /// `None` when the payload type carries no parameters
    pub fn fmtp_config(&self) -> Option<String> {
        if self.parameters.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .parameters
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}={}", key, s),
                other => format!("{}={}", key, other),
            })
            .collect();
        Some(pairs.join(";"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmbRtcpFeedback {
    #[serde(rename = "type")]
    pub feedback_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmbRtpHeaderExtension {
    pub id: u16,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbVideo {
    #[serde(default)]
    pub streams: Vec<SmbVideoStream>,
    #[serde(rename = "payload-types", default)]
    pub payload_types: Vec<SmbPayloadType>,
    #[serde(rename = "rtp-hdrexts", default)]
    pub rtp_hdrexts: Vec<SmbRtpHeaderExtension>,
}

/// Video sources grouped under one media-stream id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmbVideoStream {
    pub sources: Vec<SmbVideoSource>,
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmbVideoSource {
    pub main: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmbData {
    pub port: u16,
}

impl SmbEndpointDescription {
    pub fn bundle_transport(&self) -> Result<&SmbBundleTransport> {
        self.bundle_transport
            .as_ref()
            .ok_or_else(|| DomainError::validation("Missing endpoint bundle-transport"))
    }

    pub fn ice(&self) -> Result<&SmbIce> {
        self.bundle_transport()?
            .ice
            .as_ref()
            .ok_or_else(|| DomainError::validation("Missing endpoint ICE parameters"))
    }

    pub fn dtls(&self) -> Result<&SmbDtls> {
        self.bundle_transport()?
            .dtls
            .as_ref()
            .ok_or_else(|| DomainError::validation("Missing endpoint DTLS parameters"))
    }

    pub fn audio(&self) -> Result<&SmbAudio> {
        self.audio
            .as_ref()
            .ok_or_else(|| DomainError::validation("Missing endpoint audio description"))
    }

    /// Checks the preconditions every configure call relies on: transport
    /// credentials present and at least one audio SSRC
    pub fn validate_for_configure(&self) -> Result<()> {
        self.ice()?;
        self.dtls()?;
        if self.audio()?.ssrcs.is_empty() {
            return Err(DomainError::validation("Endpoint audio has no SSRCs"));
        }
        Ok(())
    }
}
