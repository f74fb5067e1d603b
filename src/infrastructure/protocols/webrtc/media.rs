//! SDP media sections
//!
//! Each `m=` block is parsed into a record tagged by its media type. All
//! records share a [`MediaTransport`]; audio and video additionally carry
//! [`RtpParameters`].
use crate::infrastructure::protocols::ice::IceCandidate;
use serde::{Deserialize, Serialize};

/// Media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Audio,
    Video,
    Application,
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Application => "application",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "audio" => Some(MediaType::Audio),
            "video" => Some(MediaType::Video),
            "application" => Some(MediaType::Application),
            _ => None,
        }
    }
}

/// Media direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl MediaDirection {
    pub fn as_str(&self) -> &str {
        match self {
            MediaDirection::SendRecv => "sendrecv",
            MediaDirection::SendOnly => "sendonly",
            MediaDirection::RecvOnly => "recvonly",
            MediaDirection::Inactive => "inactive",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "sendrecv" => Some(MediaDirection::SendRecv),
            "sendonly" => Some(MediaDirection::SendOnly),
            "recvonly" => Some(MediaDirection::RecvOnly),
            "inactive" => Some(MediaDirection::Inactive),
            _ => None,
        }
    }
}

/// DTLS fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtlsFingerprint {
    pub algorithm: String,
    pub value: String,
}

impl DtlsFingerprint {
    pub fn new(algorithm: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            value: value.into(),
        }
    }

    /// Parse "sha-256 AA:BB:CC:..."
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let algorithm = parts.next()?;
        let fingerprint = parts.next()?;
        Some(Self::new(algorithm, fingerprint))
    }

    /// To SDP format: "sha-256 AA:BB:CC:..."
    pub fn to_sdp(&self) -> String {
        format!("{} {}", self.algorithm, self.value)
    }
}

/// DTLS setup role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtlsSetup {
    Active,
    Passive,
    Actpass,
    Holdconn,
}

impl DtlsSetup {
    pub fn as_str(&self) -> &str {
        match self {
            DtlsSetup::Active => "active",
            DtlsSetup::Passive => "passive",
            DtlsSetup::Actpass => "actpass",
            DtlsSetup::Holdconn => "holdconn",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "active" => Some(DtlsSetup::Active),
            "passive" => Some(DtlsSetup::Passive),
            "actpass" => Some(DtlsSetup::Actpass),
            "holdconn" => Some(DtlsSetup::Holdconn),
            _ => None,
        }
    }
}

/// Generic `a=key[:value]` attribute kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }

    pub fn to_sdp(&self) -> String {
        match self.value {
            Some(ref value) => format!("a={}:{}", self.key, value),
            None => format!("a={}", self.key),
        }
    }
}

/// RTP codec (`a=rtpmap`)
#[derive(Debug, Clone, PartialEq)]
pub struct RtpCodec {
    pub payload_type: u8,
    pub name: String,
    pub clock_rate: u32,
    pub channels: Option<u32>,
}

impl RtpCodec {
    pub fn new(payload_type: u8, name: impl Into<String>, clock_rate: u32) -> Self {
        Self {
            payload_type,
            name: name.into(),
            clock_rate,
            channels: None,
        }
    }

    /// Parse rtpmap value: "111 opus/48000/2"
    pub fn parse(value: &str) -> Option<Self> {
        let (payload, encoding) = value.trim().split_once(' ')?;
        let mut parts = encoding.trim().split('/');
        let name = parts.next()?.to_string();
        let clock_rate = parts.next()?.parse().ok()?;
        let channels = parts.next().and_then(|c| c.parse().ok());
        Some(Self {
            payload_type: payload.parse().ok()?,
            name,
            clock_rate,
            channels,
        })
    }

    /// To rtpmap format: "96 VP8/90000"
    pub fn to_rtpmap(&self) -> String {
        if let Some(channels) = self.channels {
            format!("{} {}/{}/{}", self.payload_type, self.name, self.clock_rate, channels)
        } else {
            format!("{} {}/{}", self.payload_type, self.name, self.clock_rate)
        }
    }
}

/// Format parameters (`a=fmtp`)
#[derive(Debug, Clone, PartialEq)]
pub struct Fmtp {
    pub payload_type: u8,
    pub config: String,
}

impl Fmtp {
    pub fn parse(value: &str) -> Option<Self> {
        let (payload, config) = value.trim().split_once(' ')?;
        Some(Self {
            payload_type: payload.parse().ok()?,
            config: config.trim().to_string(),
        })
    }

    /// `key=value` pairs of the config, in order
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.config
            .split(';')
            .filter_map(|pair| {
                let pair = pair.trim();
                if pair.is_empty() {
                    return None;
                }
                match pair.split_once('=') {
                    Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
                    None => Some((pair.to_string(), String::new())),
                }
            })
            .collect()
    }
}

/// RTCP feedback (`a=rtcp-fb`); payload may be `*`
#[derive(Debug, Clone, PartialEq)]
pub struct RtcpFeedback {
    pub payload: String,
    pub feedback_type: String,
    pub subtype: Option<String>,
}

impl RtcpFeedback {
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let payload = parts.next()?.to_string();
        let feedback_type = parts.next()?.to_string();
        let rest: Vec<&str> = parts.collect();
        Some(Self {
            payload,
            feedback_type,
            subtype: if rest.is_empty() { None } else { Some(rest.join(" ")) },
        })
    }

    pub fn to_value(&self) -> String {
        match self.subtype {
            Some(ref subtype) => format!("{} {} {}", self.payload, self.feedback_type, subtype),
            None => format!("{} {}", self.payload, self.feedback_type),
        }
    }
}

/// RTP header extension (`a=extmap`)
#[derive(Debug, Clone, PartialEq)]
pub struct ExtMap {
    pub id: u16,
    pub direction: Option<String>,
    pub uri: String,
    pub config: Option<String>,
}

impl ExtMap {
    pub fn new(id: u16, uri: impl Into<String>) -> Self {
        Self {
            id,
            direction: None,
            uri: uri.into(),
            config: None,
        }
    }

    /// Parse "1/sendrecv urn:ietf:params:rtp-hdrext:ssrc-audio-level [config]"
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let (id, direction) = match parts.next()?.split_once('/') {
            Some((id, dir)) => (id, Some(dir.to_string())),
            None => (value.split_whitespace().next()?, None),
        };
        let uri = parts.next()?.to_string();
        let rest: Vec<&str> = parts.collect();
        Some(Self {
            id: id.parse().ok()?,
            direction,
            uri,
            config: if rest.is_empty() { None } else { Some(rest.join(" ")) },
        })
    }

    pub fn to_value(&self) -> String {
        let mut value = match self.direction {
            Some(ref dir) => format!("{}/{} {}", self.id, dir, self.uri),
            None => format!("{} {}", self.id, self.uri),
        };
        if let Some(ref config) = self.config {
            value.push(' ');
            value.push_str(config);
        }
        value
    }
}

/// Source-specific attribute (`a=ssrc:<id> <attribute>[:<value>]`)
#[derive(Debug, Clone, PartialEq)]
pub struct SsrcAttribute {
    pub ssrc: u32,
    pub attribute: String,
    pub value: Option<String>,
}

impl SsrcAttribute {
    pub fn new(ssrc: u32, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ssrc,
            attribute: attribute.into(),
            value: Some(value.into()),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (ssrc, rest) = match value.trim().split_once(' ') {
            Some((ssrc, rest)) => (ssrc, rest.trim()),
            None => (value.trim(), ""),
        };
        let (attribute, attr_value) = match rest.split_once(':') {
            Some((attr, val)) => (attr.to_string(), Some(val.to_string())),
            None => (rest.to_string(), None),
        };
        Some(Self {
            ssrc: ssrc.parse().ok()?,
            attribute,
            value: attr_value,
        })
    }

    pub fn to_value(&self) -> String {
        match self.value {
            Some(ref value) => format!("{} {}:{}", self.ssrc, self.attribute, value),
            None => format!("{} {}", self.ssrc, self.attribute),
        }
    }
}

/// `a=ssrc-group:<semantics> <ssrc> ...`
#[derive(Debug, Clone, PartialEq)]
pub struct SsrcGroup {
    pub semantics: String,
    pub ssrcs: Vec<u32>,
}

impl SsrcGroup {
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let semantics = parts.next()?.to_string();
        let ssrcs = parts.map(|s| s.parse().ok()).collect::<Option<Vec<u32>>>()?;
        Some(Self { semantics, ssrcs })
    }

    pub fn to_value(&self) -> String {
        let ssrcs: Vec<String> = self.ssrcs.iter().map(|s| s.to_string()).collect();
        format!("{} {}", self.semantics, ssrcs.join(" "))
    }
}

/// Transport and identity fields shared by every media section
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTransport {
    pub port: u16,
    pub protocol: String,
    /// m-line format tokens (payload ids, or `webrtc-datachannel`)
    pub formats: Vec<String>,
    /// Raw `i=`/`k=` lines of the section
    pub extra_lines: Vec<String>,
    pub connection: Option<String>,
    pub bandwidths: Vec<String>,
    pub mid: Option<String>,
    pub direction: Option<MediaDirection>,
    pub ice_ufrag: Option<String>,
    pub ice_pwd: Option<String>,
    pub ice_options: Option<String>,
    pub fingerprint: Option<DtlsFingerprint>,
    pub setup: Option<DtlsSetup>,
    pub candidates: Vec<IceCandidate>,
    pub end_of_candidates: bool,
    pub rtcp: Option<String>,
    pub rtcp_mux: bool,
    pub rtcp_rsize: bool,
    pub msid: Option<String>,
    /// Attributes without a typed field, in order
    pub attributes: Vec<Attribute>,
}

impl MediaTransport {
    pub fn new(port: u16, protocol: impl Into<String>) -> Self {
        Self {
            port,
            protocol: protocol.into(),
            formats: Vec::new(),
            extra_lines: Vec::new(),
            connection: Some("IN IP4 0.0.0.0".to_string()),
            bandwidths: Vec::new(),
            mid: None,
            direction: None,
            ice_ufrag: None,
            ice_pwd: None,
            ice_options: None,
            fingerprint: None,
            setup: None,
            candidates: Vec::new(),
            end_of_candidates: false,
            rtcp: None,
            rtcp_mux: false,
            rtcp_rsize: false,
            msid: None,
            attributes: Vec::new(),
        }
    }

    /// Set ICE credentials
    pub fn set_ice_credentials(&mut self, ufrag: impl Into<String>, pwd: impl Into<String>) {
        self.ice_ufrag = Some(ufrag.into());
        self.ice_pwd = Some(pwd.into());
    }
}

/// RTP-specific attributes of an audio or video section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtpParameters {
    pub codecs: Vec<RtpCodec>,
    pub fmtps: Vec<Fmtp>,
    pub rtcp_fbs: Vec<RtcpFeedback>,
    pub extmaps: Vec<ExtMap>,
    pub ssrc_groups: Vec<SsrcGroup>,
    pub ssrcs: Vec<SsrcAttribute>,
}

impl RtpParameters {
    pub fn codec(&self, payload_type: u8) -> Option<&RtpCodec> {
        self.codecs.iter().find(|c| c.payload_type == payload_type)
    }

    pub fn fmtp(&self, payload_type: u8) -> Option<&Fmtp> {
        self.fmtps.iter().find(|f| f.payload_type == payload_type)
    }

    /// Keep only the given payload types, dropping their fmtp and feedback
    /// lines along with them
    pub fn retain_payloads(&mut self, keep: &[u8]) {
        self.codecs.retain(|c| keep.contains(&c.payload_type));
        self.fmtps.retain(|f| keep.contains(&f.payload_type));
        self.rtcp_fbs.retain(|fb| {
            fb.payload == "*"
                || fb
                    .payload
                    .parse::<u8>()
                    .map(|pt| keep.contains(&pt))
                    .unwrap_or(false)
        });
    }

    /// Distinct SSRC ids in first-seen order
    pub fn ssrc_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for attr in &self.ssrcs {
            if !ids.contains(&attr.ssrc) {
                ids.push(attr.ssrc);
            }
        }
        ids
    }
}

/// Common capability set of every media section
pub trait SdpMedia {
    fn media_type(&self) -> MediaType;
    fn transport(&self) -> &MediaTransport;
    fn transport_mut(&mut self) -> &mut MediaTransport;

    fn mid(&self) -> Option<&str> {
        self.transport().mid.as_deref()
    }

    fn direction(&self) -> Option<MediaDirection> {
        self.transport().direction
    }

    fn candidates(&self) -> &[IceCandidate] {
        &self.transport().candidates
    }

    /// Port zero marks a rejected section
    fn is_rejected(&self) -> bool {
        self.transport().port == 0
    }
}

/// `m=application` section carrying SCTP data channels
#[derive(Debug, Clone, PartialEq)]
pub struct DataSection {
    pub transport: MediaTransport,
    pub sctp_port: Option<u16>,
    pub max_message_size: Option<u32>,
}

/// `m=audio` section
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSection {
    pub transport: MediaTransport,
    pub rtp: RtpParameters,
}

/// `m=video` section
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSection {
    pub transport: MediaTransport,
    pub rtp: RtpParameters,
}

macro_rules! impl_sdp_media {
    ($ty:ty, $kind:expr) => {
        impl SdpMedia for $ty {
            fn media_type(&self) -> MediaType {
                $kind
            }

            fn transport(&self) -> &MediaTransport {
                &self.transport
            }

            fn transport_mut(&mut self) -> &mut MediaTransport {
                &mut self.transport
            }
        }
    };
}

impl_sdp_media!(DataSection, MediaType::Application);
impl_sdp_media!(AudioSection, MediaType::Audio);
impl_sdp_media!(VideoSection, MediaType::Video);

/// One `m=` block of a session description
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSection {
    Application(DataSection),
    Audio(AudioSection),
    Video(VideoSection),
}

impl MediaSection {
    /// Empty section of the given type
    pub fn new(media_type: MediaType, transport: MediaTransport) -> Self {
        match media_type {
            MediaType::Application => MediaSection::Application(DataSection {
                transport,
                sctp_port: None,
                max_message_size: None,
            }),
            MediaType::Audio => MediaSection::Audio(AudioSection {
                transport,
                rtp: RtpParameters::default(),
            }),
            MediaType::Video => MediaSection::Video(VideoSection {
                transport,
                rtp: RtpParameters::default(),
            }),
        }
    }

    pub fn rtp(&self) -> Option<&RtpParameters> {
        match self {
            MediaSection::Audio(audio) => Some(&audio.rtp),
            MediaSection::Video(video) => Some(&video.rtp),
            MediaSection::Application(_) => None,
        }
    }

    pub fn rtp_mut(&mut self) -> Option<&mut RtpParameters> {
        match self {
            MediaSection::Audio(audio) => Some(&mut audio.rtp),
            MediaSection::Video(video) => Some(&mut video.rtp),
            MediaSection::Application(_) => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioSection> {
        match self {
            MediaSection::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoSection> {
        match self {
            MediaSection::Video(video) => Some(video),
            _ => None,
        }
    }
}

impl SdpMedia for MediaSection {
    fn media_type(&self) -> MediaType {
        match self {
            MediaSection::Application(_) => MediaType::Application,
            MediaSection::Audio(_) => MediaType::Audio,
            MediaSection::Video(_) => MediaType::Video,
        }
    }

    fn transport(&self) -> &MediaTransport {
        match self {
            MediaSection::Application(data) => &data.transport,
            MediaSection::Audio(audio) => &audio.transport,
            MediaSection::Video(video) => &video.transport,
        }
    }

    fn transport_mut(&mut self) -> &mut MediaTransport {
        match self {
            MediaSection::Application(data) => &mut data.transport,
            MediaSection::Audio(audio) => &mut audio.transport,
            MediaSection::Video(video) => &mut video.transport,
        }
    }
}
