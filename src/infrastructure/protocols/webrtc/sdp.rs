//! WebRTC SDP (Session Description Protocol) documents
//!
//! Parses RFC 4566 text into typed session and media records and renders
//! them back with CRLF line endings in RFC field order.
use crate::domain::shared::error::DomainError;
use crate::infrastructure::protocols::ice::IceCandidate;
use crate::infrastructure::protocols::webrtc::media::{
    Attribute, AudioSection, DtlsFingerprint, DtlsSetup, ExtMap, Fmtp, MediaDirection,
    MediaSection, MediaTransport, MediaType, RtcpFeedback, RtpCodec, SdpMedia, SsrcAttribute,
    SsrcGroup, VideoSection,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdpError {
    #[error("Invalid SDP line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Missing SDP field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),
}

impl From<SdpError> for DomainError {
    fn from(err: SdpError) -> Self {
        DomainError::ValidationError(err.to_string())
    }
}

/// Session origin (`o=`)
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub username: String,
    pub session_id: String,
    pub session_version: u64,
    pub network_type: String,
    pub address_type: String,
    pub address: String,
}

impl Origin {
    fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 6 {
            return None;
        }
        Some(Self {
            username: parts[0].to_string(),
            session_id: parts[1].to_string(),
            session_version: parts[2].parse().ok()?,
            network_type: parts[3].to_string(),
            address_type: parts[4].to_string(),
            address: parts[5].to_string(),
        })
    }

    fn to_value(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.address
        )
    }
}

/// `a=group:<semantics> <mid> ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub semantics: String,
    pub mids: Vec<String>,
}

/// `a=msid-semantic: <semantic> <token>`
#[derive(Debug, Clone, PartialEq)]
pub struct MsidSemantic {
    pub semantic: String,
    pub token: String,
}

/// WebRTC Session Description
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDescription {
    pub version: u32,
    pub origin: Origin,
    pub session_name: String,
    /// Raw `i=`, `u=`, `e=`, `p=` lines
    pub info_lines: Vec<String>,
    pub connection: Option<String>,
    pub bandwidths: Vec<String>,
    pub timing: String,
    /// Raw `r=`, `z=`, `k=` lines
    pub timing_lines: Vec<String>,
    pub groups: Vec<Group>,
    pub msid_semantic: Option<MsidSemantic>,
    pub ice_lite: bool,
    pub ice_ufrag: Option<String>,
    pub ice_pwd: Option<String>,
    pub ice_options: Option<String>,
    pub fingerprint: Option<DtlsFingerprint>,
    pub setup: Option<DtlsSetup>,
    pub attributes: Vec<Attribute>,
    pub media: Vec<MediaSection>,
}

impl SessionDescription {
    /// Create an empty session with a fresh origin
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            version: 0,
            origin: Origin {
                username: "-".to_string(),
                session_id: session_id.into(),
                session_version: 2,
                network_type: "IN".to_string(),
                address_type: "IP4".to_string(),
                address: "127.0.0.1".to_string(),
            },
            session_name: "-".to_string(),
            info_lines: Vec::new(),
            connection: None,
            bandwidths: Vec::new(),
            timing: "0 0".to_string(),
            timing_lines: Vec::new(),
            groups: Vec::new(),
            msid_semantic: None,
            ice_lite: false,
            ice_ufrag: None,
            ice_pwd: None,
            ice_options: None,
            fingerprint: None,
            setup: None,
            attributes: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Add media description
    pub fn add_media(&mut self, media: MediaSection) {
        self.media.push(media);
    }

    /// First section of the given type, located by type rather than index
    pub fn find_media(&self, media_type: MediaType) -> Option<&MediaSection> {
        self.media.iter().find(|m| m.media_type() == media_type)
    }

    pub fn bundle_group(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.semantics == "BUNDLE")
    }

    /// Replace (or add) the BUNDLE group
    pub fn set_bundle(&mut self, mids: Vec<String>) {
        self.groups.retain(|g| g.semantics != "BUNDLE");
        self.groups.insert(
            0,
            Group {
                semantics: "BUNDLE".to_string(),
                mids,
            },
        );
    }

    pub fn set_msid_semantic(&mut self, token: impl Into<String>) {
        self.msid_semantic = Some(MsidSemantic {
            semantic: "WMS".to_string(),
            token: token.into(),
        });
    }

    /// Parse from SDP string
    pub fn parse(sdp: &str) -> Result<Self, SdpError> {
        let mut version = None;
        let mut origin = None;
        let mut session = Self::new("0");
        session.session_name = String::new();
        let mut has_timing = false;
        let mut current: Option<MediaSection> = None;

        for (index, raw) in sdp.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            let invalid = |reason: &str| SdpError::InvalidLine {
                line: line_no,
                reason: reason.to_string(),
            };

            let (kind, value) = line
                .split_once('=')
                .filter(|(k, _)| k.len() == 1)
                .ok_or_else(|| invalid("expected <type>=<value>"))?;

            if kind == "m" {
                if let Some(done) = current.take() {
                    session.media.push(done);
                }
                current = Some(parse_media_line(value).map_err(|reason| invalid(&reason))?);
                continue;
            }

            if let Some(ref mut media) = current {
                match kind {
                    "c" => media.transport_mut().connection = Some(value.to_string()),
                    "b" => media.transport_mut().bandwidths.push(value.to_string()),
                    "a" => apply_media_attribute(media, value).map_err(|reason| invalid(&reason))?,
                    _ => media.transport_mut().extra_lines.push(line.to_string()),
                }
                continue;
            }

            match kind {
                "v" => version = Some(value.parse().map_err(|_| invalid("bad version"))?),
                "o" => origin = Some(Origin::parse(value).ok_or_else(|| invalid("bad origin"))?),
                "s" => session.session_name = value.to_string(),
                "i" | "u" | "e" | "p" => session.info_lines.push(line.to_string()),
                "c" => session.connection = Some(value.to_string()),
                "b" => session.bandwidths.push(value.to_string()),
                "t" if !has_timing => {
                    session.timing = value.to_string();
                    has_timing = true;
                }
                "t" | "r" | "z" | "k" => session.timing_lines.push(line.to_string()),
                "a" => apply_session_attribute(&mut session, value)
                    .map_err(|reason| invalid(&reason))?,
                _ => return Err(invalid("unknown line type")),
            }
        }

        if let Some(done) = current.take() {
            session.media.push(done);
        }

        session.version = version.ok_or(SdpError::MissingField("v="))?;
        session.origin = origin.ok_or(SdpError::MissingField("o="))?;
        if !has_timing {
            return Err(SdpError::MissingField("t="));
        }
        if session.session_name.is_empty() {
            session.session_name = "-".to_string();
        }

        Ok(session)
    }

    /// Convert to SDP string
    pub fn to_sdp_string(&self) -> String {
        let mut sdp = String::new();

        push_line(&mut sdp, &format!("v={}", self.version));
        push_line(&mut sdp, &format!("o={}", self.origin.to_value()));
        push_line(&mut sdp, &format!("s={}", self.session_name));
        for line in &self.info_lines {
            push_line(&mut sdp, line);
        }
        if let Some(ref connection) = self.connection {
            push_line(&mut sdp, &format!("c={}", connection));
        }
        for bandwidth in &self.bandwidths {
            push_line(&mut sdp, &format!("b={}", bandwidth));
        }
        push_line(&mut sdp, &format!("t={}", self.timing));
        for line in &self.timing_lines {
            push_line(&mut sdp, line);
        }

        for group in &self.groups {
            push_line(
                &mut sdp,
                format!("a=group:{} {}", group.semantics, group.mids.join(" ")).trim_end(),
            );
        }
        if let Some(ref msid) = self.msid_semantic {
            push_line(
                &mut sdp,
                format!("a=msid-semantic: {} {}", msid.semantic, msid.token).trim_end(),
            );
        }
        if self.ice_lite {
            push_line(&mut sdp, "a=ice-lite");
        }
        if let Some(ref ufrag) = self.ice_ufrag {
            push_line(&mut sdp, &format!("a=ice-ufrag:{}", ufrag));
        }
        if let Some(ref pwd) = self.ice_pwd {
            push_line(&mut sdp, &format!("a=ice-pwd:{}", pwd));
        }
        if let Some(ref options) = self.ice_options {
            push_line(&mut sdp, &format!("a=ice-options:{}", options));
        }
        if let Some(ref fingerprint) = self.fingerprint {
            push_line(&mut sdp, &format!("a=fingerprint:{}", fingerprint.to_sdp()));
        }
        if let Some(ref setup) = self.setup {
            push_line(&mut sdp, &format!("a=setup:{}", setup.as_str()));
        }
        for attribute in &self.attributes {
            push_line(&mut sdp, &attribute.to_sdp());
        }

        for media in &self.media {
            write_media(&mut sdp, media);
        }

        sdp
    }
}

fn push_line(sdp: &mut String, line: &str) {
    sdp.push_str(line);
    sdp.push_str("\r\n");
}

fn parse_media_line(value: &str) -> Result<MediaSection, String> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() < 3 {
        return Err("m-line needs media, port and protocol".to_string());
    }
    let media_type = MediaType::from_string(parts[0])
        .ok_or_else(|| SdpError::UnsupportedMedia(parts[0].to_string()).to_string())?;
    let port = parts[1]
        .split('/')
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .ok_or_else(|| format!("bad port {}", parts[1]))?;

    let mut transport = MediaTransport::new(port, parts[2]);
    transport.connection = None;
    transport.formats = parts[3..].iter().map(|f| f.to_string()).collect();

    Ok(MediaSection::new(media_type, transport))
}

fn apply_session_attribute(session: &mut SessionDescription, value: &str) -> Result<(), String> {
    let (key, attr) = split_attribute(value);
    match (key, attr) {
        ("group", Some(v)) => {
            let mut parts = v.split_whitespace();
            let semantics = parts.next().ok_or("empty group")?.to_string();
            session.groups.push(Group {
                semantics,
                mids: parts.map(|m| m.to_string()).collect(),
            });
        }
        ("msid-semantic", Some(v)) => {
            let mut parts = v.split_whitespace();
            let semantic = parts.next().unwrap_or("WMS").to_string();
            let token = parts.collect::<Vec<_>>().join(" ");
            session.msid_semantic = Some(MsidSemantic { semantic, token });
        }
        ("ice-lite", None) => session.ice_lite = true,
        ("ice-ufrag", Some(v)) => session.ice_ufrag = Some(v.to_string()),
        ("ice-pwd", Some(v)) => session.ice_pwd = Some(v.to_string()),
        ("ice-options", Some(v)) => session.ice_options = Some(v.to_string()),
        ("fingerprint", Some(v)) => {
            session.fingerprint = Some(DtlsFingerprint::parse(v).ok_or("bad fingerprint")?)
        }
        ("setup", Some(v)) => {
            session.setup = Some(DtlsSetup::from_string(v.trim()).ok_or("bad setup role")?)
        }
        (key, attr) => session
            .attributes
            .push(Attribute::new(key, attr.map(|a| a.to_string()))),
    }
    Ok(())
}

fn apply_media_attribute(media: &mut MediaSection, value: &str) -> Result<(), String> {
    let (key, attr) = split_attribute(value);

    if let Some(direction) = MediaDirection::from_string(key) {
        media.transport_mut().direction = Some(direction);
        return Ok(());
    }

    let transport = media.transport_mut();
    match (key, attr) {
        ("mid", Some(v)) => transport.mid = Some(v.to_string()),
        ("ice-ufrag", Some(v)) => transport.ice_ufrag = Some(v.to_string()),
        ("ice-pwd", Some(v)) => transport.ice_pwd = Some(v.to_string()),
        ("ice-options", Some(v)) => transport.ice_options = Some(v.to_string()),
        ("fingerprint", Some(v)) => {
            transport.fingerprint = Some(DtlsFingerprint::parse(v).ok_or("bad fingerprint")?)
        }
        ("setup", Some(v)) => {
            transport.setup = Some(DtlsSetup::from_string(v.trim()).ok_or("bad setup role")?)
        }
        ("candidate", Some(v)) => transport.candidates.push(IceCandidate::parse(v)?),
        ("end-of-candidates", None) => transport.end_of_candidates = true,
        ("rtcp", Some(v)) => transport.rtcp = Some(v.to_string()),
        ("rtcp-mux", None) => transport.rtcp_mux = true,
        ("rtcp-rsize", None) => transport.rtcp_rsize = true,
        ("msid", Some(v)) => transport.msid = Some(v.to_string()),
        _ => return apply_section_attribute(media, key, attr),
    }
    Ok(())
}

fn apply_section_attribute(
    media: &mut MediaSection,
    key: &str,
    attr: Option<&str>,
) -> Result<(), String> {
    match media {
        MediaSection::Application(data) => match (key, attr) {
            ("sctp-port", Some(v)) => {
                data.sctp_port = Some(v.trim().parse().map_err(|_| "bad sctp-port")?)
            }
            ("max-message-size", Some(v)) => {
                data.max_message_size = Some(v.trim().parse().map_err(|_| "bad max-message-size")?)
            }
            _ => data
                .transport
                .attributes
                .push(Attribute::new(key, attr.map(|a| a.to_string()))),
        },
        MediaSection::Audio(AudioSection { transport, rtp })
        | MediaSection::Video(VideoSection { transport, rtp }) => match (key, attr) {
            ("rtpmap", Some(v)) => rtp.codecs.push(RtpCodec::parse(v).ok_or("bad rtpmap")?),
            ("fmtp", Some(v)) => rtp.fmtps.push(Fmtp::parse(v).ok_or("bad fmtp")?),
            ("rtcp-fb", Some(v)) => rtp.rtcp_fbs.push(RtcpFeedback::parse(v).ok_or("bad rtcp-fb")?),
            ("extmap", Some(v)) => rtp.extmaps.push(ExtMap::parse(v).ok_or("bad extmap")?),
            ("ssrc", Some(v)) => rtp.ssrcs.push(SsrcAttribute::parse(v).ok_or("bad ssrc")?),
            ("ssrc-group", Some(v)) => {
                rtp.ssrc_groups.push(SsrcGroup::parse(v).ok_or("bad ssrc-group")?)
            }
            _ => transport
                .attributes
                .push(Attribute::new(key, attr.map(|a| a.to_string()))),
        },
    }
    Ok(())
}

/// Split `key:value` at the first colon
fn split_attribute(value: &str) -> (&str, Option<&str>) {
    match value.split_once(':') {
        Some((key, attr)) => (key, Some(attr)),
        None => (value, None),
    }
}

fn write_media(sdp: &mut String, media: &MediaSection) {
    let transport = media.transport();

    push_line(
        sdp,
        format!(
            "m={} {} {} {}",
            media.media_type().as_str(),
            transport.port,
            transport.protocol,
            transport.formats.join(" ")
        )
        .trim_end(),
    );
    for line in &transport.extra_lines {
        push_line(sdp, line);
    }
    if let Some(ref connection) = transport.connection {
        push_line(sdp, &format!("c={}", connection));
    }
    for bandwidth in &transport.bandwidths {
        push_line(sdp, &format!("b={}", bandwidth));
    }
    if let Some(ref rtcp) = transport.rtcp {
        push_line(sdp, &format!("a=rtcp:{}", rtcp));
    }
    for candidate in &transport.candidates {
        push_line(sdp, &format!("a={}", candidate));
    }
    if let Some(ref ufrag) = transport.ice_ufrag {
        push_line(sdp, &format!("a=ice-ufrag:{}", ufrag));
    }
    if let Some(ref pwd) = transport.ice_pwd {
        push_line(sdp, &format!("a=ice-pwd:{}", pwd));
    }
    if let Some(ref options) = transport.ice_options {
        push_line(sdp, &format!("a=ice-options:{}", options));
    }
    if let Some(ref fingerprint) = transport.fingerprint {
        push_line(sdp, &format!("a=fingerprint:{}", fingerprint.to_sdp()));
    }
    if let Some(ref setup) = transport.setup {
        push_line(sdp, &format!("a=setup:{}", setup.as_str()));
    }
    if let Some(ref mid) = transport.mid {
        push_line(sdp, &format!("a=mid:{}", mid));
    }

    if let Some(rtp) = media.rtp() {
        for ext in &rtp.extmaps {
            push_line(sdp, &format!("a=extmap:{}", ext.to_value()));
        }
    }
    if let Some(direction) = transport.direction {
        push_line(sdp, &format!("a={}", direction.as_str()));
    }
    if let Some(ref msid) = transport.msid {
        push_line(sdp, &format!("a=msid:{}", msid));
    }
    if transport.rtcp_mux {
        push_line(sdp, "a=rtcp-mux");
    }
    if transport.rtcp_rsize {
        push_line(sdp, "a=rtcp-rsize");
    }

    match media {
        MediaSection::Application(data) => {
            if let Some(port) = data.sctp_port {
                push_line(sdp, &format!("a=sctp-port:{}", port));
            }
            if let Some(size) = data.max_message_size {
                push_line(sdp, &format!("a=max-message-size:{}", size));
            }
        }
        MediaSection::Audio(_) | MediaSection::Video(_) => {
            if let Some(rtp) = media.rtp() {
                for codec in &rtp.codecs {
                    let payload = codec.payload_type.to_string();
                    push_line(sdp, &format!("a=rtpmap:{}", codec.to_rtpmap()));
                    for fb in rtp.rtcp_fbs.iter().filter(|fb| fb.payload == payload) {
                        push_line(sdp, &format!("a=rtcp-fb:{}", fb.to_value()));
                    }
                    if let Some(fmtp) = rtp.fmtp(codec.payload_type) {
                        push_line(sdp, &format!("a=fmtp:{} {}", fmtp.payload_type, fmtp.config));
                    }
                }
                // Lines whose payload has no rtpmap (static payloads, wildcard feedback)
                for fb in rtp.rtcp_fbs.iter().filter(|fb| {
                    fb.payload
                        .parse::<u8>()
                        .map(|pt| rtp.codec(pt).is_none())
                        .unwrap_or(true)
                }) {
                    push_line(sdp, &format!("a=rtcp-fb:{}", fb.to_value()));
                }
                for fmtp in rtp.fmtps.iter().filter(|f| rtp.codec(f.payload_type).is_none()) {
                    push_line(sdp, &format!("a=fmtp:{} {}", fmtp.payload_type, fmtp.config));
                }
                for group in &rtp.ssrc_groups {
                    push_line(sdp, &format!("a=ssrc-group:{}", group.to_value()));
                }
                for ssrc in &rtp.ssrcs {
                    push_line(sdp, &format!("a=ssrc:{}", ssrc.to_value()));
                }
            }
        }
    }

    for attribute in &transport.attributes {
        push_line(sdp, &attribute.to_sdp());
    }
    if transport.end_of_candidates {
        push_line(sdp, "a=end-of-candidates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSER_OFFER: &str = "v=0\r\n\
o=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1\r\n\
a=extmap-allow-mixed\r\n\
a=msid-semantic: WMS stream\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111 0\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:9 IN IP4 0.0.0.0\r\n\
a=candidate:1 1 udp 2122260223 192.168.1.10 54321 typ host generation 0 network-id 1\r\n\
a=ice-ufrag:abcd\r\n\
a=ice-pwd:0123456789abcdef012345\r\n\
a=ice-options:trickle\r\n\
a=fingerprint:sha-256 AA:BB:CC\r\n\
a=setup:actpass\r\n\
a=mid:0\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=sendrecv\r\n\
a=msid:stream track\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=rtcp-fb:111 transport-cc\r\n\
a=fmtp:111 minptime=10;useinbandfec=1\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=ssrc:1001 cname:abc\r\n\
a=ssrc:1001 msid:stream track\r\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:abcd\r\n\
a=ice-pwd:0123456789abcdef012345\r\n\
a=fingerprint:sha-256 AA:BB:CC\r\n\
a=setup:actpass\r\n\
a=mid:1\r\n\
a=sctp-port:5000\r\n\
a=max-message-size:262144\r\n";

    #[test]
    fn test_parse_browser_offer() {
        let sdp = SessionDescription::parse(BROWSER_OFFER).unwrap();

        assert_eq!(sdp.origin.session_version, 2);
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0", "1"]);
        assert_eq!(sdp.msid_semantic.as_ref().unwrap().token, "stream");
        assert_eq!(sdp.attributes, vec![Attribute::flag("extmap-allow-mixed")]);
        assert_eq!(sdp.media.len(), 2);

        let audio = sdp.find_media(MediaType::Audio).unwrap().as_audio().unwrap();
        assert_eq!(audio.mid(), Some("0"));
        assert_eq!(audio.transport.ice_ufrag.as_deref(), Some("abcd"));
        assert_eq!(audio.transport.setup, Some(DtlsSetup::Actpass));
        assert_eq!(audio.transport.candidates.len(), 1);
        assert_eq!(audio.direction(), Some(MediaDirection::SendRecv));
        assert_eq!(audio.rtp.codecs.len(), 2);
        assert_eq!(audio.rtp.fmtp(111).unwrap().config, "minptime=10;useinbandfec=1");
        assert_eq!(audio.rtp.ssrc_ids(), vec![1001]);

        match &sdp.media[1] {
            MediaSection::Application(data) => {
                assert_eq!(data.sctp_port, Some(5000));
                assert_eq!(data.max_message_size, Some(262144));
            }
            other => panic!("expected application section, got {:?}", other.media_type()),
        }
    }

    #[test]
    fn test_render_then_parse_is_stable() {
        let sdp = SessionDescription::parse(BROWSER_OFFER).unwrap();
        let rendered = sdp.to_sdp_string();
        let reparsed = SessionDescription::parse(&rendered).unwrap();
        assert_eq!(sdp, reparsed);
        assert!(rendered.ends_with("\r\n"));
        assert!(rendered.contains("a=msid-semantic: WMS stream\r\n"));
    }

    #[test]
    fn test_parse_accepts_lf_only() {
        let lf = BROWSER_OFFER.replace("\r\n", "\n");
        let sdp = SessionDescription::parse(&lf).unwrap();
        assert_eq!(sdp.media.len(), 2);
    }

    #[test]
    fn test_parse_rejects_missing_origin() {
        let result = SessionDescription::parse("v=0\r\ns=-\r\nt=0 0\r\n");
        assert_eq!(result, Err(SdpError::MissingField("o=")));
    }

    #[test]
    fn test_parse_rejects_unknown_media() {
        let result = SessionDescription::parse(
            "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\nm=text 9 RTP/AVP 98\r\n",
        );
        assert!(matches!(result, Err(SdpError::InvalidLine { line: 5, .. })));
    }

    #[test]
    fn test_sdp_error_maps_to_validation() {
        let err: DomainError = SdpError::MissingField("v=").into();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn test_set_bundle_replaces_group() {
        let mut sdp = SessionDescription::parse(BROWSER_OFFER).unwrap();
        sdp.set_bundle(vec!["0".to_string()]);
        assert_eq!(sdp.groups.len(), 1);
        assert_eq!(sdp.bundle_group().unwrap().mids, vec!["0"]);
    }
}
