//! Offers built from a bridge endpoint
//!
//! The bridge is the offerer: every section carries the endpoint's ICE and
//! DTLS parameters, a data channel always comes first, and one audio
//! section is emitted per advertised stream.

use super::candidates::to_sdp_candidates;
use crate::domain::shared::result::Result;
use crate::domain::smb::{
    SmbDtls, SmbEndpointDescription, SmbIce, SmbPayloadType, SmbRtpHeaderExtension, SmbVideo,
};
use crate::infrastructure::protocols::webrtc::{
    AudioSection, DataSection, DtlsFingerprint, DtlsSetup, ExtMap, Fmtp, MediaDirection,
    MediaSection, MediaTransport, RtcpFeedback, RtpCodec, RtpParameters, SessionDescription,
    SsrcAttribute, SsrcGroup, VideoSection,
};

/// Fixed SCTP max-message-size advertised on the data channel
pub const MAX_MESSAGE_SIZE: u32 = 262144;

/// msid-semantic token used when no audio stream is advertised
pub const FALLBACK_MSID_TOKEN: &str = "feedbackvideomslabel";

const RTP_PROTOCOL: &str = "UDP/TLS/RTP/SAVPF";
const SCTP_PROTOCOL: &str = "UDP/DTLS/SCTP";
const DISCARD_PORT: u16 = 9;

/// One RTP stream advertised in an offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStreamDescriptor {
    pub ssrc: u32,
    pub cname: String,
    pub mslabel: String,
    pub label: String,
}

impl MediaStreamDescriptor {
    /// Descriptor naming the stream after the endpoint that sends it
    pub fn for_endpoint(endpoint_id: &str, ssrc: u32) -> Self {
        Self {
            ssrc,
            cname: format!("{}_audioCName", endpoint_id),
            mslabel: format!("{}_audioMSLabel", endpoint_id),
            label: format!("{}_audioLabel", endpoint_id),
        }
    }

    /// The four ssrc attributes in wire order: cname, label, mslabel, msid
    fn ssrc_attributes(&self) -> Vec<SsrcAttribute> {
        vec![
            SsrcAttribute::new(self.ssrc, "cname", &self.cname),
            SsrcAttribute::new(self.ssrc, "label", &self.label),
            SsrcAttribute::new(self.ssrc, "mslabel", &self.mslabel),
            SsrcAttribute::new(self.ssrc, "msid", format!("{} {}", self.mslabel, self.label)),
        ]
    }
}

/// Role proposed against the endpoint's role: `actpass` becomes `active`,
/// anything else becomes `actpass`
pub fn flip_setup(setup: &str) -> DtlsSetup {
    if setup.trim().eq_ignore_ascii_case("actpass") {
        DtlsSetup::Active
    } else {
        DtlsSetup::Actpass
    }
}

/// Transport block shared by every section generated for an endpoint
pub(crate) fn endpoint_transport(
    ice: &SmbIce,
    dtls: &SmbDtls,
    mid: usize,
    protocol: &str,
) -> MediaTransport {
    let mut transport = MediaTransport::new(DISCARD_PORT, protocol);
    transport.mid = Some(mid.to_string());
    transport.set_ice_credentials(&ice.ufrag, &ice.pwd);
    transport.fingerprint = Some(DtlsFingerprint::new(&dtls.hash_type, &dtls.hash));
    transport.setup = Some(flip_setup(&dtls.setup));
    transport.candidates = to_sdp_candidates(&ice.candidates);
    transport
}

/// Codec, fmtp and feedback lines for one bridge payload type
fn push_payload_type(rtp: &mut RtpParameters, formats: &mut Vec<String>, payload: &SmbPayloadType) {
    let mut codec = RtpCodec::new(payload.id, &payload.name, payload.clockrate);
    codec.channels = payload.channels;
    rtp.codecs.push(codec);
    formats.push(payload.id.to_string());

    if let Some(config) = payload.fmtp_config() {
        rtp.fmtps.push(Fmtp {
            payload_type: payload.id,
            config,
        });
    }
    for fb in &payload.rtcp_fbs {
        rtp.rtcp_fbs.push(RtcpFeedback {
            payload: payload.id.to_string(),
            feedback_type: fb.feedback_type.clone(),
            subtype: fb.subtype.clone(),
        });
    }
}

fn extmaps(hdrexts: &[SmbRtpHeaderExtension]) -> Vec<ExtMap> {
    hdrexts.iter().map(|ext| ExtMap::new(ext.id, &ext.uri)).collect()
}

fn data_section(ice: &SmbIce, dtls: &SmbDtls, mid: usize, sctp_port: u16) -> MediaSection {
    let mut transport = endpoint_transport(ice, dtls, mid, SCTP_PROTOCOL);
    transport.formats = vec!["webrtc-datachannel".to_string()];
    MediaSection::Application(DataSection {
        transport,
        sctp_port: Some(sctp_port),
        max_message_size: Some(MAX_MESSAGE_SIZE),
    })
}

fn audio_section(
    endpoint: &SmbEndpointDescription,
    mid: usize,
    stream: &MediaStreamDescriptor,
) -> Result<MediaSection> {
    let audio = endpoint.audio()?;
    let mut transport = endpoint_transport(endpoint.ice()?, endpoint.dtls()?, mid, RTP_PROTOCOL);
    transport.direction = Some(MediaDirection::SendRecv);
    transport.rtcp_mux = true;

    let mut rtp = RtpParameters {
        extmaps: extmaps(&audio.rtp_hdrexts),
        ssrcs: stream.ssrc_attributes(),
        ..Default::default()
    };
    push_payload_type(&mut rtp, &mut transport.formats, &audio.payload_type);

    Ok(MediaSection::Audio(AudioSection { transport, rtp }))
}

/// One video section per bridge stream, FID pairs grouped
fn video_sections(
    ice: &SmbIce,
    dtls: &SmbDtls,
    video: &SmbVideo,
    next_mid: &mut usize,
) -> Vec<MediaSection> {
    let mut sections = Vec::new();
    for stream in &video.streams {
        let mut transport = endpoint_transport(ice, dtls, *next_mid, RTP_PROTOCOL);
        *next_mid += 1;
        transport.direction = Some(MediaDirection::SendRecv);
        transport.rtcp_mux = true;

        let mut rtp = RtpParameters {
            extmaps: extmaps(&video.rtp_hdrexts),
            ..Default::default()
        };
        for payload in &video.payload_types {
            push_payload_type(&mut rtp, &mut transport.formats, payload);
        }

        let label = format!("{}_{}", stream.id, stream.content);
        for source in &stream.sources {
            let mut ssrcs = vec![source.main];
            if let Some(feedback) = source.feedback {
                ssrcs.push(feedback);
                rtp.ssrc_groups.push(SsrcGroup {
                    semantics: "FID".to_string(),
                    ssrcs: ssrcs.clone(),
                });
            }
            for ssrc in ssrcs {
                let descriptor = MediaStreamDescriptor {
                    ssrc,
                    cname: stream.id.clone(),
                    mslabel: stream.id.clone(),
                    label: label.clone(),
                };
                rtp.ssrcs.extend(descriptor.ssrc_attributes());
            }
        }

        sections.push(MediaSection::Video(VideoSection { transport, rtp }));
    }
    sections
}

/// Build the offer the bridge endpoint makes to a client
///
/// Fails before building anything if the endpoint lacks its bundle
/// transport, ICE, DTLS, audio or data description.
pub fn create_offer(
    endpoint: &SmbEndpointDescription,
    audio_streams: &[MediaStreamDescriptor],
) -> Result<SessionDescription> {
    let ice = endpoint.ice()?;
    let dtls = endpoint.dtls()?;
    endpoint.audio()?;
    let data = endpoint.data.as_ref().ok_or_else(|| {
        crate::domain::shared::error::DomainError::validation("Missing endpoint data channel")
    })?;

    let mut sdp = SessionDescription::new(chrono::Utc::now().timestamp_millis().to_string());
    let mut mid = 0;

    sdp.add_media(data_section(ice, dtls, mid, data.port));
    mid += 1;

    for stream in audio_streams {
        sdp.add_media(audio_section(endpoint, mid, stream)?);
        mid += 1;
    }

    if let Some(ref video) = endpoint.video {
        for section in video_sections(ice, dtls, video, &mut mid) {
            sdp.add_media(section);
        }
    }

    sdp.set_bundle((0..mid).map(|m| m.to_string()).collect());
    let mslabels: Vec<&str> = audio_streams.iter().map(|s| s.mslabel.as_str()).collect();
    if mslabels.is_empty() {
        sdp.set_msid_semantic(FALLBACK_MSID_TOKEN);
    } else {
        sdp.set_msid_semantic(mslabels.join(" "));
    }

    Ok(sdp)
}
