//! Client SDP folded into bridge endpoint descriptions
//!
//! Both directions produce a new description and leave the inputs alone.

use super::candidates::to_smb_candidates;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::smb::{
    SmbAudio, SmbDtls, SmbEndpointDescription, SmbIce, SmbPayloadType, SmbRtcpFeedback,
    SmbRtpHeaderExtension, SmbVideo, SmbVideoSource, SmbVideoStream,
};
use crate::infrastructure::protocols::ice::IceCandidate;
use crate::infrastructure::protocols::webrtc::{
    MediaSection, MediaType, RtpCodec, RtpParameters, SdpMedia, SessionDescription,
};
use serde_json::{Map, Value};

pub const ABS_SEND_TIME_URI: &str = "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time";
pub const RTP_STREAM_ID_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id";

const SUPPORTED_VIDEO_CODECS: [&str; 3] = ["VP8", "H264", "VP9"];

/// ICE credentials, session level first, then the given (or first) media
/// section
fn ice_credentials(sdp: &SessionDescription, media: Option<&MediaSection>) -> Result<(String, String)> {
    let section = media.or_else(|| sdp.media.first()).map(|m| m.transport());
    let ufrag = sdp
        .ice_ufrag
        .clone()
        .or_else(|| section.and_then(|t| t.ice_ufrag.clone()))
        .ok_or_else(|| DomainError::validation("SDP has no ICE ufrag"))?;
    let pwd = sdp
        .ice_pwd
        .clone()
        .or_else(|| section.and_then(|t| t.ice_pwd.clone()))
        .ok_or_else(|| DomainError::validation("SDP has no ICE pwd"))?;
    Ok((ufrag, pwd))
}

/// DTLS fingerprint and role, session level first, then the given (or
/// first) media section
fn dtls_parameters(sdp: &SessionDescription, media: Option<&MediaSection>) -> Result<SmbDtls> {
    let section = media.or_else(|| sdp.media.first());
    let fingerprint = sdp
        .fingerprint
        .as_ref()
        .or_else(|| section.and_then(|m| m.transport().fingerprint.as_ref()))
        .ok_or_else(|| DomainError::validation("SDP has no DTLS fingerprint"))?;
    let setup = sdp
        .setup
        .or_else(|| section.and_then(|m| m.transport().setup))
        .ok_or_else(|| DomainError::validation("SDP has no DTLS setup role"))?;

    Ok(SmbDtls {
        setup: setup.as_str().to_string(),
        hash_type: fingerprint.algorithm.clone(),
        hash: fingerprint.value.clone(),
    })
}

/// Every candidate of every section, duplicates removed
fn all_candidates(sdp: &SessionDescription) -> Vec<IceCandidate> {
    let mut seen = Vec::new();
    for candidate in sdp.media.iter().flat_map(|m| m.candidates()) {
        if !seen.contains(candidate) {
            seen.push(candidate.clone());
        }
    }
    seen
}

/// Bridge payload type for one rtpmap entry, with its fmtp parameters and
/// feedback lines
fn payload_type(rtp: &RtpParameters, codec: &RtpCodec) -> SmbPayloadType {
    let mut parameters = Map::new();
    if let Some(fmtp) = rtp.fmtp(codec.payload_type) {
        for (key, value) in fmtp.parameters() {
            parameters.insert(key, Value::String(value));
        }
    }
    let payload = codec.payload_type.to_string();
    let rtcp_fbs = rtp
        .rtcp_fbs
        .iter()
        .filter(|fb| fb.payload == payload)
        .map(|fb| SmbRtcpFeedback {
            feedback_type: fb.feedback_type.clone(),
            subtype: fb.subtype.clone(),
        })
        .collect();

    SmbPayloadType {
        id: codec.payload_type,
        name: codec.name.clone(),
        clockrate: codec.clock_rate,
        channels: codec.channels,
        parameters,
        rtcp_fbs,
    }
}

fn audio_from_offer(rtp: &RtpParameters) -> Result<SmbAudio> {
    let codec = rtp
        .codecs
        .first()
        .ok_or_else(|| DomainError::validation("Audio section has no rtpmap"))?;

    Ok(SmbAudio {
        ssrcs: rtp.ssrc_ids(),
        payload_type: payload_type(rtp, codec),
        rtp_hdrexts: rtp
            .extmaps
            .iter()
            .map(|ext| SmbRtpHeaderExtension {
                id: ext.id,
                uri: ext.uri.clone(),
            })
            .collect(),
    })
}

/// Media-stream id of an SSRC: its `msid` attribute, else the section msid
fn stream_label(rtp: &RtpParameters, section_msid: Option<&str>, ssrc: u32) -> String {
    rtp.ssrcs
        .iter()
        .find(|attr| attr.ssrc == ssrc && attr.attribute == "msid")
        .and_then(|attr| attr.value.as_deref())
        .or(section_msid)
        .and_then(|msid| msid.split_whitespace().next())
        .unwrap_or("-")
        .to_string()
}

fn video_from_offer(rtp: &RtpParameters, section_msid: Option<&str>) -> SmbVideo {
    let mut payload_types: Vec<SmbPayloadType> = Vec::new();
    for codec in &rtp.codecs {
        let supported = SUPPORTED_VIDEO_CODECS
            .iter()
            .any(|name| codec.name.eq_ignore_ascii_case(name));
        if supported && !payload_types.iter().any(|pt| pt.id == codec.payload_type) {
            payload_types.push(payload_type(rtp, codec));
        }
    }

    let rtp_hdrexts = rtp
        .extmaps
        .iter()
        .filter(|ext| ext.uri == ABS_SEND_TIME_URI || ext.uri == RTP_STREAM_ID_URI)
        .map(|ext| SmbRtpHeaderExtension {
            id: ext.id,
            uri: ext.uri.clone(),
        })
        .collect();

    let fid_pairs: Vec<(u32, u32)> = rtp
        .ssrc_groups
        .iter()
        .filter(|group| group.semantics == "FID" && group.ssrcs.len() >= 2)
        .map(|group| (group.ssrcs[0], group.ssrcs[1]))
        .collect();

    let mut streams: Vec<SmbVideoStream> = Vec::new();
    for ssrc in rtp.ssrc_ids() {
        if fid_pairs.iter().any(|&(_, feedback)| feedback == ssrc) {
            continue;
        }
        let source = SmbVideoSource {
            main: ssrc,
            feedback: fid_pairs
                .iter()
                .find(|&&(main, _)| main == ssrc)
                .map(|&(_, feedback)| feedback),
        };
        let label = stream_label(rtp, section_msid, ssrc);
        match streams.iter_mut().find(|stream| stream.id == label) {
            Some(stream) => stream.sources.push(source),
            None => streams.push(SmbVideoStream {
                sources: vec![source],
                id: label,
                content: "video".to_string(),
            }),
        }
    }

    SmbVideo {
        streams,
        payload_types,
        rtp_hdrexts,
    }
}

/// Endpoint description the bridge needs to receive a client's offer
///
/// The endpoint's transport is required up front; the returned description
/// carries the client's ICE/DTLS parameters, the first audio codec, the
/// supported video codecs and no data channel.
pub fn endpoint_from_client_offer(
    endpoint: &SmbEndpointDescription,
    offer: &SessionDescription,
) -> Result<SmbEndpointDescription> {
    endpoint.bundle_transport()?;
    endpoint.dtls()?;
    endpoint.ice()?;

    let mut configured = endpoint.clone();
    let (ufrag, pwd) = ice_credentials(offer, None)?;
    let dtls = dtls_parameters(offer, None)?;
    let transport = configured
        .bundle_transport
        .get_or_insert_with(Default::default);
    transport.ice = Some(SmbIce {
        ufrag,
        pwd,
        candidates: to_smb_candidates(&all_candidates(offer)),
    });
    transport.dtls = Some(dtls);

    let audio = offer
        .find_media(MediaType::Audio)
        .and_then(|m| m.rtp())
        .ok_or_else(|| DomainError::validation("Client offer has no audio section"))?;
    configured.audio = Some(audio_from_offer(audio)?);

    configured.video = offer.find_media(MediaType::Video).and_then(|section| {
        section
            .rtp()
            .map(|rtp| video_from_offer(rtp, section.transport().msid.as_deref()))
    });
    configured.data = None;

    configured.validate_for_configure()?;
    Ok(configured)
}

/// Endpoint description updated with a client's answer to a bridge offer
///
/// The audio section is located by type: answers may or may not carry a
/// data channel ahead of it. SSRCs announced with `msid` win; otherwise the
/// first SSRC of the section is used.
pub fn endpoint_from_client_answer(
    endpoint: &SmbEndpointDescription,
    answer: &SessionDescription,
) -> Result<SmbEndpointDescription> {
    let audio_section = answer
        .find_media(MediaType::Audio)
        .ok_or_else(|| DomainError::validation("Answer has no audio section"))?;
    let rtp = audio_section
        .rtp()
        .ok_or_else(|| DomainError::validation("Answer audio section has no RTP parameters"))?;

    let mut ssrcs: Vec<u32> = Vec::new();
    for attr in rtp.ssrcs.iter().filter(|attr| attr.attribute == "msid") {
        if !ssrcs.contains(&attr.ssrc) {
            ssrcs.push(attr.ssrc);
        }
    }
    if ssrcs.is_empty() {
        ssrcs.extend(rtp.ssrcs.first().map(|attr| attr.ssrc));
    }
    if ssrcs.is_empty() {
        return Err(DomainError::validation("Answer audio section has no SSRC"));
    }

    let mut configured = endpoint.clone();
    let mut audio = endpoint.audio()?.clone();
    audio.ssrcs = ssrcs;
    configured.audio = Some(audio);

    let (ufrag, pwd) = ice_credentials(answer, Some(audio_section))?;
    let dtls = dtls_parameters(answer, Some(audio_section))?;
    let transport = configured
        .bundle_transport
        .get_or_insert_with(Default::default);
    transport.ice = Some(SmbIce {
        ufrag,
        pwd,
        candidates: to_smb_candidates(&all_candidates(answer)),
    });
    transport.dtls = Some(dtls);

    configured.validate_for_configure()?;
    Ok(configured)
}
