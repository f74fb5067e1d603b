//! Answers to WHIP/WHEP offers
//!
//! The client's offer is echoed back with the bridge's transport, trimmed to
//! what the bridge receives: opus audio and VP8 (+RTX) video, both
//! `recvonly`. All sections share one transport, so candidates are only
//! listed on the first.

use super::candidates::to_sdp_candidates;
use super::offer::flip_setup;
use crate::domain::shared::result::Result;
use crate::domain::smb::SmbEndpointDescription;
use crate::infrastructure::protocols::webrtc::{
    DtlsFingerprint, MediaDirection, MediaSection, RtpParameters, SdpMedia, SessionDescription,
};

/// Payload ids the bridge accepts in an audio section: the first opus
fn audio_payloads(rtp: &RtpParameters) -> Vec<u8> {
    rtp.codecs
        .iter()
        .find(|codec| codec.name.eq_ignore_ascii_case("opus"))
        .map(|codec| vec![codec.payload_type])
        .unwrap_or_default()
}

/// Payload ids the bridge accepts in a video section: the first VP8 and the
/// RTX payload whose fmtp is exactly `apt=<vp8>`
fn video_payloads(rtp: &RtpParameters) -> Vec<u8> {
    let Some(vp8) = rtp
        .codecs
        .iter()
        .find(|codec| codec.name.eq_ignore_ascii_case("VP8"))
    else {
        return Vec::new();
    };

    let apt = format!("apt={}", vp8.payload_type);
    let mut keep = vec![vp8.payload_type];
    keep.extend(
        rtp.fmtps
            .iter()
            .filter(|fmtp| fmtp.config == apt)
            .map(|fmtp| fmtp.payload_type),
    );
    keep
}

/// Narrow an RTP section to the given payloads as a receive-only answer;
/// rejects the section when nothing survives
fn answer_rtp_section(media: &mut MediaSection, keep: Vec<u8>, clear_feedback: bool) {
    if keep.is_empty() {
        reject(media);
        return;
    }
    if let Some(rtp) = media.rtp_mut() {
        rtp.retain_payloads(&keep);
        if clear_feedback {
            rtp.rtcp_fbs.clear();
        }
        rtp.ssrcs.clear();
        rtp.ssrc_groups.clear();
    }
    let transport = media.transport_mut();
    transport.formats = keep.iter().map(|pt| pt.to_string()).collect();
    transport.direction = Some(MediaDirection::RecvOnly);
    transport.msid = None;
}

/// Port zero, inactive, no candidates
fn reject(media: &mut MediaSection) {
    let transport = media.transport_mut();
    transport.port = 0;
    transport.direction = Some(MediaDirection::Inactive);
    transport.candidates.clear();
    transport.end_of_candidates = false;
}

/// Build the bridge's answer to a client WHIP/WHEP offer
///
/// The origin version is bumped and the msid-semantic token forced to `*`.
/// Data channels survive only when the endpoint has one.
pub fn create_whip_whep_answer(
    offer: &SessionDescription,
    endpoint: &SmbEndpointDescription,
) -> Result<SessionDescription> {
    let ice = endpoint.ice()?;
    let dtls = endpoint.dtls()?;

    let mut answer = offer.clone();
    answer.origin.session_version += 1;
    answer.set_msid_semantic("*");
    answer.ice_ufrag = None;
    answer.ice_pwd = None;
    answer.ice_options = None;
    answer.fingerprint = None;
    answer.setup = None;

    let candidates = to_sdp_candidates(&ice.candidates);
    for (index, media) in answer.media.iter_mut().enumerate() {
        {
            let transport = media.transport_mut();
            transport.set_ice_credentials(&ice.ufrag, &ice.pwd);
            transport.ice_options = None;
            transport.fingerprint = Some(DtlsFingerprint::new(&dtls.hash_type, &dtls.hash));
            transport.setup = Some(flip_setup(&dtls.setup));
            transport.candidates = if index == 0 {
                candidates.clone()
            } else {
                Vec::new()
            };
            transport.end_of_candidates = false;
        }

        let narrowing = match media {
            MediaSection::Audio(audio) => Some((audio_payloads(&audio.rtp), true)),
            MediaSection::Video(video) => Some((video_payloads(&video.rtp), false)),
            MediaSection::Application(_) => None,
        };
        match (narrowing, endpoint.data) {
            (Some((keep, clear_feedback)), _) => answer_rtp_section(media, keep, clear_feedback),
            (None, Some(smb_data)) => {
                if let MediaSection::Application(data) = media {
                    data.sctp_port = Some(smb_data.port);
                }
            }
            (None, None) => reject(media),
        }
    }

    let mids: Vec<String> = answer
        .media
        .iter()
        .filter(|m| !m.is_rejected())
        .filter_map(|m| m.mid().map(str::to_string))
        .collect();
    answer.set_bundle(mids);

    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sdp::fixtures::{bridge_endpoint, WHIP_OFFER};
    use crate::infrastructure::protocols::webrtc::{DtlsSetup, MediaType};

    fn answer() -> SessionDescription {
        let offer = SessionDescription::parse(WHIP_OFFER).unwrap();
        create_whip_whep_answer(&offer, &bridge_endpoint()).unwrap()
    }

    #[test]
    fn test_audio_narrowed_to_opus() {
        let answer = answer();
        let audio = answer.find_media(MediaType::Audio).unwrap();
        let rtp = audio.rtp().unwrap();

        assert_eq!(rtp.codecs.len(), 1);
        assert_eq!(rtp.codecs[0].name, "opus");
        assert_eq!(rtp.fmtps.len(), 1);
        assert_eq!(rtp.fmtps[0].payload_type, 111);
        assert!(rtp.rtcp_fbs.is_empty());
        assert!(rtp.ssrcs.is_empty());
        assert_eq!(audio.direction(), Some(MediaDirection::RecvOnly));
        assert_eq!(audio.transport().formats, vec!["111"]);
    }

    #[test]
    fn test_video_keeps_vp8_and_rtx() {
        let answer = answer();
        let video = answer.find_media(MediaType::Video).unwrap();
        let rtp = video.rtp().unwrap();

        let payloads: Vec<u8> = rtp.codecs.iter().map(|c| c.payload_type).collect();
        assert_eq!(payloads, vec![96, 97]);
        assert_eq!(rtp.rtcp_fbs.len(), 1);
        assert_eq!(video.direction(), Some(MediaDirection::RecvOnly));
    }

    #[test]
    fn test_transport_and_candidates() {
        let answer = answer();
        assert_eq!(answer.origin.session_version, 3);
        assert_eq!(answer.msid_semantic.as_ref().unwrap().token, "*");
        assert!(answer.ice_ufrag.is_none());

        let first = &answer.media[0];
        let second = &answer.media[1];
        assert_eq!(first.transport().ice_ufrag.as_deref(), Some("smbUfrag"));
        assert_eq!(second.transport().ice_ufrag.as_deref(), Some("smbUfrag"));
        assert_eq!(first.transport().setup, Some(DtlsSetup::Active));
        assert_eq!(first.candidates().len(), 1);
        assert!(second.candidates().is_empty());
        assert_eq!(answer.bundle_group().unwrap().mids, vec!["0", "1"]);
    }

    #[test]
    fn test_unsupported_video_is_rejected() {
        let h264_only = WHIP_OFFER
            .replace("m=video 9 UDP/TLS/RTP/SAVPF 96 97 102", "m=video 9 UDP/TLS/RTP/SAVPF 102")
            .replace("a=rtpmap:96 VP8/90000\r\n", "")
            .replace("a=rtcp-fb:96 nack\r\n", "")
            .replace("a=rtpmap:97 rtx/90000\r\n", "")
            .replace("a=fmtp:97 apt=96\r\n", "");
        let offer = SessionDescription::parse(&h264_only).unwrap();
        let answer = create_whip_whep_answer(&offer, &bridge_endpoint()).unwrap();

        assert!(answer.media[1].is_rejected());
        assert_eq!(answer.bundle_group().unwrap().mids, vec!["0"]);
    }

    #[test]
    fn test_answer_reparses() {
        let answer = answer();
        let reparsed = SessionDescription::parse(&answer.to_sdp_string()).unwrap();
        assert_eq!(reparsed.media.len(), answer.media.len());
        assert_eq!(
            reparsed.bundle_group().unwrap().mids,
            answer.bundle_group().unwrap().mids
        );
    }
}
