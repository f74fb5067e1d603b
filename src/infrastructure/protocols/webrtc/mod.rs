//! WebRTC session description handling
pub mod media;
pub mod sdp;

pub use media::{
    Attribute, AudioSection, DataSection, DtlsFingerprint, DtlsSetup, ExtMap, Fmtp,
    MediaDirection, MediaSection, MediaTransport, MediaType, RtcpFeedback, RtpCodec,
    RtpParameters, SdpMedia, SsrcAttribute, SsrcGroup, VideoSection,
};
pub use sdp::{Group, MsidSemantic, Origin, SdpError, SessionDescription};
