//! Media bridge bounded context - the SFU's endpoint description format and
//! the port through which conferences and endpoints are allocated

pub mod client;
pub mod endpoint;

pub use client::{ConferenceEndpointState, RelayType, SmbClient};
#[cfg(test)]
pub use client::MockSmbClient;
pub use endpoint::{
    SmbAudio, SmbBundleTransport, SmbCandidate, SmbData, SmbDtls, SmbEndpointDescription, SmbIce,
    SmbPayloadType, SmbRtcpFeedback, SmbRtpHeaderExtension, SmbVideo, SmbVideoSource,
    SmbVideoStream,
};
