//! Translation between SDP candidate attributes and bridge candidates

use crate::domain::smb::SmbCandidate;
use crate::infrastructure::protocols::ice::{CandidateType, IceCandidate};
use tracing::warn;

/// Bridge candidate rendered for an SDP media section
///
/// Returns `None` for candidate types SDP cannot express.
pub fn to_sdp_candidate(candidate: &SmbCandidate) -> Option<IceCandidate> {
    let Some(candidate_type) = CandidateType::from_string(&candidate.candidate_type) else {
        warn!(
            "Skipping bridge candidate with unknown type {}",
            candidate.candidate_type
        );
        return None;
    };
    let component = u16::try_from(candidate.component).ok()?;

    let mut sdp = IceCandidate::new(
        candidate.foundation.clone(),
        component,
        candidate.protocol.clone(),
        candidate.priority,
        candidate.ip.clone(),
        candidate.port,
        candidate_type,
    );
    sdp.related_address = candidate.rel_addr.clone();
    sdp.related_port = candidate.rel_port;
    sdp.generation = Some(candidate.generation);
    sdp.network_id = candidate.network;
    Some(sdp)
}

/// Bridge candidates for every entry of a media section, in order
pub fn to_sdp_candidates(candidates: &[SmbCandidate]) -> Vec<IceCandidate> {
    candidates.iter().filter_map(to_sdp_candidate).collect()
}

/// SDP candidate in the bridge's shape: `transport` becomes `protocol`,
/// `network-id` becomes `network`, `raddr`/`rport` become `rel-addr`/`rel-port`
pub fn to_smb_candidate(candidate: &IceCandidate) -> SmbCandidate {
    SmbCandidate {
        generation: candidate.generation.unwrap_or(0),
        component: u32::from(candidate.component),
        protocol: candidate.transport.to_lowercase(),
        port: candidate.port,
        ip: candidate.address.clone(),
        rel_port: candidate.related_port,
        rel_addr: candidate.related_address.clone(),
        foundation: candidate.foundation.clone(),
        priority: candidate.priority,
        candidate_type: candidate.candidate_type.as_str().to_string(),
        network: candidate.network_id,
    }
}

pub fn to_smb_candidates(candidates: &[IceCandidate]) -> Vec<SmbCandidate> {
    candidates.iter().map(to_smb_candidate).collect()
}
