//! ICE candidate attribute (RFC 8839 `a=candidate`)
use std::fmt;

/// ICE candidate types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateType {
    /// Host candidate - local interface address
    Host,
    /// Server reflexive candidate - public address discovered via STUN
    ServerReflexive,
    /// Peer reflexive candidate - discovered during connectivity checks
    PeerReflexive,
    /// Relay candidate - address on TURN relay server
    Relay,
}

impl CandidateType {
    pub fn as_str(&self) -> &str {
        match self {
            CandidateType::Host => "host",
            CandidateType::ServerReflexive => "srflx",
            CandidateType::PeerReflexive => "prflx",
            CandidateType::Relay => "relay",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "host" => Some(CandidateType::Host),
            "srflx" => Some(CandidateType::ServerReflexive),
            "prflx" => Some(CandidateType::PeerReflexive),
            "relay" => Some(CandidateType::Relay),
            _ => None,
        }
    }
}

/// ICE candidate as carried in SDP
///
/// Addresses stay textual: browsers may advertise mDNS hostnames instead of
/// IP literals.
#[derive(Debug, Clone, PartialEq)]
pub struct IceCandidate {
    /// Foundation - unique identifier for candidates from same source
    pub foundation: String,
    /// Component ID (1 = RTP, 2 = RTCP)
    pub component: u16,
    /// Transport token as written by the peer ("udp", "UDP", "tcp")
    pub transport: String,
    pub priority: u64,
    pub address: String,
    pub port: u16,
    pub candidate_type: CandidateType,
    /// Related address (for reflexive and relay candidates)
    pub related_address: Option<String>,
    pub related_port: Option<u16>,
    pub tcp_type: Option<String>,
    pub generation: Option<u32>,
    pub network_id: Option<u32>,
    pub network_cost: Option<u32>,
    /// Extension attributes not modelled above, in order
    pub extensions: Vec<(String, String)>,
}

impl IceCandidate {
    pub fn new(
        foundation: impl Into<String>,
        component: u16,
        transport: impl Into<String>,
        priority: u64,
        address: impl Into<String>,
        port: u16,
        candidate_type: CandidateType,
    ) -> Self {
        Self {
            foundation: foundation.into(),
            component,
            transport: transport.into(),
            priority,
            address: address.into(),
            port,
            candidate_type,
            related_address: None,
            related_port: None,
            tcp_type: None,
            generation: None,
            network_id: None,
            network_cost: None,
            extensions: Vec::new(),
        }
    }

    /// Parse the value of a candidate attribute, with or without the
    /// `candidate:` prefix
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let value = value.strip_prefix("candidate:").unwrap_or(value);
        let parts: Vec<&str> = value.split_whitespace().collect();

        if parts.len() < 8 {
            return Err(format!("Invalid candidate: {}", value));
        }

        let component = parts[1]
            .parse::<u16>()
            .map_err(|_| format!("Invalid candidate component: {}", parts[1]))?;
        let priority = parts[3]
            .parse::<u64>()
            .map_err(|_| format!("Invalid candidate priority: {}", parts[3]))?;
        let port = parts[5]
            .parse::<u16>()
            .map_err(|_| format!("Invalid candidate port: {}", parts[5]))?;
        if parts[6] != "typ" {
            return Err("Missing 'typ' keyword".to_string());
        }
        let candidate_type = CandidateType::from_string(parts[7])
            .ok_or_else(|| format!("Invalid candidate type: {}", parts[7]))?;

        let mut candidate = Self::new(
            parts[0],
            component,
            parts[2],
            priority,
            parts[4],
            port,
            candidate_type,
        );

        let mut rest = parts[8..].chunks(2);
        while let Some(pair) = rest.next() {
            let [key, val] = pair else {
                return Err(format!("Dangling candidate extension: {}", pair[0]));
            };
            match *key {
                "raddr" => candidate.related_address = Some(val.to_string()),
                "rport" => candidate.related_port = val.parse().ok(),
                "tcptype" => candidate.tcp_type = Some(val.to_string()),
                "generation" => candidate.generation = val.parse().ok(),
                "network-id" => candidate.network_id = val.parse().ok(),
                "network-cost" => candidate.network_cost = val.parse().ok(),
                _ => candidate.extensions.push((key.to_string(), val.to_string())),
            }
        }

        Ok(candidate)
    }

    /// Attribute value without the `candidate:` prefix
    pub fn to_value(&self) -> String {
        let mut sdp = format!(
            "{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.address,
            self.port,
            self.candidate_type.as_str()
        );

        if let Some(ref raddr) = self.related_address {
            sdp.push_str(&format!(" raddr {}", raddr));
        }
        if let Some(rport) = self.related_port {
            sdp.push_str(&format!(" rport {}", rport));
        }
        if let Some(ref tcp_type) = self.tcp_type {
            sdp.push_str(&format!(" tcptype {}", tcp_type));
        }
        if let Some(generation) = self.generation {
            sdp.push_str(&format!(" generation {}", generation));
        }
        if let Some(network_id) = self.network_id {
            sdp.push_str(&format!(" network-id {}", network_id));
        }
        if let Some(network_cost) = self.network_cost {
            sdp.push_str(&format!(" network-cost {}", network_cost));
        }
        for (key, val) in &self.extensions {
            sdp.push_str(&format!(" {} {}", key, val));
        }

        sdp
    }
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate:{}", self.to_value())
    }
}
