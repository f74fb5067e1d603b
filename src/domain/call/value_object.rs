//! Call value objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Call state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    /// Caller has an offer, callee has not finished signaling
    Offering,
    /// Both parties completed signaling
    Active,
    /// Terminal
    Ended,
}

impl CallState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &CallState) -> bool {
        use CallState::*;

        matches!(
            (self, new_state),
            (Offering, Active) | (Offering, Ended) | (Active, Ended)
        )
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, CallState::Ended)
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallState::Offering => "offering",
            CallState::Active => "active",
            CallState::Ended => "ended",
        }
    }
}

/// Reason for call ending
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndReason {
    CallerHangup,
    CalleeHangup,
    CallerDisconnected,
    CalleeDisconnected,
    /// Callee did not complete signaling in time
    Timeout,
    /// Free-form reason supplied by a client
    Other(String),
}

impl EndReason {
    pub fn as_str(&self) -> &str {
        match self {
            EndReason::CallerHangup => "caller_hangup",
            EndReason::CalleeHangup => "callee_hangup",
            EndReason::CallerDisconnected => "caller_disconnected",
            EndReason::CalleeDisconnected => "callee_disconnected",
            EndReason::Timeout => "timeout",
            EndReason::Other(reason) => reason,
        }
    }

    pub fn from_string(value: &str) -> Self {
        match value {
            "caller_hangup" => EndReason::CallerHangup,
            "callee_hangup" => EndReason::CalleeHangup,
            "caller_disconnected" => EndReason::CallerDisconnected,
            "callee_disconnected" => EndReason::CalleeDisconnected,
            "timeout" => EndReason::Timeout,
            other => EndReason::Other(other.to_string()),
        }
    }
}

impl Serialize for EndReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EndReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(EndReason::from_string(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_state_transitions() {
        assert!(CallState::Offering.can_transition_to(&CallState::Active));
        assert!(CallState::Offering.can_transition_to(&CallState::Ended));
        assert!(CallState::Active.can_transition_to(&CallState::Ended));
    }

    #[test]
    fn test_invalid_state_transitions() {
        assert!(!CallState::Active.can_transition_to(&CallState::Offering));
        assert!(!CallState::Ended.can_transition_to(&CallState::Active));
        assert!(!CallState::Ended.can_transition_to(&CallState::Ended));
    }

    #[test]
    fn test_end_reason_wire_format() {
        assert_eq!(
            serde_json::to_string(&EndReason::CalleeDisconnected).unwrap(),
            "\"callee_disconnected\""
        );
        let parsed: EndReason = serde_json::from_str("\"declined\"").unwrap();
        assert_eq!(parsed, EndReason::Other("declined".to_string()));
        assert_eq!(EndReason::from_string("timeout"), EndReason::Timeout);
    }
}
