//! Allocation policy, voice bindings and router state

use std::fmt;
use std::str::FromStr;

use pad_protocol::Note;
use serde::{Deserialize, Serialize};

use crate::error::MuxError;

/// How incoming notes are mapped onto physical channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Source channel `c` drives physical channel `c`; latest note wins
    #[default]
    SingleVoice,
    /// Notes are bound to the first free physical channel
    Polyphony,
}

impl AllocationPolicy {
    /// All policies, in display order
    pub const ALL: [AllocationPolicy; 2] = [AllocationPolicy::SingleVoice, AllocationPolicy::Polyphony];

    /// Configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SingleVoice => "single_voice",
            Self::Polyphony => "polyphony",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::SingleVoice => "One source channel per pad, the most recent note on a channel wins",
            Self::Polyphony => "Any note takes the first free pad; notes are dropped when all pads sound",
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocationPolicy {
    type Err = MuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single_voice" => Ok(Self::SingleVoice),
            "polyphony" => Ok(Self::Polyphony),
            other => Err(MuxError::UnknownPolicy(other.to_string())),
        }
    }
}

/// The note occupying a polyphony slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceBinding {
    /// Channel the note arrived on
    pub source_channel: u8,
    /// Sounding note
    pub note: Note,
}

impl VoiceBinding {
    pub fn new(source_channel: u8, note: Note) -> Self {
        Self {
            source_channel,
            note,
        }
    }
}

/// Lifecycle of an event router
///
/// `Idle → Streaming → Stopping → Stopped`. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RouterState {
    /// No source attached yet
    #[default]
    Idle,
    /// Dispatching events from a source
    Streaming,
    /// Silencing every channel
    Stopping,
    /// Finished; no further output
    Stopped,
}

impl RouterState {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Whether the router has begun or finished its stop-all
    pub fn is_finishing(&self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped)
    }
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("single_voice".parse(), Ok(AllocationPolicy::SingleVoice));
        assert_eq!("polyphony".parse(), Ok(AllocationPolicy::Polyphony));
        assert_eq!(
            "round_robin".parse::<AllocationPolicy>(),
            Err(MuxError::UnknownPolicy("round_robin".to_string()))
        );
    }

    #[test]
    fn test_policy_names_round_trip() {
        for policy in AllocationPolicy::ALL {
            assert_eq!(policy.name().parse::<AllocationPolicy>(), Ok(policy));
            assert!(!policy.description().is_empty());
        }
        assert_eq!(AllocationPolicy::default(), AllocationPolicy::SingleVoice);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&AllocationPolicy::Polyphony).unwrap();
        assert_eq!(json, "\"polyphony\"");
        let parsed: AllocationPolicy = serde_json::from_str("\"single_voice\"").unwrap();
        assert_eq!(parsed, AllocationPolicy::SingleVoice);
    }

    #[test]
    fn test_router_state_finishing() {
        assert!(!RouterState::Idle.is_finishing());
        assert!(!RouterState::Streaming.is_finishing());
        assert!(RouterState::Stopping.is_finishing());
        assert!(RouterState::Stopped.is_finishing());
    }
}
