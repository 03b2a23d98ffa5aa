//! Participant roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The two sides of a conversation. Exactly one live connection per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// Sends video frames of sign language, receives transcribed speech
    Signer,
    /// Sends speech audio, receives refined text and synthesized audio
    Hearing,
}

impl ParticipantRole {
    pub const ALL: [ParticipantRole; 2] = [ParticipantRole::Signer, ParticipantRole::Hearing];

    /// The role results are routed to
    pub fn peer(self) -> Self {
        match self {
            ParticipantRole::Signer => ParticipantRole::Hearing,
            ParticipantRole::Hearing => ParticipantRole::Signer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantRole::Signer => "signer",
            ParticipantRole::Hearing => "hearing",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = Error;

    /// Accepts the legacy route names (`deaf`, `normal`) alongside the role names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signer" | "deaf" => Ok(ParticipantRole::Signer),
            "hearing" | "normal" => Ok(ParticipantRole::Hearing),
            other => Err(Error::InvalidInput(format!("unknown participant role: {}", other))),
        }
    }
}
