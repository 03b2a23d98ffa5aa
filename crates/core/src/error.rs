//! Error types

use thiserror::Error;

use crate::traits::Capability;

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Frame decode error: {0}")]
    Frame(String),

    #[error("{capability} call failed: {message}")]
    Capability {
        capability: Capability,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn capability(capability: Capability, message: impl Into<String>) -> Self {
        Error::Capability {
            capability,
            message: message.into(),
        }
    }

    /// Capability that produced this error, if any
    pub fn failed_capability(&self) -> Option<Capability> {
        match self {
            Error::Capability { capability, .. } => Some(*capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
