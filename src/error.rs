//! Error types for DSA operations

use core::fmt;

use crate::params::Phase;

/// Errors that can occur during parameter generation, signing or verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied option or argument is unusable
    InvalidParameter(String),

    /// Key material failed a consistency check
    InvalidKey(String),

    /// Signing requires the private half of the key
    MissingPrivateKey,

    /// The operating-system entropy source is unavailable or failed mid-call
    Rng(String),

    /// A post-condition was violated; indicates a library bug
    Internal(String),

    /// Generation was stopped by the caller's progress hook
    Cancelled {
        /// Search loop that was running when the hook cancelled
        phase: Phase,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Error::MissingPrivateKey => write!(f, "Operation requires a private key"),
            Error::Rng(msg) => write!(f, "RNG error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
            Error::Cancelled { phase } => {
                write!(f, "Parameter generation cancelled during {} search", phase)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
