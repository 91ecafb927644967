//! Error taxonomy for the transaction pipeline.

use thiserror::Error;

use crate::chain::ChainError;
use crate::decode::DecodeError;

/// Everything that can go wrong between `Building` and the network's verdict.
///
/// No variant is fatal to the process; every failure path returns one of
/// these to the caller, who must restart from `Building` with a fresh
/// sequence number if the envelope was already assembled.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rejected locally, before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another state-changing action from this session is still in flight.
    #[error("another action is already in flight")]
    Busy,

    /// Session is not authorized, or address/passphrase is absent.
    #[error("wallet not connected")]
    NotConnected,

    /// The dry-run rejected the call. Carries the adapter's raw error text.
    #[error("simulation failed: {0}")]
    Simulation(String),

    /// The external signer refused or failed. Envelope discarded.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The network rejected the signed envelope. Envelope discarded.
    #[error("submission failed: {0}")]
    Submission(String),

    /// Transport or protocol failure talking to an endpoint.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// A required field of a return value could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Envelope could not be (de)serialized to its opaque form.
    #[error("envelope serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// Error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Busy => "busy",
            Self::NotConnected => "session",
            Self::Simulation(_) => "simulation",
            Self::Signing(_) => "signing",
            Self::Submission(_) => "submission",
            Self::Chain(_) => "chain",
            Self::Decode(_) => "decode",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether the same action can sensibly be attempted again without a
    /// change of inputs. Envelope-consuming failures still require a fresh
    /// build; this only says retrying is not pointless.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Busy | Self::NotConnected | Self::Chain(_) => true,
            Self::Submission(_) => true,
            Self::Validation(_)
            | Self::Simulation(_)
            | Self::Signing(_)
            | Self::Decode(_)
            | Self::Serialization(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_stable() {
        assert_eq!(PipelineError::Busy.category(), "busy");
        assert_eq!(
            PipelineError::Simulation("boom".to_string()).category(),
            "simulation"
        );
        assert_eq!(PipelineError::NotConnected.category(), "session");
    }

    #[test]
    fn recoverability() {
        assert!(PipelineError::Busy.is_recoverable());
        assert!(PipelineError::NotConnected.is_recoverable());
        assert!(!PipelineError::Signing("refused".to_string()).is_recoverable());
        assert!(!PipelineError::Validation("bad".to_string()).is_recoverable());
    }

    #[test]
    fn simulation_error_text_is_verbatim() {
        let err = PipelineError::Simulation("HostError: contract trapped".to_string());
        assert_eq!(err.to_string(), "simulation failed: HostError: contract trapped");
    }
}
