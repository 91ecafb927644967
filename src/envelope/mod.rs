//! Transaction envelope assembly.
//!
//! The pipeline for a state-changing call is a strict state machine:
//! `Building -> Simulated -> Assembled -> Submitted`, with no skippable
//! transition. Each stage is its own type, so skipping one does not compile.
//! Envelopes are single-use: a [`PreparedEnvelope`] is consumed by submission
//! and any failure means restarting from `Building` with a fresh sequence
//! number.

mod args;
mod errors;
mod pipeline;

pub use args::ScArg;
pub use errors::PipelineError;
pub use pipeline::{BuiltCall, EnvelopeBuilder, PreparedEnvelope, SimulatedCall, TxPipeline};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Base fee in smallest units before resource accounting.
pub const BASE_FEE: u64 = 100;

/// Network-relative validity window set at assembly time, in seconds.
/// The sequence number is considered reserved for this long.
pub const VALIDITY_WINDOW_SECS: u64 = 30;

/// A contract call envelope.
///
/// Serialized to an opaque base64 string for the external signer; the signer
/// returns the same shape with `signatures` populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelope {
    /// Source account the envelope is built against.
    pub source: String,

    /// Per-account sequence number, reserved for one submission attempt.
    pub sequence: i64,

    /// Total fee. Base fee until assembly merges the resource estimate.
    pub fee: u64,

    /// Network the envelope is valid on.
    pub network_passphrase: String,

    /// The contract invocation carried by this envelope.
    pub invocation: ContractInvocation,

    /// Ledger footprint, absent until assembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Footprint>,

    /// Unix time after which the envelope is invalid, set at assembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until_unix: Option<u64>,

    /// Signatures attached by the external signer. Never produced here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<String>,
}

/// A single contract method invocation with explicitly typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInvocation {
    pub contract_id: String,
    pub method: String,
    pub args: Vec<ScArg>,
}

/// Ledger entries a transaction will read or write, as estimated by
/// simulation. Required for correct fee and resource accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footprint {
    #[serde(default)]
    pub read_only: Vec<String>,

    #[serde(default)]
    pub read_write: Vec<String>,
}

impl CallEnvelope {
    /// Serialize to the opaque form handed to the external signer.
    pub fn to_base64(&self) -> Result<String, PipelineError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        Ok(BASE64.encode(json))
    }

    /// Parse an opaque envelope, signed or unsigned.
    pub fn from_base64(encoded: &str) -> Result<Self, PipelineError> {
        let json = BASE64
            .decode(encoded)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    /// Whether the external signer has attached at least one signature.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope() -> CallEnvelope {
        CallEnvelope {
            source: "GSOURCE".to_string(),
            sequence: 42,
            fee: BASE_FEE,
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            invocation: ContractInvocation {
                contract_id: "CCONTRACT".to_string(),
                method: "buy_ticket".to_string(),
                args: vec![ScArg::Address("GBUYER".to_string()), ScArg::U64(7), ScArg::U32(3)],
            },
            footprint: None,
            valid_until_unix: None,
            signatures: vec![],
        }
    }

    #[test]
    fn envelope_survives_opaque_round_trip() {
        let envelope = sample_envelope();
        let opaque = envelope.to_base64().unwrap();
        let back = CallEnvelope::from_base64(&opaque).unwrap();
        assert_eq!(back, envelope);
        assert!(!back.is_signed());
    }

    #[test]
    fn signed_form_parses_the_same_way() {
        let mut envelope = sample_envelope();
        envelope.signatures.push("sig0".to_string());
        let back = CallEnvelope::from_base64(&envelope.to_base64().unwrap()).unwrap();
        assert!(back.is_signed());
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        assert!(matches!(
            CallEnvelope::from_base64("not base64 at all!!"),
            Err(PipelineError::Serialization(_))
        ));
    }
}
