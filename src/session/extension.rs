//! Capability trait for the external signing extension.
//!
//! The client never holds key material. Everything it may ask of the wallet
//! extension is behind this narrow trait, which also keeps the session state
//! machine testable against a scripted fake.

use async_trait::async_trait;
use thiserror::Error;

/// Network identity reported by the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDetails {
    /// Human-readable network label (e.g. "TESTNET").
    pub network: String,

    /// Passphrase required for signing on that network.
    pub network_passphrase: String,
}

/// Parameters for a signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub network_passphrase: String,
    pub address: String,
}

/// Failures reported by the extension. All recoverable by re-polling or
/// re-connecting; never fatal to the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("wallet extension not installed or unreachable")]
    Unreachable,

    #[error("address not exposed to this origin")]
    Unauthorized,

    #[error("request refused: {0}")]
    Refused(String),

    #[error("extension error: {0}")]
    Extension(String),
}

/// The narrow surface of the external wallet extension.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Whether the extension is installed and reachable at all.
    async fn is_connected(&self) -> bool;

    /// Current network the extension is pointed at.
    async fn network_details(&self) -> Result<NetworkDetails, ExtensionError>;

    /// The address exposed to this origin, if the user has authorized it.
    async fn address(&self) -> Result<String, ExtensionError>;

    /// Ask the user to expose an address to this origin.
    async fn request_access(&self) -> Result<String, ExtensionError>;

    /// Sign an opaque envelope. Returns the signed envelope or the refusal.
    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        request: &SignRequest,
    ) -> Result<String, ExtensionError>;
}
