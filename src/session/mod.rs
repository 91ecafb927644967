//! Wallet session state machine.
//!
//! Tracks extension connectivity and authorization across a fixed-interval
//! polling loop and exposes `connect` and `sign_and_submit` to the rest of
//! the client. A poll tick only rewrites connectivity display fields; it
//! never cancels or touches an in-flight transaction pipeline.

mod extension;
mod gate;

pub use extension::{ExtensionError, NetworkDetails, SignRequest, WalletExtension};
pub use gate::{ActionGate, ActionPermit};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::envelope::{CallEnvelope, PipelineError, PreparedEnvelope};
use crate::types::SubmissionOutcome;

/// Connectivity/authorization states.
///
/// `Unknown` exists only before the first refresh; every refresh re-derives
/// one of the other four from three ordered checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No refresh has completed yet.
    Unknown,
    /// Extension not installed or unreachable.
    Unavailable,
    /// Extension reachable but network details unavailable (e.g. locked).
    Disconnected,
    /// Reachable with network details, but no address exposed to this origin.
    ConnectedUnauthorized,
    /// Address exposed; signing is possible.
    ConnectedAuthorized,
}

/// Snapshot of the wallet session at one poll tick.
#[derive(Debug, Clone)]
pub struct WalletSession {
    pub state: SessionState,
    pub address: Option<String>,
    pub network: Option<String>,
    pub network_passphrase: Option<String>,
    /// Diagnostic from the most recent failed check, if any.
    pub last_error: Option<String>,
}

impl WalletSession {
    fn unknown() -> Self {
        Self {
            state: SessionState::Unknown,
            address: None,
            network: None,
            network_passphrase: None,
            last_error: None,
        }
    }

    /// Whether signing is currently possible.
    pub fn is_authorized(&self) -> bool {
        self.state == SessionState::ConnectedAuthorized
    }
}

/// Owns the session snapshot, the polling loop, and the signing path.
pub struct SessionManager {
    extension: Arc<dyn WalletExtension>,
    chain: Arc<ChainClient>,
    session: Arc<RwLock<WalletSession>>,
    gate: ActionGate,
}

impl SessionManager {
    pub fn new(extension: Arc<dyn WalletExtension>, chain: Arc<ChainClient>) -> Self {
        Self {
            extension,
            chain,
            session: Arc::new(RwLock::new(WalletSession::unknown())),
            gate: ActionGate::new(),
        }
    }

    /// The per-session processing gate for state-changing actions.
    pub fn gate(&self) -> &ActionGate {
        &self.gate
    }

    /// Current session snapshot.
    pub async fn snapshot(&self) -> WalletSession {
        self.session.read().await.clone()
    }

    /// Re-derive the session state from three ordered checks: extension
    /// reachability, network details, exposed address. The first failing
    /// check short-circuits into the corresponding partial state with the
    /// failure recorded; nothing here returns an error.
    pub async fn refresh(&self) -> WalletSession {
        let next = self.derive_session().await;
        let mut guard = self.session.write().await;
        if guard.state != next.state {
            debug!(from = ?guard.state, to = ?next.state, "session state changed");
        }
        *guard = next.clone();
        next
    }

    async fn derive_session(&self) -> WalletSession {
        if !self.extension.is_connected().await {
            return WalletSession {
                state: SessionState::Unavailable,
                last_error: Some(ExtensionError::Unreachable.to_string()),
                ..WalletSession::unknown()
            };
        }

        let details = match self.extension.network_details().await {
            Ok(details) => details,
            Err(err) => {
                return WalletSession {
                    state: SessionState::Disconnected,
                    last_error: Some(err.to_string()),
                    ..WalletSession::unknown()
                }
            }
        };

        match self.extension.address().await {
            Ok(address) => WalletSession {
                state: SessionState::ConnectedAuthorized,
                address: Some(address),
                network: Some(details.network),
                network_passphrase: Some(details.network_passphrase),
                last_error: None,
            },
            Err(err) => WalletSession {
                state: SessionState::ConnectedUnauthorized,
                address: None,
                network: Some(details.network),
                network_passphrase: Some(details.network_passphrase),
                last_error: Some(err.to_string()),
            },
        }
    }

    /// Run `refresh` forever on a fixed interval.
    ///
    /// Polling continues in every state, including `Unavailable`, so
    /// install/unlock/account-switch events are observed without a reload.
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                manager.refresh().await;
            }
        })
    }

    /// Ask the extension to expose an address to this origin.
    ///
    /// On refusal the session stays unauthorized with the reason recorded;
    /// the updated snapshot is returned either way.
    pub async fn connect(&self) -> WalletSession {
        if !self.extension.is_connected().await {
            let next = WalletSession {
                state: SessionState::Unavailable,
                last_error: Some(ExtensionError::Unreachable.to_string()),
                ..WalletSession::unknown()
            };
            *self.session.write().await = next.clone();
            return next;
        }

        match self.extension.request_access().await {
            Ok(address) => {
                info!(%address, "wallet access granted");
                let next = match self.extension.network_details().await {
                    Ok(details) => WalletSession {
                        state: SessionState::ConnectedAuthorized,
                        address: Some(address),
                        network: Some(details.network),
                        network_passphrase: Some(details.network_passphrase),
                        last_error: None,
                    },
                    Err(err) => WalletSession {
                        state: SessionState::Disconnected,
                        last_error: Some(err.to_string()),
                        ..WalletSession::unknown()
                    },
                };
                *self.session.write().await = next.clone();
                next
            }
            Err(err) => {
                warn!(error = %err, "wallet access refused");
                let mut guard = self.session.write().await;
                guard.state = SessionState::ConnectedUnauthorized;
                guard.address = None;
                guard.last_error = Some(err.to_string());
                guard.clone()
            }
        }
    }

    /// Sign an assembled envelope with the session's address and passphrase,
    /// then forward it to the network.
    ///
    /// Only valid from `ConnectedAuthorized`. The envelope is consumed; on
    /// any failure the caller must rebuild from `Building` with a fresh
    /// sequence number. The network's outcome is returned unmodified.
    pub async fn sign_and_submit(
        &self,
        prepared: PreparedEnvelope,
    ) -> Result<SubmissionOutcome, PipelineError> {
        let snapshot = self.snapshot().await;
        if !snapshot.is_authorized() {
            return Err(PipelineError::NotConnected);
        }
        let (address, network_passphrase) =
            match (snapshot.address, snapshot.network_passphrase) {
                (Some(address), Some(passphrase)) => (address, passphrase),
                _ => return Err(PipelineError::NotConnected),
            };

        let request = SignRequest {
            network_passphrase,
            address,
        };
        let signed = self
            .extension
            .sign_transaction(prepared.envelope_xdr(), &request)
            .await
            .map_err(|e| PipelineError::Signing(e.to_string()))?;

        // The extension's output must parse as a signed envelope before it
        // goes anywhere near the network.
        let parsed = CallEnvelope::from_base64(&signed)
            .map_err(|e| PipelineError::Signing(format!("unparseable signed envelope: {e}")))?;
        if !parsed.is_signed() {
            return Err(PipelineError::Signing(
                "extension returned an unsigned envelope".to_string(),
            ));
        }

        info!(sequence = prepared.sequence(), "submitting signed envelope");
        Ok(self.chain.submit(&signed).await?)
    }
}
