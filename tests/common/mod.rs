//! Scriptable fake wallet extension shared by integration tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use nft_lottery_client::envelope::CallEnvelope;
use nft_lottery_client::session::{ExtensionError, NetworkDetails, SignRequest, WalletExtension};

pub const FAKE_ADDRESS: &str = "GDQNY3PBOJOKYZSRMK2S7LHHGWZIUISD4QORETLMXEWXBI7KFZZMKTL3";
pub const TEST_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Every check is a flag so tests can flip extension behavior mid-flight.
pub struct FakeExtension {
    pub installed: AtomicBool,
    pub unlocked: AtomicBool,
    pub authorized: AtomicBool,
    pub grant_access: AtomicBool,
    pub refuse_signing: AtomicBool,
}

impl FakeExtension {
    /// Installed, unlocked, authorized, approving everything.
    pub fn authorized() -> Self {
        Self {
            installed: AtomicBool::new(true),
            unlocked: AtomicBool::new(true),
            authorized: AtomicBool::new(true),
            grant_access: AtomicBool::new(true),
            refuse_signing: AtomicBool::new(false),
        }
    }

    /// Installed and unlocked but no address exposed yet.
    pub fn unauthorized() -> Self {
        let fake = Self::authorized();
        fake.authorized.store(false, Ordering::SeqCst);
        fake
    }

    pub fn uninstall(&self) {
        self.installed.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletExtension for FakeExtension {
    async fn is_connected(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    async fn network_details(&self) -> Result<NetworkDetails, ExtensionError> {
        if !self.unlocked.load(Ordering::SeqCst) {
            return Err(ExtensionError::Extension(
                "unable to get network details".to_string(),
            ));
        }
        Ok(NetworkDetails {
            network: "TESTNET".to_string(),
            network_passphrase: TEST_PASSPHRASE.to_string(),
        })
    }

    async fn address(&self) -> Result<String, ExtensionError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(FAKE_ADDRESS.to_string())
        } else {
            Err(ExtensionError::Unauthorized)
        }
    }

    async fn request_access(&self) -> Result<String, ExtensionError> {
        if self.grant_access.load(Ordering::SeqCst) {
            self.authorized.store(true, Ordering::SeqCst);
            Ok(FAKE_ADDRESS.to_string())
        } else {
            Err(ExtensionError::Refused("user rejected connection".to_string()))
        }
    }

    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        request: &SignRequest,
    ) -> Result<String, ExtensionError> {
        if self.refuse_signing.load(Ordering::SeqCst) {
            return Err(ExtensionError::Refused("user declined to sign".to_string()));
        }
        assert_eq!(request.network_passphrase, TEST_PASSPHRASE);
        let mut envelope = CallEnvelope::from_base64(envelope_xdr)
            .map_err(|e| ExtensionError::Extension(e.to_string()))?;
        envelope.signatures.push("fake-signature".to_string());
        envelope
            .to_base64()
            .map_err(|e| ExtensionError::Extension(e.to_string()))
    }
}
