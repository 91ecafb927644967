//! HTTP client for the simulation/submission RPC and the account endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::envelope::{EnvelopeBuilder, Footprint, ScArg};
use crate::types::SubmissionOutcome;

use super::ChainError;

/// Generate a throwaway read-only identity.
///
/// A freshly generated key used only to author a simulation locally; it is
/// never submitted, never funded, and never reused.
pub fn read_identity() -> String {
    let signing = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
    stellar_strkey::ed25519::PublicKey(signing.verifying_key().to_bytes()).to_string()
}

/// Outcome of a dry-run call.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Raw simulation error text, verbatim from the endpoint. `None` means
    /// the dry-run succeeded.
    pub error: Option<String>,

    /// Self-describing return value of the simulated call, if any.
    pub retval: Option<Value>,

    /// Estimated ledger footprint.
    pub footprint: Option<Footprint>,

    /// Resource fee estimate in smallest units.
    pub min_resource_fee: u64,

    /// Instruction/memory cost estimate, when the endpoint reports one.
    pub cost: Option<SimulationCost>,

    /// Ledger the simulation ran against.
    pub latest_ledger: u64,
}

/// Instruction/memory cost estimate reported by simulation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationCost {
    #[serde(default, rename = "cpuInsns", deserialize_with = "flexible_u64")]
    pub cpu_instructions: u64,

    #[serde(default, rename = "memBytes", deserialize_with = "flexible_u64")]
    pub memory_bytes: u64,
}

/// Thin façade over the two external services everything above depends on.
pub struct ChainClient {
    http: reqwest::Client,
    rpc_url: String,
    horizon_url: String,
    network_passphrase: String,
    next_request_id: AtomicU64,
}

impl ChainClient {
    pub fn new(config: &NetworkConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            horizon_url: config.horizon_url.trim_end_matches('/').to_string(),
            network_passphrase: config.network_passphrase.clone(),
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Passphrase of the network this client is configured against.
    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    /// Dry-run an envelope against current chain state.
    ///
    /// Returns the decoded return value and resource estimates, or the
    /// endpoint's simulation error text verbatim inside [`Simulation`].
    pub async fn simulate(&self, envelope_xdr: &str) -> Result<Simulation, ChainError> {
        let response: SimulateResponse = self
            .rpc_call("simulateTransaction", TransactionParams { transaction: envelope_xdr })
            .await?;
        Ok(Simulation {
            error: response.error,
            retval: response.results.into_iter().next().map(|r| r.retval),
            footprint: response.footprint,
            min_resource_fee: response
                .min_resource_fee
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(|_| {
                    ChainError::MalformedResponse("non-numeric minResourceFee".to_string())
                })?
                .unwrap_or(0),
            cost: response.cost,
            latest_ledger: response.latest_ledger,
        })
    }

    /// Simulate a read-only contract call under a throwaway identity.
    ///
    /// The caller needs no funds and no on-chain account; the envelope is
    /// built at sequence 0 and exists only for this dry-run.
    pub async fn simulate_view(
        &self,
        contract_id: &str,
        method: &str,
        args: Vec<ScArg>,
    ) -> Result<Simulation, ChainError> {
        let built = EnvelopeBuilder::new(contract_id, method)
            .args(args)
            .build(read_identity(), 0, self.network_passphrase.clone());
        let opaque = built
            .envelope()
            .to_base64()
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
        self.simulate(&opaque).await
    }

    /// Forward a fully signed envelope to the network.
    ///
    /// The network's acceptance or rejection is returned verbatim; no
    /// interpretation happens at this layer.
    pub async fn submit(&self, signed_envelope_xdr: &str) -> Result<SubmissionOutcome, ChainError> {
        self.rpc_call("sendTransaction", TransactionParams { transaction: signed_envelope_xdr })
            .await
    }

    /// Fetch the current sequence number for an account.
    pub async fn load_sequence(&self, account: &str) -> Result<i64, ChainError> {
        let url = format!("{}/accounts/{}", self.horizon_url, account);
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChainError::AccountNotFound(account.to_string()));
        }
        if !response.status().is_success() {
            return Err(ChainError::RpcResponse {
                code: Some(response.status().as_u16() as i64),
                message: format!("account endpoint returned {}", response.status()),
            });
        }
        let record: AccountRecord = response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
        record
            .sequence
            .parse()
            .map_err(|_| ChainError::MalformedResponse("non-numeric sequence".to_string()))
    }

    async fn rpc_call<P: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, ChainError> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc call");
        let response = self
            .http
            .post(&self.rpc_url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?;
        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
        if let Some(err) = body.error {
            return Err(ChainError::RpcResponse {
                code: Some(err.code),
                message: err.message,
            });
        }
        body.result
            .ok_or_else(|| ChainError::MalformedResponse("missing result".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Wire shapes

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Serialize)]
struct TransactionParams<'a> {
    transaction: &'a str,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<SimulateResult>,
    #[serde(default)]
    footprint: Option<Footprint>,
    #[serde(default)]
    min_resource_fee: Option<String>,
    #[serde(default)]
    cost: Option<SimulationCost>,
    #[serde(default)]
    latest_ledger: u64,
}

#[derive(Deserialize)]
struct SimulateResult {
    retval: Value,
}

#[derive(Deserialize)]
struct AccountRecord {
    sequence: String,
}

fn flexible_u64<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| serde::de::Error::custom("negative")),
        Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        _ => Err(serde::de::Error::custom("expected number or string")),
    }
}
