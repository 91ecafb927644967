//! Staged pipeline from a built call to a signable envelope.
//!
//! Stages are distinct types: a [`BuiltCall`] can only be simulated, a
//! [`SimulatedCall`] can only be assembled, and a [`PreparedEnvelope`] can
//! only be consumed once by submission.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::chain::{ChainClient, Simulation};

use super::{CallEnvelope, ContractInvocation, PipelineError, ScArg, BASE_FEE, VALIDITY_WINDOW_SECS};

/// `Building` stage: collects the call into an unsigned, unsimulated
/// envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    contract_id: String,
    method: String,
    args: Vec<ScArg>,
}

impl EnvelopeBuilder {
    pub fn new(contract_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append one explicitly typed positional argument.
    pub fn arg(mut self, arg: ScArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = ScArg>) -> Self {
        self.args.extend(args);
        self
    }

    /// Finish `Building` against a source account and reserved sequence.
    pub fn build(
        self,
        source: impl Into<String>,
        sequence: i64,
        network_passphrase: impl Into<String>,
    ) -> BuiltCall {
        BuiltCall {
            envelope: CallEnvelope {
                source: source.into(),
                sequence,
                fee: BASE_FEE,
                network_passphrase: network_passphrase.into(),
                invocation: ContractInvocation {
                    contract_id: self.contract_id,
                    method: self.method,
                    args: self.args,
                },
                footprint: None,
                valid_until_unix: None,
                signatures: vec![],
            },
        }
    }
}

/// A built-but-unsimulated call. The only way forward is [`Self::simulate`].
#[derive(Debug)]
pub struct BuiltCall {
    envelope: CallEnvelope,
}

impl BuiltCall {
    pub fn envelope(&self) -> &CallEnvelope {
        &self.envelope
    }

    /// `Building -> Simulated`: dry-run the envelope to obtain its resource
    /// footprint and fee estimate. A simulation failure aborts the pipeline
    /// with the adapter's raw error text.
    pub async fn simulate(self, chain: &ChainClient) -> Result<SimulatedCall, PipelineError> {
        let opaque = self.envelope.to_base64()?;
        let simulation = chain.simulate(&opaque).await?;
        if let Some(error) = simulation.error {
            return Err(PipelineError::Simulation(error));
        }
        debug!(
            method = %self.envelope.invocation.method,
            min_resource_fee = simulation.min_resource_fee,
            "simulation succeeded"
        );
        Ok(SimulatedCall {
            envelope: self.envelope,
            simulation,
        })
    }
}

/// A simulated call carrying its footprint estimate.
#[derive(Debug)]
pub struct SimulatedCall {
    envelope: CallEnvelope,
    simulation: Simulation,
}

impl SimulatedCall {
    /// `Simulated -> Assembled`: merge the estimated footprint and fee back
    /// into the envelope, open the validity window, and serialize for the
    /// external signer.
    pub fn assemble(mut self) -> Result<PreparedEnvelope, PipelineError> {
        self.envelope.fee = BASE_FEE + self.simulation.min_resource_fee;
        self.envelope.footprint = self.simulation.footprint.take();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?
            .as_secs();
        self.envelope.valid_until_unix = Some(now + VALIDITY_WINDOW_SECS);
        let sequence = self.envelope.sequence;
        Ok(PreparedEnvelope {
            envelope_xdr: self.envelope.to_base64()?,
            sequence,
        })
    }
}

/// An assembled envelope ready for external signing.
///
/// Valid for exactly one submission attempt; deliberately not `Clone`. After
/// any submission, success or failure, the caller rebuilds from `Building`
/// with a freshly loaded sequence number.
#[derive(Debug)]
pub struct PreparedEnvelope {
    envelope_xdr: String,
    sequence: i64,
}

impl PreparedEnvelope {
    /// Opaque serialized envelope for the signer.
    pub fn envelope_xdr(&self) -> &str {
        &self.envelope_xdr
    }

    /// Sequence number this envelope reserves.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }
}

/// Runs the `Building -> Simulated -> Assembled` stages against one chain
/// adapter, loading a fresh sequence number each time.
pub struct TxPipeline<'a> {
    chain: &'a ChainClient,
}

impl<'a> TxPipeline<'a> {
    pub fn new(chain: &'a ChainClient) -> Self {
        Self { chain }
    }

    /// Produce a signable envelope for one contract call.
    ///
    /// The sequence number is fetched fresh on every invocation; stale
    /// sequence reuse is rejected by the network, so there is no caching.
    pub async fn prepare(
        &self,
        source: &str,
        contract_id: &str,
        method: &str,
        args: Vec<ScArg>,
    ) -> Result<PreparedEnvelope, PipelineError> {
        let current = self.chain.load_sequence(source).await?;
        let sequence = current + 1;
        debug!(%source, method, sequence, "building envelope");

        let built = EnvelopeBuilder::new(contract_id, method)
            .args(args)
            .build(source, sequence, self.chain.network_passphrase());
        let simulated = built.simulate(self.chain).await?;
        simulated.assemble()
    }
}
