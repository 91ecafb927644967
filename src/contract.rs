//! High-level surface of the lottery contract.
//!
//! Reads go through throwaway-identity simulation plus the decoder; writes
//! run the full gate -> fresh sequence -> build -> simulate -> assemble ->
//! sign -> submit pipeline. All argument validation happens locally, before
//! any network call.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chain::{ChainClient, Simulation};
use crate::decode::{decode_count, decode_lottery, decode_ticket_list, DecodeError};
use crate::envelope::{PipelineError, ScArg, TxPipeline};
use crate::session::SessionManager;
use crate::types::{Lottery, SubmissionOutcome};

/// Upper bound the contract accepts for `max_tickets`.
pub const MAX_TICKETS_LIMIT: u32 = 10_000;

/// Largest lottery count a listing will accept from the endpoint. The count
/// is untrusted RPC output; anything past this is treated as corrupt rather
/// than iterated or preallocated.
pub const MAX_LISTED_LOTTERIES: u64 = 10_000;

/// Parameters for `create_lottery`. The admin address is taken from the
/// session at call time.
#[derive(Debug, Clone)]
pub struct CreateLottery {
    /// Price per ticket in the smallest currency unit. Must be positive.
    pub ticket_price: i128,
    /// 1..=10000.
    pub max_tickets: u32,
    pub name: String,
    pub image_url: String,
    /// 1..=4.
    pub rarity: u32,
}

impl CreateLottery {
    /// Local validation, run before any network call.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.ticket_price <= 0 {
            return Err(PipelineError::Validation(
                "ticket price must be positive".to_string(),
            ));
        }
        if self.max_tickets == 0 || self.max_tickets > MAX_TICKETS_LIMIT {
            return Err(PipelineError::Validation(format!(
                "max tickets must be between 1 and {MAX_TICKETS_LIMIT}"
            )));
        }
        if !(1..=4).contains(&self.rarity) {
            return Err(PipelineError::Validation(
                "rarity must be between 1 and 4".to_string(),
            ));
        }
        Ok(())
    }
}

/// Client for one deployed lottery contract instance.
pub struct LotteryContract {
    chain: Arc<ChainClient>,
    contract_id: String,
}

impl LotteryContract {
    pub fn new(chain: Arc<ChainClient>, contract_id: impl Into<String>) -> Self {
        Self {
            chain,
            contract_id: contract_id.into(),
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    // -- Reads --------------------------------------------------------------

    /// Total number of lotteries ever created.
    pub async fn lottery_count(&self) -> Result<u64, PipelineError> {
        let sim = self
            .chain
            .simulate_view(&self.contract_id, "get_lottery_count", vec![])
            .await?;
        let retval = success_retval(sim)?;
        Ok(decode_count(&retval)?)
    }

    /// One lottery by id. A contract-side miss or undecodable record is a
    /// typed error, never a crash.
    pub async fn lottery(&self, id: u64) -> Result<Lottery, PipelineError> {
        let sim = self
            .chain
            .simulate_view(&self.contract_id, "get_lottery", vec![ScArg::U64(id)])
            .await?;
        let retval = success_retval(sim)?;
        Ok(decode_lottery(&retval)?)
    }

    /// Every currently decodable lottery, ids 1..=count.
    ///
    /// Records that fail to decode or simulate are dropped from the listing
    /// with a warning; losing one entry is tolerable, losing the listing is
    /// not.
    pub async fn lotteries(&self) -> Result<Vec<Lottery>, PipelineError> {
        let count = self.lottery_count().await?;
        if count > MAX_LISTED_LOTTERIES {
            warn!(count, "implausible lottery count from endpoint");
            return Err(PipelineError::Decode(DecodeError::Coercion {
                field: "lottery_count",
                expected: "count within listing bound",
            }));
        }
        let mut out = Vec::with_capacity(count as usize);
        for id in 1..=count {
            match self.lottery(id).await {
                Ok(lottery) => out.push(lottery),
                Err(err) => warn!(id, error = %err, "dropping undecodable lottery from listing"),
            }
        }
        Ok(out)
    }

    /// Ticket numbers held by `address` in lottery `id`. Empty is valid.
    pub async fn user_tickets(&self, address: &str, id: u64) -> Result<Vec<u32>, PipelineError> {
        let sim = self
            .chain
            .simulate_view(
                &self.contract_id,
                "get_user_tickets",
                vec![ScArg::Address(address.to_string()), ScArg::U64(id)],
            )
            .await?;
        let retval = success_retval(sim)?;
        Ok(decode_ticket_list(&retval)?)
    }

    // -- Writes -------------------------------------------------------------

    /// Create a new lottery administered by the session's address.
    pub async fn create_lottery(
        &self,
        session: &SessionManager,
        params: CreateLottery,
    ) -> Result<SubmissionOutcome, PipelineError> {
        params.validate()?;
        self.invoke(session, "create_lottery", move |admin| {
            vec![
                ScArg::Address(admin),
                ScArg::I128(params.ticket_price),
                ScArg::U32(params.max_tickets),
                ScArg::Str(params.name),
                ScArg::Str(params.image_url),
                ScArg::U32(params.rarity),
            ]
        })
        .await
    }

    /// Buy tickets in an active lottery for the session's address.
    pub async fn buy_ticket(
        &self,
        session: &SessionManager,
        id: u64,
        num_tickets: u32,
    ) -> Result<SubmissionOutcome, PipelineError> {
        if num_tickets == 0 {
            return Err(PipelineError::Validation(
                "must buy at least one ticket".to_string(),
            ));
        }
        self.invoke(session, "buy_ticket", move |buyer| {
            vec![ScArg::Address(buyer), ScArg::U64(id), ScArg::U32(num_tickets)]
        })
        .await
    }

    /// Draw the winner of a lottery; admin only, enforced by the contract.
    pub async fn draw_winner(
        &self,
        session: &SessionManager,
        id: u64,
    ) -> Result<SubmissionOutcome, PipelineError> {
        self.invoke(session, "draw_winner", move |admin| {
            vec![ScArg::Address(admin), ScArg::U64(id)]
        })
        .await
    }

    async fn session_address(&self, session: &SessionManager) -> Result<String, PipelineError> {
        session
            .snapshot()
            .await
            .address
            .ok_or(PipelineError::NotConnected)
    }

    /// Run one state-changing call end to end under the session's action
    /// gate. The permit is acquired before `Building` and released on every
    /// exit path of this function. The session address is read exactly once,
    /// under the permit, so the envelope source and the address arguments
    /// cannot come from different poll ticks.
    async fn invoke(
        &self,
        session: &SessionManager,
        method: &str,
        make_args: impl FnOnce(String) -> Vec<ScArg>,
    ) -> Result<SubmissionOutcome, PipelineError> {
        let _permit = session.gate().try_begin().ok_or(PipelineError::Busy)?;
        let source = self.session_address(session).await?;
        let args = make_args(source.clone());

        let pipeline = TxPipeline::new(&self.chain);
        let prepared = pipeline
            .prepare(&source, &self.contract_id, method, args)
            .await?;
        let outcome = session.sign_and_submit(prepared).await?;
        info!(method, status = ?outcome.status, "submission outcome");
        Ok(outcome)
    }
}

/// Extract the return value from a successful simulation; a simulation-level
/// error surfaces verbatim, a success with no value is malformed.
fn success_retval(sim: Simulation) -> Result<serde_json::Value, PipelineError> {
    if let Some(error) = sim.error {
        return Err(PipelineError::Simulation(error));
    }
    sim.retval
        .ok_or_else(|| PipelineError::Simulation("simulation returned no value".to_string()))
}
