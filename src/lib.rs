//! Client-side layer for an on-chain NFT lottery contract.
//!
//! Lets an untrusted session read contract state through simulated calls,
//! build and fee/footprint state-changing calls, hand unsigned envelopes to
//! an external signer, submit the signed result, and decode the contract's
//! return values into stable domain records. No private keys are ever held
//! here.

pub mod chain;
pub mod config;
pub mod contract;
pub mod decode;
pub mod envelope;
pub mod format;
pub mod session;
pub mod types;

// Re-export the types most callers need
pub use chain::{ChainClient, ChainError};
pub use config::Config;
pub use contract::{CreateLottery, LotteryContract};
pub use envelope::{PipelineError, PreparedEnvelope, ScArg};
pub use session::{SessionManager, SessionState, WalletExtension};
pub use types::{Lottery, NftMetadata, SubmissionOutcome, SubmissionStatus};
