//! Common domain types shared across the client.

use serde::{Deserialize, Serialize};

/// A single lottery as read back from the contract.
///
/// Every field except `winner` is required at decode time; a lottery that is
/// missing a required field is dropped from listings rather than rendered
/// half-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lottery {
    /// Contract-assigned identity, immutable once created.
    pub id: u64,

    /// Price per ticket in the smallest currency unit.
    pub ticket_price: i128,

    /// Upper bound on tickets for this lottery, immutable.
    pub max_tickets: u32,

    /// Tickets sold so far. Monotonically non-decreasing, mutated only by
    /// the contract; `tickets_sold <= max_tickets` is contract-enforced.
    pub tickets_sold: u32,

    /// False exactly once the winner has been drawn.
    pub is_active: bool,

    /// Winning account, absent until a draw has executed. "No winner yet"
    /// is a distinct state from a present winner, never collapsed.
    pub winner: Option<String>,

    /// The NFT handed to the winner.
    pub nft_prize: NftMetadata,
}

/// Prize metadata embedded in a lottery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,

    /// Image location. Not validated for reachability by this client.
    pub image_url: String,

    /// Rarity code 1-4; other values render as the Unknown sentinel.
    pub rarity: u32,
}

/// Network's verdict on a submitted envelope, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Status as reported by the network.
    pub status: SubmissionStatus,

    /// Transaction hash assigned by the network, if any.
    #[serde(default)]
    pub hash: Option<String>,

    /// Raw error detail from the network on rejection.
    #[serde(default, rename = "errorResult")]
    pub error: Option<String>,
}

/// Acceptance states the network reports for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Accepted into the queue; inclusion not yet known.
    Pending,
    /// Duplicate of an envelope already seen.
    Duplicate,
    /// Rejected outright.
    Error,
    /// Queue full, caller must rebuild and resubmit.
    TryAgainLater,
}

impl SubmissionStatus {
    /// True when the network accepted the envelope for inclusion.
    pub fn accepted(&self) -> bool {
        matches!(self, SubmissionStatus::Pending | SubmissionStatus::Duplicate)
    }
}
