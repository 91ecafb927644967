//! Decoding of simulated-call return values into domain records.
//!
//! The RPC layer hands back self-describing JSON values. Required fields are
//! coerced explicitly and fail hard; the optional winner address goes through
//! an ordered fallback chain because its wire shape is underdetermined.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::types::{Lottery, NftMetadata};

/// Hard decode failure: a required field could not be produced.
///
/// A record that fails this way is dropped from any listing; there is no
/// partially valid lottery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has unexpected shape, expected {expected}")]
    Coercion {
        field: &'static str,
        expected: &'static str,
    },

    #[error("expected {0} return value")]
    Shape(&'static str),
}

/// Decode an unsigned counter (e.g. `get_lottery_count`).
///
/// Large integers can arrive as JSON numbers or as decimal strings.
pub fn decode_count(value: &Value) -> Result<u64, DecodeError> {
    coerce_u64(value).ok_or(DecodeError::Shape("u64 count"))
}

/// Decode a full lottery record.
///
/// Every scalar field is read by name and coerced explicitly; any required
/// field failing to coerce fails the whole record. The winner field is the
/// one exception: it degrades to absent (see [`decode_winner`]).
pub fn decode_lottery(value: &Value) -> Result<Lottery, DecodeError> {
    let obj = value.as_object().ok_or(DecodeError::Shape("lottery record"))?;

    let prize = obj
        .get("nft_prize")
        .ok_or(DecodeError::MissingField("nft_prize"))?;
    let prize_obj = prize.as_object().ok_or(DecodeError::Coercion {
        field: "nft_prize",
        expected: "object",
    })?;

    let winner = match obj.get("winner") {
        None => None,
        Some(raw) => decode_winner(raw),
    };

    Ok(Lottery {
        id: require_u64(obj.get("id"), "id")?,
        ticket_price: require_i128(obj.get("ticket_price"), "ticket_price")?,
        max_tickets: require_u32(obj.get("max_tickets"), "max_tickets")?,
        tickets_sold: require_u32(obj.get("tickets_sold"), "tickets_sold")?,
        is_active: require_bool(obj.get("is_active"), "is_active")?,
        winner,
        nft_prize: NftMetadata {
            name: require_string(prize_obj.get("name"), "nft_prize.name")?,
            image_url: require_string(prize_obj.get("image_url"), "nft_prize.image_url")?,
            rarity: require_u32(prize_obj.get("rarity"), "nft_prize.rarity")?,
        },
    })
}

/// Decode a ticket-number list (e.g. `get_user_tickets`).
///
/// Each element is coerced independently; an empty list is valid.
pub fn decode_ticket_list(value: &Value) -> Result<Vec<u32>, DecodeError> {
    let items = value.as_array().ok_or(DecodeError::Shape("ticket list"))?;
    items
        .iter()
        .map(|item| {
            coerce_u64(item)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or(DecodeError::Coercion {
                    field: "tickets",
                    expected: "u32 element",
                })
        })
        .collect()
}

/// Ordered strategies for extracting a winner address from the wrapped
/// optional-address wire value. Tried strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WinnerStrategy {
    /// The wrapped value exposes a raw-byte payload directly (`_value`).
    RawBytePayload,
    /// The wrapped value is already a plain string.
    PlainString,
    /// The wrapped value exposes a nested `address` byte field.
    NestedAddress,
    /// The wrapped value exposes a custom string conversion (`string`).
    CustomString,
    /// Last resort: scan fields for the first byte-sequence that encodes.
    ByteFieldScan,
}

const WINNER_STRATEGIES: [WinnerStrategy; 5] = [
    WinnerStrategy::RawBytePayload,
    WinnerStrategy::PlainString,
    WinnerStrategy::NestedAddress,
    WinnerStrategy::CustomString,
    WinnerStrategy::ByteFieldScan,
];

impl WinnerStrategy {
    fn apply(self, value: &Value) -> Option<String> {
        match self {
            WinnerStrategy::RawBytePayload => {
                encode_public_key(&byte_payload(value.get("_value")?)?)
            }
            WinnerStrategy::PlainString => value.as_str().map(str::to_owned),
            WinnerStrategy::NestedAddress => {
                encode_public_key(&byte_payload(value.get("address")?)?)
            }
            WinnerStrategy::CustomString => value.get("string")?.as_str().map(str::to_owned),
            WinnerStrategy::ByteFieldScan => {
                let obj = value.as_object()?;
                obj.values()
                    .filter_map(byte_payload)
                    .find_map(|bytes| encode_public_key(&bytes))
            }
        }
    }
}

/// Resolve the optional winner-address wire value to a public-key string.
///
/// Compatibility shim for an underdetermined wire encoding: the same
/// `Option<Address>` can surface in several concrete shapes, so the
/// strategies in [`WINNER_STRATEGIES`] are tried in order. `null` means no
/// winner yet. If every strategy fails on a present value, the winner
/// resolves to absent and a warning is logged; the surrounding record read
/// still succeeds.
pub fn decode_winner(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    for strategy in WINNER_STRATEGIES {
        if let Some(address) = strategy.apply(value) {
            return Some(address);
        }
    }
    warn!(raw = %value, "winner address present but undecodable, rendering as absent");
    None
}

// ---------------------------------------------------------------------------
// Field coercion helpers

fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn coerce_i128(value: &Value) -> Option<i128> {
    match value {
        // A raw number may exceed i64 while still fitting u64.
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn require_u64(value: Option<&Value>, field: &'static str) -> Result<u64, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField(field))?;
    coerce_u64(value).ok_or(DecodeError::Coercion {
        field,
        expected: "u64",
    })
}

fn require_u32(value: Option<&Value>, field: &'static str) -> Result<u32, DecodeError> {
    require_u64(value, field)?
        .try_into()
        .map_err(|_| DecodeError::Coercion {
            field,
            expected: "u32",
        })
}

fn require_i128(value: Option<&Value>, field: &'static str) -> Result<i128, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField(field))?;
    coerce_i128(value).ok_or(DecodeError::Coercion {
        field,
        expected: "i128",
    })
}

fn require_bool(value: Option<&Value>, field: &'static str) -> Result<bool, DecodeError> {
    value
        .ok_or(DecodeError::MissingField(field))?
        .as_bool()
        .ok_or(DecodeError::Coercion {
            field,
            expected: "bool",
        })
}

fn require_string(value: Option<&Value>, field: &'static str) -> Result<String, DecodeError> {
    value
        .ok_or(DecodeError::MissingField(field))?
        .as_str()
        .map(str::to_owned)
        .ok_or(DecodeError::Coercion {
            field,
            expected: "string",
        })
}

/// Interpret a JSON value as a raw byte sequence (array of 0..=255).
fn byte_payload(value: &Value) -> Option<Vec<u8>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

/// Strkey-encode a raw ed25519 public key; None if the payload is not one.
fn encode_public_key(bytes: &[u8]) -> Option<String> {
    stellar_strkey::ed25519::PublicKey::from_payload(bytes)
        .ok()
        .map(|pk| pk.to_string())
}
