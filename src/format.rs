//! Pure display mappings for domain values.
//!
//! Everything here is total: unrecognized inputs map to explicit sentinels,
//! never to an error or a panic.

use std::fmt;

/// Fixed divisor between the smallest currency unit and the display unit.
pub const PRICE_BASE_UNIT: i128 = 1_000_000;

/// Closed four-level prize classification, plus a sentinel for codes the
/// contract may emit that this client does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    /// Any code outside 1..=4.
    Unknown,
}

impl Rarity {
    /// Map a raw rarity code to the closed table.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Rarity::Common,
            2 => Rarity::Rare,
            3 => Rarity::Epic,
            4 => Rarity::Legendary,
            _ => Rarity::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Unknown => "Unknown",
        }
    }

    /// Display color hex. The sentinel shares the Common gray.
    pub fn color(&self) -> &'static str {
        match self {
            Rarity::Common | Rarity::Unknown => "#9ca3af",
            Rarity::Rare => "#3b82f6",
            Rarity::Epic => "#8b5cf6",
            Rarity::Legendary => "#f59e0b",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format a smallest-unit price as a two-decimal display string.
///
/// Integer arithmetic with half-up rounding on the hundredths digit.
pub fn format_price(price: i128) -> String {
    let negative = price < 0;
    let magnitude = price.unsigned_abs();
    // Round to hundredths of the display unit.
    let hundredths =
        (magnitude.saturating_mul(100).saturating_add(PRICE_BASE_UNIT as u128 / 2))
            / PRICE_BASE_UNIT as u128;
    let whole = hundredths / 100;
    let frac = hundredths % 100;
    if negative {
        format!("-{}.{:02}", whole, frac)
    } else {
        format!("{}.{:02}", whole, frac)
    }
}
