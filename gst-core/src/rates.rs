//! GST slab menu and rate labels.

use rust_decimal::Decimal;
use serde::Serialize;

/// Standard GST slabs offered in the product picker, in percent.
pub const STANDARD_SLABS: [u32; 5] = [0, 5, 12, 18, 28];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateSlab {
    pub rate: Decimal,
    pub label: String,
}

/// Display label for a rate: `NIL` for zero, otherwise `18%`, `0.25%`.
pub fn rate_label(rate: Decimal) -> String {
    if rate.is_zero() {
        "NIL".to_string()
    } else {
        format!("{}%", rate.normalize())
    }
}

pub fn is_standard_slab(rate: Decimal) -> bool {
    STANDARD_SLABS.iter().any(|slab| Decimal::from(*slab) == rate)
}

/// Any percentage between 0 and 100 inclusive is accepted by the calculator.
pub fn is_valid_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED
}

pub fn standard_slabs() -> Vec<RateSlab> {
    STANDARD_SLABS
        .iter()
        .map(|slab| {
            let rate = Decimal::from(*slab);
            RateSlab {
                rate,
                label: rate_label(rate),
            }
        })
        .collect()
}
