//! Per-line GST computation.

use crate::money::{coerce_amount, round2};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Derived amounts for a single invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub taxable_value: Decimal,
    pub gst_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total_amount: Decimal,
}

impl LineAmounts {
    pub fn zero() -> Self {
        Self {
            taxable_value: round2(Decimal::ZERO),
            gst_amount: round2(Decimal::ZERO),
            cgst_amount: round2(Decimal::ZERO),
            sgst_amount: round2(Decimal::ZERO),
            total_amount: round2(Decimal::ZERO),
        }
    }
}

/// Compute taxable value, GST and its CGST/SGST halves for one line.
///
/// Each field is rounded to 2 decimals on its own. Negative inputs are not rejected here;
/// request validation is responsible for that.
pub fn compute_line_item(quantity: Decimal, unit_price: Decimal, gst_rate: Decimal) -> LineAmounts {
    let taxable_value = round2(quantity.saturating_mul(unit_price));
    let gst_amount = round2(
        taxable_value
            .saturating_mul(gst_rate)
            .checked_div(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO),
    );
    let half = round2(gst_amount / Decimal::TWO);
    let total_amount = round2(taxable_value.saturating_add(gst_amount));

    LineAmounts {
        taxable_value,
        gst_amount,
        cgst_amount: half,
        sgst_amount: half,
        total_amount,
    }
}

/// Inputs of a line after coercion, alongside the amounts computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub gst_rate: Decimal,
    pub amounts: LineAmounts,
}

/// Calculator carrying the rate applied to lines that omit one.
#[derive(Debug, Clone, Copy)]
pub struct GstCalculator {
    default_rate: Decimal,
}

impl Default for GstCalculator {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl GstCalculator {
    pub fn new(default_rate: Decimal) -> Self {
        Self { default_rate }
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    /// Coerce raw JSON inputs and compute the line.
    ///
    /// A missing or null rate uses the default rate; any other non-numeric input becomes 0.
    pub fn line(&self, quantity: &Value, unit_price: &Value, gst_rate: Option<&Value>) -> PricedLine {
        let quantity = round2(coerce_amount(quantity));
        let unit_price = round2(coerce_amount(unit_price));
        let gst_rate = match gst_rate {
            None | Some(Value::Null) => round2(self.default_rate),
            Some(value) => round2(coerce_amount(value)),
        };

        PricedLine {
            quantity,
            unit_price,
            gst_rate,
            amounts: compute_line_item(quantity, unit_price, gst_rate),
        }
    }
}
