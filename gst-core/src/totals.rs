//! Invoice level totals and round-off.

use crate::line_item::LineAmounts;
use crate::money::{round2, round_to_rupee};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub cgst_total: Decimal,
    pub sgst_total: Decimal,
    pub round_off: Decimal,
    pub grand_total: Decimal,
}

impl Default for InvoiceTotals {
    fn default() -> Self {
        aggregate(std::iter::empty())
    }
}

impl InvoiceTotals {
    /// Payable amount before rounding to the rupee.
    pub fn raw_total(&self) -> Decimal {
        self.subtotal
            .saturating_add(self.cgst_total)
            .saturating_add(self.sgst_total)
    }
}

/// Sum already rounded line amounts and round the payable total to the whole rupee.
///
/// `round_off` is signed: negative when the total was rounded down.
pub fn aggregate<'a, I>(lines: I) -> InvoiceTotals
where
    I: IntoIterator<Item = &'a LineAmounts>,
{
    let (subtotal, cgst, sgst) = lines.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(subtotal, cgst, sgst), line| {
            (
                subtotal.saturating_add(line.taxable_value),
                cgst.saturating_add(line.cgst_amount),
                sgst.saturating_add(line.sgst_amount),
            )
        },
    );

    let mut totals = InvoiceTotals {
        subtotal: round2(subtotal),
        cgst_total: round2(cgst),
        sgst_total: round2(sgst),
        round_off: round2(Decimal::ZERO),
        grand_total: round2(Decimal::ZERO),
    };

    let raw_total = totals.raw_total();
    totals.grand_total = round_to_rupee(raw_total);
    totals.round_off = round2(totals.grand_total.saturating_sub(raw_total));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::compute_line_item;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_invoice_is_all_zero() {
        let lines: Vec<LineAmounts> = Vec::new();
        let totals = aggregate(&lines);

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.cgst_total, Decimal::ZERO);
        assert_eq!(totals.sgst_total, Decimal::ZERO);
        assert_eq!(totals.round_off, Decimal::ZERO);
        assert_eq!(totals.grand_total, Decimal::ZERO);
        assert_eq!(InvoiceTotals::default(), totals);
    }

    #[test]
    fn mixed_rate_invoice_rounds_down_to_rupee() {
        let lines = [
            compute_line_item(dec!(1), dec!(1000.00), dec!(18)),
            compute_line_item(dec!(1), dec!(250.50), dec!(5)),
            compute_line_item(dec!(1), dec!(75.25), dec!(0)),
        ];

        let totals = aggregate(&lines);

        assert_eq!(totals.subtotal, dec!(1325.75));
        assert_eq!(totals.cgst_total, dec!(96.27));
        assert_eq!(totals.sgst_total, dec!(96.27));
        assert_eq!(totals.raw_total(), dec!(1518.29));
        assert_eq!(totals.grand_total, dec!(1518));
        assert_eq!(totals.round_off, dec!(-0.29));
    }

    #[test]
    fn rounds_up_with_positive_round_off() {
        let lines = [compute_line_item(dec!(1), dec!(99.60), dec!(0))];

        let totals = aggregate(&lines);

        assert_eq!(totals.grand_total, dec!(100));
        assert_eq!(totals.round_off, dec!(0.40));
    }

    #[test]
    fn grand_total_is_whole_and_round_off_reconciles() {
        let prices = [dec!(0.01), dec!(9.99), dec!(49.5), dec!(123.45), dec!(999.99)];
        let rates = [dec!(0), dec!(5), dec!(12), dec!(18), dec!(28)];

        for p in prices {
            for r in rates {
                let lines = [
                    compute_line_item(dec!(3), p, r),
                    compute_line_item(dec!(1.5), p, dec!(18)),
                ];
                let totals = aggregate(&lines);

                assert_eq!(totals.grand_total.fract(), Decimal::ZERO, "p={p} r={r}");
                assert_eq!(totals.round_off, totals.grand_total - totals.raw_total());
                assert!(totals.round_off.abs() <= dec!(0.50));
            }
        }
    }

    #[test]
    fn totals_serialize_camel_case() {
        let totals = aggregate(&[compute_line_item(dec!(10), dec!(100), dec!(18))]);
        let json = serde_json::to_value(totals).unwrap();

        assert_eq!(json["subtotal"], "1000.00");
        assert_eq!(json["cgstTotal"], "90.00");
        assert_eq!(json["roundOff"], "0.00");
        assert_eq!(json["grandTotal"], "1180.00");
    }
}
