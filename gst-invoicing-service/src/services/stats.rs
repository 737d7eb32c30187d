use chrono::{Datelike, NaiveDate};
use gst_core::round2;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dtos::DashboardStatsResponse;
use crate::models::{Invoice, InvoiceStatus};

/// Summarise an owner's invoices as of `today`.
pub fn dashboard_stats(invoices: &[Invoice], today: NaiveDate) -> DashboardStatsResponse {
    let mut stats = DashboardStatsResponse {
        total: invoices.len() as u64,
        paid: 0,
        overdue: 0,
        pending: 0,
        total_amount: Decimal::ZERO,
        paid_amount: Decimal::ZERO,
        pending_amount: Decimal::ZERO,
        monthly_revenue: Decimal::ZERO,
        yearly_revenue: Decimal::ZERO,
        collection_rate: Decimal::ZERO,
    };

    for invoice in invoices {
        let amount = invoice.grand_total;
        stats.total_amount = stats.total_amount.saturating_add(amount);

        match invoice.status {
            InvoiceStatus::Paid => {
                stats.paid += 1;
                stats.paid_amount = stats.paid_amount.saturating_add(amount);
            }
            InvoiceStatus::Overdue => stats.overdue += 1,
            status if status.is_pending() => {
                stats.pending += 1;
                stats.pending_amount = stats.pending_amount.saturating_add(amount);
            }
            _ => {}
        }

        if invoice.invoice_date.year() == today.year() {
            stats.yearly_revenue = stats.yearly_revenue.saturating_add(amount);
            if invoice.invoice_date.month() == today.month() {
                stats.monthly_revenue = stats.monthly_revenue.saturating_add(amount);
            }
        }
    }

    if !stats.total_amount.is_zero() {
        let mut rate = (stats.paid_amount / stats.total_amount)
            .saturating_mul(Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        rate.rescale(1);
        stats.collection_rate = rate;
    }

    stats.total_amount = round2(stats.total_amount);
    stats.paid_amount = round2(stats.paid_amount);
    stats.pending_amount = round2(stats.pending_amount);
    stats.monthly_revenue = round2(stats.monthly_revenue);
    stats.yearly_revenue = round2(stats.yearly_revenue);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::NewInvoice;
    use crate::models::{Address, Customer, Product};
    use gst_core::GstCalculator;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn invoice(invoice_date: &str, price: u32, status: InvoiceStatus) -> Invoice {
        let line = GstCalculator::default().line(&json!(1), &json!(price), Some(&json!(0)));
        let customer = Customer::new(
            "Acme".into(),
            String::new(),
            String::new(),
            String::new(),
            Address::default(),
            None,
        );
        Invoice::new(
            NewInvoice {
                invoice_number: "INV-2024-0001".into(),
                owner_id: "owner-1".into(),
                company_id: "company-1".into(),
                customer,
                invoice_date: date(invoice_date),
                due_date: date(invoice_date),
                payment_terms: "Net 30".into(),
                products: vec![Product::new("Item".into(), String::new(), "Nos".into(), line)],
                notes: String::new(),
                status,
            },
            30,
        )
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        let stats = dashboard_stats(&[], date("2024-06-15"));

        assert_eq!(stats.total, 0);
        assert_eq!(stats.total_amount, Decimal::ZERO);
        assert_eq!(stats.collection_rate, Decimal::ZERO);
    }

    #[test]
    fn counts_amounts_and_periods() {
        let invoices = vec![
            invoice("2024-06-02", 1000, InvoiceStatus::Paid),
            invoice("2024-06-10", 500, InvoiceStatus::Sent),
            invoice("2024-02-01", 300, InvoiceStatus::Overdue),
            invoice("2023-12-20", 200, InvoiceStatus::Draft),
            invoice("2024-05-05", 100, InvoiceStatus::Cancelled),
        ];

        let stats = dashboard_stats(&invoices, date("2024-06-15"));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total_amount, dec!(2100.00));
        assert_eq!(stats.paid_amount, dec!(1000.00));
        assert_eq!(stats.pending_amount, dec!(700.00));
        assert_eq!(stats.monthly_revenue, dec!(1500.00));
        assert_eq!(stats.yearly_revenue, dec!(1900.00));
        assert_eq!(stats.collection_rate, dec!(47.6));
    }

    #[test]
    fn saturated_amounts_do_not_overflow_totals() {
        let mut big = invoice("2024-06-02", 1, InvoiceStatus::Paid);
        big.grand_total = Decimal::MAX;
        let mut other = invoice("2024-06-03", 1, InvoiceStatus::Sent);
        other.grand_total = Decimal::MAX;

        let stats = dashboard_stats(&[big, other], date("2024-06-15"));

        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_amount, Decimal::MAX);
        assert_eq!(stats.monthly_revenue, Decimal::MAX);
        assert_eq!(stats.collection_rate, dec!(100.0));
    }
}
