//! gst-core: GST arithmetic shared by invoice preview and invoice persistence.
//!
//! Everything in this crate is pure. The service crate calls the same functions for the
//! live preview endpoint and for the authoritative computation on create and edit.

pub mod gstin;
pub mod invoice_number;
pub mod line_item;
pub mod money;
pub mod rates;
pub mod totals;

pub use invoice_number::{InvalidInvoiceNumber, InvoiceNumber};
pub use line_item::{compute_line_item, GstCalculator, LineAmounts, PricedLine};
pub use money::{coerce_amount, parse_lenient, parse_strict, round2, round_to_rupee};
pub use rates::{rate_label, standard_slabs, RateSlab, STANDARD_SLABS};
pub use totals::{aggregate, InvoiceTotals};

pub use rust_decimal::Decimal;
