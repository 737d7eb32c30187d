use chrono::{DateTime, Days, NaiveDate, Utc};
use gst_core::{InvoiceTotals, PricedLine};
use mongodb::bson::DateTime as BsonDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_PAYMENT_TERMS: &str = "Net 30";
pub const DEFAULT_UNIT: &str = "Nos";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    #[default]
    Generated,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 6] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Generated,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    /// Issued but not yet settled.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Draft | InvoiceStatus::Generated | InvoiceStatus::Sent
        )
    }

    /// No further payment is expected.
    pub fn is_closed(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Generated => write!(f, "generated"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid status: {}. Must be one of: draft, generated, sent, paid, overdue, cancelled",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Customer details as they were when the invoice was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub billing_address: Address,
    pub shipping_address: Address,
}

/// Stored line item: inputs plus the amounts derived from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub hsn_code: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price: Decimal,
    pub gst_rate: Decimal,
    pub taxable_value: Decimal,
    pub gst_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total_amount: Decimal,
}

impl Product {
    pub fn new(description: String, hsn_code: String, unit: String, line: PricedLine) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description,
            hsn_code,
            quantity: line.quantity,
            unit,
            price: line.unit_price,
            gst_rate: line.gst_rate,
            taxable_value: line.amounts.taxable_value,
            gst_amount: line.amounts.gst_amount,
            cgst_amount: line.amounts.cgst_amount,
            sgst_amount: line.amounts.sgst_amount,
            total_amount: line.amounts.total_amount,
        }
    }

    pub fn amounts(&self) -> gst_core::LineAmounts {
        gst_core::LineAmounts {
            taxable_value: self.taxable_value,
            gst_amount: self.gst_amount,
            cgst_amount: self.cgst_amount,
            sgst_amount: self.sgst_amount,
            total_amount: self.total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub invoice_number: String,
    pub owner_id: String,
    pub company_id: String,
    pub customer: Customer,
    /// Stored as `YYYY-MM-DD`, so string order is date order.
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_terms: String,
    pub products: Vec<Product>,
    pub subtotal: Decimal,
    pub cgst_total: Decimal,
    pub sgst_total: Decimal,
    pub round_off: Decimal,
    pub grand_total: Decimal,
    #[serde(default)]
    pub notes: String,
    pub status: InvoiceStatus,
    pub paid_at: Option<BsonDateTime>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Everything a caller decides about a new invoice; ids, totals and timestamps are filled in.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub owner_id: String,
    pub company_id: String,
    pub customer: Customer,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_terms: String,
    pub products: Vec<Product>,
    pub notes: String,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn new(draft: NewInvoice, due_days: i64) -> Self {
        let now = Utc::now();
        let mut invoice = Self {
            id: Uuid::new_v4().to_string(),
            invoice_number: draft.invoice_number,
            owner_id: draft.owner_id,
            company_id: draft.company_id,
            customer: draft.customer,
            invoice_date: draft.invoice_date,
            due_date: draft.due_date,
            payment_terms: draft.payment_terms,
            products: Vec::new(),
            subtotal: Decimal::ZERO,
            cgst_total: Decimal::ZERO,
            sgst_total: Decimal::ZERO,
            round_off: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            notes: draft.notes,
            status: draft.status,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        if invoice.status == InvoiceStatus::Paid {
            invoice.paid_at = Some(BsonDateTime::from_chrono(now));
        }
        invoice.set_products(draft.products);
        invoice.normalize_due_date(due_days);
        invoice
    }

    /// Replace the line items and recompute every invoice total from them.
    pub fn set_products(&mut self, products: Vec<Product>) {
        let amounts: Vec<_> = products.iter().map(Product::amounts).collect();
        self.apply_totals(gst_core::aggregate(&amounts));
        self.products = products;
    }

    pub fn apply_totals(&mut self, totals: InvoiceTotals) {
        self.subtotal = totals.subtotal;
        self.cgst_total = totals.cgst_total;
        self.sgst_total = totals.sgst_total;
        self.round_off = totals.round_off;
        self.grand_total = totals.grand_total;
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            cgst_total: self.cgst_total,
            sgst_total: self.sgst_total,
            round_off: self.round_off,
            grand_total: self.grand_total,
        }
    }

    /// A due date before the invoice date is replaced by invoice date + `due_days`.
    pub fn normalize_due_date(&mut self, due_days: i64) {
        if self.due_date < self.invoice_date {
            self.due_date = add_days(self.invoice_date, due_days);
        }
    }

    /// Record a status change; moving to paid stamps `paid_at`.
    pub fn set_status(&mut self, status: InvoiceStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == InvoiceStatus::Paid {
            self.paid_at = Some(BsonDateTime::from_chrono(now));
        }
        self.updated_at = now;
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_closed() && today > self.due_date
    }

    /// Negative once the due date has passed.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

impl Customer {
    /// Missing shipping address falls back to the billing address.
    pub fn new(
        name: String,
        gstin: String,
        email: String,
        phone: String,
        billing_address: Address,
        shipping_address: Option<Address>,
    ) -> Self {
        let shipping_address = shipping_address.unwrap_or_else(|| billing_address.clone());
        Self {
            name,
            gstin,
            email,
            phone,
            billing_address,
            shipping_address,
        }
    }
}
