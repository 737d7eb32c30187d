use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use gst_core::invoice_number::{next_sequence, MAX_SEQUENCE};
use gst_core::InvoiceNumber;
use service_core::error::AppError;
use std::sync::Arc;

use crate::models::Invoice;
use crate::services::metrics::record_number_fallback;

/// Read side of the invoice collection that number allocation depends on.
#[async_trait]
pub trait InvoiceNumberLedger: Send + Sync {
    /// Sequential numbers for `year` issued by this owner or this company.
    async fn sequential_numbers(
        &self,
        owner_id: &str,
        company_id: &str,
        year: i32,
    ) -> Result<Vec<String>, AppError>;

    async fn number_exists(&self, owner_id: &str, invoice_number: &str) -> Result<bool, AppError>;
}

/// Hands out the next `INV-{year}-{seq}` number. Storage trouble never fails the
/// caller; it degrades to a timestamped fallback number instead.
#[derive(Clone)]
pub struct InvoiceNumberAllocator {
    ledger: Arc<dyn InvoiceNumberLedger>,
}

impl InvoiceNumberAllocator {
    pub fn new(ledger: Arc<dyn InvoiceNumberLedger>) -> Self {
        Self { ledger }
    }

    pub async fn allocate(
        &self,
        owner_id: &str,
        company_id: &str,
        now: DateTime<Utc>,
    ) -> InvoiceNumber {
        let year = now.year();

        let existing = match self
            .ledger
            .sequential_numbers(owner_id, company_id, year)
            .await
        {
            Ok(numbers) => numbers,
            Err(e) => {
                tracing::error!(owner_id, error = %e, "Invoice number scan failed");
                return fallback(year, now, "scan_failed");
            }
        };

        let sequence = next_sequence(year, &existing);
        if sequence > MAX_SEQUENCE {
            tracing::warn!(owner_id, year, "Sequential invoice numbers exhausted for year");
            return fallback(year, now, "sequence_exhausted");
        }

        let candidate = InvoiceNumber::sequential(year, sequence);
        match self
            .ledger
            .number_exists(owner_id, &candidate.to_string())
            .await
        {
            Ok(false) => candidate,
            Ok(true) => {
                tracing::warn!(owner_id, invoice_number = %candidate, "Invoice number collision");
                fallback(year, now, "collision")
            }
            Err(e) => {
                tracing::error!(owner_id, error = %e, "Invoice number lookup failed");
                fallback(year, now, "lookup_failed")
            }
        }
    }
}

/// Write side of the invoice collection.
#[async_trait]
pub trait InvoiceWriter: Send + Sync {
    /// Fails with `AppError::Conflict` when the owner already has this invoice number.
    async fn insert(&self, invoice: &Invoice) -> Result<(), AppError>;
}

/// Insert `invoice`, switching once to a fallback number if another request took the
/// allocated one in the meantime.
pub async fn insert_with_fallback(
    writer: &dyn InvoiceWriter,
    invoice: &mut Invoice,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match writer.insert(invoice).await {
        Err(AppError::Conflict(_)) => {}
        other => return other,
    }

    let retry = fallback(now.year(), now, "duplicate_retry");
    tracing::warn!(
        taken = %invoice.invoice_number,
        invoice_number = %retry,
        "Invoice number taken, retrying with fallback"
    );
    invoice.invoice_number = retry.to_string();

    match writer.insert(invoice).await {
        Err(AppError::Conflict(_)) => Err(AppError::Conflict(anyhow::anyhow!(
            "Invoice number already exists. Please try again."
        ))),
        other => other,
    }
}

fn fallback(year: i32, now: DateTime<Utc>, reason: &'static str) -> InvoiceNumber {
    record_number_fallback(reason);
    InvoiceNumber::fallback(year, now)
}
