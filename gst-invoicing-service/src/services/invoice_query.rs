use mongodb::bson::{doc, Document};
use service_core::error::AppError;

use crate::dtos::ListInvoicesQuery;
use crate::models::InvoiceStatus;
use crate::utils::parse_iso_date;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A validated invoice listing request, ready to hand to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListParams {
    pub filter: Document,
    pub sort: Document,
    pub page: u64,
    pub limit: u64,
}

impl InvoiceListParams {
    pub fn from_query(owner_id: &str, query: &ListInvoicesQuery) -> Result<Self, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut filter = doc! { "owner_id": owner_id };

        if let Some(status) = non_blank(&query.status) {
            let status: InvoiceStatus = status
                .parse()
                .map_err(|e: String| AppError::BadRequest(anyhow::anyhow!(e)))?;
            filter.insert("status", status.to_string());
        }

        if let Some(name) = non_blank(&query.customer_name) {
            filter.insert(
                "customer.name",
                doc! { "$regex": regex::escape(name), "$options": "i" },
            );
        }

        let mut date_range = Document::new();
        if let Some(start) = non_blank(&query.start_date) {
            date_range.insert("$gte", parse_date("startDate", start)?);
        }
        if let Some(end) = non_blank(&query.end_date) {
            date_range.insert("$lte", parse_date("endDate", end)?);
        }
        if !date_range.is_empty() {
            filter.insert("invoice_date", date_range);
        }

        let sort_field = match non_blank(&query.sort_by).unwrap_or("createdAt") {
            "createdAt" => "created_at",
            "invoiceDate" => "invoice_date",
            "dueDate" => "due_date",
            "invoiceNumber" => "invoice_number",
            "status" => "status",
            other => {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invalid sortBy: {}. Must be one of: createdAt, invoiceDate, dueDate, invoiceNumber, status",
                    other
                )))
            }
        };
        let direction = match non_blank(&query.sort_order) {
            Some(order) if order.eq_ignore_ascii_case("asc") => 1,
            _ => -1,
        };

        Ok(Self {
            filter,
            sort: doc! { sort_field: direction },
            page,
            limit,
        })
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Dates are stored as `YYYY-MM-DD`, so the bound is compared as a string.
fn parse_date(field: &str, value: &str) -> Result<String, AppError> {
    parse_iso_date(value)
        .map(|date| date.to_string())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid {}: {}", field, value)))
}
