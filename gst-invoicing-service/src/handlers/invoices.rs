use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use service_core::error::AppError;

use crate::dtos::{
    CreateInvoiceRequest, DashboardStatsResponse, InvoiceEnvelope, InvoiceNumberResponse,
    InvoiceResponse, ListInvoicesQuery, ListInvoicesResponse, MessageResponse, Pagination,
    PreviewRequest, PreviewResponse, UpdateInvoiceRequest, UpdateStatusRequest,
};
use crate::middleware::UserId;
use crate::models::invoice::NewInvoice;
use crate::models::{Customer, Invoice, InvoiceStatus};
use crate::services::metrics::{record_invoice_created, record_invoice_deleted};
use crate::services::{dashboard_stats, insert_with_fallback, InvoiceListParams};
use crate::startup::AppState;
use crate::utils::{parse_iso_date, ValidatedJson};

fn invoice_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Invoice not found"))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    parse_iso_date(value)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid {}: {}", field, value)))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn status_message(status: InvoiceStatus) -> String {
    format!("Invoice status updated to {}", status)
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn list_invoices(
    State(state): State<AppState>,
    user_id: UserId,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<ListInvoicesResponse>, AppError> {
    let params = InvoiceListParams::from_query(&user_id.0, &query)?;

    let total = state.db.count_invoices(params.filter.clone()).await?;
    let invoices = state
        .db
        .list_invoices(
            params.filter.clone(),
            params.sort.clone(),
            params.skip(),
            params.limit as i64,
        )
        .await?;

    let company = if invoices.is_empty() {
        None
    } else {
        state.db.find_company(&user_id.0).await?
    };

    let today = today();
    Ok(Json(ListInvoicesResponse {
        invoices: invoices
            .into_iter()
            .map(|invoice| {
                let company = company
                    .as_ref()
                    .filter(|c| c.id == invoice.company_id)
                    .cloned();
                InvoiceResponse::new(invoice, company, today)
            })
            .collect(),
        pagination: Pagination::new(params.page, params.limit, total),
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    let invoices = state.db.owner_invoices(&user_id.0).await?;
    Ok(Json(dashboard_stats(&invoices, today())))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn generate_invoice_number(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<InvoiceNumberResponse>, AppError> {
    let company = state
        .db
        .find_company(&user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company not found")))?;

    let number = state
        .allocator
        .allocate(&user_id.0, &company.id, Utc::now())
        .await;

    Ok(Json(InvoiceNumberResponse {
        invoice_number: number.to_string(),
    }))
}

/// Compute lines and totals exactly as create would, without persisting anything.
pub async fn preview_invoice(
    State(state): State<AppState>,
    _user_id: UserId,
    ValidatedJson(payload): ValidatedJson<PreviewRequest>,
) -> Json<PreviewResponse> {
    Json(PreviewResponse::compute(&payload, &state.calculator))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn create_invoice(
    State(state): State<AppState>,
    user_id: UserId,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let company = state.db.find_company(&user_id.0).await?.ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!(
            "Company not found. Please setup your company details first."
        ))
    })?;

    let invoice_date = parse_date("invoiceDate", &payload.invoice_date)?;
    let due_date = parse_date("dueDate", &payload.due_date)?;
    let payment_terms = payload.payment_terms();
    let products = payload
        .products
        .into_iter()
        .map(|product| product.into_product(&state.calculator))
        .collect();

    let now = Utc::now();
    let number = state
        .allocator
        .allocate(&user_id.0, &company.id, now)
        .await;

    let mut invoice = Invoice::new(
        NewInvoice {
            invoice_number: number.to_string(),
            owner_id: user_id.0.clone(),
            company_id: company.id.clone(),
            customer: Customer::from(payload.customer),
            invoice_date,
            due_date,
            payment_terms,
            products,
            notes: payload.notes.unwrap_or_default(),
            status: payload.status.unwrap_or_default(),
        },
        state.config.gst.due_days,
    );

    insert_with_fallback(&state.db, &mut invoice, Utc::now()).await?;

    record_invoice_created(&invoice.status.to_string());
    tracing::info!(
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        grand_total = %invoice.grand_total,
        "Invoice created"
    );

    Ok((
        StatusCode::CREATED,
        Json(InvoiceEnvelope {
            message: Some("Invoice created successfully".to_string()),
            invoice: InvoiceResponse::new(invoice, Some(company), today()),
        }),
    ))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0, invoice_id = %id))]
pub async fn get_invoice(
    State(state): State<AppState>,
    user_id: UserId,
    Path(id): Path<String>,
) -> Result<Json<InvoiceEnvelope>, AppError> {
    let invoice = state
        .db
        .find_invoice(&user_id.0, &id)
        .await?
        .ok_or_else(invoice_not_found)?;
    let company = state.db.find_company_by_id(&invoice.company_id).await?;

    Ok(Json(InvoiceEnvelope {
        message: None,
        invoice: InvoiceResponse::new(invoice, company, today()),
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0, invoice_id = %id))]
pub async fn update_invoice(
    State(state): State<AppState>,
    user_id: UserId,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceEnvelope>, AppError> {
    let mut invoice = state
        .db
        .find_invoice(&user_id.0, &id)
        .await?
        .ok_or_else(invoice_not_found)?;
    let now = Utc::now();

    if let Some(customer) = payload.customer {
        invoice.customer = customer.into();
    }
    if let Some(date) = payload.invoice_date.as_deref() {
        invoice.invoice_date = parse_date("invoiceDate", date)?;
    }
    if let Some(date) = payload.due_date.as_deref() {
        invoice.due_date = parse_date("dueDate", date)?;
    }
    if let Some(terms) = payload.payment_terms {
        invoice.payment_terms = terms;
    }
    if let Some(notes) = payload.notes {
        invoice.notes = notes;
    }
    if let Some(products) = payload.products {
        invoice.set_products(
            products
                .into_iter()
                .map(|product| product.into_product(&state.calculator))
                .collect(),
        );
    }
    if let Some(status) = payload.status {
        invoice.set_status(status, now);
    }
    invoice.normalize_due_date(state.config.gst.due_days);
    invoice.updated_at = now;

    if !state.db.replace_invoice(&invoice).await? {
        return Err(invoice_not_found());
    }
    let company = state.db.find_company_by_id(&invoice.company_id).await?;

    Ok(Json(InvoiceEnvelope {
        message: Some("Invoice updated successfully".to_string()),
        invoice: InvoiceResponse::new(invoice, company, today()),
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0, invoice_id = %id))]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    user_id: UserId,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<InvoiceEnvelope>, AppError> {
    let mut invoice = state
        .db
        .find_invoice(&user_id.0, &id)
        .await?
        .ok_or_else(invoice_not_found)?;

    let previous = invoice.status;
    invoice.set_status(payload.status, Utc::now());

    if !state.db.replace_invoice(&invoice).await? {
        return Err(invoice_not_found());
    }
    tracing::info!(from = %previous, to = %invoice.status, "Invoice status changed");

    Ok(Json(InvoiceEnvelope {
        message: Some(status_message(invoice.status)),
        invoice: InvoiceResponse::new(invoice, None, today()),
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0, invoice_id = %id))]
pub async fn delete_invoice(
    State(state): State<AppState>,
    user_id: UserId,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_invoice(&user_id.0, &id).await? {
        return Err(invoice_not_found());
    }
    record_invoice_deleted();

    Ok(Json(MessageResponse {
        message: "Invoice deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_names_new_status() {
        assert_eq!(
            status_message(InvoiceStatus::Paid),
            "Invoice status updated to paid"
        );
        assert_eq!(
            status_message(InvoiceStatus::Overdue),
            "Invoice status updated to overdue"
        );
    }
}
