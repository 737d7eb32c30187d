use chrono::{DateTime, NaiveDate, Utc};
use gst_core::{GstCalculator, InvoiceTotals, LineAmounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::{empty_string_as_none, trim_option, trim_string, CompanyResponse};
use crate::models::invoice::{DEFAULT_PAYMENT_TERMS, DEFAULT_UNIT};
use crate::models::{Address, Company, Customer, Invoice, InvoiceStatus, Product};
use crate::utils::validation::{
    validate_gst_rate, validate_gstin, validate_iso_date, validate_pincode, validate_price,
    validate_quantity,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Street address is required"))]
    pub street: String,
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(custom(function = "validate_pincode"))]
    pub pincode: String,
}

impl From<AddressInput> for Address {
    fn from(a: AddressInput) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            pincode: a.pincode,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(custom(function = "validate_gstin"))]
    pub gstin: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Invalid customer email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    #[validate(nested)]
    pub billing_address: AddressInput,
    #[validate(nested)]
    pub shipping_address: Option<AddressInput>,
}

impl From<CustomerInput> for Customer {
    fn from(c: CustomerInput) -> Self {
        Customer::new(
            c.name,
            c.gstin.map(|g| g.to_uppercase()).unwrap_or_default(),
            c.email.map(|e| e.to_lowercase()).unwrap_or_default(),
            c.phone.unwrap_or_default(),
            c.billing_address.into(),
            c.shipping_address.map(Address::from),
        )
    }
}

/// A line item as typed into the invoice form. Numbers may arrive as strings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Product description is required"))]
    pub description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hsn_code: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: Value,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "unitPrice")]
    #[validate(custom(function = "validate_price"))]
    pub price: Value,
    #[serde(default)]
    #[validate(custom(function = "validate_gst_rate"))]
    pub gst_rate: Option<Value>,
}

impl ProductInput {
    /// Coerce the inputs and compute the line's tax amounts.
    pub fn into_product(self, calculator: &GstCalculator) -> Product {
        let line = calculator.line(&self.quantity, &self.price, self.gst_rate.as_ref());
        let unit = self
            .unit
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());
        Product::new(
            self.description,
            self.hsn_code.unwrap_or_default(),
            unit,
            line,
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[validate(nested)]
    pub customer: CustomerInput,
    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub invoice_date: String,
    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub due_date: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub payment_terms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one product is required"), nested)]
    pub products: Vec<ProductInput>,
    pub status: Option<InvoiceStatus>,
}

impl CreateInvoiceRequest {
    pub fn payment_terms(&self) -> String {
        self.payment_terms
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string())
    }
}

/// Partial edit. Replacement products are recomputed but not range checked.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[validate(nested)]
    pub customer: Option<CustomerInput>,
    #[validate(custom(function = "validate_iso_date"))]
    pub invoice_date: Option<String>,
    #[validate(custom(function = "validate_iso_date"))]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "trim_option")]
    pub payment_terms: Option<String>,
    #[serde(default, deserialize_with = "trim_option")]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one product is required"))]
    pub products: Option<Vec<ProductInput>>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLine {
    #[serde(default)]
    pub quantity: Value,
    #[serde(default, alias = "unitPrice")]
    pub price: Value,
    #[serde(default)]
    pub gst_rate: Option<Value>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PreviewRequest {
    #[serde(default)]
    pub products: Vec<PreviewLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLineResponse {
    pub quantity: Decimal,
    pub price: Decimal,
    pub gst_rate: Decimal,
    pub rate_label: String,
    #[serde(flatten)]
    pub amounts: LineAmounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub products: Vec<PreviewLineResponse>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
}

impl PreviewResponse {
    pub fn compute(request: &PreviewRequest, calculator: &GstCalculator) -> Self {
        let products: Vec<PreviewLineResponse> = request
            .products
            .iter()
            .map(|line| {
                let priced = calculator.line(&line.quantity, &line.price, line.gst_rate.as_ref());
                PreviewLineResponse {
                    quantity: priced.quantity,
                    price: priced.unit_price,
                    gst_rate: priced.gst_rate,
                    rate_label: gst_core::rate_label(priced.gst_rate),
                    amounts: priced.amounts,
                }
            })
            .collect();
        let totals = gst_core::aggregate(products.iter().map(|p| &p.amounts));
        Self { products, totals }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            pincode: a.pincode,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub name: String,
    pub gstin: String,
    pub email: String,
    pub phone: String,
    pub billing_address: AddressResponse,
    pub shipping_address: AddressResponse,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            name: c.name,
            gstin: c.gstin,
            email: c.email,
            phone: c.phone,
            billing_address: c.billing_address.into(),
            shipping_address: c.shipping_address.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub description: String,
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

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            description: p.description,
            hsn_code: p.hsn_code,
            quantity: p.quantity,
            unit: p.unit,
            price: p.price,
            gst_rate: p.gst_rate,
            taxable_value: p.taxable_value,
            gst_amount: p.gst_amount,
            cgst_amount: p.cgst_amount,
            sgst_amount: p.sgst_amount,
            total_amount: p.total_amount,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub invoice_number: String,
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyResponse>,
    pub customer: CustomerResponse,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_terms: String,
    pub products: Vec<ProductResponse>,
    pub subtotal: Decimal,
    pub cgst_total: Decimal,
    pub sgst_total: Decimal,
    pub round_off: Decimal,
    pub grand_total: Decimal,
    pub notes: String,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub days_until_due: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    /// `today` drives the derived `isOverdue` and `daysUntilDue` fields.
    pub fn new(invoice: Invoice, company: Option<Company>, today: NaiveDate) -> Self {
        let is_overdue = invoice.is_overdue(today);
        let days_until_due = invoice.days_until_due(today);
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            company_id: invoice.company_id,
            company: company.map(CompanyResponse::from),
            customer: invoice.customer.into(),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            payment_terms: invoice.payment_terms,
            products: invoice.products.into_iter().map(ProductResponse::from).collect(),
            subtotal: invoice.subtotal,
            cgst_total: invoice.cgst_total,
            sgst_total: invoice.sgst_total,
            round_off: invoice.round_off,
            grand_total: invoice.grand_total,
            notes: invoice.notes,
            status: invoice.status,
            paid_at: invoice.paid_at.map(|d| d.to_chrono()),
            is_overdue,
            days_until_due,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub invoice: InvoiceResponse,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit.max(1)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub total: u64,
    pub paid: u64,
    pub overdue: u64,
    pub pending: u64,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub monthly_revenue: Decimal,
    pub yearly_revenue: Decimal,
    pub collection_rate: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceNumberResponse {
    pub invoice_number: String,
}
