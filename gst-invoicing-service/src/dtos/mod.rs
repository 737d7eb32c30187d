pub mod bank;
pub mod company;
pub mod invoice;

use serde::{Deserialize, Deserializer, Serialize};

pub use bank::{BankEnvelope, BankResponse, UpsertBankRequest};
pub use company::{CompanyEnvelope, CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};
pub use invoice::{
    CreateInvoiceRequest, DashboardStatsResponse, InvoiceEnvelope, InvoiceNumberResponse,
    InvoiceResponse, ListInvoicesQuery, ListInvoicesResponse, Pagination, PreviewRequest,
    PreviewResponse, UpdateInvoiceRequest, UpdateStatusRequest,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Trim required text input; a missing field reads as empty so `length` rules report it.
pub(crate) fn trim_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Trim optional text input, keeping an explicit empty string as `Some("")`.
pub(crate) fn trim_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

/// Trim optional text input; blank or null becomes `None`.
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
