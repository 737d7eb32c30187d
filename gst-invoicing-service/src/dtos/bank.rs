use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use super::empty_string_as_none;
use crate::models::{AccountType, BankProfile};

/// Body of `PUT /api/bank`. Required fields are checked together so the caller gets the
/// single "All required fields must be filled" message.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBankRequest {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub branch_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ifsc_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account_holder_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub upi_id: Option<String>,
}

struct RequiredBankFields {
    bank_name: String,
    branch_name: String,
    account_number: String,
    ifsc_code: String,
    account_holder_name: String,
}

impl UpsertBankRequest {
    fn required(&self) -> Option<RequiredBankFields> {
        Some(RequiredBankFields {
            bank_name: self.bank_name.clone()?,
            branch_name: self.branch_name.clone()?,
            account_number: self.account_number.clone()?,
            ifsc_code: self.ifsc_code.clone()?.to_uppercase(),
            account_holder_name: self.account_holder_name.clone()?,
        })
    }

    /// Write the request onto `bank`. Account type and UPI id keep their stored values
    /// when omitted.
    pub fn apply(self, bank: &mut BankProfile) -> Result<(), AppError> {
        let required = self.required().ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("All required fields must be filled"))
        })?;

        let account_type = self
            .account_type
            .as_deref()
            .map(str::parse::<AccountType>)
            .transpose()
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

        bank.bank_name = required.bank_name;
        bank.branch_name = required.branch_name;
        bank.account_number = required.account_number;
        bank.ifsc_code = required.ifsc_code;
        bank.account_holder_name = required.account_holder_name;
        if let Some(account_type) = account_type {
            bank.account_type = account_type;
        }
        if let Some(upi_id) = self.upi_id {
            bank.upi_id = upi_id;
        }
        bank.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub bank_name: String,
    pub branch_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub account_holder_name: String,
    pub account_type: AccountType,
    pub upi_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BankResponse {
    /// Blank profile returned to owners who have not saved bank details yet.
    pub fn empty() -> Self {
        Self {
            id: None,
            bank_name: String::new(),
            branch_name: String::new(),
            account_number: String::new(),
            ifsc_code: String::new(),
            account_holder_name: String::new(),
            account_type: AccountType::default(),
            upi_id: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<BankProfile> for BankResponse {
    fn from(b: BankProfile) -> Self {
        Self {
            id: Some(b.id),
            bank_name: b.bank_name,
            branch_name: b.branch_name,
            account_number: b.account_number,
            ifsc_code: b.ifsc_code,
            account_holder_name: b.account_holder_name,
            account_type: b.account_type,
            upi_id: b.upi_id,
            created_at: Some(b.created_at),
            updated_at: Some(b.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BankEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub bank: BankResponse,
}
