use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Savings,
    Current,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Savings => write!(f, "savings"),
            AccountType::Current => write!(f, "current"),
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(AccountType::Savings),
            "current" => Ok(AccountType::Current),
            _ => Err(format!(
                "Invalid account type: {}. Must be one of: savings, current",
                s
            )),
        }
    }
}

/// Payee bank details printed on invoices. One per owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub bank_name: String,
    pub branch_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub account_holder_name: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub upi_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl BankProfile {
    pub fn new(owner_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            bank_name: String::new(),
            branch_name: String::new(),
            account_number: String::new(),
            ifsc_code: String::new(),
            account_holder_name: String::new(),
            account_type: AccountType::default(),
            upi_id: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Current".parse::<AccountType>(), Ok(AccountType::Current));
        assert_eq!(" savings ".parse::<AccountType>(), Ok(AccountType::Savings));
        assert!("checking".parse::<AccountType>().is_err());
    }
}
