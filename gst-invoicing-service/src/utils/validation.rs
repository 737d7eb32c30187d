use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::AppError;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

static PINCODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid pincode regex"));

/// JSON body extractor that runs `validator` rules before the handler sees the value.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e.body_text()))
        })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Accepts `YYYY-MM-DD` or a full ISO-8601 timestamp; only the date part is kept.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    match parse_iso_date(value) {
        Some(_) => Ok(()),
        None => Err(invalid("iso_date", "Invalid date format, expected ISO-8601")),
    }
}

pub fn validate_pincode(value: &str) -> Result<(), ValidationError> {
    if !PINCODE_PATTERN.is_match(value.trim()) {
        return Err(invalid("pincode", "Pincode must be 6 digits"));
    }
    Ok(())
}

/// Company addresses may leave the pincode empty; anything entered must still be 6 digits.
pub fn validate_optional_pincode(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_pincode(value)
}

pub fn validate_gstin(value: &str) -> Result<(), ValidationError> {
    if !gst_core::gstin::is_valid_gstin(&value.trim().to_uppercase()) {
        return Err(invalid("gstin", "Invalid GSTIN format"));
    }
    Ok(())
}

/// Largest quantity accepted on a single line.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);
/// Largest unit price accepted on a single line, in rupees.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

pub fn validate_quantity(value: &Value) -> Result<(), ValidationError> {
    match gst_core::parse_strict(value) {
        Some(q) if q > MAX_QUANTITY => Err(invalid(
            "quantity",
            "Product quantity must not exceed 10000000",
        )),
        Some(q) if q >= Decimal::new(1, 2) => Ok(()),
        _ => Err(invalid(
            "quantity",
            "Product quantity must be greater than 0",
        )),
    }
}

pub fn validate_price(value: &Value) -> Result<(), ValidationError> {
    match gst_core::parse_strict(value) {
        Some(p) if p > MAX_PRICE => Err(invalid(
            "price",
            "Product price must not exceed 10000000000",
        )),
        Some(p) if p >= Decimal::ZERO => Ok(()),
        _ => Err(invalid("price", "Product price must be 0 or greater")),
    }
}

pub fn validate_gst_rate(value: &Value) -> Result<(), ValidationError> {
    match gst_core::parse_strict(value) {
        Some(r) if gst_core::rates::is_valid_rate(r) => Ok(()),
        _ => Err(invalid("gst_rate", "GST rate must be between 0 and 100")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pincode_must_be_six_digits() {
        assert!(validate_pincode("411001").is_ok());
        assert!(validate_pincode("41100").is_err());
        assert!(validate_pincode("4110011").is_err());
        assert!(validate_pincode("41100a").is_err());
        assert!(validate_optional_pincode("").is_ok());
        assert!(validate_optional_pincode("123").is_err());
    }

    #[test]
    fn dates_accept_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(parse_iso_date("2024-03-15"), Some(expected));
        assert_eq!(parse_iso_date("2024-03-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_iso_date("2024-03-15T10:30:00.000+05:30"), Some(expected));
        assert_eq!(parse_iso_date("2024-03-15T10:30:00"), Some(expected));
        assert_eq!(parse_iso_date("15/03/2024"), None);
        assert_eq!(parse_iso_date("2024-02-30"), None);
        assert!(validate_iso_date("").is_err());
    }

    #[test]
    fn numeric_rules() {
        assert!(validate_quantity(&json!(0.01)).is_ok());
        assert!(validate_quantity(&json!("2")).is_ok());
        assert!(validate_quantity(&json!(0)).is_err());
        assert!(validate_quantity(&json!("2 boxes")).is_err());
        assert!(validate_quantity(&Value::Null).is_err());

        assert!(validate_price(&json!(0)).is_ok());
        assert!(validate_price(&json!(-1)).is_err());

        assert!(validate_gst_rate(&json!(28)).is_ok());
        assert!(validate_gst_rate(&json!("100")).is_ok());
        assert!(validate_gst_rate(&json!(100.5)).is_err());
        assert!(validate_gst_rate(&json!(-5)).is_err());
    }

    #[test]
    fn quantity_and_price_have_ceilings() {
        assert_eq!(MAX_QUANTITY.to_string(), "10000000");
        assert_eq!(MAX_PRICE.to_string(), "10000000000");

        assert!(validate_quantity(&json!(10_000_000)).is_ok());
        assert!(validate_quantity(&json!("10000000.01")).is_err());
        assert!(validate_quantity(&json!("1e27")).is_err());

        assert!(validate_price(&json!("10000000000")).is_ok());
        assert!(validate_price(&json!(10_000_000_001_u64)).is_err());
        assert!(validate_price(&json!("1e27")).is_err());
    }

    #[test]
    fn gstin_rule_uses_format_check() {
        assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gstin(" 27aapfu0939f1zv ").is_ok());
        assert!(validate_gstin("27AAPFU0939F1Z").is_err());
    }
}
