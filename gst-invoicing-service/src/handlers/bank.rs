use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::dtos::{BankEnvelope, BankResponse, UpsertBankRequest};
use crate::middleware::UserId;
use crate::models::BankProfile;
use crate::startup::AppState;
use crate::utils::ValidatedJson;

/// Owners without saved details get a blank profile rather than 404.
#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn get_bank(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<BankEnvelope>, AppError> {
    let bank = match state.db.find_bank(&user_id.0).await? {
        Some(bank) => BankResponse::from(bank),
        None => BankResponse::empty(),
    };

    Ok(Json(BankEnvelope {
        message: None,
        bank,
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn upsert_bank(
    State(state): State<AppState>,
    user_id: UserId,
    ValidatedJson(payload): ValidatedJson<UpsertBankRequest>,
) -> Result<Json<BankEnvelope>, AppError> {
    let mut bank = state
        .db
        .find_bank(&user_id.0)
        .await?
        .unwrap_or_else(|| BankProfile::new(user_id.0.clone()));

    payload.apply(&mut bank)?;
    let bank = state.db.upsert_bank(&bank).await?;

    Ok(Json(BankEnvelope {
        message: Some("Bank details saved successfully".to_string()),
        bank: bank.into(),
    }))
}
