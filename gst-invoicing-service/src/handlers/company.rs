use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::dtos::{CompanyEnvelope, CreateCompanyRequest, UpdateCompanyRequest};
use crate::middleware::UserId;
use crate::startup::AppState;
use crate::utils::ValidatedJson;

fn company_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Company not found"))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn create_company(
    State(state): State<AppState>,
    user_id: UserId,
    ValidatedJson(payload): ValidatedJson<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.db.find_company(&user_id.0).await?.is_some() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Company already exists. Use update instead."
        )));
    }

    let company = payload.into_company(user_id.0);
    state.db.insert_company(&company).await?;
    tracing::info!(company_id = %company.id, "Company created");

    Ok((
        StatusCode::CREATED,
        Json(CompanyEnvelope {
            message: Some("Company created successfully".to_string()),
            company: company.into(),
        }),
    ))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn get_company(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<CompanyEnvelope>, AppError> {
    let company = state
        .db
        .find_company(&user_id.0)
        .await?
        .ok_or_else(company_not_found)?;

    Ok(Json(CompanyEnvelope {
        message: None,
        company: company.into(),
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn update_company(
    State(state): State<AppState>,
    user_id: UserId,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyEnvelope>, AppError> {
    let mut company = state
        .db
        .find_company(&user_id.0)
        .await?
        .ok_or_else(company_not_found)?;

    payload.apply(&mut company);
    state.db.replace_company(&company).await?;

    Ok(Json(CompanyEnvelope {
        message: Some("Company updated successfully".to_string()),
        company: company.into(),
    }))
}
