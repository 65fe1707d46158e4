use crate::handlers::OwnerId;
use crate::models::{CreateQuote, QuoteStatus};
use crate::startup::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct UpdateQuoteStatus {
    pub status: QuoteStatus,
}

pub async fn create_quote(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreateQuote>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let quote = state.db.create_quote(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let quotes = state.db.list_quotes(user_id).await?;
    Ok(Json(quotes))
}

pub async fn get_quote(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state
        .db
        .get_quote(user_id, quote_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)))?;
    Ok(Json(quote))
}

pub async fn update_quote_status(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(quote_id): Path<Uuid>,
    Json(input): Json<UpdateQuoteStatus>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state
        .db
        .update_quote_status(user_id, quote_id, input.status)
        .await?;
    Ok(Json(quote))
}

pub async fn convert_quote(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = state.db.convert_quote_to_sale(user_id, quote_id).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_quote(user_id, quote_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
