use crate::handlers::OwnerId;
use crate::models::{CreatePayable, CreateReceivable, CreateTransaction};
use crate::startup::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

// Receivables

pub async fn create_receivable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreateReceivable>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let receivable = state.db.create_receivable(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(receivable)))
}

pub async fn list_receivables(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let receivables = state.db.list_receivables(user_id).await?;
    Ok(Json(receivables))
}

pub async fn update_receivable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(receivable_id): Path<Uuid>,
    Json(input): Json<CreateReceivable>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let receivable = state
        .db
        .update_receivable(user_id, receivable_id, &input)
        .await?;
    Ok(Json(receivable))
}

pub async fn mark_receivable_paid(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(receivable_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receivable = state.db.mark_receivable_paid(user_id, receivable_id).await?;
    Ok(Json(receivable))
}

pub async fn delete_receivable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(receivable_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_receivable(user_id, receivable_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Payables

pub async fn create_payable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreatePayable>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let payable = state.db.create_payable(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(payable)))
}

pub async fn list_payables(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let payables = state.db.list_payables(user_id).await?;
    Ok(Json(payables))
}

pub async fn update_payable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(payable_id): Path<Uuid>,
    Json(input): Json<CreatePayable>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let payable = state.db.update_payable(user_id, payable_id, &input).await?;
    Ok(Json(payable))
}

pub async fn mark_payable_paid(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(payable_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payable = state.db.mark_payable_paid(user_id, payable_id).await?;
    Ok(Json(payable))
}

pub async fn delete_payable(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(payable_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_payable(user_id, payable_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Transactions

pub async fn create_transaction(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreateTransaction>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let transaction = state.db.create_transaction(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let transactions = state.db.list_transactions(user_id).await?;
    Ok(Json(transactions))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_transaction(user_id, transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
