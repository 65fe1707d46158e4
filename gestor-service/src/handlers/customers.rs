use crate::handlers::OwnerId;
use crate::models::CustomerInput;
use crate::startup::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_customer(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let customer = state.db.create_customer(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.db.list_customers(user_id).await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .db
        .get_customer(user_id, customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer {} not found", customer_id)))?;
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let customer = state.db.update_customer(user_id, customer_id, &input).await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_customer(user_id, customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
