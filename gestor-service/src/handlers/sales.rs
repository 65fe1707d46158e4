use crate::handlers::OwnerId;
use crate::models::CreateSale;
use crate::startup::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_sale(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreateSale>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let sale = state.db.create_sale(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn list_sales(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let sales = state.db.list_sales(user_id).await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = state
        .db
        .get_sale(user_id, sale_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)))?;
    Ok(Json(sale))
}

pub async fn complete_sale(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = state.db.complete_sale(user_id, sale_id).await?;
    Ok(Json(sale))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_sale(user_id, sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
