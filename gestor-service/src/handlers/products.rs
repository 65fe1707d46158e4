use crate::handlers::OwnerId;
use crate::models::CreateProduct;
use crate::startup::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct ListProductsParams {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn create_product(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<CreateProduct>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let product = state.db.create_product(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.db.list_products(user_id, params.active_only).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .db
        .get_product(user_id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product {} not found", product_id)))?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(product_id): Path<Uuid>,
    Json(input): Json<CreateProduct>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let product = state.db.update_product(user_id, product_id, &input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_product(user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
