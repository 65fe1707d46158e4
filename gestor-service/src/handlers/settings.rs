use crate::handlers::OwnerId;
use crate::models::UpsertStoreSettings;
use crate::startup::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;
use validator::Validate;

pub async fn get_store_settings(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let settings = state
        .db
        .get_store_settings(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Store settings not configured")))?;
    Ok(Json(settings))
}

pub async fn upsert_store_settings(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
    Json(input): Json<UpsertStoreSettings>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let settings = state.db.upsert_store_settings(user_id, &input).await?;
    Ok(Json(settings))
}
