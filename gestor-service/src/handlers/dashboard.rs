use crate::handlers::OwnerId;
use crate::startup::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use gestor_core::error::AppError;

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    OwnerId(user_id): OwnerId,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.db.get_dashboard_stats(user_id).await?;
    Ok(Json(stats))
}
