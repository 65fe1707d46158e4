//! Store settings model: one company profile per user account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Company profile used when rendering printable documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoreSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing the company profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertStoreSettings {
    #[validate(length(min = 1, message = "Nome da empresa é obrigatório"))]
    pub company_name: String,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub logo_url: Option<String>,
}
