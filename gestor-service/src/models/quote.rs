//! Quote model.

use crate::models::draft::DocumentItemInput;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Quote status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Approved,
    Rejected,
    Converted,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Converted => "converted",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => QuoteStatus::Approved,
            "rejected" => QuoteStatus::Rejected,
            "converted" => QuoteStatus::Converted,
            _ => QuoteStatus::Pending,
        }
    }
}

/// Quote document: a non-binding priced proposal, convertible to a sale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub quote_number: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item on a quote.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Quote together with its items, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithItems {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

/// Input for creating a quote with its line items.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuote {
    pub customer_id: Uuid,
    /// Generated (`ORC-<epoch-ms>`) when absent.
    pub quote_number: Option<String>,
    /// Defaults to today when absent.
    pub issue_date: Option<NaiveDate>,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub items: Vec<DocumentItemInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            QuoteStatus::Pending,
            QuoteStatus::Approved,
            QuoteStatus::Rejected,
            QuoteStatus::Converted,
        ] {
            assert_eq!(QuoteStatus::from_string(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        assert_eq!(QuoteStatus::from_string("garbage"), QuoteStatus::Pending);
    }
}
