//! Sale model and the payment splitter.

use crate::models::draft::DocumentItemInput;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use gestor_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Payment status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }
}

/// How the customer settles a sale at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Fully paid at sale time.
    Total,
    /// Part paid now, the remainder tracked as a receivable.
    Partial,
}

/// Payment choice submitted with a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentTerms {
    pub kind: PaymentKind,
    pub paid_amount: Option<Decimal>,
}

/// Recorded sale with a customer, composed of line items.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub sale_number: String,
    pub sale_date: NaiveDate,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item on a sale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Sale together with its items, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Input for registering a sale with its line items.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSale {
    pub customer_id: Uuid,
    /// Generated (`VND-<epoch-ms>`) when absent.
    pub sale_number: Option<String>,
    /// Defaults to today.
    pub sale_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub payment: PaymentTerms,
    pub notes: Option<String>,
    pub items: Vec<DocumentItemInput>,
}

/// Receivable to be persisted alongside a partially paid sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivableDraft {
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub notes: String,
}

/// Outcome of splitting a sale's payment.
#[derive(Debug, Clone)]
pub struct PaymentSplit {
    pub status: PaymentStatus,
    pub receivable: Option<ReceivableDraft>,
}

/// Number of days a derived receivable is given until it falls due.
const RECEIVABLE_TERM_DAYS: i64 = 30;

/// Decide the payment status of a new sale and derive the receivable for the
/// outstanding balance, if any.
///
/// A partial payment must satisfy `0 <= paid <= total`; paying more than the
/// total is rejected before anything is persisted. Paying exactly the total
/// settles the sale with no receivable.
pub fn split_payment(
    total: Decimal,
    terms: &PaymentTerms,
    sale_number: &str,
    sale_date: NaiveDate,
) -> Result<PaymentSplit, AppError> {
    match terms.kind {
        PaymentKind::Total => Ok(PaymentSplit {
            status: PaymentStatus::Paid,
            receivable: None,
        }),
        PaymentKind::Partial => {
            let paid = terms.paid_amount.ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!("Informe o valor pago"))
            })?;

            if paid.is_sign_negative() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Valor pago não pode ser negativo"
                )));
            }
            if paid > total {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Valor pago deve ser menor que o total da venda"
                )));
            }
            if paid == total {
                return Ok(PaymentSplit {
                    status: PaymentStatus::Paid,
                    receivable: None,
                });
            }

            Ok(PaymentSplit {
                status: PaymentStatus::Pending,
                receivable: Some(ReceivableDraft {
                    amount: total - paid,
                    due_date: sale_date + Duration::days(RECEIVABLE_TERM_DAYS),
                    notes: format!("Referente à venda {}", sale_number),
                }),
            })
        }
    }
}
