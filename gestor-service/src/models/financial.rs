//! Financial models: receivables, payables, transactions and aggregates.

use crate::models::sale::{PaymentStatus, Sale};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Settlement status shared by receivables and payables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Paid,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Paid => "paid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => SettlementStatus::Paid,
            _ => SettlementStatus::Pending,
        }
    }
}

/// Direction of a cash transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "expense" => TransactionType::Expense,
            _ => TransactionType::Income,
        }
    }
}

/// Money owed to the business by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receivable {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Money owed by the business to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payable {
    pub id: Uuid,
    pub user_id: Uuid,
    pub supplier_name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manually recorded income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub transaction_date: NaiveDate,
    pub sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a receivable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReceivable {
    pub customer_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

/// Input for creating a payable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayable {
    #[validate(length(min = 1, message = "Fornecedor é obrigatório"))]
    pub supplier_name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Input for recording a transaction.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Descrição é obrigatória"))]
    pub description: String,
    pub category: Option<String>,
    /// Defaults to today.
    pub transaction_date: Option<NaiveDate>,
    pub sale_id: Option<Uuid>,
}

/// Dashboard-level revenue/expense figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Dashboard counters and financial summary.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_products: i64,
    pub pending_quotes: i64,
    pub total_sales: i64,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

/// Recompute revenue, expenses and balance from settled records.
///
/// Revenue counts settled receivables plus sales settled at sale time. A sale
/// completed later contributes its full total only because completing it also
/// removes the linked receivable; both steps share one transaction in the
/// database layer.
pub fn summarize(sales: &[Sale], receivables: &[Receivable], payables: &[Payable]) -> FinancialSummary {
    let received: Decimal = receivables
        .iter()
        .filter(|r| SettlementStatus::from_string(&r.status) == SettlementStatus::Paid)
        .map(|r| r.amount)
        .sum();

    let paid_sales: Decimal = sales
        .iter()
        .filter(|s| PaymentStatus::from_string(&s.payment_status) == PaymentStatus::Paid)
        .map(|s| s.total_amount)
        .sum();

    let expenses: Decimal = payables
        .iter()
        .filter(|p| SettlementStatus::from_string(&p.status) == SettlementStatus::Paid)
        .map(|p| p.amount)
        .sum();

    let revenue = received + paid_sales;

    FinancialSummary {
        revenue,
        expenses,
        balance: revenue - expenses,
    }
}
