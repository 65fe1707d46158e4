//! Data models for gestor-service.

pub mod customer;
pub mod draft;
pub mod financial;
pub mod product;
pub mod quote;
pub mod sale;
pub mod settings;

pub use customer::{Customer, CustomerInput};
pub use draft::{DocumentItemInput, DraftDocument, DraftItem};
pub use financial::{
    CreatePayable, CreateReceivable, CreateTransaction, DashboardStats, FinancialSummary, Payable,
    Receivable, SettlementStatus, Transaction, TransactionType,
};
pub use product::{CreateProduct, Product, ProductVariant, ProductWithVariants, VariantInput};
pub use quote::{CreateQuote, Quote, QuoteItem, QuoteStatus, QuoteWithItems};
pub use sale::{
    split_payment, CreateSale, PaymentKind, PaymentSplit, PaymentStatus, PaymentTerms,
    ReceivableDraft, Sale, SaleItem, SaleWithItems,
};
pub use settings::{StoreSettings, UpsertStoreSettings};

/// Prefix for generated quote numbers.
pub const QUOTE_NUMBER_PREFIX: &str = "ORC";

/// Prefix for generated sale numbers.
pub const SALE_NUMBER_PREFIX: &str = "VND";

/// Generate a human-readable document number.
///
/// Timestamp-based, not globally unique, but collision-improbable at the rate
/// a single operator issues documents.
pub fn next_document_number(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_numbers_carry_the_prefix() {
        let number = next_document_number(QUOTE_NUMBER_PREFIX);
        assert!(number.starts_with("ORC-"));

        let suffix = number.strip_prefix("ORC-").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }
}
