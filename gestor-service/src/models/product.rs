//! Product and variant models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Catalog entry: a product or a service, owned by a single user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_service: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Resolve the effective unit price for this product.
    ///
    /// A variant adds its price modifier to the base price. Modifiers may be
    /// negative and are passed through unchecked, so the result can drop
    /// below zero.
    pub fn resolve_price(&self, variant: Option<&ProductVariant>) -> Decimal {
        match variant {
            Some(v) => self.base_price + v.price_modifier,
            None => self.base_price,
        }
    }
}

/// Named price/stock modifier on a product (e.g. size, color).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price_modifier: Decimal,
    pub sku: Option<String>,
    pub stock_quantity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Product together with its current variant set, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// Variant payload on a product save. The persisted variant set is replaced
/// wholesale by these rows.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VariantInput {
    #[validate(length(min = 1, message = "Nome da variação é obrigatório"))]
    pub name: String,
    #[serde(default)]
    pub price_modifier: Decimal,
    pub sku: Option<String>,
    pub stock_quantity: Option<i32>,
}

fn validate_base_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("base_price_negative");
        err.message = Some("Preço base não pode ser negativo".into());
        return Err(err);
    }
    Ok(())
}

/// Input for creating or overwriting a product and its variant set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = validate_base_price))]
    pub base_price: Decimal,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantInput>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(base_price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Camiseta".to_string(),
            description: None,
            base_price,
            is_service: false,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(product_id: Uuid, modifier: Decimal) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            product_id,
            name: "Azul".to_string(),
            price_modifier: modifier,
            sku: None,
            stock_quantity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn price_without_variant_is_base_price() {
        let p = product(Decimal::new(5000, 2));
        assert_eq!(p.resolve_price(None), Decimal::new(5000, 2));
    }

    #[test]
    fn variant_modifier_is_added_to_base_price() {
        let p = product(Decimal::new(5000, 2));
        let v = variant(p.id, Decimal::new(500, 2));
        assert_eq!(p.resolve_price(Some(&v)), Decimal::new(5500, 2));
    }

    #[test]
    fn negative_modifier_may_drop_price_below_zero() {
        let p = product(Decimal::new(1000, 2));
        let v = variant(p.id, Decimal::new(-1500, 2));
        assert_eq!(p.resolve_price(Some(&v)), Decimal::new(-500, 2));
    }

    #[test]
    fn price_resolution_is_idempotent() {
        let p = product(Decimal::new(5000, 2));
        let v = variant(p.id, Decimal::new(500, 2));
        let first = p.resolve_price(Some(&v));
        let second = p.resolve_price(Some(&v));
        assert_eq!(first, second);
    }

    #[test]
    fn negative_base_price_fails_validation() {
        let input = CreateProduct {
            name: "Camiseta".to_string(),
            description: None,
            base_price: Decimal::new(-100, 2),
            is_service: false,
            active: true,
            variants: vec![],
        };
        assert!(input.validate().is_err());
    }
}
