//! In-memory line item accumulator for a quote or sale being composed.
//!
//! A draft lives only for the duration of one create/edit request; items are
//! identified by position, which is safe because nothing is persisted until
//! the document is finalized as a whole.

use crate::models::product::{Product, ProductVariant};
use gestor_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw item payload as submitted by the client form.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentItemInput {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Overrides the resolved price when present (the form lets the operator
    /// adjust the price per item).
    pub unit_price: Option<Decimal>,
}

fn default_quantity() -> i32 {
    1
}

/// A priced line held by the accumulator, description snapshotted at add-time.
#[derive(Debug, Clone, Serialize)]
pub struct DraftItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Ordered, mutable sequence of items for the document under composition.
#[derive(Debug, Clone, Default)]
pub struct DraftDocument {
    items: Vec<DraftItem>,
}

impl DraftDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. The description snapshots the product name, suffixed
    /// with the variant name when one is selected; the unit price falls back
    /// to the resolved catalog price when no override is given.
    pub fn add_item(
        &mut self,
        product: Option<&Product>,
        variant: Option<&ProductVariant>,
        quantity: i32,
        unit_price: Option<Decimal>,
    ) -> Result<(), AppError> {
        let product = product
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Selecione um produto")))?;

        if quantity < 1 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quantidade deve ser maior que zero"
            )));
        }

        if let Some(v) = variant {
            if v.product_id != product.id {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Variação não pertence ao produto selecionado"
                )));
            }
        }

        let mut description = product.name.clone();
        if let Some(v) = variant {
            description.push_str(" - ");
            description.push_str(&v.name);
        }

        let unit_price = unit_price.unwrap_or_else(|| product.resolve_price(variant));
        let total_price = Decimal::from(quantity) * unit_price;

        self.items.push(DraftItem {
            product_id: product.id,
            variant_id: variant.map(|v| v.id),
            description,
            quantity,
            unit_price,
            total_price,
        });

        Ok(())
    }

    /// Remove by position; subsequent indices shift down by one.
    pub fn remove_item(&mut self, index: usize) -> Result<DraftItem, AppError> {
        if index >= self.items.len() {
            return Err(AppError::BadRequest(anyhow::anyhow!("Item inválido")));
        }
        Ok(self.items.remove(index))
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<(), AppError> {
        if quantity < 1 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quantidade deve ser maior que zero"
            )));
        }
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Item inválido")))?;
        item.quantity = quantity;
        item.total_price = Decimal::from(quantity) * item.unit_price;
        Ok(())
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Decimal) -> Result<(), AppError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Item inválido")))?;
        item.unit_price = unit_price;
        item.total_price = Decimal::from(item.quantity) * unit_price;
        Ok(())
    }

    /// Document total, recomputed from quantity and unit price on every call.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.unit_price)
            .sum()
    }

    /// A document must carry at least one item to be finalized.
    pub fn require_items(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Adicione pelo menos um item"
            )));
        }
        Ok(())
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, base_price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            base_price,
            is_service: false,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(product_id: Uuid, name: &str, modifier: Decimal) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            product_id,
            name: name.to_string(),
            price_modifier: modifier,
            sku: None,
            stock_quantity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn add_without_product_is_rejected() {
        let mut draft = DraftDocument::new();
        let err = draft.add_item(None, None, 1, None).unwrap_err();
        assert!(err.to_string().contains("Selecione um produto"));
        assert!(draft.is_empty());
    }

    #[test]
    fn description_snapshots_product_and_variant_names() {
        let p = product("Camiseta", Decimal::new(5000, 2));
        let v = variant(p.id, "Azul", Decimal::new(500, 2));

        let mut draft = DraftDocument::new();
        draft.add_item(Some(&p), Some(&v), 3, None).unwrap();

        let item = &draft.items()[0];
        assert_eq!(item.description, "Camiseta - Azul");
        assert_eq!(item.unit_price, Decimal::new(5500, 2));
        assert_eq!(item.total_price, Decimal::new(16500, 2));
    }

    #[test]
    fn scenario_three_shirts_with_variant_total_165() {
        let p = product("Camiseta", Decimal::new(5000, 2));
        let v = variant(p.id, "Azul", Decimal::new(500, 2));

        let mut draft = DraftDocument::new();
        draft.add_item(Some(&p), Some(&v), 3, None).unwrap();

        assert_eq!(draft.total(), Decimal::new(16500, 2));
    }

    #[test]
    fn variant_of_another_product_is_rejected() {
        let p = product("Camiseta", Decimal::new(5000, 2));
        let other = product("Caneca", Decimal::new(2000, 2));
        let v = variant(other.id, "Azul", Decimal::new(500, 2));

        let mut draft = DraftDocument::new();
        assert!(draft.add_item(Some(&p), Some(&v), 1, None).is_err());
    }

    #[test]
    fn removal_is_positional_and_shifts_indices() {
        let a = product("A", Decimal::new(1000, 2));
        let b = product("B", Decimal::new(2000, 2));
        let c = product("C", Decimal::new(3000, 2));

        let mut draft = DraftDocument::new();
        draft.add_item(Some(&a), None, 1, None).unwrap();
        draft.add_item(Some(&b), None, 1, None).unwrap();
        draft.add_item(Some(&c), None, 1, None).unwrap();

        let removed = draft.remove_item(1).unwrap();
        assert_eq!(removed.description, "B");
        assert_eq!(draft.len(), 2);
        assert_eq!(draft.items()[1].description, "C");
    }

    #[test]
    fn total_follows_quantity_and_price_updates() {
        let p = product("Camiseta", Decimal::new(5000, 2));

        let mut draft = DraftDocument::new();
        draft.add_item(Some(&p), None, 1, None).unwrap();
        assert_eq!(draft.total(), Decimal::new(5000, 2));

        draft.set_quantity(0, 4).unwrap();
        assert_eq!(draft.total(), Decimal::new(20000, 2));

        draft.set_unit_price(0, Decimal::new(2500, 2)).unwrap();
        assert_eq!(draft.total(), Decimal::new(10000, 2));
    }

    #[test]
    fn explicit_unit_price_overrides_catalog_price() {
        let p = product("Camiseta", Decimal::new(5000, 2));

        let mut draft = DraftDocument::new();
        draft
            .add_item(Some(&p), None, 2, Some(Decimal::new(4500, 2)))
            .unwrap();
        assert_eq!(draft.total(), Decimal::new(9000, 2));
    }

    #[test]
    fn empty_draft_cannot_be_finalized() {
        let draft = DraftDocument::new();
        let err = draft.require_items().unwrap_err();
        assert!(err.to_string().contains("pelo menos um item"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let p = product("Camiseta", Decimal::new(5000, 2));
        let mut draft = DraftDocument::new();
        assert!(draft.add_item(Some(&p), None, 0, None).is_err());
    }
}
