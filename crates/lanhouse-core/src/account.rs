//! # Account Accumulator
//!
//! The running list of products and services charged to an open session.
//!
//! ```text
//! add(Soda $18, qty 1)  ──►  [Soda $18 ×1]
//! add(Soda $18, qty 2)  ──►  [Soda $18 ×3]               (same id + price: merge)
//! add(Soda $20, qty 1)  ──►  [Soda $18 ×3, Soda $20 ×1]  (price changed: new line)
//! ```
//!
//! Lines are never removed mid-session; the whole list is dropped when the
//! session is finalized. The subtotal is always folded from the lines,
//! never cached.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AccountItem, Product};
use crate::validation::{validate_name, validate_price, validate_quantity};
use crate::{MAX_ACCOUNT_ITEMS, MAX_ITEM_QUANTITY};

impl AccountItem {
    /// Builds a line from a catalog product (quantity 1).
    pub fn from_product(product: &Product) -> Self {
        AccountItem {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.sale_price_cents,
            quantity: 1,
            unit_cost_cents: product.purchase_price_cents,
            is_service: product.is_service,
        }
    }

    /// Builds an ad-hoc line typed in at the counter.
    ///
    /// Custom lines get a fresh `custom-<uuid>` id so they never merge with
    /// catalog products, and carry no stock.
    pub fn custom(name: &str, price: Money) -> CoreResult<Self> {
        validate_name("name", name)?;
        validate_price("price", price)?;

        Ok(AccountItem {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.trim().to_string(),
            unit_price_cents: price.cents(),
            quantity: 1,
            unit_cost_cents: price.cents(),
            is_service: true,
        })
    }
}

/// Adds `quantity` of `item` to the account, merging with an existing line
/// that has the same id and unit price.
///
/// The `quantity` field of `item` itself is ignored.
pub fn add_item(items: &mut Vec<AccountItem>, item: AccountItem, quantity: i64) -> CoreResult<()> {
    validate_quantity(quantity)?;

    if let Some(line) = items
        .iter_mut()
        .find(|line| line.id == item.id && line.unit_price_cents == item.unit_price_cents)
    {
        let new_qty = line.quantity + quantity;
        if new_qty > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_ITEM_QUANTITY,
            });
        }
        line.quantity = new_qty;
        return Ok(());
    }

    if items.len() >= MAX_ACCOUNT_ITEMS {
        return Err(CoreError::AccountTooLarge {
            max: MAX_ACCOUNT_ITEMS,
        });
    }

    items.push(AccountItem { quantity, ..item });
    Ok(())
}

/// `Σ unit_price × quantity` over all lines.
pub fn subtotal(items: &[AccountItem]) -> Money {
    items.iter().map(AccountItem::line_total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn soda(price_cents: i64) -> AccountItem {
        AccountItem {
            id: "soda".to_string(),
            name: "Soda".to_string(),
            unit_price_cents: price_cents,
            quantity: 1,
            unit_cost_cents: 1200,
            is_service: false,
        }
    }

    #[test]
    fn test_same_item_merges() {
        let mut items = Vec::new();
        add_item(&mut items, soda(1800), 1).unwrap();
        add_item(&mut items, soda(1800), 2).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(subtotal(&items).cents(), 5400);
    }

    #[test]
    fn test_price_change_appends() {
        let mut items = Vec::new();
        add_item(&mut items, soda(1800), 1).unwrap();
        add_item(&mut items, soda(2000), 1).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].unit_price_cents, 2000);
        assert_eq!(subtotal(&items).cents(), 3800);
    }

    #[test]
    fn test_item_quantity_field_is_ignored() {
        let mut items = Vec::new();
        let mut item = soda(1800);
        item.quantity = 50;
        add_item(&mut items, item, 2).unwrap();
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_quantity_limits() {
        let mut items = Vec::new();
        assert!(add_item(&mut items, soda(1800), 0).is_err());

        add_item(&mut items, soda(1800), MAX_ITEM_QUANTITY).unwrap();
        let err = add_item(&mut items, soda(1800), 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert_eq!(items[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_account_size_limit() {
        let mut items = Vec::new();
        for i in 0..MAX_ACCOUNT_ITEMS {
            let mut item = soda(100);
            item.id = format!("p{i}");
            add_item(&mut items, item, 1).unwrap();
        }
        let err = add_item(&mut items, soda(100), 1).unwrap_err();
        assert!(matches!(err, CoreError::AccountTooLarge { .. }));
    }

    #[test]
    fn test_empty_subtotal() {
        assert_eq!(subtotal(&[]).cents(), 0);
    }

    #[test]
    fn test_custom_items_never_merge() {
        let a = AccountItem::custom("Print", Money::from_cents(300)).unwrap();
        let b = AccountItem::custom("Print", Money::from_cents(300)).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("custom-"));
        assert!(a.is_service);

        assert!(AccountItem::custom("  ", Money::from_cents(300)).is_err());
        assert!(AccountItem::custom("Print", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_from_product() {
        let product = Product {
            id: "chips".to_string(),
            name: "Chips".to_string(),
            category: Some("Snacks".to_string()),
            barcode: None,
            sale_price_cents: 2000,
            purchase_price_cents: 1400,
            manages_inventory: true,
            stock: 12,
            is_service: false,
        };
        let item = AccountItem::from_product(&product);
        assert_eq!(item.unit_price_cents, 2000);
        assert_eq!(item.unit_cost_cents, 1400);
        assert_eq!(item.quantity, 1);
        assert!(!item.is_service);
    }
}
