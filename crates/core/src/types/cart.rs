//! Cart line items and carts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// Reasons a cart line item is rejected before it reaches any cart store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartLineItemError {
    #[error("product id must not be empty")]
    EmptyProductId,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// A product selection destined for a cart.
///
/// Conceptually identified by product, size and color, but carts keep each
/// accepted line as-is without merging duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Selected color, or the product image shown for the selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_or_image_ref: Option<String>,
}

impl CartLineItem {
    /// Check the input constraints for a line item.
    ///
    /// # Errors
    ///
    /// Returns `CartLineItemError` if the product id is blank or the quantity is zero.
    pub fn validate(&self) -> Result<(), CartLineItemError> {
        if self.product_id.is_blank() {
            return Err(CartLineItemError::EmptyProductId);
        }
        if self.quantity == 0 {
            return Err(CartLineItemError::ZeroQuantity);
        }
        Ok(())
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A cart as returned by a cart store.
///
/// Carts are priced in a single currency, the one of their first line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line totals in the currency of the first line.
    ///
    /// Lines priced in another currency are left out of the sum.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.unit_price.currency_code);
        self.items
            .iter()
            .filter(|item| item.unit_price.currency_code == currency)
            .fold(Price::zero(currency), |total, item| {
                Price::new(total.amount + item.line_total().amount, currency)
            })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            name: "Bold Vibe Oversize Tshirt".to_string(),
            unit_price: Price::new(Decimal::new(999, 0), CurrencyCode::INR),
            quantity,
            size: Some("M".to_string()),
            color_or_image_ref: None,
        }
    }

    #[test]
    fn test_validate_accepts_valid_line() {
        assert_eq!(line("tee-1", 1).validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_blank_product() {
        assert_eq!(
            line(" ", 1).validate(),
            Err(CartLineItemError::EmptyProductId)
        );
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        assert_eq!(
            line("tee-1", 0).validate(),
            Err(CartLineItemError::ZeroQuantity)
        );
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart {
            items: vec![line("tee-1", 2), line("tee-2", 1)],
        };
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal().amount, Decimal::new(2997, 0));
        assert_eq!(Cart::empty().subtotal().amount, Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_skips_lines_in_another_currency() {
        let mut foreign = line("tee-us", 3);
        foreign.unit_price = Price::new(Decimal::new(25, 0), CurrencyCode::USD);
        let cart = Cart {
            items: vec![line("tee-1", 1), foreign, line("tee-2", 1)],
        };

        let subtotal = cart.subtotal();
        assert_eq!(subtotal.currency_code, CurrencyCode::INR);
        assert_eq!(subtotal.amount, Decimal::new(1998, 0));
        assert_eq!(cart.item_count(), 5);
    }
}
