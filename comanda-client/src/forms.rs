//! Presentation-side forms
//!
//! Input collected before an action is issued. Validation happens here so an
//! invalid form never reaches the backend.

use crate::error::ValidationError;
use shared::models::Product;

/// Open-tab dialog: customer name and the initial cart
///
/// Each product appears at most once; the backend adds it with quantity 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenTabForm {
    pub customer: String,
    cart: Vec<i64>,
}

impl OpenTabForm {
    pub fn new(customer: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            cart: Vec::new(),
        }
    }

    /// Add a product; already present products are left as they are
    pub fn add(&mut self, product_id: i64) {
        if !self.contains(product_id) {
            self.cart.push(product_id);
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.cart.retain(|&id| id != product_id);
    }

    /// Add if absent, remove if present
    pub fn toggle(&mut self, product_id: i64) {
        if self.contains(product_id) {
            self.remove(product_id);
        } else {
            self.add(product_id);
        }
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.cart.contains(&product_id)
    }

    pub fn product_ids(&self) -> &[i64] {
        &self.cart
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Catalog price of the cart, for the dialog preview
    pub fn preview_cents(&self, catalog: &[Product]) -> i64 {
        catalog
            .iter()
            .filter(|p| self.contains(p.id))
            .map(|p| p.price_cents)
            .fold(0i64, i64::saturating_add)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price_cents: i64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            price_cents,
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_cart_keeps_each_product_once() {
        let mut form = OpenTabForm::new("Consumidor");
        form.add(3);
        form.add(5);
        form.add(3);
        assert_eq!(form.product_ids(), &[3, 5]);

        form.toggle(3);
        assert_eq!(form.product_ids(), &[5]);
        form.toggle(3);
        assert_eq!(form.product_ids(), &[5, 3]);
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let mut form = OpenTabForm::new("Ana");
        assert_eq!(form.validate(), Err(ValidationError::EmptyCart));
        form.add(1);
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_preview_uses_catalog() {
        let catalog = vec![product(1, 1000), product(2, 250), product(3, 99)];
        let mut form = OpenTabForm::default();
        form.add(1);
        form.add(3);
        assert_eq!(form.preview_cents(&catalog), 1099);
    }
}
