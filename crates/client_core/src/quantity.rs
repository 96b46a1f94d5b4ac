//! Quantity rules for the product detail purchase form.

use shared::{
    domain::{Cart, Product},
    protocol::MAX_ADD_QUANTITY,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("No product selected")]
    NoProduct,
    #[error("Please enter a valid quantity")]
    Invalid,
    #[error("This product is out of stock")]
    OutOfStock,
    #[error("Only {available} items available in stock")]
    ExceedsStock { available: u32 },
    #[error("Only {available} more items can be added ({in_cart} already in cart)")]
    ExceedsRemaining { available: u32, in_cart: u32 },
    #[error("Quantity cannot exceed {max}")]
    AboveMaximum { max: u32 },
}

/// Stock bounds for one product, taking into account what the cart already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityLimits {
    pub stock: u32,
    pub in_cart: u32,
}

impl QuantityLimits {
    pub fn for_product(product: &Product, cart: Option<&Cart>) -> Self {
        Self {
            stock: product.stock,
            in_cart: cart.map_or(0, |cart| cart.quantity_of(product.id)),
        }
    }

    pub fn available(&self) -> u32 {
        self.stock.saturating_sub(self.in_cart)
    }

    pub fn check(&self, quantity: u32) -> Result<u32, QuantityError> {
        if quantity < 1 {
            return Err(QuantityError::Invalid);
        }

        let available = self.available();
        if quantity > available {
            return Err(match (available, self.in_cart) {
                (0, 0) => QuantityError::OutOfStock,
                (available, 0) => QuantityError::ExceedsStock { available },
                (available, in_cart) => QuantityError::ExceedsRemaining { available, in_cart },
            });
        }

        if quantity > MAX_ADD_QUANTITY {
            return Err(QuantityError::AboveMaximum {
                max: MAX_ADD_QUANTITY,
            });
        }
        Ok(quantity)
    }

    /// Validates raw form input.
    pub fn validate(&self, input: &str) -> Result<u32, QuantityError> {
        let quantity = parse_quantity(input).ok_or(QuantityError::Invalid)?;
        self.check(quantity)
    }

    pub fn increment(&self, quantity: u32) -> u32 {
        if quantity < self.upper_bound() {
            quantity + 1
        } else {
            self.clamp(quantity)
        }
    }

    pub fn decrement(&self, quantity: u32) -> u32 {
        self.clamp(quantity.saturating_sub(1))
    }

    /// Clamps into `[1, max_quantity]`; never below 1 so the form always shows a sane value.
    pub fn clamp(&self, quantity: u32) -> u32 {
        quantity.clamp(1, self.upper_bound())
    }

    /// Largest quantity a single add may carry.
    pub fn max_quantity(&self) -> u32 {
        self.available().min(MAX_ADD_QUANTITY)
    }

    fn upper_bound(&self) -> u32 {
        self.max_quantity().max(1)
    }
}

pub fn parse_quantity(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(stock: u32, in_cart: u32) -> QuantityLimits {
        QuantityLimits { stock, in_cart }
    }

    #[test]
    fn every_quantity_within_available_is_accepted() {
        let limits = limits(8, 3);
        for quantity in 1..=limits.available() {
            assert_eq!(limits.check(quantity), Ok(quantity));
        }
        assert_eq!(limits.available(), 5);
    }

    #[test]
    fn zero_and_garbage_are_invalid() {
        let limits = limits(5, 0);
        assert_eq!(limits.validate("0"), Err(QuantityError::Invalid));
        assert_eq!(limits.validate("abc"), Err(QuantityError::Invalid));
        assert_eq!(limits.validate("-2"), Err(QuantityError::Invalid));
        assert_eq!(limits.validate(""), Err(QuantityError::Invalid));
        assert_eq!(limits.validate(" 3 "), Ok(3));
    }

    #[test]
    fn exceeding_stock_distinguishes_cart_contents() {
        assert_eq!(
            limits(5, 0).check(6),
            Err(QuantityError::ExceedsStock { available: 5 })
        );
        assert_eq!(
            limits(5, 2).check(4),
            Err(QuantityError::ExceedsRemaining {
                available: 3,
                in_cart: 2
            })
        );
        assert_eq!(limits(0, 0).check(1), Err(QuantityError::OutOfStock));
        assert_eq!(
            limits(2, 2).check(1),
            Err(QuantityError::ExceedsRemaining {
                available: 0,
                in_cart: 2
            })
        );
    }

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            QuantityError::ExceedsRemaining {
                available: 3,
                in_cart: 2
            }
            .to_string(),
            "Only 3 more items can be added (2 already in cart)"
        );
        assert_eq!(
            QuantityError::ExceedsStock { available: 5 }.to_string(),
            "Only 5 items available in stock"
        );
    }

    #[test]
    fn backend_ceiling_applies_to_large_stock() {
        assert_eq!(
            limits(5_000, 0).check(1_000),
            Err(QuantityError::AboveMaximum { max: 999 })
        );
        assert_eq!(limits(5_000, 0).increment(999), 999);
        assert_eq!(limits(5_000, 0).max_quantity(), 999);
        assert_eq!(limits(5_000, 4_990).max_quantity(), 10);
    }

    #[test]
    fn increment_and_decrement_stay_in_bounds() {
        let limits = limits(4, 1);
        assert_eq!(limits.increment(1), 2);
        assert_eq!(limits.increment(3), 3);
        assert_eq!(limits.increment(9), 3);
        assert_eq!(limits.decrement(2), 1);
        assert_eq!(limits.decrement(1), 1);
        assert_eq!(limits.decrement(0), 1);
    }

    #[test]
    fn available_never_underflows() {
        assert_eq!(limits(2, 5).available(), 0);
    }
}
