use shared::domain::{Cart, Product};

use crate::quantity::QuantityLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Products,
    ProductDetail,
    Cart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailStatus {
    #[default]
    Loading,
    Ready,
    NotFound,
    Failed,
}

/// Everything the storefront shows, owned by the controller and mapped to
/// view models by [`crate::view::render`].
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub view: ActiveView,
    pub products: Vec<Product>,
    pub products_status: LoadStatus,
    pub cart: Option<Cart>,
    pub current_product: Option<Product>,
    pub detail_status: DetailStatus,
    pub quantity_input: String,
}

impl StoreState {
    pub fn cart_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::item_count)
    }

    pub fn quantity_limits(&self) -> Option<QuantityLimits> {
        self.current_product
            .as_ref()
            .map(|product| QuantityLimits::for_product(product, self.cart.as_ref()))
    }
}
