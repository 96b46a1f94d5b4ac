//! Pure mapping from [`StoreState`] to view models. Front ends only draw these.

use shared::domain::{Cart, Product, ProductId};

use crate::{
    notification::{Notification, NotificationKind},
    quantity::{parse_quantity, QuantityLimits},
    state::{ActiveView, DetailStatus, LoadStatus, StoreState},
};

pub const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreView {
    pub active: ActiveView,
    pub cart_count: u32,
    pub body: ViewBody,
    pub notification: Option<NotificationView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Products(ProductListView),
    Detail(DetailView),
    Cart(CartView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationView {
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductListView {
    Loading,
    Failed { message: String },
    Empty { message: String },
    Cards(Vec<ProductCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    NotFound { title: String, message: String },
    Failed { title: String, message: String },
    Ready(ProductDetail),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price_label: String,
    pub stock: StockStatus,
    pub purchase: Purchase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockStatus {
    pub class: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Purchase {
    OutOfStock,
    Available(QuantityForm),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantityForm {
    pub input: String,
    pub max: u32,
    pub error: Option<String>,
    pub submit_enabled: bool,
    pub summary: PriceSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub unit_price_label: String,
    pub quantity: u32,
    pub total_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartView {
    Empty { message: String },
    Items { lines: Vec<CartLine>, total_label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price_label: String,
    pub quantity: u32,
    pub line_total_label: String,
}

pub fn render(state: &StoreState, notification: Option<&Notification>) -> StoreView {
    let body = match state.view {
        ActiveView::Products => ViewBody::Products(product_list_view(state)),
        ActiveView::ProductDetail => ViewBody::Detail(detail_view(state)),
        ActiveView::Cart => ViewBody::Cart(cart_view(state.cart.as_ref())),
    };

    StoreView {
        active: state.view,
        cart_count: state.cart_count(),
        body,
        notification: notification.map(|n| NotificationView {
            message: n.message.clone(),
            kind: n.kind,
        }),
    }
}

pub fn product_list_view(state: &StoreState) -> ProductListView {
    match state.products_status {
        LoadStatus::Loading => ProductListView::Loading,
        LoadStatus::Failed => ProductListView::Failed {
            message: "Failed to load products".to_string(),
        },
        LoadStatus::Loaded if state.products.is_empty() => ProductListView::Empty {
            message: "No products available".to_string(),
        },
        LoadStatus::Loaded => ProductListView::Cards(
            state
                .products
                .iter()
                .map(|product| ProductCard {
                    id: product.id,
                    name: product.name.clone(),
                    description: product.description.clone(),
                    price_label: price_label(product.price_cents()),
                })
                .collect(),
        ),
    }
}

pub fn detail_view(state: &StoreState) -> DetailView {
    match (state.detail_status, state.current_product.as_ref()) {
        (DetailStatus::NotFound, _) => DetailView::NotFound {
            title: "Product Not Found".to_string(),
            message: "The product you're looking for doesn't exist or has been removed."
                .to_string(),
        },
        (DetailStatus::Failed, _) => DetailView::Failed {
            title: "Error Loading Product".to_string(),
            message: "Unable to load product details. Please try again.".to_string(),
        },
        (DetailStatus::Ready, Some(product)) => DetailView::Ready(product_detail(
            product,
            state.cart.as_ref(),
            &state.quantity_input,
        )),
        (DetailStatus::Loading, _) | (DetailStatus::Ready, None) => DetailView::Loading,
    }
}

pub fn product_detail(
    product: &Product,
    cart: Option<&Cart>,
    quantity_input: &str,
) -> ProductDetail {
    let purchase = if product.stock == 0 {
        Purchase::OutOfStock
    } else {
        let limits = QuantityLimits::for_product(product, cart);
        Purchase::Available(quantity_form(product, limits, quantity_input))
    };

    ProductDetail {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price_label: price_label(product.price_cents()),
        stock: stock_status(product.stock),
        purchase,
    }
}

pub fn quantity_form(product: &Product, limits: QuantityLimits, input: &str) -> QuantityForm {
    let validation = limits.validate(input);
    let quantity = match &validation {
        Ok(quantity) => *quantity,
        Err(_) => parse_quantity(input).filter(|q| *q > 0).unwrap_or(1),
    };

    QuantityForm {
        input: input.to_string(),
        max: limits.max_quantity(),
        error: validation.as_ref().err().map(ToString::to_string),
        submit_enabled: validation.is_ok(),
        summary: price_summary(product, quantity),
    }
}

pub fn price_summary(product: &Product, quantity: u32) -> PriceSummary {
    let unit_cents = product.price_cents();
    PriceSummary {
        unit_price_label: price_label(unit_cents),
        quantity,
        total_label: price_label(unit_cents.saturating_mul(i64::from(quantity))),
    }
}

pub fn stock_status(stock: u32) -> StockStatus {
    match stock {
        0 => StockStatus {
            class: "stock-out-of-stock",
            message: "Out of Stock".to_string(),
        },
        n if n <= LOW_STOCK_THRESHOLD => StockStatus {
            class: "stock-low-stock",
            message: format!("Only {n} left in stock!"),
        },
        n => StockStatus {
            class: "stock-in-stock",
            message: format!("{n} in stock"),
        },
    }
}

pub fn cart_view(cart: Option<&Cart>) -> CartView {
    let Some(cart) = cart.filter(|cart| !cart.is_empty()) else {
        return CartView::Empty {
            message: "Your cart is empty".to_string(),
        };
    };

    CartView::Items {
        lines: cart
            .items
            .iter()
            .map(|item| CartLine {
                product_id: item.product.id,
                name: item.product.name.clone(),
                unit_price_label: price_label(item.product.price_cents()),
                quantity: item.quantity,
                line_total_label: price_label(item.line_total_cents()),
            })
            .collect(),
        total_label: price_label(cart.total_cents()),
    }
}

pub fn price_label(cents: i64) -> String {
    format!("${}", format_price(cents))
}

/// Two decimals with `,` thousands grouping: `1234567` cents → `12,345.67`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{fraction:02}")
}
