//! Plain-text drawing of the client view models.

use std::fmt::Write as _;

use client_core::{
    view::{
        CartView, DetailView, ProductDetail, ProductListView, Purchase, QuantityForm, StoreView,
        ViewBody,
    },
    ActiveView, Notification,
};

pub fn render_view(view: &StoreView) -> String {
    let mut out = String::new();
    let title = match view.active {
        ActiveView::Products => "Products",
        ActiveView::ProductDetail => "Product",
        ActiveView::Cart => "Cart",
    };
    let _ = writeln!(out, "== {title} ==  [cart: {}]", view.cart_count);

    match &view.body {
        ViewBody::Products(list) => render_products(&mut out, list),
        ViewBody::Detail(detail) => render_detail(&mut out, detail),
        ViewBody::Cart(cart) => render_cart(&mut out, cart),
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    format!(
        "[{} {}] {}",
        notification.shown_at.format("%H:%M:%S"),
        notification.kind.as_str(),
        notification.message
    )
}

fn render_products(out: &mut String, list: &ProductListView) {
    match list {
        ProductListView::Loading => {
            let _ = writeln!(out, "Loading products...");
        }
        ProductListView::Failed { message } | ProductListView::Empty { message } => {
            let _ = writeln!(out, "{message}");
        }
        ProductListView::Cards(cards) => {
            for card in cards {
                let _ = writeln!(out, "{}  {}", card.name, card.price_label);
                if !card.description.is_empty() {
                    let _ = writeln!(out, "  {}", card.description);
                }
                let _ = writeln!(out, "  id: {}  (show <id> | add <id> [qty])", card.id);
            }
        }
    }
}

fn render_detail(out: &mut String, detail: &DetailView) {
    match detail {
        DetailView::Loading => {
            let _ = writeln!(out, "Loading product details...");
        }
        DetailView::NotFound { title, message } | DetailView::Failed { title, message } => {
            let _ = writeln!(out, "{title}");
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out, "Type 'back' to return to products.");
        }
        DetailView::Ready(product) => render_product(out, product),
    }
}

fn render_product(out: &mut String, product: &ProductDetail) {
    let _ = writeln!(out, "{}  {}", product.name, product.price_label);
    let _ = writeln!(out, "{} ({})", product.stock.message, product.stock.class);
    if !product.description.is_empty() {
        let _ = writeln!(out, "{}", product.description);
    }

    match &product.purchase {
        Purchase::OutOfStock => {
            let _ = writeln!(out, "Out of Stock: cannot add to cart");
        }
        Purchase::Available(form) => render_quantity_form(out, form),
    }
}

fn render_quantity_form(out: &mut String, form: &QuantityForm) {
    let _ = writeln!(out, "Quantity: {} (max {})", form.input, form.max);
    if let Some(error) = &form.error {
        let _ = writeln!(out, "  ! {error}");
    }
    let _ = writeln!(out, "Unit Price: {}", form.summary.unit_price_label);
    let _ = writeln!(out, "Quantity:   {}", form.summary.quantity);
    let _ = writeln!(out, "Total:      {}", form.summary.total_label);
    let action = if form.submit_enabled {
        "add to cart with 'add'"
    } else {
        "add to cart disabled"
    };
    let _ = writeln!(out, "({action}; adjust with '+', '-' or 'qty <n>')");
}

fn render_cart(out: &mut String, cart: &CartView) {
    match cart {
        CartView::Empty { message } => {
            let _ = writeln!(out, "{message}");
        }
        CartView::Items { lines, total_label } => {
            for line in lines {
                let _ = writeln!(
                    out,
                    "{} x {}  {} each  = {}",
                    line.quantity, line.name, line.unit_price_label, line.line_total_label
                );
            }
            let _ = writeln!(out, "Total: {total_label}");
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::view::{CartLine, PriceSummary, StockStatus};
    use shared::domain::ProductId;
    use uuid::Uuid;

    use super::*;

    fn view(active: ActiveView, cart_count: u32, body: ViewBody) -> StoreView {
        StoreView {
            active,
            cart_count,
            body,
            notification: None,
        }
    }

    #[test]
    fn cart_shows_lines_and_total() {
        let text = render_view(&view(
            ActiveView::Cart,
            4,
            ViewBody::Cart(CartView::Items {
                lines: vec![CartLine {
                    product_id: ProductId(Uuid::new_v4()),
                    name: "Widget".into(),
                    unit_price_label: "$2.50".into(),
                    quantity: 3,
                    line_total_label: "$7.50".into(),
                }],
                total_label: "$17.50".into(),
            }),
        ));

        assert!(text.starts_with("== Cart ==  [cart: 4]"));
        assert!(text.contains("3 x Widget  $2.50 each  = $7.50"));
        assert!(text.contains("Total: $17.50"));
    }

    #[test]
    fn disabled_form_shows_reason() {
        let text = render_view(&view(
            ActiveView::ProductDetail,
            2,
            ViewBody::Detail(DetailView::Ready(ProductDetail {
                id: ProductId(Uuid::new_v4()),
                name: "Widget".into(),
                description: String::new(),
                price_label: "$2.50".into(),
                stock: StockStatus {
                    class: "stock-low-stock",
                    message: "Only 5 left in stock!".into(),
                },
                purchase: Purchase::Available(QuantityForm {
                    input: "4".into(),
                    max: 3,
                    error: Some("Only 3 more items can be added (2 already in cart)".into()),
                    submit_enabled: false,
                    summary: PriceSummary {
                        unit_price_label: "$2.50".into(),
                        quantity: 4,
                        total_label: "$10.00".into(),
                    },
                }),
            })),
        ));

        assert!(text.contains("! Only 3 more items can be added (2 already in cart)"));
        assert!(text.contains("add to cart disabled"));
        assert!(text.contains("Total:      $10.00"));
    }

    #[test]
    fn not_found_panel_offers_way_back() {
        let text = render_view(&view(
            ActiveView::ProductDetail,
            0,
            ViewBody::Detail(DetailView::NotFound {
                title: "Product Not Found".into(),
                message: "gone".into(),
            }),
        ));
        assert!(text.contains("Product Not Found"));
        assert!(text.contains("'back'"));
    }
}
