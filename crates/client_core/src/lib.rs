use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Cart, CartId, ProductId},
    error::is_insufficient_stock,
    protocol::{AddToCartRequest, MAX_ADD_QUANTITY},
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

pub mod cart_id_store;
pub mod error;
pub mod notification;
pub mod quantity;
pub mod state;
pub mod transport;
pub mod view;

pub use cart_id_store::{CartIdStore, FileCartIdStore, MemoryCartIdStore};
pub use error::StoreError;
pub use notification::{
    Notification, NotificationKind, Notifier, DEFAULT_NOTIFICATION_DURATION,
    REJECTION_NOTIFICATION_DURATION,
};
pub use quantity::{QuantityError, QuantityLimits};
pub use state::{ActiveView, DetailStatus, LoadStatus, StoreState};
pub use transport::{HttpStorefrontApi, StorefrontApi};
pub use view::StoreView;

const ADD_TO_CART_FAILED: &str = "Failed to add product to cart";

/// How the cart is addressed on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartMode {
    /// Implicitly via the session cookie.
    #[default]
    Session,
    /// Via a cart id persisted in a [`CartIdStore`].
    Identifier,
}

impl fmt::Display for CartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Session => "session",
            Self::Identifier => "identifier",
        })
    }
}

impl FromStr for CartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "identifier" | "id" => Ok(Self::Identifier),
            other => Err(format!(
                "unknown cart mode '{other}' (expected 'session' or 'identifier')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The backend answered 404 (or there is nothing to load yet).
    Missing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The backend refused for a domain reason; the message is shown verbatim.
    Rejected(String),
    Invalid(QuantityError),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Completed,
    NoCart,
    Failed,
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    Notification(Notification),
    ViewChanged(ActiveView),
    CartChanged { count: u32 },
    ProductsChanged { count: usize },
}

/// Owns storefront state and synchronizes it with the backend. Every
/// operation reports its result as an outcome and surfaces failures as
/// notifications or error panels; nothing propagates past the controller.
pub struct StorefrontController {
    api: Arc<dyn StorefrontApi>,
    cart_mode: CartMode,
    cart_ids: Arc<dyn CartIdStore>,
    state: StoreState,
    notifier: Notifier,
    notification_duration: Duration,
    events: broadcast::Sender<StoreEvent>,
}

impl StorefrontController {
    pub fn new(api: Arc<dyn StorefrontApi>, cart_mode: CartMode) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            api,
            cart_mode,
            cart_ids: Arc::new(MemoryCartIdStore::new()),
            state: StoreState::default(),
            notifier: Notifier::new(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            events,
        }
    }

    pub fn with_cart_id_store(mut self, cart_ids: Arc<dyn CartIdStore>) -> Self {
        self.cart_ids = cart_ids;
        self
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn cart_mode(&self) -> CartMode {
        self.cart_mode
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn cart(&self) -> Option<&Cart> {
        self.state.cart.as_ref()
    }

    pub fn cart_count(&self) -> u32 {
        self.state.cart_count()
    }

    pub fn view_model(&self) -> StoreView {
        view::render(&self.state, self.notifier.current().as_ref())
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Notification>> {
        self.notifier.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Initial fetch of catalog and cart.
    pub async fn start(&mut self) {
        self.load_products().await;
        self.load_cart().await;
    }

    pub async fn load_products(&mut self) -> LoadOutcome {
        self.state.products_status = LoadStatus::Loading;
        match self.api.list_products().await {
            Ok(products) => {
                info!(count = products.len(), "catalog: products loaded");
                self.state.products = products;
                self.state.products_status = LoadStatus::Loaded;
                self.emit(StoreEvent::ProductsChanged {
                    count: self.state.products.len(),
                });
                LoadOutcome::Loaded
            }
            Err(err) => {
                warn!(error = %err, "catalog: failed to load products");
                self.state.products_status = LoadStatus::Failed;
                self.show_notification("Failed to load products", NotificationKind::Error);
                LoadOutcome::Failed
            }
        }
    }

    pub async fn load_cart(&mut self) -> LoadOutcome {
        let result = match self.cart_mode {
            CartMode::Session => self.api.session_cart().await,
            CartMode::Identifier => match self.stored_cart_id() {
                Some(cart_id) => self.api.get_cart(cart_id).await,
                None => {
                    debug!("cart: no stored cart id");
                    self.set_cart(None);
                    return LoadOutcome::Missing;
                }
            },
        };

        match result {
            Ok(cart) => {
                info!(items = cart.item_count(), "cart: loaded");
                self.set_cart(Some(cart));
                LoadOutcome::Loaded
            }
            Err(err) if err.is_not_found() => {
                info!("cart: not found on server; clearing local cart");
                self.forget_stored_cart_id();
                self.set_cart(None);
                LoadOutcome::Missing
            }
            Err(err) => {
                warn!(error = %err, "cart: failed to load");
                self.show_notification("Failed to load cart", NotificationKind::Error);
                LoadOutcome::Failed
            }
        }
    }

    pub async fn add_to_cart(&mut self, product_id: ProductId, quantity: u32) -> AddOutcome {
        if quantity == 0 {
            return self.reject_quantity(QuantityError::Invalid);
        }
        if quantity > MAX_ADD_QUANTITY {
            return self.reject_quantity(QuantityError::AboveMaximum {
                max: MAX_ADD_QUANTITY,
            });
        }

        let request = AddToCartRequest::new(product_id, quantity);
        let result = match self.cart_mode {
            CartMode::Session => self.api.add_to_session_cart(&request).await,
            CartMode::Identifier => self.add_to_identified_cart(&request).await,
        };

        match result {
            Ok(cart) => {
                info!(product_id = %product_id, quantity, "cart: product added");
                self.set_cart(Some(cart));
                self.show_notification(
                    format!("{quantity} item(s) added to cart!"),
                    NotificationKind::Success,
                );
                if self
                    .state
                    .current_product
                    .as_ref()
                    .is_some_and(|product| product.id == product_id)
                {
                    self.refresh_product_stock(product_id).await;
                }
                AddOutcome::Added
            }
            Err(err) => match err.server_message() {
                Some(message) if is_insufficient_stock(message) => {
                    let message = message.to_string();
                    info!(product_id = %product_id, quantity, %message, "cart: add rejected");
                    self.show_notification_for(
                        message.clone(),
                        NotificationKind::Error,
                        REJECTION_NOTIFICATION_DURATION,
                    );
                    AddOutcome::Rejected(message)
                }
                message => {
                    let message = message.unwrap_or(ADD_TO_CART_FAILED).to_string();
                    warn!(product_id = %product_id, error = %err, "cart: add failed");
                    self.show_notification(message, NotificationKind::Error);
                    AddOutcome::Failed
                }
            },
        }
    }

    /// Submits the detail view's quantity form if it validates.
    pub async fn add_to_cart_from_detail(&mut self) -> AddOutcome {
        let Some(product_id) = self.state.current_product.as_ref().map(|p| p.id) else {
            return AddOutcome::Invalid(QuantityError::NoProduct);
        };
        match self.validate_quantity() {
            Ok(quantity) => self.add_to_cart(product_id, quantity).await,
            Err(err) => AddOutcome::Invalid(err),
        }
    }

    pub async fn show_product_detail(&mut self, product_id: ProductId) -> LoadOutcome {
        self.state.current_product = None;
        self.state.detail_status = DetailStatus::Loading;
        self.set_view(ActiveView::ProductDetail);

        match self.api.get_product(product_id).await {
            Ok(product) => {
                debug!(
                    product_id = %product_id,
                    stock = product.stock,
                    "catalog: product detail loaded"
                );
                self.state.current_product = Some(product);
                self.state.detail_status = DetailStatus::Ready;
                self.state.quantity_input = "1".to_string();
                LoadOutcome::Loaded
            }
            Err(err) if err.is_not_found() => {
                info!(product_id = %product_id, "catalog: product not found");
                self.state.detail_status = DetailStatus::NotFound;
                LoadOutcome::Missing
            }
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "catalog: failed to load product");
                self.state.detail_status = DetailStatus::Failed;
                self.show_notification("Failed to load product details", NotificationKind::Error);
                LoadOutcome::Failed
            }
        }
    }

    /// Refetches the product on the detail view so its stock reflects the
    /// latest add. Failures only get logged.
    pub async fn refresh_product_stock(&mut self, product_id: ProductId) {
        match self.api.get_product(product_id).await {
            Ok(product) => {
                let still_viewing = self
                    .state
                    .current_product
                    .as_ref()
                    .is_some_and(|current| current.id == product_id);
                if still_viewing {
                    self.state.current_product = Some(product);
                    self.clamp_quantity_input();
                }
            }
            Err(err) => {
                warn!(
                    product_id = %product_id,
                    error = %err,
                    "catalog: failed to refresh product stock"
                );
            }
        }
    }

    pub fn set_quantity_input(&mut self, raw: impl Into<String>) -> Result<u32, QuantityError> {
        self.state.quantity_input = raw.into();
        self.validate_quantity()
    }

    pub fn increment_quantity(&mut self) -> Result<u32, QuantityError> {
        self.step_quantity(|limits, quantity| limits.increment(quantity))
    }

    pub fn decrement_quantity(&mut self) -> Result<u32, QuantityError> {
        self.step_quantity(|limits, quantity| limits.decrement(quantity))
    }

    pub fn validate_quantity(&self) -> Result<u32, QuantityError> {
        let limits = self
            .state
            .quantity_limits()
            .ok_or(QuantityError::NoProduct)?;
        limits.validate(&self.state.quantity_input)
    }

    pub async fn checkout(&mut self) -> CheckoutOutcome {
        let Some(cart_id) = self.state.cart.as_ref().and_then(|cart| cart.id) else {
            self.show_notification("No cart to checkout", NotificationKind::Error);
            return CheckoutOutcome::NoCart;
        };

        match self.api.checkout(cart_id).await {
            Ok(result) if result.success => {
                info!(cart_id = %cart_id, "checkout: completed");
                self.show_notification(
                    "Checkout successful! Order placed.",
                    NotificationKind::Success,
                );
                self.forget_stored_cart_id();
                self.set_cart(None);
                self.load_cart().await;
                self.show_products();
                CheckoutOutcome::Completed
            }
            Ok(result) => {
                warn!(cart_id = %cart_id, message = ?result.message, "checkout: rejected");
                let message = result
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Checkout failed".to_string());
                self.show_notification(message, NotificationKind::Error);
                CheckoutOutcome::Failed
            }
            Err(err) => {
                warn!(cart_id = %cart_id, error = %err, "checkout: failed");
                self.show_notification("Checkout failed", NotificationKind::Error);
                CheckoutOutcome::Failed
            }
        }
    }

    pub fn show_products(&mut self) {
        self.state.current_product = None;
        self.set_view(ActiveView::Products);
    }

    pub fn show_cart(&mut self) {
        self.state.current_product = None;
        self.set_view(ActiveView::Cart);
    }

    pub fn show_notification(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let duration = self.notification_duration;
        self.show_notification_for(message, kind, duration);
    }

    pub fn show_notification_for(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) {
        let notification = self.notifier.show(message, kind, duration);
        self.emit(StoreEvent::Notification(notification));
    }

    async fn add_to_identified_cart(
        &mut self,
        request: &AddToCartRequest,
    ) -> Result<Cart, StoreError> {
        let Some(cart_id) = self.stored_cart_id() else {
            let cart_id = self.create_identified_cart().await?;
            return self.api.add_to_cart(cart_id, request).await;
        };

        match self.api.add_to_cart(cart_id, request).await {
            Err(err) if err.is_not_found() => {
                if !self.cart_is_gone(cart_id).await {
                    return Err(err);
                }
                info!(cart_id = %cart_id, "cart: stored cart is gone; starting a new one");
                self.forget_stored_cart_id();
                self.set_cart(None);
                let cart_id = self.create_identified_cart().await?;
                self.api.add_to_cart(cart_id, request).await
            }
            result => result,
        }
    }

    async fn create_identified_cart(&self) -> Result<CartId, StoreError> {
        let cart = self.api.create_cart().await?;
        let cart_id = cart.id.ok_or(StoreError::MissingCartId)?;
        self.cart_ids
            .save(cart_id)
            .map_err(StoreError::CartIdStore)?;
        info!(cart_id = %cart_id, "cart: created");
        Ok(cart_id)
    }

    /// A 404 on add may name the product rather than the cart, so ask for
    /// the cart itself.
    async fn cart_is_gone(&self, cart_id: CartId) -> bool {
        matches!(self.api.get_cart(cart_id).await, Err(err) if err.is_not_found())
    }

    fn step_quantity(
        &mut self,
        step: impl FnOnce(&QuantityLimits, u32) -> u32,
    ) -> Result<u32, QuantityError> {
        let limits = self
            .state
            .quantity_limits()
            .ok_or(QuantityError::NoProduct)?;
        let next = match quantity::parse_quantity(&self.state.quantity_input) {
            Some(current) => step(&limits, current),
            None => 1,
        };
        self.state.quantity_input = next.to_string();
        limits.check(next)
    }

    fn clamp_quantity_input(&mut self) {
        if let (Some(limits), Some(current)) = (
            self.state.quantity_limits(),
            quantity::parse_quantity(&self.state.quantity_input),
        ) {
            self.state.quantity_input = limits.clamp(current).to_string();
        }
    }

    fn reject_quantity(&mut self, err: QuantityError) -> AddOutcome {
        self.show_notification(err.to_string(), NotificationKind::Error);
        AddOutcome::Invalid(err)
    }

    fn stored_cart_id(&self) -> Option<CartId> {
        match self.cart_ids.load() {
            Ok(cart_id) => cart_id,
            Err(err) => {
                warn!(error = ?err, "cart: failed to read stored cart id");
                None
            }
        }
    }

    fn forget_stored_cart_id(&self) {
        if self.cart_mode != CartMode::Identifier {
            return;
        }
        if let Err(err) = self.cart_ids.clear() {
            warn!(error = ?err, "cart: failed to clear stored cart id");
        }
    }

    fn set_cart(&mut self, cart: Option<Cart>) {
        self.state.cart = cart;
        self.emit(StoreEvent::CartChanged {
            count: self.state.cart_count(),
        });
    }

    fn set_view(&mut self, view: ActiveView) {
        self.state.view = view;
        self.emit(StoreEvent::ViewChanged(view));
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
