//! HTTP surface: catalog, cart and checkout endpoints.

pub mod error;
pub mod state;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::application::{CartSession, CatalogState, Lookup, PanelState};
use crate::domain::aggregates::{CartItem, Order, Product, ProductId};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{Money, MoneyError};
use crate::ports::publish_all;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-storefront"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:session", delete(end_session))
        .route("/api/v1/cart/:session", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items", post(add_item))
        .route("/api/v1/cart/:session/items/:id", delete(remove_item))
        .route("/api/v1/cart/:session/items/:id/increment", post(increment_item))
        .route("/api/v1/cart/:session/items/:id/decrement", post(decrement_item))
        .route("/api/v1/cart/:session/panel", post(toggle_panel))
        .route("/api/v1/cart/:session/checkout", post(checkout))
        .with_state(state)
}

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SessionPath {
    #[validate(length(min = 1, max = 128))]
    pub session: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ItemPath {
    #[validate(length(min = 1, max = 128))]
    pub session: String,
    pub id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest { pub product_id: ProductId }

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub selling_price: Money,
}

impl TryFrom<Product> for ProductView {
    type Error = MoneyError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        let selling_price = product.discounted_price()?;
        Ok(Self { product, selling_price })
    }
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub subtotal: Money,
}

/// Everything the cart panel renders.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub session: String,
    pub items: Vec<CartLineView>,
    pub total_items: u64,
    pub total_price: Money,
    pub shipping: &'static str,
    pub total: Money,
    pub can_checkout: bool,
    pub panel: PanelState,
}

impl CartView {
    fn of(session_id: &str, session: &CartSession) -> ApiResult<Self> {
        let cart = session.store().snapshot();
        let totals = cart.totals()?;
        Ok(Self {
            session: session_id.to_string(),
            items: cart.items().iter().map(|i| CartLineView { item: i.clone(), subtotal: i.display_subtotal() }).collect(),
            total_items: totals.total_items,
            total: totals.total_price.clone(),
            total_price: totals.total_price,
            shipping: "free",
            can_checkout: !cart.is_empty(),
            panel: session.panel(),
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(s): State<AppState>) -> Json<CatalogState> { Json(s.catalog.state()) }

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    match s.catalog.lookup(&id, &s.listing_path) {
        Lookup::Found(product) => Ok(Json(ProductView::try_from(product)?).into_response()),
        Lookup::Redirect(path) => {
            tracing::debug!(route_id = %id, to = %path, "Unknown product, redirecting");
            Ok(Redirect::to(&path).into_response())
        }
        Lookup::Loading => Err(ApiError::CatalogLoading),
        Lookup::Failed(reason) => Err(ApiError::CatalogUnavailable(reason)),
    }
}

// =============================================================================
// Sessions & Cart
// =============================================================================

async fn create_session(State(s): State<AppState>) -> ApiResult<(StatusCode, Json<CartView>)> {
    let (id, session) = s.sessions.create().await;
    Ok((StatusCode::CREATED, Json(CartView::of(&id, &session)?)))
}

async fn end_session(State(s): State<AppState>, Path(p): Path<SessionPath>) -> ApiResult<StatusCode> {
    p.validate()?;
    if s.sessions.end(&p.session).await { Ok(StatusCode::NO_CONTENT) } else { Err(ApiError::NotFound(format!("session {}", p.session))) }
}

async fn get_cart(State(s): State<AppState>, Path(p): Path<SessionPath>) -> ApiResult<Json<CartView>> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    Ok(Json(CartView::of(&p.session, &session)?))
}

async fn add_item(State(s): State<AppState>, Path(p): Path<SessionPath>, Json(r): Json<AddItemRequest>) -> ApiResult<Json<CartView>> {
    p.validate()?;
    if s.catalog.state().is_loading { return Err(ApiError::CatalogLoading); }
    let product = s.catalog.find(r.product_id).ok_or_else(|| ApiError::NotFound(format!("product {}", r.product_id)))?;
    let session = find_session(&s, &p.session).await?;
    let events = session.store().add_item(&product)?;
    respond(&s, &p.session, &session, events).await
}

async fn remove_item(State(s): State<AppState>, Path(p): Path<ItemPath>) -> ApiResult<Json<CartView>> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    let events = session.store().remove_item(p.id);
    respond(&s, &p.session, &session, events).await
}

async fn increment_item(State(s): State<AppState>, Path(p): Path<ItemPath>) -> ApiResult<Json<CartView>> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    let events = session.store().add_quantity(p.id);
    respond(&s, &p.session, &session, events).await
}

async fn decrement_item(State(s): State<AppState>, Path(p): Path<ItemPath>) -> ApiResult<Json<CartView>> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    let events = session.store().subtract_quantity(p.id);
    respond(&s, &p.session, &session, events).await
}

async fn clear_cart(State(s): State<AppState>, Path(p): Path<SessionPath>) -> ApiResult<StatusCode> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    publish_all(s.events.as_ref(), session.store().clear_cart()).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_panel(State(s): State<AppState>, Path(p): Path<SessionPath>) -> ApiResult<Json<PanelState>> {
    p.validate()?;
    let session = find_session(&s, &p.session).await?;
    Ok(Json(session.toggle_panel()))
}

async fn respond(s: &AppState, id: &str, session: &CartSession, events: Vec<DomainEvent>) -> ApiResult<Json<CartView>> {
    publish_all(s.events.as_ref(), events).await;
    Ok(Json(CartView::of(id, session)?))
}

/// Sessions are only created through `POST /api/v1/sessions`.
async fn find_session(s: &AppState, id: &str) -> ApiResult<Arc<CartSession>> {
    s.sessions.get(id).await.ok_or_else(|| ApiError::NotFound(format!("session {id}")))
}

// =============================================================================
// Checkout
// =============================================================================

async fn checkout(State(s): State<AppState>, Path(p): Path<SessionPath>, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<Order>)> {
    p.validate()?;
    r.validate()?;
    let session = find_session(&s, &p.session).await?;
    // the service itself accepts an empty cart; the endpoint does not
    if session.store().is_empty() { return Err(ApiError::EmptyCart); }
    let order = s.checkout.finish_purchase(&r.user_id, &session).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn tv() -> Product {
        Product {
            id: 42, title: "TV".into(), price: Money::usd(Decimal::from(300)), discount: Money::usd(Decimal::from(20)),
            description: String::new(), brand: "Acme".into(), model: "X".into(), color: "black".into(),
            category: "video".into(), image: "/img/42.png".into(),
        }
    }

    #[test]
    fn test_product_view_selling_price() {
        let view = ProductView::try_from(tv()).unwrap();
        assert_eq!(view.selling_price, Money::usd(Decimal::from(280)));
    }

    #[test]
    fn test_product_view_surfaces_currency_mismatch() {
        let mut product = tv();
        product.discount = Money::new(Decimal::from(20), "EUR");
        assert!(matches!(ProductView::try_from(product), Err(MoneyError::CurrencyMismatch { .. })));
        let status = ApiError::from(MoneyError::CurrencyMismatch { left: "USD".into(), right: "EUR".into() }).into_response().status();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
