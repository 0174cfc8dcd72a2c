//! HTTP surface: axum router, request DTOs, and the error-to-status mapping.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{Address, LineItem, Order};
use crate::domain::value_objects::OwnerId;
use crate::error::{Error, ErrorKind};
use crate::gateway::GatewayOrder;
use crate::services::{CartService, CheckoutService, ConfirmCheckout};
use crate::store::CustomerStore;

#[derive(Clone)]
pub struct AppState {
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub customers: Arc<dyn CustomerStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async {
                Json(serde_json::json!({"status": "healthy", "service": "aurum-commerce"}))
            }),
        )
        .route("/api/v1/cart/:owner", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/api/v1/cart/:owner/items/:product_id",
            put(update_quantity).delete(remove_item),
        )
        .route("/api/v1/checkout/payment-order", post(create_payment_order))
        .route("/api/v1/checkout/confirm", post(confirm_checkout))
        .route("/api/v1/orders/:owner", get(list_orders))
        .route("/api/v1/addresses/:owner", get(list_addresses).post(create_address))
        .route("/api/v1/addresses/:owner/:id", delete(delete_address))
        .route("/api/v1/addresses/:owner/:id/default", put(set_default_address))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, self.to_string()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            // Upstream details (gateway/store internals) stay in the logs.
            ErrorKind::Upstream => {
                error!(error = %self, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "Service temporarily unavailable, please try again later".to_string(),
                )
            }
            // The payment may have succeeded; do not invite a retry.
            ErrorKind::Reconciliation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "We could not finalize your order. Please contact support before paying again"
                    .to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// --- cart -------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 1_000_000_000))]
    pub unit_price: i64,
    #[validate(range(min = 1, max = 10_000))]
    pub quantity: u32,
    #[serde(default)]
    pub image_url: String,
}

async fn get_cart(
    State(s): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<LineItem>>, Error> {
    Ok(Json(s.cart.get(&owner).await?.items))
}

async fn add_to_cart(
    State(s): State<AppState>,
    Path(owner): Path<String>,
    Json(r): Json<AddItemRequest>,
) -> Result<Json<Vec<LineItem>>, Error> {
    r.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let items = s
        .cart
        .add_item(
            &owner,
            LineItem {
                product_id: r.product_id,
                name: r.name,
                unit_price: r.unit_price,
                quantity: r.quantity,
                image_url: r.image_url,
            },
        )
        .await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

async fn update_quantity(
    State(s): State<AppState>,
    Path((owner, product_id)): Path<(String, String)>,
    Json(r): Json<UpdateQuantityRequest>,
) -> Result<Json<Vec<LineItem>>, Error> {
    if r.quantity < 0 || r.quantity > i64::from(u32::MAX) {
        return Err(Error::InvalidQuantity);
    }
    let items = s
        .cart
        .set_quantity(&owner, &product_id, r.quantity as u32)
        .await?;
    Ok(Json(items))
}

async fn remove_item(
    State(s): State<AppState>,
    Path((owner, product_id)): Path<(String, String)>,
) -> Result<Json<Vec<LineItem>>, Error> {
    Ok(Json(s.cart.remove_item(&owner, &product_id).await?))
}

async fn clear_cart(State(s): State<AppState>, Path(owner): Path<String>) -> Result<StatusCode, Error> {
    s.cart.clear(&owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- checkout ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PaymentOrderRequest {
    pub amount: i64,
}

async fn create_payment_order(
    State(s): State<AppState>,
    Json(r): Json<PaymentOrderRequest>,
) -> Result<Json<GatewayOrder>, Error> {
    Ok(Json(s.checkout.create_payment_order(r.amount).await?))
}

async fn confirm_checkout(
    State(s): State<AppState>,
    Json(r): Json<ConfirmCheckout>,
) -> Result<(StatusCode, Json<Order>), Error> {
    let order = s.checkout.confirm(r).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(s): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Order>>, Error> {
    Ok(Json(s.checkout.orders_for(&owner).await?))
}

// --- addresses --------------------------------------------------------------

fn default_label() -> String {
    "Home".to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[serde(default = "default_label")]
    pub label: String,
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(equal = 6))]
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

async fn list_addresses(
    State(s): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Address>>, Error> {
    let owner = OwnerId::parse(owner)?;
    Ok(Json(s.customers.list_addresses(&owner).await?))
}

async fn create_address(
    State(s): State<AppState>,
    Path(owner): Path<String>,
    Json(r): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), Error> {
    r.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let owner = OwnerId::parse(owner)?;
    let address = Address {
        id: Uuid::now_v7(),
        label: r.label,
        street: r.street,
        city: r.city,
        state: r.state,
        zip_code: r.zip_code,
        is_default: r.is_default,
    };
    address.validate()?;
    let address = s.customers.upsert_address(&owner, address).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

async fn set_default_address(
    State(s): State<AppState>,
    Path((owner, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<Address>>, Error> {
    let owner = OwnerId::parse(owner)?;
    Ok(Json(s.customers.set_default_address(&owner, id).await?))
}

async fn delete_address(
    State(s): State<AppState>,
    Path((owner, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, Error> {
    let owner = OwnerId::parse(owner)?;
    s.customers.delete_address(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
