//! Aurum Commerce service entry point.

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aurum_commerce::api::{self, AppState};
use aurum_commerce::config::Config;
use aurum_commerce::gateway::razorpay::RazorpayClient;
use aurum_commerce::services::{CartService, CheckoutService};
use aurum_commerce::store::postgres::{PgCartStore, PgCustomerStore, PgOrderStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable; order events disabled");
                None
            }
        },
        None => None,
    };

    let carts = Arc::new(PgCartStore::new(db.clone()));
    let orders = Arc::new(PgOrderStore::new(db.clone()));
    let customers = Arc::new(PgCustomerStore::new(db));
    let gateway = Arc::new(RazorpayClient::new(
        config.razorpay_base_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    ));

    let state = AppState {
        cart: CartService::new(carts.clone()),
        checkout: CheckoutService::new(carts, orders, customers.clone(), gateway, nats),
        customers,
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("aurum-commerce listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
