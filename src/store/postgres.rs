//! sqlx Postgres adapters.
//!
//! Cart items live in a `(owner_id, product_id)`-keyed table so each
//! mutation is one `INSERT .. ON CONFLICT` / `UPDATE` / `DELETE` statement.
//! Order item lists and address snapshots travel as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::aggregates::order::{DeliveryEstimate, OrderStatus, PaymentRef, PaymentStatus};
use crate::domain::aggregates::{Address, Cart, LineItem, Order};
use crate::domain::value_objects::OwnerId;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items(&self, owner: &OwnerId) -> Result<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT product_id, name, unit_price, quantity, image_url \
             FROM cart_items WHERE owner_id = $1 ORDER BY added_at",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    /// Ensure the cart record exists and bump `last_modified`.
    async fn touch<'e, E>(&self, executor: E, owner: &OwnerId) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            "INSERT INTO carts (owner_id, last_modified) VALUES ($1, now()) \
             ON CONFLICT (owner_id) DO UPDATE SET last_modified = now()",
        )
        .bind(owner.as_str())
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: String,
    name: String,
    unit_price: i64,
    quantity: i32,
    image_url: String,
}

impl From<CartItemRow> for LineItem {
    fn from(r: CartItemRow) -> Self {
        LineItem {
            product_id: r.product_id,
            name: r.name,
            unit_price: r.unit_price,
            quantity: r.quantity.max(0) as u32,
            image_url: r.image_url,
        }
    }
}

#[async_trait]
impl super::CartStore for PgCartStore {
    async fn fetch(&self, owner: &OwnerId) -> Result<Cart> {
        let last_modified: Option<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT last_modified FROM carts WHERE owner_id = $1")
                .bind(owner.as_str())
                .fetch_optional(&self.pool)
                .await?;
        match last_modified {
            None => Ok(Cart::empty(owner.clone())),
            Some((last_modified,)) => Ok(Cart {
                owner: owner.clone(),
                items: self.items(owner).await?,
                last_modified,
            }),
        }
    }

    async fn upsert_item(&self, owner: &OwnerId, item: LineItem) -> Result<Vec<LineItem>> {
        let mut tx = self.pool.begin().await?;
        self.touch(&mut *tx, owner).await?;
        // Replace semantics: a second add for the same product overwrites
        // quantity rather than incrementing it.
        sqlx::query(
            "INSERT INTO cart_items (owner_id, product_id, name, unit_price, quantity, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (owner_id, product_id) DO UPDATE \
             SET name = EXCLUDED.name, unit_price = EXCLUDED.unit_price, \
                 quantity = EXCLUDED.quantity, image_url = EXCLUDED.image_url",
        )
        .bind(owner.as_str())
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.unit_price)
        .bind(item.quantity as i32)
        .bind(&item.image_url)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        self.items(owner).await
    }

    async fn set_quantity(
        &self,
        owner: &OwnerId,
        product_id: &str,
        quantity: u32,
    ) -> Result<Vec<LineItem>> {
        let mut tx = self.pool.begin().await?;
        if quantity == 0 {
            sqlx::query("DELETE FROM cart_items WHERE owner_id = $1 AND product_id = $2")
                .bind(owner.as_str())
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        } else {
            let updated = sqlx::query(
                "UPDATE cart_items SET quantity = $3 WHERE owner_id = $1 AND product_id = $2",
            )
            .bind(owner.as_str())
            .bind(product_id)
            .bind(quantity as i32)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(Error::ItemNotFound {
                    product_id: product_id.to_string(),
                });
            }
        }
        self.touch(&mut *tx, owner).await?;
        tx.commit().await?;
        self.items(owner).await
    }

    async fn remove_item(&self, owner: &OwnerId, product_id: &str) -> Result<Vec<LineItem>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cart_items WHERE owner_id = $1 AND product_id = $2")
            .bind(owner.as_str())
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        self.touch(&mut *tx, owner).await?;
        tx.commit().await?;
        self.items(owner).await
    }

    async fn clear(&self, owner: &OwnerId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cart_items WHERE owner_id = $1")
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await?;
        self.touch(&mut *tx, owner).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: String,
    items: Json<Vec<LineItem>>,
    subtotal: i64,
    tax: i64,
    discount: i64,
    total: i64,
    gateway_order_id: String,
    payment_id: String,
    signature: String,
    payment_status: String,
    shipping_address: Json<Address>,
    order_status: String,
    expected_delivery: DateTime<Utc>,
    actual_delivery: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Error;

    fn try_from(r: OrderRow) -> Result<Self> {
        Ok(Order {
            id: r.id,
            owner: OwnerId::parse(&r.owner_id)
                .map_err(|_| Error::Store(format!("stored owner id {:?} is invalid", r.owner_id)))?,
            items: r.items.0,
            amounts: crate::domain::pricing::PricingBreakdown {
                subtotal: r.subtotal,
                tax: r.tax,
                discount: r.discount,
                total: r.total,
            },
            payment: PaymentRef {
                gateway_order_id: r.gateway_order_id,
                payment_id: r.payment_id,
                signature: r.signature,
                status: PaymentStatus::parse(&r.payment_status)?,
            },
            shipping_address: r.shipping_address.0,
            order_status: OrderStatus::parse(&r.order_status)?,
            delivery: DeliveryEstimate {
                expected: r.expected_delivery,
                actual: r.actual_delivery,
            },
            created_at: r.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, owner_id, items, subtotal, tax, discount, total, \
     gateway_order_id, payment_id, signature, payment_status, shipping_address, \
     order_status, expected_delivery, actual_delivery, created_at";

#[async_trait]
impl super::OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<bool> {
        // The unique index on gateway_order_id backstops the service-level
        // idempotency lookup; a conflicting insert writes nothing.
        let result = sqlx::query(
            "INSERT INTO orders (id, owner_id, items, subtotal, tax, discount, total, \
             gateway_order_id, payment_id, signature, payment_status, shipping_address, \
             order_status, expected_delivery, actual_delivery, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (gateway_order_id) DO NOTHING",
        )
        .bind(order.id)
        .bind(order.owner.as_str())
        .bind(Json(&order.items))
        .bind(order.amounts.subtotal)
        .bind(order.amounts.tax)
        .bind(order.amounts.discount)
        .bind(order.amounts.total)
        .bind(&order.payment.gateway_order_id)
        .bind(&order.payment.payment_id)
        .bind(&order.payment.signature)
        .bind(order.payment.status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(order.order_status.as_str())
        .bind(order.delivery.expected)
        .bind(order.delivery.actual)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE gateway_order_id = $1"
        ))
        .bind(gateway_order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    label: String,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(r: AddressRow) -> Self {
        Address {
            id: r.id,
            label: r.label,
            street: r.street,
            city: r.city,
            state: r.state,
            zip_code: r.zip_code,
            is_default: r.is_default,
        }
    }
}

const ADDRESS_COLUMNS: &str = "id, label, street, city, state, zip_code, is_default";

#[async_trait]
impl super::CustomerStore for PgCustomerStore {
    async fn list_addresses(&self, owner: &OwnerId) -> Result<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE owner_id = $1 ORDER BY created_at"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn get_address(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Address>> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Address::from))
    }

    async fn upsert_address(&self, owner: &OwnerId, address: Address) -> Result<Address> {
        let mut tx = self.pool.begin().await?;
        if address.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE owner_id = $1 AND id <> $2")
                .bind(owner.as_str())
                .bind(address.id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            "INSERT INTO addresses (id, owner_id, label, street, city, state, zip_code, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE \
             SET label = EXCLUDED.label, street = EXCLUDED.street, city = EXCLUDED.city, \
                 state = EXCLUDED.state, zip_code = EXCLUDED.zip_code, \
                 is_default = EXCLUDED.is_default \
             WHERE addresses.owner_id = EXCLUDED.owner_id",
        )
        .bind(address.id)
        .bind(owner.as_str())
        .bind(&address.label)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(address.is_default)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(address)
    }

    async fn set_default_address(&self, owner: &OwnerId, id: Uuid) -> Result<Vec<Address>> {
        let mut tx = self.pool.begin().await?;
        // Demote first so the partial unique index on (owner_id) WHERE
        // is_default never sees two defaults within the transaction.
        sqlx::query("UPDATE addresses SET is_default = FALSE WHERE owner_id = $1 AND id <> $2")
            .bind(owner.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let updated =
            sqlx::query("UPDATE addresses SET is_default = TRUE WHERE owner_id = $1 AND id = $2")
                .bind(owner.as_str())
                .bind(id)
                .execute(&mut *tx)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::AddressNotFound { id: id.to_string() });
        }
        tx.commit().await?;
        self.list_addresses(owner).await
    }

    async fn delete_address(&self, owner: &OwnerId, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM addresses WHERE owner_id = $1 AND id = $2")
            .bind(owner.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
