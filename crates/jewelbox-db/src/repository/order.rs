//! # Order Repository
//!
//! Placed orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. INSERT                                                             │
//! │     └── insert(&record) → order row + item rows, one transaction       │
//! │         returns the human order number (JB-20261018-4F3A9C21)          │
//! │                                                                         │
//! │  2. FULFILMENT                                                         │
//! │     └── update_status(id, Confirmed | Shipped | Delivered)             │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                  │
//! │     └── update_status(id, Cancelled)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `count_for_user` backs the first-order-only coupon rule; cancelled
//! orders do not count.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use jewelbox_core::{
    CartLineItem, ContactInfo, DeliverySelection, Money, OrderRecord, OrderStatus, OrderTotals,
    PaymentMethod,
};

// =============================================================================
// Row Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    user_id: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    city: String,
    street: String,
    house_number: String,
    notes: Option<String>,
    delivery_json: String,
    payment_method: PaymentMethod,
    coupon_code: Option<String>,
    subtotal_minor: i64,
    shipping_minor: i64,
    discount_minor: i64,
    total_minor: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    product_id: String,
    name_snapshot: String,
    unit_price_minor: i64,
    quantity: i64,
}

impl From<OrderItemRow> for CartLineItem {
    fn from(row: OrderItemRow) -> Self {
        CartLineItem::new(
            row.product_id,
            row.name_snapshot,
            Money::from_minor(row.unit_price_minor),
            row.quantity,
        )
    }
}

/// An order as stored, with its human-readable number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub order_number: String,
    pub record: OrderRecord,
}

impl OrderRow {
    fn into_stored(self, items: Vec<CartLineItem>) -> DbResult<StoredOrder> {
        let delivery: DeliverySelection = serde_json::from_str(&self.delivery_json)
            .map_err(|e| DbError::invalid_data("order delivery", e))?;

        let totals = OrderTotals {
            subtotal: Money::from_minor(self.subtotal_minor),
            shipping: Money::from_minor(self.shipping_minor),
            discount: Money::from_minor(self.discount_minor),
            total: Money::from_minor(self.total_minor),
        };

        Ok(StoredOrder {
            order_number: self.order_number,
            record: OrderRecord {
                id: self.id,
                user_id: self.user_id,
                contact: ContactInfo {
                    first_name: self.first_name,
                    last_name: self.last_name,
                    email: self.email,
                    phone: self.phone,
                    city: self.city,
                    street: self.street,
                    house_number: self.house_number,
                    notes: self.notes,
                },
                items,
                delivery,
                payment_method: self.payment_method,
                coupon_code: self.coupon_code,
                totals,
                status: self.status,
                created_at: self.created_at,
            },
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Stores an order and its items.
    ///
    /// ## Returns
    /// The generated order number.
    ///
    /// ## Transaction
    /// Order and item rows commit together; a failed item insert leaves no
    /// partial order behind.
    pub async fn insert(&self, order: &OrderRecord) -> DbResult<String> {
        let order_number = generate_order_number(order.created_at);
        let delivery_json = serde_json::to_string(&order.delivery)
            .map_err(|e| DbError::invalid_data("order delivery", e))?;

        debug!(
            id = %order.id,
            order_number = %order_number,
            items = order.items.len(),
            total = %order.totals.total,
            "Inserting order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id,
                first_name, last_name, email, phone,
                city, street, house_number, notes,
                delivery_method, delivery_area, delivery_json,
                payment_method, coupon_code,
                subtotal_minor, shipping_minor, discount_minor, total_minor,
                status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16,
                ?17, ?18, ?19, ?20,
                ?21, ?22, ?22
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order_number)
        .bind(&order.user_id)
        .bind(&order.contact.first_name)
        .bind(&order.contact.last_name)
        .bind(&order.contact.email)
        .bind(&order.contact.phone)
        .bind(&order.contact.city)
        .bind(&order.contact.street)
        .bind(&order.contact.house_number)
        .bind(&order.contact.notes)
        .bind(order.delivery.method())
        .bind(order.delivery.area())
        .bind(&delivery_json)
        .bind(order.payment_method)
        .bind(&order.coupon_code)
        .bind(order.totals.subtotal.minor())
        .bind(order.totals.shipping.minor())
        .bind(order.totals.discount.minor())
        .bind(order.totals.total.minor())
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, product_id, name_snapshot,
                    unit_price_minor, quantity, line_total_minor
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.unit_price.minor())
            .bind(item.quantity)
            .bind(item.line_total().minor())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %order.id, order_number = %order_number, "Order stored");
        Ok(order_number)
    }

    /// Loads an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredOrder>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT
                id, order_number, user_id,
                first_name, last_name, email, phone,
                city, street, house_number, notes,
                delivery_json, payment_method, coupon_code,
                subtotal_minor, shipping_minor, discount_minor, total_minor,
                status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.get_items(id).await?;
                row.into_stored(items).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Line items of an order, in cart order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<CartLineItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT product_id, name_snapshot, unit_price_minor, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLineItem::from).collect())
    }

    /// Number of non-cancelled orders placed by a user.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = ?1 AND status <> 'cancelled'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Moves an order to a new status.
    ///
    /// ## Errors
    /// `NotFound` if no order has this id.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id = %id, ?status, "Order status updated");
        Ok(())
    }
}

/// Generates a new order id.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates an order number in the format `JB-YYYYMMDD-XXXXXXXX`.
///
/// ## Format
/// - YYYYMMDD: order date (UTC)
/// - XXXXXXXX: 8 random hex digits, upper-case
fn generate_order_number(created_at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();

    format!("JB-{}-{}", created_at.format("%Y%m%d"), suffix.to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use jewelbox_core::DeliveryArea;

    fn sample_order(user_id: Option<&str>) -> OrderRecord {
        let items = vec![
            CartLineItem::new("ring-1", "Silver ring", Money::from_major(100), 2),
            CartLineItem::new("neck-1", "Pearl necklace", Money::from_minor(24950), 1),
        ];
        OrderRecord {
            id: generate_order_id(),
            user_id: user_id.map(str::to_string),
            contact: ContactInfo {
                first_name: "Dana".to_string(),
                last_name: "Levi".to_string(),
                email: "dana@example.com".to_string(),
                phone: "050-1234567".to_string(),
                city: "Haifa".to_string(),
                street: "Herzl".to_string(),
                house_number: "12".to_string(),
                notes: Some("Gift wrap please".to_string()),
            },
            items,
            delivery: DeliverySelection::delivery_to(DeliveryArea::Local),
            payment_method: PaymentMethod::CreditCard,
            coupon_code: Some("SAVE30".to_string()),
            totals: OrderTotals::new(
                Money::from_minor(44950),
                Money::from_major(20),
                Money::from_major(30),
            ),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let order = sample_order(Some("user-1"));

        let number = db.orders().insert(&order).await.unwrap();
        assert!(number.starts_with("JB-"));

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_number, number);
        assert_eq!(stored.record.items, order.items);
        assert_eq!(stored.record.totals, order.totals);
        assert_eq!(stored.record.delivery, order.delivery);
        assert_eq!(stored.record.contact, order.contact);
        assert_eq!(stored.record.payment_method, PaymentMethod::CreditCard);
        assert_eq!(stored.record.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let db = test_db().await;
        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
        assert!(db.orders().get_items("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_for_user_ignores_cancelled() {
        let db = test_db().await;
        let first = sample_order(Some("user-1"));
        let second = sample_order(Some("user-1"));
        db.orders().insert(&first).await.unwrap();
        db.orders().insert(&second).await.unwrap();
        db.orders().insert(&sample_order(None)).await.unwrap();

        assert_eq!(db.orders().count_for_user("user-1").await.unwrap(), 2);

        db.orders()
            .update_status(&second.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(db.orders().count_for_user("user-1").await.unwrap(), 1);
        assert_eq!(db.orders().count_for_user("user-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let db = test_db().await;
        let err = db
            .orders()
            .update_status("missing", OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_nothing() {
        let db = test_db().await;
        let mut order = sample_order(Some("user-1"));
        order.items[1].quantity = 0; // violates the item CHECK

        assert!(db.orders().insert(&order).await.is_err());
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert_eq!(db.orders().count_for_user("user-1").await.unwrap(), 0);
    }

    #[test]
    fn test_order_number_format() {
        let created = DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = generate_order_number(created);

        assert!(number.starts_with("JB-20261018-"));
        assert_eq!(number.len(), "JB-20261018-".len() + 8);
    }
}
