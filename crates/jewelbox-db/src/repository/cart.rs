//! # Cart Repository
//!
//! Persisted carts, one per signed-in user.
//!
//! A save replaces the user's whole cart inside one transaction, so a
//! reader never sees half of an update. Row order is kept in `position`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use jewelbox_core::{CartLineItem, Money};

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: String,
    name: String,
    unit_price_minor: i64,
    quantity: i64,
}

impl From<CartItemRow> for CartLineItem {
    fn from(row: CartItemRow) -> Self {
        CartLineItem::new(
            row.product_id,
            row.name,
            Money::from_minor(row.unit_price_minor),
            row.quantity,
        )
    }
}

/// Repository for persisted carts.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads a user's cart in the order items were added.
    /// An unknown user has an empty cart.
    pub async fn load(&self, user_id: &str) -> DbResult<Vec<CartLineItem>> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            r#"
            SELECT product_id, name, unit_price_minor, quantity
            FROM cart_items
            WHERE user_id = ?1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, items = rows.len(), "Loaded cart");

        Ok(rows.into_iter().map(CartLineItem::from).collect())
    }

    /// Replaces a user's cart with `items`.
    ///
    /// ## Transaction
    /// The delete and all inserts commit together. On any failure the
    /// previously stored cart is left untouched.
    pub async fn save(&self, user_id: &str, items: &[CartLineItem]) -> DbResult<()> {
        debug!(user_id = %user_id, items = items.len(), "Saving cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (
                    user_id, product_id, name,
                    unit_price_minor, quantity, position, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(user_id)
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.unit_price.minor())
            .bind(item.quantity)
            .bind(position as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a user's cart.
    pub async fn clear(&self, user_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, "Clearing cart");

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::test_db;

    fn item(id: &str, price_minor: i64, qty: i64) -> CartLineItem {
        CartLineItem::new(id, format!("Item {id}"), Money::from_minor(price_minor), qty)
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_cart() {
        let db = test_db().await;
        assert!(db.carts().load("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_order() {
        let db = test_db().await;
        let items = vec![item("b", 500, 2), item("a", 14990, 1), item("c", 100, 10)];

        db.carts().save("user-1", &items).await.unwrap();
        assert_eq!(db.carts().load("user-1").await.unwrap(), items);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_cart() {
        let db = test_db().await;
        db.carts()
            .save("user-1", &[item("a", 100, 1), item("b", 200, 1)])
            .await
            .unwrap();
        db.carts().save("user-1", &[item("c", 300, 3)]).await.unwrap();

        let loaded = db.carts().load("user-1").await.unwrap();
        assert_eq!(loaded, vec![item("c", 300, 3)]);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let db = test_db().await;
        db.carts().save("user-1", &[item("a", 100, 1)]).await.unwrap();
        db.carts().save("user-2", &[item("b", 200, 2)]).await.unwrap();

        db.carts().clear("user-1").await.unwrap();

        assert!(db.carts().load("user-1").await.unwrap().is_empty());
        assert_eq!(db.carts().load("user-2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_cart() {
        let db = test_db().await;
        db.carts().save("user-1", &[item("a", 100, 1)]).await.unwrap();

        // duplicate product ids violate the primary key mid-transaction
        let err = db
            .carts()
            .save("user-1", &[item("x", 100, 1), item("x", 100, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        assert_eq!(db.carts().load("user-1").await.unwrap(), vec![item("a", 100, 1)]);
    }
}
