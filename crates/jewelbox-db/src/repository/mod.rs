//! # Repository Module
//!
//! Database repositories for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront adapter                                                     │
//! │       │                                                                 │
//! │       │  db.carts().save("user-42", &items)                            │
//! │       ▼                                                                 │
//! │  CartRepository / CouponRepository / OrderRepository                   │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into private `*Row` records (`sqlx::FromRow`) and converted
//! into jewelbox-core types at the repository boundary.
//!
//! ## Available Repositories
//!
//! - [`cart::CartRepository`] - Persisted carts per user
//! - [`coupon::CouponRepository`] - Coupon catalogue
//! - [`order::OrderRepository`] - Placed orders and their items

pub mod cart;
pub mod coupon;
pub mod order;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }
}
