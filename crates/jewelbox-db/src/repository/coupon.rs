//! # Coupon Repository
//!
//! The shop's coupon catalogue. Codes are stored normalized (trimmed,
//! upper-case) and looked up the same way.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use jewelbox_core::coupon::normalize_code;
use jewelbox_core::{Coupon, CouponDiscount, CouponKind};

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    code: String,
    kind: CouponKind,
    value: i64,
    first_order_only: bool,
    active: bool,
    expires_on: Option<NaiveDate>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let discount = CouponDiscount::from_parts(row.kind, row.value)
            .map_err(|e| DbError::invalid_data("coupon", e))?;

        Ok(Coupon {
            code: row.code,
            discount,
            first_order_only: row.first_order_only,
            active: row.active,
            expires_on: row.expires_on,
        })
    }
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Looks up a coupon by code (case-insensitive).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let code = normalize_code(code);

        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT code, kind, value, first_order_only, active, expires_on
            FROM coupons
            WHERE code = ?1
            "#,
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Inserts a coupon or overwrites the one with the same code.
    pub async fn upsert(&self, coupon: &Coupon) -> DbResult<()> {
        let code = normalize_code(&coupon.code);
        let now = Utc::now();

        debug!(code = %code, kind = %coupon.kind(), "Upserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                code, kind, value, first_order_only, active, expires_on,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (code) DO UPDATE SET
                kind = excluded.kind,
                value = excluded.value,
                first_order_only = excluded.first_order_only,
                active = excluded.active,
                expires_on = excluded.expires_on,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&code)
        .bind(coupon.kind())
        .bind(coupon.discount.raw_value())
        .bind(coupon.first_order_only)
        .bind(coupon.active)
        .bind(coupon.expires_on)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All active coupons, by code.
    pub async fn list_active(&self) -> DbResult<Vec<Coupon>> {
        let rows: Vec<CouponRow> = sqlx::query_as(
            r#"
            SELECT code, kind, value, first_order_only, active, expires_on
            FROM coupons
            WHERE active = 1
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Coupon::try_from).collect()
    }

    /// Enables or disables a coupon.
    ///
    /// ## Errors
    /// `NotFound` if no coupon has this code.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let code = normalize_code(code);

        let result = sqlx::query("UPDATE coupons SET active = ?2, updated_at = ?3 WHERE code = ?1")
            .bind(&code)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", code));
        }

        info!(code = %code, active, "Coupon availability changed");
        Ok(())
    }

    /// Number of coupons in the catalogue.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
