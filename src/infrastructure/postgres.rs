//! Postgres-backed order and profile stores.

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use tracing::debug;

use crate::domain::aggregates::Order;
use crate::domain::shipping::ShippingProfile;
use crate::ports::{OrderStore, PersistenceError, ProfileStore};

const INSERT_ORDER_SQL: &str = "INSERT INTO orders (id, order_number, user_id, items, subtotal, shipping_fee, cod_fee, total, payment_method, shipping_address, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

const SELECT_PROFILE_SQL: &str = "SELECT first_name, last_name, email, phone, address, city, postal_code, country FROM profiles WHERE id = $1";

// Email belongs to the identity provider; an existing row keeps its email.
const UPSERT_PROFILE_SQL: &str = "INSERT INTO profiles (id, first_name, last_name, email, phone, address, city, postal_code, country, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) \
    ON CONFLICT (id) DO UPDATE SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, phone = EXCLUDED.phone, address = EXCLUDED.address, city = EXCLUDED.city, postal_code = EXCLUDED.postal_code, country = EXCLUDED.country, updated_at = NOW()";

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<(), PersistenceError> {
        let pricing = order.pricing();
        sqlx::query(INSERT_ORDER_SQL)
            .bind(order.id())
            .bind(order.order_number())
            .bind(order.user_id())
            .bind(Json(order.lines()))
            .bind(pricing.subtotal.amount())
            .bind(pricing.shipping_fee.amount())
            .bind(pricing.payment_surcharge.amount())
            .bind(pricing.grand_total.amount())
            .bind(order.payment_method().as_str())
            .bind(Json(order.shipping()))
            .bind(order.placed_at())
            .execute(&self.pool)
            .await?;
        debug!(order_id = %order.id(), "order row inserted");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

/// Columns are nullable; a missing value hydrates as an empty field.
#[derive(Debug, Default, FromRow)]
struct ProfileRow {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl From<ProfileRow> for ShippingProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            city: row.city.unwrap_or_default(),
            postal_code: row.postal_code.unwrap_or_default(),
            country: row.country.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ShippingProfile>, PersistenceError> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ShippingProfile::from))
    }

    async fn upsert_profile(&self, user_id: &str, profile: &ShippingProfile) -> Result<(), PersistenceError> {
        sqlx::query(UPSERT_PROFILE_SQL)
            .bind(user_id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.email)
            .bind(&profile.phone)
            .bind(&profile.address)
            .bind(&profile.city)
            .bind(&profile.postal_code)
            .bind(&profile.country)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_row_nulls_become_empty_fields() {
        let row = ProfileRow { first_name: Some("Ada".into()), city: Some("London".into()), ..ProfileRow::default() };
        let profile = ShippingProfile::from(row);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.city, "London");
        assert_eq!(profile.email, "");
        assert_eq!(profile.country, "");
    }

    #[test]
    fn test_upsert_keeps_existing_email() {
        let update_clause = UPSERT_PROFILE_SQL.split("DO UPDATE SET").nth(1).unwrap();
        assert!(!update_clause.contains("email"));
        assert!(update_clause.contains("postal_code = EXCLUDED.postal_code"));
    }
}
