//! Postgres-backed collaborators.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};

use crate::domain::aggregates::{Product, UserProfile};
use crate::domain::value_objects::Money;
use crate::ports::{ProductSource, RepositoryError, UserRepository};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64, title: String, price: Decimal, discount: Decimal, currency: String,
    description: String, brand: String, model: String, color: String, category: String, image: String,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id, title: r.title, price: Money::new(r.price, &r.currency), discount: Money::new(r.discount, &r.currency),
            description: r.description, brand: r.brand, model: r.model, color: r.color, category: r.category, image: r.image,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgProductSource { pool: PgPool }

impl PgProductSource {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ProductSource for PgProductSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, price, discount, currency, description, brand, model, color, category, image FROM products WHERE status = 'active' ORDER BY id",
        ).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepository { pool: PgPool }

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user(&self, id: &str) -> Result<UserProfile, RepositoryError> {
        let row: Option<(Json<UserProfile>,)> = sqlx::query_as("SELECT profile FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(|(Json(profile),)| profile).ok_or_else(|| RepositoryError::UserNotFound(id.to_string()))
    }

    async fn update_user(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (id, profile, updated_at) VALUES ($1, $2, NOW()) ON CONFLICT (id) DO UPDATE SET profile = EXCLUDED.profile, updated_at = NOW()")
            .bind(&profile.id).bind(Json(profile)).execute(&self.pool).await?;
        Ok(())
    }
}
