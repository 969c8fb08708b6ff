use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewProduct, Product};
use crate::store::StoreResult;

#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// All products, oldest first.
    async fn list(&self) -> StoreResult<Vec<Product>>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>>;
    async fn insert(&self, product: NewProduct) -> StoreResult<Product>;
    /// Removes the product and hands back what was stored.
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Product>>;
}

#[derive(Clone)]
pub struct PgProductRepo {
    db: PgPool,
}

impl PgProductRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, images, name, price, description, tags, brand
            FROM products
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, images, name, price, description, tags, brand
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, images, name, price, description, tags, brand)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, images, name, price, description, tags, brand
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&product.images)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.tags)
        .bind(&product.brand)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, images, name, price, description, tags, brand
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
