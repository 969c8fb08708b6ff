use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entry. The id is assigned once on insert and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub images: Vec<String>,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub tags: Vec<String>,
    pub brand: Option<String>,
}

/// Validated fields for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub images: Vec<String>,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub tags: Vec<String>,
    pub brand: Option<String>,
}

impl NewProduct {
    pub fn with_id(self, id: Uuid) -> Product {
        Product {
            id,
            images: self.images,
            name: self.name,
            price: self.price,
            description: self.description,
            tags: self.tags,
            brand: self.brand,
        }
    }
}
