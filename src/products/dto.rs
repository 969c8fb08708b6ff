use serde::{Deserialize, Serialize};

use super::repo_types::Product;

/// Request body for product creation. Required fields are optional here so
/// that a missing one is reported as a 400 by validation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub images: Vec<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ProductMessageResponse {
    pub message: &'static str,
    pub product: Product,
}
