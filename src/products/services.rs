use uuid::Uuid;

use super::{dto::CreateProductRequest, repo_types::NewProduct};
use crate::error::AppError;

pub(crate) const NOT_FOUND: &str = "Product not found";

/// Checks required fields and builds the record to insert.
pub fn validate_new_product(req: CreateProductRequest) -> Result<NewProduct, AppError> {
    let name = required_text(req.name, "name")?;
    let description = required_text(req.description, "description")?;
    let price = match req.price {
        Some(p) if p.is_finite() && p >= 0.0 => p,
        Some(_) => {
            return Err(AppError::BadRequest(
                "price must be a non-negative number".into(),
            ))
        }
        None => return Err(AppError::BadRequest("price is required".into())),
    };

    Ok(NewProduct {
        images: req.images,
        name,
        price,
        description,
        tags: req.tags,
        brand: req.brand.filter(|b| !b.trim().is_empty()),
    })
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

/// Ids that are not UUIDs cannot name a stored product.
pub fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(NOT_FOUND.into()))
}
