use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateProductRequest, ProductListResponse, ProductMessageResponse, ProductResponse},
    services::{parse_product_id, validate_new_product, NOT_FOUND},
};
use crate::{
    auth::extractors::AuthUser, error::AppError, extract::ApiJson, state::AppState,
    store::StoreError,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/all", get(list_products))
        .route("/product/create", post(create_product))
        .route("/product/:id", get(get_product))
        .route("/delete/:id", delete(delete_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = state.products.list().await.map_err(internal)?;
    Ok(Json(ProductListResponse { products }))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let id = parse_product_id(&id)?;
    let product = state
        .products
        .get(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(ProductResponse { product }))
}

#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductMessageResponse>), AppError> {
    let new_product = validate_new_product(body)?;
    let product = state.products.insert(new_product).await.map_err(internal)?;
    info!(product_id = %product.id, %user_id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductMessageResponse {
            message: "Product created",
            product,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProductMessageResponse>, AppError> {
    let id = parse_product_id(&id)?;
    let product = state
        .products
        .delete(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    info!(product_id = %product.id, %user_id, "product deleted");
    Ok(Json(ProductMessageResponse {
        message: "Product deleted",
        product,
    }))
}

fn internal(e: StoreError) -> AppError {
    match e {
        StoreError::Backend(e) => AppError::Internal(e),
        StoreError::Duplicate => AppError::Internal(anyhow::anyhow!("unexpected duplicate key")),
    }
}
