//! Product catalog CRUD. Reads need any valid token; mutations need admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::{require_admin, AuthUser};
use crate::error::{parse_id, AppError, AppJson};
use crate::models::Product;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
}

/// Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: Option<i32>,
}

/// Newest first. Query parameters are accepted and ignored; older clients
/// still send `?inStock=true`, which never filtered anything.
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.store.list_products().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id, "product")?;
    let product = state
        .store
        .product_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    require_admin(&claims)?;
    req.validate()?;

    let product = Product::new(req.name, req.category, req.description, req.price, req.quantity);
    state.store.insert_product(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    require_admin(&claims)?;
    let id = parse_id(&id, "product")?;
    req.validate()?;

    let mut product = state
        .store
        .product_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(category) = req.category {
        product.category = category;
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(price) = req.price {
        product.price = price;
    }
    if let Some(quantity) = req.quantity {
        product.quantity = quantity;
    }
    state.store.update_product(&product).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&claims)?;
    let id = parse_id(&id, "product")?;

    if !state.store.delete_product(id).await? {
        return Err(AppError::NotFound("Product"));
    }
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
