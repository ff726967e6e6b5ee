//! Order endpoints. The stock movements behind them live in
//! [`crate::workflow`]; handlers only gate access and shape the wire types.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{parse_id, AppError, AppJson};
use crate::models::{OrderStatus, OrderView};
use crate::workflow::{self, OrderChanges};
use crate::AppState;

/// Any authenticated caller sees the full ledger, expanded.
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let orders = state.store.list_orders().await?;
    Ok(Json(workflow::expand_all(state.store.as_ref(), orders).await?))
}

/// `:id` is a customer id, compared against the caller as a raw string
/// before any parsing.
pub async fn list_user_orders(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    if claims.id.to_string() != id && !claims.is_admin() {
        return Err(AppError::Forbidden("Access denied"));
    }
    let customer = parse_id(&id, "user")?;

    let orders = state.store.orders_by_customer(customer).await?;
    Ok(Json(workflow::expand_all(state.store.as_ref(), orders).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub product: Option<Uuid>,
    pub quantity: Option<i32>,
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<CreateOrder>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    let (product, quantity) = match (req.product, req.quantity) {
        (Some(product), Some(quantity)) if quantity > 0 => (product, quantity),
        _ => {
            return Err(AppError::Validation(
                "Product ID and quantity are required".into(),
            ))
        }
    };

    let view = workflow::place_order(state.store.as_ref(), claims.id, product, quantity).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub quantity: Option<i32>,
    pub product: Option<Uuid>,
}

pub async fn update_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateOrder>,
) -> Result<Json<OrderView>, AppError> {
    let id = parse_id(&id, "order")?;
    let changes = OrderChanges {
        status: req.status,
        quantity: req.quantity,
        product: req.product,
    };
    let view = workflow::amend_order(state.store.as_ref(), id, changes, &claims).await?;
    Ok(Json(view))
}

pub async fn delete_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "order")?;
    workflow::remove_order(state.store.as_ref(), id, &claims).await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
