//! The order workflow: placement, amendment and removal, and the stock
//! movement each one drives on the referenced product.
//!
//! Every operation is a sequence of independent single-record reads and
//! writes against the store. No transaction spans the order and the product,
//! so a crash or a concurrent request landing between the two writes can
//! leave them out of step (an order without its decrement, or an oversold
//! count). That window is inherited behavior and is kept as-is; a failure
//! partway through returns an error without rolling back writes already
//! made.

use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use crate::models::{Order, OrderStatus, OrderView};
use crate::store::Store;

/// Requested changes for an amendment; absent fields stay untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrderChanges {
    pub status: Option<OrderStatus>,
    pub quantity: Option<i32>,
    pub product: Option<Uuid>,
}

/// Places an order, reserving stock by decrementing the product's count.
///
/// Nothing is written when the product is missing or its stock is short.
/// On success the order record is written first, then the decremented
/// product.
pub async fn place_order(
    store: &dyn Store,
    customer: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<OrderView, AppError> {
    let mut product = store
        .product_by_id(product_id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.quantity < quantity {
        return Err(AppError::InsufficientStock);
    }

    let total_price = product.price * f64::from(quantity);
    let order = Order::new(customer, product_id, quantity, total_price);
    store.insert_order(&order).await?;

    product.quantity -= quantity;
    store.update_product(&product).await?;

    expand(store, order).await
}

/// Applies an amendment on behalf of `actor` (owner or admin).
///
/// A status change overwrites unconditionally. A quantity/product change
/// first gives the old reservation back, then re-reserves against the
/// target product and reprices the order. The restore must come first:
/// when the product is unchanged, it is what makes an equal or grown
/// quantity satisfiable. If resolving or checking the target fails after
/// the restore, the restore stays committed.
pub async fn amend_order(
    store: &dyn Store,
    order_id: Uuid,
    changes: OrderChanges,
    actor: &Claims,
) -> Result<OrderView, AppError> {
    let mut order = store
        .order_by_id(order_id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    if !actor.may_act_on(order.customer) {
        return Err(AppError::Forbidden("Access denied"));
    }

    if let Some(status) = changes.status {
        order.status = status;
    }

    if changes.quantity.is_some() || changes.product.is_some() {
        // Give the old reservation back; a product deleted since placement
        // is skipped.
        if let Some(mut old) = store.product_by_id(order.product).await? {
            old.quantity += order.quantity;
            store.update_product(&old).await?;
        }

        // Re-read the target so an unchanged product reflects the restore.
        let target_id = changes.product.unwrap_or(order.product);
        let mut target = store
            .product_by_id(target_id)
            .await?
            .ok_or(AppError::NotFound("New product"))?;

        let quantity = changes.quantity.unwrap_or(order.quantity);
        if target.quantity < quantity {
            return Err(AppError::InsufficientStock);
        }

        target.quantity -= quantity;
        store.update_product(&target).await?;

        order.product = target.id;
        order.quantity = quantity;
        order.total_price = target.price * f64::from(quantity);
    }

    store.update_order(&order).await?;
    expand(store, order).await
}

/// Deletes an order on behalf of `actor`, giving its reservation back.
///
/// The restore is best-effort: a product deleted in the meantime is skipped
/// silently. It happens exactly once, whatever the order's status was.
pub async fn remove_order(
    store: &dyn Store,
    order_id: Uuid,
    actor: &Claims,
) -> Result<(), AppError> {
    let order = store
        .order_by_id(order_id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    if !actor.may_act_on(order.customer) {
        return Err(AppError::Forbidden("Access denied"));
    }

    if let Some(mut product) = store.product_by_id(order.product).await? {
        product.quantity += order.quantity;
        store.update_product(&product).await?;
    }

    store.delete_order(order.id).await?;
    Ok(())
}

/// Swaps an order's references for the referenced records.
pub async fn expand(store: &dyn Store, order: Order) -> Result<OrderView, AppError> {
    let customer = store.user_by_id(order.customer).await?;
    let product = store.product_by_id(order.product).await?;
    Ok(OrderView::assemble(order, customer, product))
}

pub async fn expand_all(
    store: &dyn Store,
    orders: Vec<Order>,
) -> Result<Vec<OrderView>, AppError> {
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(expand(store, order).await?);
    }
    Ok(views)
}
