//! Persistence for the three collections: users, products, orders.
//!
//! The store is a trait so the same workflow and HTTP code runs against
//! either backend:
//! - [`PgStore`]: PostgreSQL via sqlx, the production backend
//! - [`MemStore`]: in-memory maps for tests and local development
//!
//! Operations are deliberately single-record. Flows that touch an order and
//! its product are sequenced by the caller as independent calls, with no
//! transaction spanning them.

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Order, Product, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-index violation (duplicate user email).
    #[error("duplicate key")]
    Duplicate,
    /// A stored value no longer parses into its model type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Oldest first (registration order).
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    /// Newest first.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    /// Persists every mutable field of an existing product keyed by its id.
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    /// Returns false when no such product existed.
    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    /// Oldest first (placement order).
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn orders_by_customer(&self, customer: Uuid) -> Result<Vec<Order>, StoreError>;
    async fn update_order(&self, order: &Order) -> Result<(), StoreError>;
    /// Returns false when no such order existed.
    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError>;
}
