//! In-memory backend for tests and local development.
//!
//! Each operation takes its collection lock for just that operation, so a
//! sequence of calls interleaves exactly like a sequence of independent
//! database writes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Order, Product, User};

#[derive(Default)]
pub struct MemStore {
    users: RwLock<HashMap<Uuid, User>>,
    products: RwLock<HashMap<Uuid, Product>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().expect("lock poisoned");
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.products
            .write()
            .expect("lock poisoned")
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut products = self.products.write().expect("lock poisoned");
        if products.contains_key(&product.id) {
            products.insert(product.id, product.clone());
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .products
            .write()
            .expect("lock poisoned")
            .remove(&id)
            .is_some())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders
            .write()
            .expect("lock poisoned")
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }

    async fn orders_by_customer(&self, customer: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|order| order.customer == customer)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().expect("lock poisoned");
        if orders.contains_key(&order.id) {
            orders.insert(order.id, order.clone());
        }
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .orders
            .write()
            .expect("lock poisoned")
            .remove(&id)
            .is_some())
    }
}
