//! In-process store used when no database is configured, and by the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User, UserStatus},
    },
    products::{
        repo::ProductRepo,
        repo_types::{NewProduct, Product},
    },
    store::{StoreError, StoreResult},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>, // keyed by email
    products: RwLock<Vec<Product>>,       // insertion order
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate);
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            photo: user.photo,
            status: UserStatus::Inactive,
        };
        users.insert(created.email.clone(), created.clone());
        Ok(created)
    }

    async fn set_status(&self, email: &str, status: UserStatus) -> StoreResult<bool> {
        match self.users.write().await.get_mut(email) {
            Some(u) => {
                u.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        match self.users.write().await.get_mut(email) {
            Some(u) => {
                u.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProductRepo for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let stored = product.with_id(Uuid::new_v4());
        self.products.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let mut products = self.products.write().await;
        let removed = products
            .iter()
            .position(|p| p.id == id)
            .map(|idx| products.remove(idx));
        Ok(removed)
    }
}
