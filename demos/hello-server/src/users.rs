use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

pub trait UserService: Send + Sync {
    fn find(&self, id: u64) -> Option<User>;
    fn create(&self, name: String, email: String) -> User;
    fn remove(&self, id: u64) -> bool;
}

#[derive(Default)]
pub struct InMemoryUserService {
    next_id: AtomicU64,
    users: RwLock<HashMap<u64, User>>,
}

impl UserService for InMemoryUserService {
    fn find(&self, id: u64) -> Option<User> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(&id).cloned()
    }

    fn create(&self, name: String, email: String) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User { id, name, email };
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(id, user.clone());
        user
    }

    fn remove(&self, id: u64) -> bool {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.remove(&id).is_some()
    }
}
