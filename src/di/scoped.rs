use crate::di::container::Instance;
use std::collections::HashMap;
use std::sync::Arc;

/// Context-aware instances created for a single request.
#[derive(Default)]
pub struct ScopedInstances {
    instances: HashMap<String, Instance>,
}

impl ScopedInstances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, instance: Instance) {
        self.instances.insert(name.to_string(), instance);
    }

    pub fn get(&self, name: &str) -> Option<Instance> {
        self.instances.get(name).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
