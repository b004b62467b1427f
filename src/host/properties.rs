use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::domain::PropertyValue;

pub type PropertyBag = IndexMap<String, PropertyValue>;

/// The host's property bag, shared between the host and its fields.
///
/// Clones point at the same bag.
#[derive(Debug, Clone, Default)]
pub struct SharedProperties {
    inner: Arc<Mutex<PropertyBag>>,
}

impl SharedProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bag(bag: PropertyBag) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bag)),
        }
    }

    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        self.lock().get(key).cloned()
    }

    /// Stores `value` under `key` and returns the value it replaced.
    pub fn set(&self, key: &str, value: PropertyValue) -> Option<PropertyValue> {
        self.lock().insert(key.to_string(), value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn snapshot(&self) -> PropertyBag {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PropertyBag> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<PropertyBag> for SharedProperties {
    fn from(bag: PropertyBag) -> Self {
        Self::from_bag(bag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_the_same_bag() {
        let properties = SharedProperties::new();
        let alias = properties.clone();
        assert_eq!(alias.set("align", json!("left")), None);
        assert_eq!(properties.get("align"), Some(json!("left")));
        assert_eq!(properties.set("align", json!("right")), Some(json!("left")));
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let properties = SharedProperties::new();
        properties.set("b", json!(1));
        properties.set("a", json!(2));
        let keys: Vec<_> = properties.snapshot().keys().cloned().collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    }
}
