use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Source of per-field keys used to build unique element ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random, lexicographically sortable keys. The generator hosts should use
/// when several panes share one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidIds;

impl IdGenerator for UlidIds {
    fn next_id(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... keys.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("field")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

/// Which generator a replayed pane uses for its field keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStyle {
    /// `field-1`, `field-2`, ... so reports stay reproducible.
    #[default]
    Sequential,
    Ulid,
}

impl IdStyle {
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdStyle::Sequential => Box::new(SequentialIds::default()),
            IdStyle::Ulid => Box::new(UlidIds),
        }
    }
}
