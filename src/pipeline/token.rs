use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Identifies one scheduled candidate. Later tokens compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ValidationToken(u64);

impl ValidationToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ValidationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and remembers the latest one.
#[derive(Debug, Default)]
pub struct TokenCounter {
    latest: AtomicU64,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> ValidationToken {
        ValidationToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest(&self) -> Option<ValidationToken> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            value => Some(ValidationToken(value)),
        }
    }

    pub fn is_latest(&self, token: ValidationToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_tokens_supersede_older_ones() {
        let counter = TokenCounter::new();
        assert_eq!(counter.latest(), None);
        let first = counter.issue();
        assert!(counter.is_latest(first));
        let second = counter.issue();
        assert!(second > first);
        assert!(!counter.is_latest(first));
        assert!(counter.is_latest(second));
    }
}
