//! Per-tab session flags.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Session storage key recording that the Applications view was opened.
pub const ACTIVATED_FLAG: &str = "zohoAutoApplicationsClicked";

/// Tab-scoped key/flag storage that survives same-tab navigations.
pub trait SessionFlags: Send + Sync {
    fn is_set(&self, key: &str) -> bool;
    fn set(&self, key: &str);
    fn clear(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemorySessionFlags {
    flags: Mutex<HashSet<String>>,
}

impl MemorySessionFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionFlags for MemorySessionFlags {
    fn is_set(&self, key: &str) -> bool {
        self.flags.lock().contains(key)
    }

    fn set(&self, key: &str) {
        self.flags.lock().insert(key.to_string());
    }

    fn clear(&self, key: &str) {
        self.flags.lock().remove(key);
    }
}

/// The activation flag over a [`SessionFlags`] store.
#[derive(Clone)]
pub struct Activation {
    flags: Arc<dyn SessionFlags>,
}

impl Activation {
    pub fn new(flags: Arc<dyn SessionFlags>) -> Self {
        Self { flags }
    }

    pub fn is_activated(&self) -> bool {
        self.flags.is_set(ACTIVATED_FLAG)
    }

    pub fn mark(&self) {
        self.flags.set(ACTIVATED_FLAG);
    }

    pub fn reset(&self) {
        self.flags.clear(ACTIVATED_FLAG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_flags() {
        let flags = MemorySessionFlags::new();
        assert!(!flags.is_set("a"));
        flags.set("a");
        assert!(flags.is_set("a"));
        flags.clear("a");
        assert!(!flags.is_set("a"));
        flags.clear("a");
    }

    #[test]
    fn test_activation_uses_session_key() {
        let flags = Arc::new(MemorySessionFlags::new());
        let activation = Activation::new(flags.clone());
        activation.mark();
        assert!(flags.is_set(ACTIVATED_FLAG));
        assert!(activation.is_activated());
        activation.reset();
        assert!(!activation.is_activated());
    }
}
