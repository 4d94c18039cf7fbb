//! Core types for spark-bind.
//!
//! Small shared types that flow between containers, the template helper and binders.

use std::fmt;

// =============================================================================
// Listener Id
// =============================================================================

/// Identifier of a change listener registered on an [`Observable`](crate::Observable).
///
/// Ids come from a per-container counter that only ever increases, so an id is
/// never handed out twice by the same container. Ids from different containers
/// are unrelated and may compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value behind this id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by scoped subscriptions.
///
/// Call this to release the subscription.
pub type Cleanup = Box<dyn FnOnce()>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_id_order_follows_counter() {
        let a = ListenerId::new(0);
        let b = ListenerId::new(1);
        assert!(a < b);
        assert_eq!(b.get(), 1);
        assert_eq!(b.to_string(), "#1");
    }
}
