//! Observable - Mutable value container with change listeners
//!
//! Holds a single value and notifies listeners synchronously whenever it changes.
//!
//! # API
//!
//! - `get()` - Read the current value
//! - `set(value)` - Replace the value and notify listeners (no-op when equal)
//! - `on_update(fn)` - Register a listener, returns its [`ListenerId`]
//! - `off_update(id)` - Remove a listener (unknown ids are ignored)
//! - `subscribe(fn)` - Register a listener, returns a cleanup function
//!
//! # Example
//!
//! ```
//! use spark_bind::Observable;
//!
//! let count = Observable::new(0);
//!
//! let id = count.on_update(|value| println!("count is now {value}"));
//! count.set(1); // prints "count is now 1"
//! count.set(1); // equal value, nothing happens
//!
//! count.off_update(id);
//! count.set(2); // no listeners left
//! ```
//!
//! # Re-entrancy
//!
//! Listeners run on the calling stack before `set` returns. A listener may call
//! `set` again on the same or another container; the nested fan-out completes
//! before the outer one resumes. There is no cycle detection and no depth limit,
//! so two containers that keep setting each other to new values recurse until
//! the stack overflows.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::types::{Cleanup, ListenerId};

// =============================================================================
// TYPES
// =============================================================================

/// Change listener. Receives the value passed to the `set` that triggered it.
type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    // Ordered by id, so iteration order is subscription order.
    listeners: RefCell<BTreeMap<ListenerId, Listener<T>>>,
    next_id: Cell<u64>,
}

impl<T> Inner<T> {
    fn remove_listener(&self, id: ListenerId) {
        // Dropping a listener can run arbitrary drop code (a captured binder
        // unbinding itself), so the borrow must end before the drop.
        let removed = self.listeners.borrow_mut().remove(&id);
        drop(removed);
    }
}

/// A value container that notifies listeners on change.
///
/// `Observable` is a handle: cloning it yields another handle to the same
/// container, which is how one container is shared between application code
/// and any number of [`TemplateBinder`](crate::TemplateBinder)s.
pub struct Observable<T: Clone + PartialEq + 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: Clone + PartialEq + 'static> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a container holding `initial`, with no listeners.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial),
                listeners: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Run `f` against the current value without cloning it.
    ///
    /// `f` must not call [`set`](Self::set) on this container.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify every listener in subscription order.
    ///
    /// Does nothing when `value` equals the current value.
    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            trace!("observable set to equal value, skipping notify");
            return;
        }

        *self.inner.value.borrow_mut() = value.clone();
        self.notify(&value);
    }

    /// Set the value computed from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Register `listener` for every future change. Returns its id.
    pub fn on_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + 'static,
    {
        let id = ListenerId::new(self.inner.next_id.get());
        self.inner.next_id.set(id.get() + 1);
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, Rc::new(listener));
        id
    }

    /// Remove the listener registered under `id`.
    ///
    /// Unknown ids (never issued, or already removed) are ignored.
    pub fn off_update(&self, id: ListenerId) {
        self.inner.remove_listener(id);
    }

    /// Register `listener` and return a cleanup function that removes it.
    ///
    /// The cleanup only holds a weak reference, so it never keeps the
    /// container alive and does nothing once the container is gone.
    pub fn subscribe<F>(&self, listener: F) -> Cleanup
    where
        F: Fn(&T) + 'static,
    {
        let id = self.on_update(listener);
        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);

        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_listener(id);
            }
        })
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Whether both handles point at the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self, value: &T) {
        // Snapshot the ids: listeners added during this fan-out wait for the
        // next change, listeners removed during it are skipped.
        let ids: Vec<ListenerId> = self.inner.listeners.borrow().keys().copied().collect();
        trace!(listeners = ids.len(), "observable changed, notifying");

        for id in ids {
            let listener = self.inner.listeners.borrow().get(&id).cloned();
            if let Some(listener) = listener {
                listener(value);
            }
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TemplateBinder, TextBuffer};

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        (seen, move |value: &T| seen_clone.borrow_mut().push(value.clone()))
    }

    #[test]
    fn test_initial_value() {
        let obs = Observable::new(5);
        assert_eq!(obs.get(), 5);
        assert_eq!(obs.listener_count(), 0);
    }

    #[test]
    fn test_set_notifies_with_new_value() {
        let obs = Observable::new(0);
        let (seen, listener) = recorder::<i32>();
        obs.on_update(listener);

        obs.set(1);
        obs.set(2);

        assert_eq!(obs.get(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_equal_set_is_noop() {
        let obs = Observable::new("a".to_string());
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        obs.on_update(move |_| count_clone.set(count_clone.get() + 1));

        obs.set("a".to_string());
        assert_eq!(count.get(), 0);

        obs.set("b".to_string());
        obs.set("b".to_string());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_listeners_called_in_subscription_order() {
        let obs = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            obs.on_update(move |_| order.borrow_mut().push(tag));
        }

        obs.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_off_update_removes_only_that_listener() {
        let obs = Observable::new(0);
        let (a_seen, a) = recorder::<i32>();
        let (b_seen, b) = recorder::<i32>();
        let a_id = obs.on_update(a);
        obs.on_update(b);

        obs.set(1);
        obs.off_update(a_id);
        obs.set(2);

        assert_eq!(*a_seen.borrow(), vec![1]);
        assert_eq!(*b_seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_off_update_unknown_id_is_noop() {
        let obs = Observable::new(0);
        let id = obs.on_update(|_| {});

        obs.off_update(ListenerId::new(99));
        assert_eq!(obs.listener_count(), 1);

        obs.off_update(id);
        obs.off_update(id);
        assert_eq!(obs.listener_count(), 0);
    }

    #[test]
    fn test_ids_never_reused() {
        let obs = Observable::new(0);
        let first = obs.on_update(|_| {});
        obs.off_update(first);
        let second = obs.on_update(|_| {});

        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_reentrant_set_completes_before_outer_returns() {
        let obs = Observable::new(0);

        // Clamp to 10 from inside a listener.
        let clamp = obs.clone();
        obs.on_update(move |value| {
            if *value > 10 {
                clamp.set(10);
            }
        });
        let (seen, listener) = recorder::<i32>();
        obs.on_update(listener);

        obs.set(15);

        assert_eq!(obs.get(), 10);
        // Nested fan-out runs first; the outer one still delivers its own value.
        assert_eq!(*seen.borrow(), vec![10, 15]);
    }

    #[test]
    fn test_listener_removed_during_fanout_is_skipped() {
        let obs = Observable::new(0);
        let victim = Rc::new(Cell::new(None));

        let remover = obs.clone();
        let victim_clone = victim.clone();
        obs.on_update(move |_| {
            if let Some(id) = victim_clone.get() {
                remover.off_update(id);
            }
        });

        let (seen, listener) = recorder::<i32>();
        victim.set(Some(obs.on_update(listener)));

        obs.set(1);
        assert!(seen.borrow().is_empty());
        assert_eq!(obs.listener_count(), 1);
    }

    #[test]
    fn test_listener_added_during_fanout_waits_for_next_change() {
        let obs = Observable::new(0);
        let late = Rc::new(Cell::new(0));

        let adder = obs.clone();
        let late_clone = late.clone();
        let added = Cell::new(false);
        obs.on_update(move |_| {
            if !added.replace(true) {
                let late = late_clone.clone();
                adder.on_update(move |_| late.set(late.get() + 1));
            }
        });

        obs.set(1);
        assert_eq!(late.get(), 0);

        obs.set(2);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn test_subscribe_cleanup() {
        let obs = Observable::new(0);
        let (seen, listener) = recorder::<i32>();
        let cleanup = obs.subscribe(listener);

        obs.set(1);
        cleanup();
        obs.set(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(obs.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_cleanup_after_drop() {
        let obs = Observable::new(0);
        let cleanup = obs.subscribe(|_| {});
        drop(obs);
        cleanup();
    }

    #[test]
    fn test_update_and_shared_handles() {
        let obs = Observable::new(1);
        let other = obs.clone();
        assert!(obs.ptr_eq(&other));
        assert!(!obs.ptr_eq(&Observable::new(1)));

        other.update(|v| v + 1);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn test_debug_output() {
        let obs = Observable::new(3);
        obs.on_update(|_| {});
        assert_eq!(format!("{obs:?}"), "Observable { value: 3, listeners: 1 }");
    }

    #[test]
    fn test_off_update_dropping_last_binder_handle() {
        let count = Observable::new(0);
        let binder = TemplateBinder::new("%c%", TextBuffer::new());
        binder.add_state("c", &count);

        let handle = binder.clone();
        let id = count.on_update(move |_| {
            let _ = handle.render();
        });
        drop(binder);

        // Removing the listener drops the last binder handle, which unbinds
        // itself from this same container.
        count.off_update(id);
        assert_eq!(count.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_cleanup_dropping_last_binder_handle() {
        let count = Observable::new(0);
        let binder = TemplateBinder::new("%c%", TextBuffer::new());
        binder.add_state("c", &count);

        let handle = binder.clone();
        let cleanup = count.subscribe(move |_| {
            let _ = handle.render();
        });
        drop(binder);

        cleanup();
        assert_eq!(count.listener_count(), 0);
    }
}
