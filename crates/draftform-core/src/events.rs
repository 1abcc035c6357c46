//! Typed listener lists used for event fan-out.
//!
//! Every adapter in this crate keeps one [`Listeners`] per event kind instead of
//! loose callback vectors. Registration hands back a [`ListenerId`] that can be
//! used to unsubscribe later.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned when registering a listener.
///
/// Ids are unique for the lifetime of the process, so an adapter holding
/// several lists can resolve an id without knowing which list it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An ordered list of callbacks receiving `&E`.
pub struct Listeners<E: ?Sized> {
    entries: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
}

impl<E: ?Sized> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<E: ?Sized> Listeners<E> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a listener. It will be called after all earlier registrations.
    pub fn add<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId::next();
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener. Returns false if the id is not in this list.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Check if a listener id belongs to this list.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Invoke every listener in registration order.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    /// Drop all listeners.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<i32> = Listeners::new();

        for tag in ["first", "second", "third"] {
            let log = log.clone();
            listeners.add(move |value: &i32| log.borrow_mut().push(format!("{tag}:{value}")));
        }

        listeners.emit(&7);
        assert_eq!(*log.borrow(), vec!["first:7", "second:7", "third:7"]);
    }

    #[test]
    fn test_remove_listener() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners: Listeners<str> = Listeners::new();

        let counter = count.clone();
        let id = listeners.add(move |_: &str| *counter.borrow_mut() += 1);
        assert!(listeners.contains(id));

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.emit("ignored");

        assert_eq!(*count.borrow(), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_lists() {
        let mut a: Listeners<u8> = Listeners::new();
        let mut b: Listeners<u8> = Listeners::new();
        let id_a = a.add(|_| {});
        let id_b = b.add(|_| {});

        assert_ne!(id_a, id_b);
        assert!(!b.contains(id_a));
    }

    #[test]
    fn test_clear() {
        let mut listeners: Listeners<[u8]> = Listeners::new();
        listeners.add(|_| {});
        listeners.add(|_| {});
        assert_eq!(listeners.len(), 2);

        listeners.clear();
        assert!(listeners.is_empty());
    }
}
