//! Keyed state stores owned by the guide.
//!
//! A store holds one state value and notifies subscribers on every update.
//! Stores live in a [`StoreRegistry`] owned by the composition root rather
//! than in process-wide state, so two guides never share stores.

use std::collections::HashMap;
use std::fmt;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

/// A named state cell with change listeners.
pub struct Store<S> {
    key: String,
    state: S,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
}

impl<S> Store<S> {
    pub fn new(key: impl Into<String>, initial: S) -> Self {
        Self {
            key: key.into(),
            state: initial,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Replace the state with `update(&old)` and notify every subscriber.
    pub fn set_state(&mut self, update: impl FnOnce(&S) -> S) {
        self.state = update(&self.state);
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&S) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// Stores of one guide instance, looked up by key.
pub struct StoreRegistry<S> {
    stores: HashMap<String, Store<S>>,
}

impl<S> Default for StoreRegistry<S> {
    fn default() -> Self {
        Self {
            stores: HashMap::new(),
        }
    }
}

impl<S> StoreRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing store under `key`, or a new one seeded by `init`.
    pub fn get_or_create(&mut self, key: &str, init: impl FnOnce() -> S) -> &mut Store<S> {
        self.stores
            .entry(key.to_string())
            .or_insert_with(|| Store::new(key, init()))
    }

    pub fn get(&self, key: &str) -> Option<&Store<S>> {
        self.stores.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Store<S>> {
        self.stores.get_mut(key)
    }

    /// Drop the store and its subscribers.
    pub fn destroy(&mut self, key: &str) -> Option<Store<S>> {
        self.stores.remove(key)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl<S> fmt::Debug for StoreRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("keys", &self.stores.keys().collect::<Vec<_>>())
            .finish()
    }
}
