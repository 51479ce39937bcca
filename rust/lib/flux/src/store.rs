use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::topic::TopicTable;
use crate::value::{State, StateValue, SubscriptionId};

/// Callback invoked with the changed path and its new value.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

/// Path-keyed view state with pattern subscriptions.
///
/// Writes notify every subscriber whose pattern covers the written path.
/// Handlers run synchronously on the writing thread, after the value
/// lock has been released, so a handler may read the store.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: RwLock<TopicTable<HandlerEntry>>,
    next_id: AtomicU64,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: RwLock::new(TopicTable::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store a typed state at its own path.
    pub fn set<S: State>(&self, value: S) {
        self.set_value(S::PATH, StateValue::new(value));
    }

    /// Store any value at an explicit path (used for per-item paths).
    pub fn set_at<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), value.clone());

        let entries = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(path);
        for entry in entries {
            (entry.handler)(path, &value);
        }
    }

    /// Read a typed state from its path.
    pub fn get<S: State>(&self) -> Option<Arc<S>> {
        self.get_value(S::PATH).and_then(|v| v.downcast::<S>())
    }

    /// Read a typed state and clone it out, falling back to `default`.
    pub fn get_or<S: State + Clone>(&self, default: impl FnOnce() -> S) -> S {
        self.get::<S>()
            .map(|s| (*s).clone())
            .unwrap_or_else(default)
    }

    pub fn get_value(&self, path: &str) -> Option<StateValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Remove a value. Subscribers are not notified.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    /// Children of `prefix` (not `prefix` itself), ordered by path.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let scan_prefix = format!("{}/", prefix);
        values
            .range(scan_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&scan_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                pattern,
                HandlerEntry {
                    id,
                    handler: Arc::new(handler),
                },
            );
        id
    }

    /// Subscribe to one typed state. The handler receives the new value.
    pub fn watch<S, F>(&self, handler: F) -> SubscriptionId
    where
        S: State,
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.subscribe(S::PATH, move |_, value| {
            if let Some(s) = value.downcast_ref::<S>() {
                handler(s);
            }
        })
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain_not(|entry| entry.id == id)
    }

    pub fn paths(&self) -> Vec<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
