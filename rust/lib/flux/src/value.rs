use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A state type stored at a well-known path.
///
/// The platform shell reads `PATH` to bind a view to the value.
pub trait State: Any + Send + Sync {
    const PATH: &'static str;
}

/// A typed request payload routed by path.
pub trait Request: Any + Send + Sync {
    const PATH: &'static str;
}

/// A type-erased, reference-counted state value.
///
/// Clone is an atomic increment; readers share the same allocation.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the value as `T`, or `None` when the stored type differs.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take a shared handle to the value as `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `StateStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Badge {
        count: u64,
    }

    impl State for Badge {
        const PATH: &'static str = "notif/badge";
    }

    #[test]
    fn downcast_ref_matches_stored_type() {
        let v = StateValue::new(Badge { count: 3 });
        assert_eq!(v.downcast_ref::<Badge>(), Some(&Badge { count: 3 }));
        assert!(v.downcast_ref::<u64>().is_none());
    }

    #[test]
    fn downcast_shares_allocation() {
        let v = StateValue::new(vec![1u8, 2, 3]);
        let a = v.downcast::<Vec<u8>>().unwrap();
        let b = v.downcast::<Vec<u8>>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn downcast_wrong_type_is_none() {
        let v = StateValue::new("dark".to_string());
        assert!(v.downcast::<bool>().is_none());
        assert!(v.is::<String>());
        assert_eq!(v.type_id(), TypeId::of::<String>());
    }

    #[test]
    fn state_path_const() {
        assert_eq!(Badge::PATH, "notif/badge");
    }

    #[test]
    fn debug_mentions_type_id() {
        let debug = format!("{:?}", StateValue::new(1u32));
        assert!(debug.contains("StateValue"));
    }

    fn _assert_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<StateValue>();
        assert_sync::<StateValue>();
    }
}
