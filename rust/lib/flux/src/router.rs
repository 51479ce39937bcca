use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::store::StateStore;
use crate::topic::TopicTable;
use crate::value::Request;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type Payload = Arc<dyn Any + Send + Sync>;

/// Returns `None` when the payload is not the type the handler was registered for.
type ErasedHandler = Arc<dyn Fn(Payload, Arc<StateStore>) -> Option<BoxFuture> + Send + Sync>;

/// Maps request paths to async handlers.
///
/// Several handlers may share a path (or cover it with a wildcard);
/// they run one after another in registration order.
pub struct Router {
    table: RwLock<TopicTable<ErasedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(TopicTable::new()),
        }
    }

    /// Register a handler for request type `R` at `R::PATH`.
    pub fn on<R, F, Fut>(&self, handler: F)
    where
        R: Request,
        F: Fn(Arc<R>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: ErasedHandler = Arc::new(move |payload: Payload, store: Arc<StateStore>| {
            let req = payload.downcast::<R>().ok()?;
            Some(Box::pin(handler(req, store)) as BoxFuture)
        });
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(R::PATH, erased);
    }

    /// Run every handler covering `path`. Unmatched paths are a no-op.
    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) {
        let handlers = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(path);
        if handlers.is_empty() {
            debug!(path, "no handler for request");
            return;
        }
        for handler in handlers {
            match handler(Arc::clone(&payload), Arc::clone(&store)) {
                Some(fut) => fut.await,
                None => warn!(path, "request payload type mismatch"),
            }
        }
    }

    pub fn has_handler(&self, pattern: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_pattern(pattern)
    }

    pub fn matches(&self, path: &str) -> bool {
        !self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(path)
            .is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct TogglePanel;
    impl Request for TogglePanel {
        const PATH: &'static str = "notif/toggle";
    }

    struct MarkRead {
        id: String,
    }
    impl Request for MarkRead {
        const PATH: &'static str = "notif/mark-read";
    }

    #[tokio::test]
    async fn dispatch_typed_payload() {
        let router = Router::new();
        let store = Arc::new(StateStore::new());

        router.on::<MarkRead, _, _>(|req, store| async move {
            store.set_at("last-read", req.id.clone());
        });

        router
            .dispatch(MarkRead::PATH, Arc::new(MarkRead { id: "n1".into() }), store.clone())
            .await;

        let v = store.get_value("last-read").unwrap();
        assert_eq!(v.downcast_ref::<String>().unwrap(), "n1");
    }

    #[tokio::test]
    async fn unmatched_path_is_noop() {
        let router = Router::new();
        router
            .dispatch("missing", Arc::new(()), Arc::new(StateStore::new()))
            .await;
        assert!(!router.matches("missing"));
    }

    #[tokio::test]
    async fn mismatched_payload_is_skipped() {
        let router = Router::new();
        let calls = Arc::new(AtomicU64::new(0));
        let c = calls.clone();
        router.on::<TogglePanel, _, _>(move |_, _| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
            }
        });

        router
            .dispatch(TogglePanel::PATH, Arc::new(42u32), Arc::new(StateStore::new()))
            .await;
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn multiple_handlers_run_in_order() {
        let router = Router::new();
        let store = Arc::new(StateStore::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for n in 0..3u32 {
            let o = order.clone();
            router.on::<TogglePanel, _, _>(move |_, _| {
                let o = o.clone();
                async move {
                    o.lock().unwrap().push(n);
                }
            });
        }

        router
            .dispatch(TogglePanel::PATH, Arc::new(TogglePanel), store)
            .await;
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert!(router.has_handler(TogglePanel::PATH));
    }
}
