use std::future::Future;
use std::sync::Arc;

use crate::router::Router;
use crate::store::StateStore;
use crate::value::{Request, State, StateValue, SubscriptionId};

/// The view-state engine.
///
/// - `get::<S>()` reads the state a view binds to.
/// - `emit(req)` routes a typed request to its handlers.
/// - `subscribe(pattern, ..)` observes state writes.
///
/// ```ignore
/// let flux = Flux::new();
/// flux.on::<TogglePanelReq, _, _>(|_, store| async move {
///     store.set(PanelState { open: true });
/// });
/// flux.emit(TogglePanelReq).await;
/// assert!(flux.get::<PanelState>().unwrap().open);
/// ```
pub struct Flux {
    store: Arc<StateStore>,
    router: Router,
}

impl Flux {
    pub fn new() -> Self {
        Self {
            store: Arc::new(StateStore::new()),
            router: Router::new(),
        }
    }

    pub fn get<S: State>(&self) -> Option<Arc<S>> {
        self.store.get::<S>()
    }

    pub fn get_value(&self, path: &str) -> Option<StateValue> {
        self.store.get_value(path)
    }

    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        self.store.scan(prefix)
    }

    /// Send a request and wait for every matching handler to finish.
    pub async fn emit<R: Request>(&self, req: R) {
        self.router
            .dispatch(R::PATH, Arc::new(req), Arc::clone(&self.store))
            .await;
    }

    pub fn on<R, F, Fut>(&self, handler: F)
    where
        R: Request,
        F: Fn(Arc<R>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.router.on::<R, F, Fut>(handler);
    }

    pub fn has_handler(&self, path: &str) -> bool {
        self.router.matches(path)
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        self.store.subscribe(pattern, handler)
    }

    pub fn watch<S, F>(&self, handler: F) -> SubscriptionId
    where
        S: State,
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.store.watch::<S, F>(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }
}

impl Default for Flux {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct PanelState {
        open: bool,
    }
    impl State for PanelState {
        const PATH: &'static str = "notif/panel";
    }

    struct TogglePanelReq;
    impl Request for TogglePanelReq {
        const PATH: &'static str = "notif/toggle";
    }

    fn toggling_flux() -> Flux {
        let flux = Flux::new();
        flux.on::<TogglePanelReq, _, _>(|_, store: Arc<StateStore>| async move {
            let open = store.get::<PanelState>().map(|p| p.open).unwrap_or(false);
            store.set(PanelState { open: !open });
        });
        flux
    }

    #[test]
    fn new_is_empty() {
        let flux = Flux::default();
        assert!(flux.get::<PanelState>().is_none());
        assert!(flux.store().is_empty());
    }

    #[tokio::test]
    async fn emit_updates_state() {
        let flux = toggling_flux();
        flux.emit(TogglePanelReq).await;
        assert!(flux.get::<PanelState>().unwrap().open);
        flux.emit(TogglePanelReq).await;
        assert!(!flux.get::<PanelState>().unwrap().open);
    }

    #[tokio::test]
    async fn watchers_see_handler_writes() {
        let flux = toggling_flux();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let id = flux.watch::<PanelState, _>(move |p| s.lock().unwrap().push(p.open));

        flux.emit(TogglePanelReq).await;
        flux.emit(TogglePanelReq).await;
        assert!(flux.unsubscribe(id));
        flux.emit(TogglePanelReq).await;

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn has_handler_reports_registration() {
        let flux = toggling_flux();
        assert!(flux.has_handler(TogglePanelReq::PATH));
        assert!(!flux.has_handler("notif/other"));
    }
}
