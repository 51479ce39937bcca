//! Handler components and their flux wiring.
//!
//! Each component owns one slice of the view state and exposes its
//! operations as methods; `register` routes the matching requests to them.

pub mod notifications;
pub mod session;
pub mod theme;
pub mod toast;

use std::sync::Arc;

use inovoid_flux::Flux;

use crate::backend::{AuthBackend, NotificationBackend, NotificationSource, ProfileBackend};
use crate::location::Location;
use crate::prefs::PreferenceStore;

use self::notifications::Notifications;
use self::session::SessionGuard;
use self::theme::ThemeController;

/// Everything the components talk to.
#[derive(Clone)]
pub struct Backends {
    pub notifications: Arc<dyn NotificationBackend>,
    pub realtime: Arc<dyn NotificationSource>,
    pub auth: Arc<dyn AuthBackend>,
    pub profiles: Arc<dyn ProfileBackend>,
    pub prefs: Arc<dyn PreferenceStore>,
}

pub struct Components {
    pub notifications: Arc<Notifications>,
    pub session: Arc<SessionGuard>,
    pub theme: Arc<ThemeController>,
}

/// Build the components for one page and register all their handlers.
pub fn register_handlers(flux: &Flux, backends: Backends, location: Location) -> Components {
    let store = Arc::clone(flux.store());

    let notifications = Notifications::new(
        backends.notifications,
        backends.realtime,
        Arc::clone(&store),
        location.clone(),
    );
    let session = Arc::new(
        SessionGuard::new(backends.auth, backends.profiles, Arc::clone(&store), location)
            .with_notifications(Arc::clone(&notifications)),
    );
    let theme = ThemeController::new(backends.prefs, store);

    toast::register(flux);
    notifications.register(flux);
    session.register(flux);
    theme.register(flux);
    theme.init_theme();

    Components {
        notifications,
        session,
        theme,
    }
}
