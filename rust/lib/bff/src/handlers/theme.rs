//! Light/dark theme, persisted as a preference.

use std::sync::Arc;

use inovoid_flux::{Flux, StateStore};
use tracing::{info, warn};

use crate::prefs::PreferenceStore;
use crate::request::{SetThemeReq, ToggleThemeReq};
use crate::state::{Theme, ThemeState};

pub const THEME_KEY: &str = "inovoid-theme";

pub struct ThemeController {
    prefs: Arc<dyn PreferenceStore>,
    store: Arc<StateStore>,
}

impl ThemeController {
    pub fn new(prefs: Arc<dyn PreferenceStore>, store: Arc<StateStore>) -> Arc<Self> {
        Arc::new(Self { prefs, store })
    }

    /// Publish the saved theme. Nothing saved means dark.
    pub fn init_theme(&self) -> Theme {
        let theme = Theme::from_pref(self.prefs.get(THEME_KEY).as_deref());
        self.store.set(ThemeState::new(theme));
        theme
    }

    pub fn toggle_theme(&self) -> Theme {
        let current = match self.store.get::<ThemeState>() {
            Some(state) => state.theme,
            None => self.init_theme(),
        };
        let next = current.toggled();
        self.set_theme(next);
        next
    }

    pub fn set_theme(&self, theme: Theme) {
        if let Err(e) = self.prefs.set(THEME_KEY, theme.as_str()) {
            warn!(error = %e, "theme preference not saved");
        }
        info!(theme = theme.as_str(), "theme changed");
        self.store.set(ThemeState::new(theme));
    }

    pub fn register(self: &Arc<Self>, flux: &Flux) {
        {
            let this = Arc::clone(self);
            flux.on::<ToggleThemeReq, _, _>(move |_, _| {
                let this = Arc::clone(&this);
                async move {
                    this.toggle_theme();
                }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<SetThemeReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move {
                    this.set_theme(req.0);
                }
            });
        }
    }
}
