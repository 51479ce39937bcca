//! Theme preference.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use inovoid_bff::state::{Theme, ThemeState};
use inovoid_bff::{FilePrefs, ThemeController};
use inovoid_flux::Flux;

use crate::config;

fn controller(config_path: &Path, flux: &Flux) -> Result<Arc<ThemeController>> {
    let prefs = FilePrefs::open(config::prefs_path(config_path))?;
    let ctl = ThemeController::new(Arc::new(prefs), Arc::clone(flux.store()));
    ctl.init_theme();
    Ok(ctl)
}

fn print(flux: &Flux) {
    if let Some(state) = flux.get::<ThemeState>() {
        println!("{} (toggle: {})", state.theme.as_str(), state.label);
    }
}

pub fn show(config_path: &Path) -> Result<()> {
    let flux = Flux::new();
    controller(config_path, &flux)?;
    print(&flux);
    Ok(())
}

pub fn toggle(config_path: &Path) -> Result<()> {
    let flux = Flux::new();
    controller(config_path, &flux)?.toggle_theme();
    print(&flux);
    Ok(())
}

pub fn set(config_path: &Path, theme: &str) -> Result<()> {
    let theme: Theme = theme.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let flux = Flux::new();
    controller(config_path, &flux)?.set_theme(theme);
    print(&flux);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_persists_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        set(&config_path, "light").unwrap();

        let flux = Flux::new();
        controller(&config_path, &flux).unwrap();
        assert_eq!(flux.get::<ThemeState>().unwrap().theme, Theme::Light);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(set(&dir.path().join("config.toml"), "sepia").is_err());
    }
}
