use inovoid_flux::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Stored value to theme. Anything other than `light` is dark.
    pub fn from_pref(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// Current theme, stored at `theme/state`.
///
/// `icon` and `label` describe the toggle, i.e. the theme you would switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub theme: Theme,
    pub icon: String,
    pub label: String,
}

impl State for ThemeState {
    const PATH: &'static str = "theme/state";
}

impl ThemeState {
    pub fn new(theme: Theme) -> Self {
        let (icon, label) = match theme {
            Theme::Dark => ("light_mode", "Light Mode"),
            Theme::Light => ("dark_mode", "Dark Mode"),
        };
        Self {
            theme,
            icon: icon.to_string(),
            label: label.to_string(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }
}
