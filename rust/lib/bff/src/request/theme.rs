use inovoid_flux::Request;

use crate::state::Theme;

#[derive(Debug, Clone)]
pub struct ToggleThemeReq;

impl Request for ToggleThemeReq {
    const PATH: &'static str = "theme/toggle";
}

#[derive(Debug, Clone)]
pub struct SetThemeReq(pub Theme);

impl Request for SetThemeReq {
    const PATH: &'static str = "theme/set";
}
