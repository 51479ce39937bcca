//! Authentication requests.

use inovoid_flux::Request;

#[derive(Debug, Clone)]
pub struct SignInReq {
    pub email: String,
    pub password: String,
}

impl Request for SignInReq {
    const PATH: &'static str = "auth/sign-in";
}

#[derive(Debug, Clone)]
pub struct SignUpReq {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Request for SignUpReq {
    const PATH: &'static str = "auth/sign-up";
}

#[derive(Debug, Clone)]
pub struct SignOutReq;

impl Request for SignOutReq {
    const PATH: &'static str = "auth/sign-out";
}

#[derive(Debug, Clone)]
pub struct UpdatePasswordReq {
    pub new_password: String,
}

impl Request for UpdatePasswordReq {
    const PATH: &'static str = "auth/update-password";
}

/// Re-read the session into `auth/nav` (page load).
#[derive(Debug, Clone)]
pub struct RefreshNavReq;

impl Request for RefreshNavReq {
    const PATH: &'static str = "auth/refresh-nav";
}
