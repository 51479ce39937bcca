//! Login / logout / signup / whoami.

use anyhow::Result;
use inovoid_bff::state::{AuthState, NavAuth};
use inovoid_flux::Flux;

use super::Runtime;

fn auth_error(flux: &Flux) -> Option<String> {
    flux.get::<AuthState>().and_then(|s| s.error.clone())
}

pub async fn login(rt: &Runtime, email: &str, password: &str) -> Result<()> {
    let flux = Flux::new();
    let guard = rt.guard(&flux);
    if !guard.sign_in(email, password).await {
        anyhow::bail!(
            "Login failed: {}",
            auth_error(&flux).unwrap_or_else(|| "unknown error".into())
        );
    }
    let name = flux
        .get::<NavAuth>()
        .and_then(|n| n.display_name.clone())
        .unwrap_or_else(|| email.to_string());
    println!("Logged in as {}.", name);
    Ok(())
}

pub async fn logout(rt: &Runtime) -> Result<()> {
    let flux = Flux::new();
    rt.guard(&flux).sign_out().await;
    println!("Logged out.");
    Ok(())
}

pub async fn signup(rt: &Runtime, email: &str, full_name: &str, password: &str) -> Result<()> {
    let flux = Flux::new();
    let guard = rt.guard(&flux);
    if !guard.sign_up(email, password, full_name).await {
        anyhow::bail!(
            "Signup failed: {}",
            auth_error(&flux).unwrap_or_else(|| "unknown error".into())
        );
    }
    if rt.session.current_user().await.is_some() {
        println!("Signed up and logged in as {}.", email);
    } else {
        println!("Signed up. Check {} for a confirmation link, then log in.", email);
    }
    Ok(())
}

pub async fn whoami(rt: &Runtime) -> Result<()> {
    let user = rt.require_user().await?;
    let flux = Flux::new();
    rt.guard(&flux).update_nav_auth().await;
    let nav = flux.get::<NavAuth>().map(|n| (*n).clone()).unwrap_or_default();

    println!("{:<10} {}", "ID", user.id);
    println!("{:<10} {}", "EMAIL", user.email.as_deref().unwrap_or("-"));
    println!("{:<10} {}", "NAME", nav.display_name.as_deref().unwrap_or("-"));
    println!("{:<10} {}", "AVATAR", nav.avatar_url.as_deref().unwrap_or("-"));
    Ok(())
}
