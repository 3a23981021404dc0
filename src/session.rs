//! Session store
//!
//! Process-wide auth state: the bearer token and the cached user, persisted
//! in `localStorage` so a reload rehydrates the session. Populated by
//! `login`/`register`, refreshed by `fetch_current_user`, cleared by
//! `logout`. The REST calls themselves live in `api`; this module owns only
//! the cached state and its lifecycle.

use crate::api;
use crate::types::User;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// The bearer token of the current session, if any.
pub fn token() -> Option<String> {
    storage().and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
}

/// The cached user, rehydrated from durable storage.
pub fn current_user() -> Option<User> {
    let raw = storage().and_then(|s| s.get_item(USER_KEY).ok().flatten())?;
    serde_json::from_str(&raw).ok()
}

pub fn is_authenticated() -> bool {
    token().is_some()
}

fn store(token: &str, user: &User) {
    let Some(storage) = storage() else { return };
    let _ = storage.set_item(TOKEN_KEY, token);
    if let Ok(json) = serde_json::to_string(user) {
        let _ = storage.set_item(USER_KEY, &json);
    }
}

/// Authenticate and populate the session.
pub async fn login(email: &str, password: &str) -> Result<User, String> {
    let auth = api::login(email, password).await?;
    store(&auth.token, &auth.user);
    Ok(auth.user)
}

/// Create an account and populate the session.
pub async fn register(full_name: &str, email: &str, password: &str) -> Result<User, String> {
    let auth = api::register(full_name, email, password).await?;
    store(&auth.token, &auth.user);
    Ok(auth.user)
}

/// Re-fetch the current user and refresh the cached copy.
pub async fn fetch_current_user() -> Result<User, String> {
    let user = api::me().await?;
    if let Some(storage) = storage() {
        if let Ok(json) = serde_json::to_string(&user) {
            let _ = storage.set_item(USER_KEY, &json);
        }
    }
    Ok(user)
}

/// Clear the session. Safe to call when already logged out.
pub fn logout() {
    let Some(storage) = storage() else { return };
    let _ = storage.remove_item(TOKEN_KEY);
    let _ = storage.remove_item(USER_KEY);
}
