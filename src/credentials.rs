//! Process-wide access credential for the dataset source.
//!
//! Only [`DatatableSource`](crate::source::DatatableSource) reads the key, and
//! it does so once at construction. The parsing engine never touches it.

use std::sync::{PoisonError, RwLock};

use log::{debug, warn};

pub const AUTH_TOKEN_ENV: &str = "NASDAQ_AUTH_TOKEN";
pub const LEGACY_AUTH_TOKEN_ENV: &str = "QUANDL_AUTH_TOKEN";

static API_KEY: RwLock<Option<String>> = RwLock::new(None);

/// Installs `key` as the process credential. Blank keys are ignored and
/// leave any previous key in place.
pub fn set_api_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        debug!("The API key for the dataset source was not provided or is empty");
        return false;
    }
    *API_KEY.write().unwrap_or_else(PoisonError::into_inner) = Some(key.to_string());
    true
}

pub fn clear_api_key() {
    *API_KEY.write().unwrap_or_else(PoisonError::into_inner) = None;
}

pub fn api_key() -> Option<String> {
    API_KEY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn is_api_key_set() -> bool {
    API_KEY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Reads the credential from the environment.
pub fn init_from_env() -> bool {
    init_from_lookup(|name| std::env::var(name).ok())
}

/// Resolves the credential through `lookup`, preferring [`AUTH_TOKEN_ENV`]
/// over the obsolete [`LEGACY_AUTH_TOKEN_ENV`].
pub fn init_from_lookup<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        return set_api_key(&token);
    }
    if let Some(token) = lookup(LEGACY_AUTH_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        warn!("'{LEGACY_AUTH_TOKEN_ENV}' is obsolete, use '{AUTH_TOKEN_ENV}' instead");
        return set_api_key(&token);
    }
    false
}
