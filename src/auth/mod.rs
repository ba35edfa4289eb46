mod app_id;
mod token;

pub use app_id::AppIdAuth;
pub use token::StaticTokenAuth;

use crate::VaultError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Snapshot of the process environment used to configure auth strategies
pub type Environ = HashMap<String, String>;

/// Trait for authentication strategies
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    /// Obtain a token from Vault at `base_url`
    async fn get_token(
        &self,
        http: &reqwest::Client,
        base_url: &Url,
    ) -> Result<String, VaultError>;

    /// Whether the token can be revoked via revoke-self
    fn revocable(&self) -> bool;
}

type StrategyCtor = fn(&Environ) -> Option<Arc<dyn AuthStrategy>>;

/// Strategies in priority order; the first configured one wins.
const STRATEGIES: &[StrategyCtor] = &[app_id_strategy, static_token_strategy];

fn app_id_strategy(env: &Environ) -> Option<Arc<dyn AuthStrategy>> {
    AppIdAuth::from_environ(env).map(|auth| Arc::new(auth) as Arc<dyn AuthStrategy>)
}

fn static_token_strategy(env: &Environ) -> Option<Arc<dyn AuthStrategy>> {
    StaticTokenAuth::from_environ(env).map(|auth| Arc::new(auth) as Arc<dyn AuthStrategy>)
}

pub fn select_auth_strategy(env: &Environ) -> Result<Arc<dyn AuthStrategy>, VaultError> {
    STRATEGIES
        .iter()
        .find_map(|ctor| ctor(env))
        .ok_or(VaultError::NoAuthStrategy)
}

pub(crate) fn process_environ() -> Environ {
    std::env::vars().collect()
}

/// Look up `name`, falling back to the file named by `{name}_FILE`.
///
/// Empty values and unreadable files count as unset.
pub(crate) fn lookup(env: &Environ, name: &str) -> Option<String> {
    if let Some(value) = env.get(name).filter(|v| !v.is_empty()) {
        return Some(value.clone());
    }

    let path = env.get(&format!("{}_FILE", name))?;
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()).filter(|v| !v.is_empty()),
        Err(e) => {
            tracing::warn!("Failed to read {}_FILE from {}: {}", name, path, e);
            None
        }
    }
}
