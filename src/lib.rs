//! vault-reader - minimal client for reading secrets from HashiCorp Vault
//!
//! Picks the first configured authentication strategy:
//! 1. VAULT_APP_ID + VAULT_USER_ID → App-ID login (token revocable)
//! 2. VAULT_TOKEN or ~/.vault-token → static token
//!
//! ```no_run
//! # async fn run() -> Result<(), vault_reader::VaultError> {
//! let client = vault_reader::VaultClient::from_env()?;
//! client.login().await?;
//! let _password = client.read_value("secret/db/password").await?;
//! client.revoke_token().await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod error;
mod models;
mod path;

pub use auth::{AppIdAuth, AuthStrategy, Environ, StaticTokenAuth, select_auth_strategy};
pub use client::{VaultClient, VaultClientBuilder};
pub use error::VaultError;
pub use models::SecretValue;
pub use path::normalize_path;
