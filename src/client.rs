use crate::auth::{self, AuthStrategy, Environ};
use crate::error::VaultError;
use crate::models::SecretValue;
use crate::path::api_path;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const TOKEN_HEADER: &str = "X-Vault-Token";
const REVOKE_SELF_PATH: &str = "/v1/auth/token/revoke-self";

pub struct VaultClientBuilder {
    base_url: Option<String>,
    auth: Option<Arc<dyn AuthStrategy>>,
    environ: Option<Environ>,
    timeout: Duration,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth: None,
            environ: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use `auth` instead of selecting a strategy from the environment
    pub fn auth(mut self, auth: impl AuthStrategy + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Resolve unset options from `environ` rather than the process environment
    pub fn environ(mut self, environ: Environ) -> Self {
        self.environ = Some(environ);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_base_url(&self, env: &Environ) -> Result<Url, VaultError> {
        let addr = self
            .base_url
            .clone()
            .or_else(|| env.get("VAULT_ADDR").cloned())
            .ok_or(VaultError::VaultNotDetected)?;

        Url::parse(&addr).map_err(|source| VaultError::InvalidAddress { addr, source })
    }

    pub fn build(self) -> Result<VaultClient, VaultError> {
        let env = match &self.environ {
            Some(env) => env.clone(),
            None => auth::process_environ(),
        };

        let base_url = self.resolve_base_url(&env)?;
        let auth = match self.auth {
            Some(auth) => auth,
            None => auth::select_auth_strategy(&env)?,
        };

        tracing::debug!("Vault client for {} using {} auth", base_url, auth.name());

        Ok(VaultClient {
            base_url,
            auth,
            token: Mutex::new(String::new()),
            http: OnceCell::new(),
            timeout: self.timeout,
        })
    }
}

/// Reads secrets from Vault with a token obtained through an [`AuthStrategy`].
///
/// The HTTP transport is created on first use and shared by every later call.
pub struct VaultClient {
    base_url: Url,
    auth: Arc<dyn AuthStrategy>,
    token: Mutex<String>,
    http: OnceCell<reqwest::Client>,
    timeout: Duration,
}

impl VaultClient {
    pub fn from_env() -> Result<Self, VaultError> {
        VaultClientBuilder::new().build()
    }

    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth_name(&self) -> &str {
        self.auth.name()
    }

    /// Currently cached token; empty before login and after a revoke
    pub async fn token(&self) -> String {
        self.token.lock().await.clone()
    }

    async fn http(&self) -> Result<&reqwest::Client, VaultError> {
        self.http
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(|e| VaultError::request(self.base_url.as_str(), e))
            })
            .await
    }

    fn endpoint(&self, path: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.to_string()
    }

    /// Obtain a token from the auth strategy and cache it
    pub async fn login(&self) -> Result<(), VaultError> {
        let http = self.http().await?;
        let token = self.auth.get_token(http, &self.base_url).await?;
        *self.token.lock().await = token;

        tracing::info!("Logged in to Vault at {} with {} auth", self.base_url, self.auth.name());
        Ok(())
    }

    /// Read the secret at `path` and return its `data` field as JSON bytes
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, VaultError> {
        let url = self.endpoint(&api_path(path));
        let http = self.http().await?;
        let token = self.token.lock().await.clone();

        tracing::debug!("Reading secret from {}", url);

        let response = http
            .get(&url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| VaultError::request(&url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| VaultError::request(&url, e))?;

        if status != 200 {
            return Err(VaultError::UnexpectedStatus { status, url, body });
        }

        extract_data(url, body)
    }

    /// Read the secret at `path` and decode its `data` field into `T`
    pub async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, VaultError> {
        let data = self.read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Read a secret shaped as `{"data": {"value": "..."}}`
    pub async fn read_value(&self, path: &str) -> Result<String, VaultError> {
        self.read_json::<SecretValue>(path)
            .await
            .map(|secret| secret.value)
    }

    /// Revoke the cached token and forget it.
    ///
    /// Does nothing for strategies whose tokens are not revocable.
    pub async fn revoke_token(&self) -> Result<(), VaultError> {
        if !self.auth.revocable() {
            tracing::debug!("{} auth token is not revocable, skipping", self.auth.name());
            return Ok(());
        }

        let url = self.endpoint(REVOKE_SELF_PATH);
        let http = self.http().await?;

        // Held until the token is cleared so no read can pick up a revoked token.
        let mut token = self.token.lock().await;

        let response = http
            .post(&url)
            .header(TOKEN_HEADER, token.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Error while revoking Vault token at {}: {}", url, e);
                VaultError::request(&url, e)
            })?;

        let status = response.status().as_u16();
        if status != 204 {
            tracing::warn!("Unexpected HTTP status {} on revoke-self from {}", status, url);
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::UnexpectedStatus { status, url, body });
        }

        token.clear();
        tracing::debug!("Vault token revoked");
        Ok(())
    }
}

fn extract_data(url: String, body: String) -> Result<Vec<u8>, VaultError> {
    let mut envelope: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&body)
    {
        Ok(envelope) => envelope,
        Err(e) => {
            return Err(VaultError::InvalidBody {
                url,
                message: e.to_string(),
            });
        }
    };

    match envelope.remove("data") {
        Some(data) => Ok(serde_json::to_vec(&data)?),
        None => Err(VaultError::MissingData { url, body }),
    }
}
