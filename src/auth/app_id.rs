use super::{AuthStrategy, Environ, lookup};
use crate::VaultError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_MOUNT: &str = "app-id";

/// App-ID authentication
pub struct AppIdAuth {
    pub app_id: String,
    pub user_id: String,
    pub mount: String,
}

impl AppIdAuth {
    pub fn new(app_id: String, user_id: String) -> Self {
        Self {
            app_id,
            user_id,
            mount: DEFAULT_MOUNT.to_string(),
        }
    }

    pub fn with_mount(mut self, mount: String) -> Self {
        self.mount = mount;
        self
    }

    /// Configured only when both the app ID and user ID are available
    pub fn from_environ(env: &Environ) -> Option<Self> {
        let app_id = lookup(env, "VAULT_APP_ID")?;
        let user_id = lookup(env, "VAULT_USER_ID")?;

        let auth = Self::new(app_id, user_id);
        match env.get("VAULT_AUTH_APP_ID_MOUNT").filter(|m| !m.is_empty()) {
            Some(mount) => Some(auth.with_mount(mount.trim_matches('/').to_string())),
            None => Some(auth),
        }
    }

    fn login_url(&self, base_url: &Url) -> String {
        let mut url = base_url.clone();
        url.set_path(&format!("/v1/auth/{}/login", self.mount));
        url.to_string()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    app_id: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: AuthData,
}

#[derive(Deserialize)]
struct AuthData {
    client_token: String,
}

#[async_trait]
impl AuthStrategy for AppIdAuth {
    fn name(&self) -> &str {
        "app-id"
    }

    async fn get_token(&self, http: &reqwest::Client, base_url: &Url) -> Result<String, VaultError> {
        let url = self.login_url(base_url);
        tracing::debug!("Logging in to Vault via {}", url);

        let response = http
            .post(&url)
            .json(&LoginRequest {
                app_id: &self.app_id,
                user_id: &self.user_id,
            })
            .send()
            .await
            .map_err(|e| VaultError::request(&url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::UnexpectedStatus { status, url, body });
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| {
                VaultError::AuthError(format!("Invalid App-ID login response from {}: {}", url, e))
            })?;

        Ok(login.auth.client_token)
    }

    fn revocable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_environ_requires_both_ids() {
        let mut env = Environ::new();
        env.insert("VAULT_APP_ID".to_string(), "app".to_string());
        assert!(AppIdAuth::from_environ(&env).is_none());

        env.insert("VAULT_USER_ID".to_string(), "user".to_string());
        let auth = AppIdAuth::from_environ(&env).unwrap();
        assert_eq!(auth.app_id, "app");
        assert_eq!(auth.user_id, "user");
        assert_eq!(auth.mount, "app-id");
    }

    #[test]
    fn test_user_id_from_file_and_custom_mount() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "user-from-file").unwrap();

        let mut env = Environ::new();
        env.insert("VAULT_APP_ID".to_string(), "app".to_string());
        env.insert(
            "VAULT_USER_ID_FILE".to_string(),
            file.path().to_str().unwrap().to_string(),
        );
        env.insert("VAULT_AUTH_APP_ID_MOUNT".to_string(), "/custom-app-id/".to_string());

        let auth = AppIdAuth::from_environ(&env).unwrap();
        assert_eq!(auth.user_id, "user-from-file");
        assert_eq!(auth.mount, "custom-app-id");
    }

    #[test]
    fn test_login_url() {
        let auth = AppIdAuth::new("app".to_string(), "user".to_string());
        let base = Url::parse("http://vault:8200/").unwrap();
        assert_eq!(auth.login_url(&base), "http://vault:8200/v1/auth/app-id/login");
        assert!(auth.revocable());
    }
}
