use super::{AuthStrategy, Environ, lookup};
use crate::VaultError;
use async_trait::async_trait;
use std::path::Path;
use url::Url;

const TOKEN_FILE_NAME: &str = ".vault-token";

/// Static token authentication
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// `VAULT_TOKEN` (or `VAULT_TOKEN_FILE`), then `$HOME/.vault-token`
    pub fn from_environ(env: &Environ) -> Option<Self> {
        lookup(env, "VAULT_TOKEN")
            .or_else(|| {
                let path = env.get("HOME").map(|home| Path::new(home).join(TOKEN_FILE_NAME))?;
                read_token_file(&path)
            })
            .map(Self::new)
    }
}

fn read_token_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let token = content.trim();
    if token.is_empty() {
        None
    } else {
        tracing::debug!("Using Vault token from {:?}", path);
        Some(token.to_string())
    }
}

#[async_trait]
impl AuthStrategy for StaticTokenAuth {
    fn name(&self) -> &str {
        "token"
    }

    async fn get_token(
        &self,
        _http: &reqwest::Client,
        _base_url: &Url,
    ) -> Result<String, VaultError> {
        Ok(self.token.clone())
    }

    fn revocable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_static_token_auth() {
        let auth = StaticTokenAuth::new("my-token".to_string());
        let base = Url::parse("http://vault:8200").unwrap();
        let token = auth.get_token(&reqwest::Client::new(), &base).await.unwrap();
        assert_eq!(token, "my-token");
        assert!(!auth.revocable());
    }

    #[test]
    fn test_token_from_home_file() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(TOKEN_FILE_NAME), "home-token\n").unwrap();

        let mut env = Environ::new();
        env.insert("HOME".to_string(), home.path().to_str().unwrap().to_string());

        let auth = StaticTokenAuth::from_environ(&env).unwrap();
        assert_eq!(auth.token, "home-token");
    }

    #[test]
    fn test_env_token_wins_over_home_file() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(TOKEN_FILE_NAME), "home-token").unwrap();

        let mut env = Environ::new();
        env.insert("HOME".to_string(), home.path().to_str().unwrap().to_string());
        env.insert("VAULT_TOKEN".to_string(), "env-token".to_string());

        let auth = StaticTokenAuth::from_environ(&env).unwrap();
        assert_eq!(auth.token, "env-token");
    }

    #[test]
    fn test_not_configured() {
        let home = TempDir::new().unwrap();
        let mut env = Environ::new();
        env.insert("HOME".to_string(), home.path().to_str().unwrap().to_string());

        assert!(StaticTokenAuth::from_environ(&env).is_none());
    }
}
