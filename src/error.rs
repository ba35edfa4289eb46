use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault not detected: VAULT_ADDR not set")]
    VaultNotDetected,

    #[error("VAULT_ADDR is an unparseable URL ({addr}): {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No Vault auth strategy configured: set VAULT_APP_ID/VAULT_USER_ID or VAULT_TOKEN")]
    NoAuthStrategy,

    #[error("Unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Vault request to {url} failed: {message}")]
    RequestError { url: String, message: String },

    #[error("Invalid JSON body from {url}: {message}")]
    InvalidBody { url: String, message: String },

    #[error("Unexpected HTTP body from {url}, no \"data\" field: {body}")]
    MissingData { url: String, body: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    pub(crate) fn request(url: &str, err: reqwest::Error) -> Self {
        VaultError::RequestError {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
