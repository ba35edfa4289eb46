use serde::Deserialize;

/// Common shape of a secret's `data` field: `{"value": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretValue {
    pub value: String,
}
