/// Credential record kept in chrome.storage.sync

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_KEY: &str = "storyblok_token";
pub const SPACE_KEY: &str = "storyblok_space";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Please fill in both fields")]
    MissingFields,
}

/// Access token and space id. Always stored and cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "storyblok_token")]
    pub access_token: String,
    #[serde(rename = "storyblok_space")]
    pub space_id: String,
}

impl Credentials {
    /// Build credentials from form input. Both fields are trimmed and must be non-empty.
    pub fn from_input(token: &str, space_id: &str) -> Result<Self, CredentialError> {
        let token = token.trim();
        let space_id = space_id.trim();

        if token.is_empty() || space_id.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        Ok(Credentials {
            access_token: token.to_string(),
            space_id: space_id.to_string(),
        })
    }
}

/// Raw shape read back from storage, where either key may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub storyblok_token: Option<String>,
    #[serde(default)]
    pub storyblok_space: Option<String>,
}

impl StoredCredentials {
    /// Only a record with both fields present counts as credentials
    pub fn into_credentials(self) -> Option<Credentials> {
        match (self.storyblok_token, self.storyblok_space) {
            (Some(token), Some(space)) if !token.is_empty() && !space.is_empty() => {
                Some(Credentials {
                    access_token: token,
                    space_id: space,
                })
            }
            _ => None,
        }
    }
}
