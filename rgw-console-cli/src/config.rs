//! Local JSON configuration: endpoint, region and named user credentials.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Contents of the console's configuration file.
///
/// Keys used by the admin and object menus (`admin-endpoint`, `object-path`)
/// may be present and are ignored here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalConfig {
    /// S3 endpoint of the RGW gateway, e.g. `http://127.0.0.1:8000`.
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// User picked when `--user` is not given.
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub users: Vec<UserCredentials>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserCredentials {
    pub name: String,
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("name", &self.name)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl LocalConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn user(&self, name: &str) -> Option<&UserCredentials> {
        self.users.iter().find(|user| user.name == name)
    }

    /// Credentials for `requested`, falling back to `default-user`.
    ///
    /// `Ok(None)` means no user was selected at all and the ambient AWS
    /// credential chain should be used.
    pub fn resolve_user(&self, requested: Option<&str>) -> Result<Option<&UserCredentials>> {
        let Some(name) = requested.or(self.default_user.as_deref()) else {
            return Ok(None);
        };
        self.user(name)
            .map(Some)
            .ok_or_else(|| anyhow!("Unknown user `{name}` in config"))
    }
}
