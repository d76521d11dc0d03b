//! Service credentials

use crate::spotify::ServiceError;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Optional file of `KEY=value` lines read at startup
pub const DOTENV_FILE: &str = ".env";

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "SPOTIFY_ACCESS_TOKEN";

/// API credentials, read once at startup and handed to the client
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,

    /// User-authorized token, only needed to create or modify playlists
    pub access_token: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
        }
    }

    /// Attach a user access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Read credentials from the process environment, then from the dotenv
    /// file at `path` for anything the environment does not set.
    ///
    /// A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ServiceError> {
        let file_vars = read_dotenv(path)?;
        Self::from_lookup(|name| {
            env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let get = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ServiceError::MissingCredential(name))
        };

        Ok(Self {
            client_id: get(CLIENT_ID_VAR)?,
            client_secret: get(CLIENT_SECRET_VAR)?,
            access_token: lookup(ACCESS_TOKEN_VAR).filter(|v| !v.is_empty()),
        })
    }
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ServiceError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    log::debug!("Reading credentials file {:?}", path);

    let mut vars = HashMap::new();
    for entry in dotenvy::from_path_iter(path)? {
        let (key, value) = entry?;
        vars.insert(key, value);
    }
    Ok(vars)
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
