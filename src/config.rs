//! Credential persistence.
//!
//! The session credential is stored as a small JSON file:
//!
//! ```json
//! {
//!     "ltuid_v2": "123456789",
//!     "ltoken_v2": "v2_..."
//! }
//! ```
//!
//! It is read once at startup and rewritten wholesale whenever the login flow
//! captures new cookies.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application name used for the config and log directories.
pub const APP_NAME: &str = "hoyodaily";

/// Config file name.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("config file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The HoYoLAB session credential: account id plus session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "ltuid_v2", default)]
    pub ltuid: String,
    #[serde(rename = "ltoken_v2", default)]
    pub ltoken: String,
}

impl Credential {
    pub fn new(ltuid: impl Into<String>, ltoken: impl Into<String>) -> Self {
        Credential {
            ltuid: ltuid.into(),
            ltoken: ltoken.into(),
        }
    }

    /// Both fields must be present for claim requests to authenticate.
    pub fn is_logged_in(&self) -> bool {
        !self.ltuid.is_empty() && !self.ltoken.is_empty()
    }

    /// Value for the `Cookie` header of a claim request.
    pub fn cookie_header(&self) -> String {
        format!("ltoken_v2={}; ltuid_v2={};", self.ltoken, self.ltuid)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        set_restrictive_permissions(path);
        Ok(())
    }
}

/// Owns the in-process credential and the file it is persisted to.
///
/// Shared between the scheduler, the tray actions and the login flow as an
/// `Arc<CredentialStore>`.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    credential: RwLock<Credential>,
}

impl CredentialStore {
    /// Creates an empty store backed by `path` without touching the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore {
            path: path.into(),
            credential: RwLock::new(Credential::default()),
        }
    }

    /// Opens the store, loading the credential from `path` if it exists.
    ///
    /// A missing or unreadable file leaves the store empty; the user can
    /// still log in from the tray.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self::new(path);
        if store.path.exists() {
            match Credential::load(&store.path) {
                Ok(credential) => {
                    tracing::info!(
                        path = %store.path.display(),
                        logged_in = credential.is_logged_in(),
                        "Loaded credential"
                    );
                    store.set(credential);
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config {}: {}", store.path.display(), e);
                }
            }
        } else {
            tracing::info!("No config at {}, login required", store.path.display());
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the current credential.
    pub fn snapshot(&self) -> Credential {
        match self.credential.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_logged_in()
    }

    fn set(&self, credential: Credential) {
        match self.credential.write() {
            Ok(mut guard) => *guard = credential,
            Err(poisoned) => *poisoned.into_inner() = credential,
        }
    }

    /// Replaces the credential and persists it.
    ///
    /// The in-memory value is updated even when writing the file fails.
    pub fn replace(&self, credential: Credential) -> Result<(), ConfigError> {
        self.set(credential.clone());
        credential.save(&self.path)?;
        tracing::info!("Credential saved to {}", self.path.display());
        Ok(())
    }
}

fn config_dir_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Default location of the config file.
///
/// A `config.json` next to the executable wins (portable installs); otherwise
/// the per-user config directory is used, whether or not the file exists yet.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(portable) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
        .filter(|path| path.exists())
    {
        return Ok(portable);
    }

    config_dir_path()
        .map(|dir| dir.join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

/// Set restrictive file permissions (0600) on Unix to protect the session token.
#[cfg(unix)]
pub fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let permissions = fs::Permissions::from_mode(0o600);
    if let Err(e) = fs::set_permissions(path, permissions) {
        tracing::warn!(
            "Failed to set restrictive permissions on {}: {}",
            path.display(),
            e
        );
    }
}

#[cfg(not(unix))]
pub fn set_restrictive_permissions(_path: &Path) {}
