//! Apache htpasswd file authenticator.
//!
//! Verifies an identity's credential against an htpasswd-style file
//! (`login:hash` per line). The file is read once, eagerly, at
//! construction, so a missing or unreadable file is a configuration error
//! at startup rather than a surprise on the first request.
//!
//! Supported entry formats: the `{SHA}` scheme (base64 of the SHA-1 digest)
//! and plaintext. `$`-prefixed schemes (bcrypt, MD5-apr1, crypt) are not
//! supported and fail verification with a warning.

use crate::config::{AuthConfig, ConfigError};
use crate::strategy::{Authenticator, AuthenticatorSource};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gatehouse_core::Identity;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Authenticator backed by an Apache htpasswd-style credential file.
///
/// # Configuration
///
/// | setting         | required | meaning                     |
/// |-----------------|----------|-----------------------------|
/// | `htpasswd_path` | yes      | path to the credential file |
///
/// The loaded entry map is immutable, so one instance safely serves
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct HtpasswdAuthenticator {
    entries: HashMap<String, String>,
    path: PathBuf,
}

impl HtpasswdAuthenticator {
    /// Returns a strategy source for the pipeline builder.
    #[must_use]
    pub fn source() -> AuthenticatorSource {
        AuthenticatorSource::factory(|config| {
            Ok(Arc::new(Self::from_config(config)?) as Arc<dyn Authenticator>)
        })
    }

    /// Constructs the authenticator from the shared configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] when `htpasswd_path` is
    /// absent, [`ConfigError::FileNotFound`] when the file does not exist,
    /// and [`ConfigError::ReadError`] when it cannot be read.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let path = config.require_str("htpasswd_path").map_err(|err| {
            error!("missing required htpasswd_path configuration setting");
            err
        })?;
        Self::load(Path::new(path))
    }

    /// Loads the credential file at the given path.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_config`], minus the setting lookup.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            error!(path = %path.display(), "htpasswd file does not exist");
            return Err(ConfigError::file_not_found(path));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::read_error(path, source))?;

        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                line.split_once(':')
                    .map(|(login, hash)| (login.to_string(), hash.to_string()))
            })
            .collect();

        Ok(Self {
            entries,
            path: path.to_path_buf(),
        })
    }

    /// Returns the number of loaded credential entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the file held no usable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks a presented key against a stored htpasswd entry.
    fn verify(&self, stored: &str, key: &str) -> bool {
        if let Some(encoded) = stored.strip_prefix("{SHA}") {
            let digest = Sha1::digest(key.as_bytes());
            return STANDARD.encode(digest) == encoded;
        }
        if stored.starts_with('$') {
            warn!(
                path = %self.path.display(),
                "unsupported htpasswd hash scheme; entry cannot verify"
            );
            return false;
        }
        stored == key
    }
}

impl Authenticator for HtpasswdAuthenticator {
    fn name(&self) -> &'static str {
        "htpasswd"
    }

    fn authenticate(&self, identity: &mut Identity) -> bool {
        let Some(key) = identity.key.as_deref() else {
            return false;
        };
        match self.entries.get(&identity.login) {
            Some(stored) => self.verify(stored, key),
            None => {
                debug!(login = %identity.login, "login not present in htpasswd file");
                false
            }
        }
    }
}
