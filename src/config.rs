//! Configuration handed to lookups at construction time.
//!
//! Providers never read the process environment themselves. A [`LookupConfig`] is
//! resolved once by the caller (for instance with [`LookupConfig::from_env`]) and
//! injected through [`LookupBuilder::config`](crate::LookupBuilder::config).

use crate::constants::{SSL_CERT_DIR_ENV, SSL_CERT_FILE_ENV};
use std::path::PathBuf;

/// Default locations of trust material.
///
/// Unset values fall back to provider built-ins: the file provider loads the platform
/// trust anchors, the hash-directory provider searches
/// [`DEFAULT_CERT_DIR`](crate::constants::DEFAULT_CERT_DIR).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LookupConfig {
    /// Bundle loaded by `load_file(None, FileType::Default)`.
    pub default_cert_file: Option<PathBuf>,
    /// Directory list registered by `add_dir(None, FileType::Default)`, separated by
    /// [`PATH_LIST_SEPARATOR`](crate::constants::PATH_LIST_SEPARATOR).
    pub default_cert_dir: Option<String>,
}

impl LookupConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `SSL_CERT_FILE` and `SSL_CERT_DIR` from the process environment.
    ///
    /// Variables that are unset, empty or not valid UTF-8 are treated as unset.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through a key/value lookup function.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use x509_lookup::LookupConfig;
    ///
    /// let vars = HashMap::from([("SSL_CERT_DIR", "/etc/ssl/certs:/usr/local/share/certs")]);
    /// let config = LookupConfig::from_vars(|key| vars.get(key).map(|v| v.to_string()));
    ///
    /// assert_eq!(config.default_cert_dir.as_deref(), Some("/etc/ssl/certs:/usr/local/share/certs"));
    /// assert_eq!(config.default_cert_file, None);
    /// ```
    pub fn from_vars<F>(mut var: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut non_empty = |key: &str| var(key).filter(|v| !v.is_empty());

        Self {
            default_cert_file: non_empty(SSL_CERT_FILE_ENV).map(PathBuf::from),
            default_cert_dir: non_empty(SSL_CERT_DIR_ENV),
        }
    }

    /// Sets the default bundle file.
    #[must_use]
    pub fn with_default_cert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_cert_file = Some(path.into());
        self
    }

    /// Sets the default directory list.
    #[must_use]
    pub fn with_default_cert_dir(mut self, dirs: impl Into<String>) -> Self {
        self.default_cert_dir = Some(dirs.into());
        self
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_vars_reads_both_keys() {
        let vars = HashMap::from([
            (SSL_CERT_FILE_ENV, "/etc/ssl/cert.pem"),
            (SSL_CERT_DIR_ENV, "/etc/ssl/certs"),
        ]);
        let config = LookupConfig::from_vars(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(
            config.default_cert_file,
            Some(PathBuf::from("/etc/ssl/cert.pem"))
        );
        assert_eq!(config.default_cert_dir.as_deref(), Some("/etc/ssl/certs"));
    }

    #[test]
    fn test_from_vars_treats_empty_as_unset() {
        let config = LookupConfig::from_vars(|_| Some(String::new()));
        assert_eq!(config, LookupConfig::default());
    }

    #[test]
    fn test_builder_style_setters() {
        let config = LookupConfig::new()
            .with_default_cert_file("/tmp/bundle.pem")
            .with_default_cert_dir("/tmp/certs");

        assert_eq!(
            config.default_cert_file,
            Some(PathBuf::from("/tmp/bundle.pem"))
        );
        assert_eq!(config.default_cert_dir.as_deref(), Some("/tmp/certs"));
    }
}
