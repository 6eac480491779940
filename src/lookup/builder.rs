use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::lookup::{Lookup, LookupMethod};
use crate::name::{NameHasher, OpenSslNameHasher};
use crate::prelude::debug;
use crate::sink::{ErrorSink, LogSink};
use crate::store::X509Store;
use crate::trust_anchors::{SystemTrustAnchors, TrustAnchorSource};
use std::fmt::Debug;
use std::sync::Arc;

/// Builder for [`Lookup`].
///
/// Every collaborator has a default: a fresh store, an empty [`LookupConfig`], the
/// OpenSSL-compatible name hash, the system trust bundle and a [`LogSink`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use x509_lookup::{ErrorQueue, Lookup, LookupConfig, LookupMethod, X509Store};
///
/// let store = Arc::new(X509Store::new());
/// let errors = Arc::new(ErrorQueue::new());
///
/// let lookup = Lookup::builder(LookupMethod::hash_dir())
///     .store(store.clone())
///     .config(LookupConfig::new().with_default_cert_dir("/etc/ssl/certs"))
///     .error_sink(errors.clone())
///     .build()?;
///
/// assert!(Arc::ptr_eq(lookup.store(), &store));
/// # Ok::<(), x509_lookup::LookupError>(())
/// ```
pub struct LookupBuilder {
    method: &'static LookupMethod,
    store: Option<Arc<X509Store>>,
    config: LookupConfig,
    name_hasher: Option<Arc<dyn NameHasher>>,
    trust_anchors: Option<Arc<dyn TrustAnchorSource>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
}

impl Debug for LookupBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupBuilder")
            .field("method", &self.method.name)
            .field("store", &self.store)
            .field("config", &self.config)
            .field(
                "name_hasher",
                &self.name_hasher.as_ref().map(|_| "<NameHasher>"),
            )
            .field(
                "trust_anchors",
                &self.trust_anchors.as_ref().map(|_| "<TrustAnchorSource>"),
            )
            .field(
                "error_sink",
                &self.error_sink.as_ref().map(|_| "<ErrorSink>"),
            )
            .finish()
    }
}

impl LookupBuilder {
    /// Creates a builder for a lookup bound to `method`.
    pub fn new(method: &'static LookupMethod) -> Self {
        Self {
            method,
            store: None,
            config: LookupConfig::default(),
            name_hasher: None,
            trust_anchors: None,
            error_sink: None,
        }
    }

    /// Sets the store the lookup loads into and searches.
    #[must_use]
    pub fn store(mut self, store: Arc<X509Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the default locations of trust material.
    #[must_use]
    pub fn config(mut self, config: LookupConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the hasher that maps names to bucket file names.
    #[must_use]
    pub fn name_hasher(mut self, hasher: Arc<dyn NameHasher>) -> Self {
        self.name_hasher = Some(hasher);
        self
    }

    /// Sets the source of platform trust anchors.
    #[must_use]
    pub fn trust_anchors(mut self, source: Arc<dyn TrustAnchorSource>) -> Self {
        self.trust_anchors = Some(source);
        self
    }

    /// Sets the sink that receives reported errors.
    #[must_use]
    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Builds the lookup and runs the method's `construct` hook.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidConfiguration`] if `construct` fails. The
    /// `destruct` hook is not run for a lookup that was never constructed.
    pub fn build(self) -> Result<Lookup, LookupError> {
        let method = self.method;
        let mut lookup = Lookup {
            method,
            initialized: false,
            disabled: false,
            destroyed: false,
            state: None,
            store: self.store.unwrap_or_default(),
            config: self.config,
            name_hasher: self
                .name_hasher
                .unwrap_or_else(|| Arc::new(OpenSslNameHasher)),
            trust_anchors: self
                .trust_anchors
                .unwrap_or_else(|| Arc::new(SystemTrustAnchors::new())),
            error_sink: self.error_sink.unwrap_or_else(|| Arc::new(LogSink)),
        };

        if let Some(construct) = method.construct {
            if let Err(e) = construct(&mut lookup) {
                lookup.destroyed = true;
                let err = match e {
                    e @ LookupError::InvalidConfiguration { .. } => e,
                    e => LookupError::InvalidConfiguration {
                        method: method.name,
                        reason: e.to_string(),
                    },
                };
                lookup.report(&err);
                return Err(err);
            }
        }

        debug!("Lookup constructed: method={}", method.name);
        Ok(lookup)
    }
}
