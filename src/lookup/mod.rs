//! The lookup dispatch layer.
//!
//! A [`Lookup`] binds a [`LookupMethod`] to a shared [`X509Store`] and forwards
//! control commands and queries to the method's hooks. Two methods are built in:
//!
//! - [`LookupMethod::file`] loads whole files into the store on request.
//! - [`LookupMethod::hash_dir`] resolves subject queries lazily from hashed directories.
//!
//! Failures that callers are expected to tolerate (a malformed block in a bundle, an
//! unsupported query) are recorded to the lookup's [`ErrorSink`] while the operation
//! returns a sentinel (`Ok(false)`, `Ok(None)` or a partial count).

use crate::config::LookupConfig;
use crate::error::{LookupError, Operation};
use crate::name::{NameHasher, X509Name};
use crate::sink::ErrorSink;
use crate::store::{ObjectType, X509Object, X509Store};
use crate::trust_anchors::TrustAnchorSource;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

mod builder;
pub mod dir;
pub mod file;
mod method;

pub use builder::LookupBuilder;
pub use method::{
    ByAliasFn, ByFingerprintFn, ByIssuerSerialFn, BySubjectFn, ConstructFn, ControlFn,
    DestructFn, LifecycleFn, LookupMethod,
};

/// Encoding of a file handed to a loader.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FileType {
    /// Zero or more PEM blocks, with arbitrary text between them.
    Pem,
    /// Exactly one DER-encoded object.
    Der,
    /// Use the provider's default location, always read as PEM.
    Default,
}

impl FileType {
    /// Returns the numeric code of this file type, as carried by [`Lookup::control`].
    pub const fn code(self) -> i64 {
        match self {
            Self::Pem => 1,
            Self::Der => 2,
            Self::Default => 3,
        }
    }
}

impl TryFrom<i64> for FileType {
    type Error = LookupError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Pem),
            2 => Ok(Self::Der),
            3 => Ok(Self::Default),
            other => Err(LookupError::BadFileType(other)),
        }
    }
}

/// Commands understood by [`Lookup::control`].
///
/// Each provider handles the commands it knows and answers `Ok(false)` to the others.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ControlCommand {
    /// Load a file into the store. Handled by the file provider.
    LoadFile,
    /// Register a directory list. Handled by the hash-directory provider.
    AddDir,
}

/// A lookup method bound to a store.
///
/// The lifecycle is `build` (runs `construct`), optional [`init`](Self::init) and
/// [`shutdown`](Self::shutdown), then [`destruct`](Self::destruct), which also runs on
/// drop. Queries on a lookup with no hook for them fail with
/// [`LookupError::UnsupportedOperation`]; a disabled lookup answers every query with
/// `Ok(None)` without calling any hook.
pub struct Lookup {
    method: &'static LookupMethod,
    initialized: bool,
    disabled: bool,
    destroyed: bool,
    state: Option<Box<dyn Any + Send + Sync>>,
    store: Arc<X509Store>,
    config: LookupConfig,
    name_hasher: Arc<dyn NameHasher>,
    trust_anchors: Arc<dyn TrustAnchorSource>,
    error_sink: Arc<dyn ErrorSink>,
}

impl Lookup {
    /// Binds `method` to `store` with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidConfiguration`] if the method's constructor fails.
    pub fn new(method: &'static LookupMethod, store: Arc<X509Store>) -> Result<Self, LookupError> {
        LookupBuilder::new(method).store(store).build()
    }

    /// Returns a builder for a lookup bound to `method`.
    pub fn builder(method: &'static LookupMethod) -> LookupBuilder {
        LookupBuilder::new(method)
    }

    /// Sends a control command to the provider.
    ///
    /// Returns `Ok(true)` when the method has no control hook.
    ///
    /// # Errors
    ///
    /// Propagates hard failures of the provider, such as [`LookupError::Io`].
    pub fn control(
        &mut self,
        command: ControlCommand,
        arg: Option<&str>,
        argl: i64,
    ) -> Result<bool, LookupError> {
        match self.method.control {
            Some(control) => control(self, command, arg, argl),
            None => Ok(true),
        }
    }

    /// Shorthand for `control(ControlCommand::LoadFile, path, file_type.code())`.
    ///
    /// # Errors
    ///
    /// See [`Lookup::control`].
    pub fn load_file(&mut self, path: Option<&str>, file_type: FileType) -> Result<bool, LookupError> {
        self.control(ControlCommand::LoadFile, path, file_type.code())
    }

    /// Shorthand for `control(ControlCommand::AddDir, dirs, file_type.code())`.
    ///
    /// # Errors
    ///
    /// See [`Lookup::control`].
    pub fn add_dir(&mut self, dirs: Option<&str>, file_type: FileType) -> Result<bool, LookupError> {
        self.control(ControlCommand::AddDir, dirs, file_type.code())
    }

    /// Resolves an object by subject name (issuer name for CRLs).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnsupportedOperation`] if the method has no such query, or
    /// a hard failure of the provider.
    pub fn by_subject(
        &self,
        object_type: ObjectType,
        name: &X509Name,
    ) -> Result<Option<X509Object>, LookupError> {
        if self.disabled {
            return Ok(None);
        }
        let query = self.query_hook(self.method.by_subject, Operation::BySubject)?;
        query(self, object_type, name)
    }

    /// Resolves an object by issuer name and raw serial number.
    ///
    /// # Errors
    ///
    /// See [`Lookup::by_subject`].
    pub fn by_issuer_serial(
        &self,
        object_type: ObjectType,
        issuer: &X509Name,
        serial: &[u8],
    ) -> Result<Option<X509Object>, LookupError> {
        if self.disabled {
            return Ok(None);
        }
        let query = self.query_hook(self.method.by_issuer_serial, Operation::ByIssuerSerial)?;
        query(self, object_type, issuer, serial)
    }

    /// Resolves an object by fingerprint bytes.
    ///
    /// # Errors
    ///
    /// See [`Lookup::by_subject`].
    pub fn by_fingerprint(
        &self,
        object_type: ObjectType,
        fingerprint: &[u8],
    ) -> Result<Option<X509Object>, LookupError> {
        if self.disabled {
            return Ok(None);
        }
        let query = self.query_hook(self.method.by_fingerprint, Operation::ByFingerprint)?;
        query(self, object_type, fingerprint)
    }

    /// Resolves an object by alias.
    ///
    /// # Errors
    ///
    /// See [`Lookup::by_subject`].
    pub fn by_alias(
        &self,
        object_type: ObjectType,
        alias: &str,
    ) -> Result<Option<X509Object>, LookupError> {
        if self.disabled {
            return Ok(None);
        }
        let query = self.query_hook(self.method.by_alias, Operation::ByAlias)?;
        query(self, object_type, alias)
    }

    /// Runs the method's `init` hook and records the outcome.
    ///
    /// # Errors
    ///
    /// Propagates the hook's error; the lookup is then uninitialized.
    pub fn init(&mut self) -> Result<bool, LookupError> {
        self.initialized = false;
        let ok = match self.method.init {
            Some(init) => init(self)?,
            None => true,
        };
        self.initialized = ok;
        Ok(ok)
    }

    /// Runs the method's `shutdown` hook. The lookup is uninitialized afterwards unless
    /// the hook reports failure.
    ///
    /// # Errors
    ///
    /// Propagates the hook's error.
    pub fn shutdown(&mut self) -> Result<bool, LookupError> {
        let ok = match self.method.shutdown {
            Some(shutdown) => shutdown(self)?,
            None => true,
        };
        if ok {
            self.initialized = false;
        }
        Ok(ok)
    }

    /// Runs the method's `destruct` hook and drops provider state.
    ///
    /// Idempotent: the hook runs at most once, whether this is called or the lookup is
    /// dropped.
    pub fn destruct(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(destruct) = self.method.destruct {
            destruct(self);
        }
        self.state = None;
        self.initialized = false;
    }

    /// Enables or disables queries.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Returns `true` if queries are disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns `true` after a successful [`init`](Self::init) and before
    /// [`shutdown`](Self::shutdown).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns `true` once [`destruct`](Self::destruct) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Returns the bound method.
    pub fn method(&self) -> &'static LookupMethod {
        self.method
    }

    /// Returns the store this lookup loads into and searches.
    pub fn store(&self) -> &Arc<X509Store> {
        &self.store
    }

    /// Returns the configuration the lookup was built with.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Returns the hasher used to derive bucket file names.
    pub fn name_hasher(&self) -> &dyn NameHasher {
        self.name_hasher.as_ref()
    }

    /// Returns the platform trust-anchor source.
    pub fn trust_anchors(&self) -> &dyn TrustAnchorSource {
        self.trust_anchors.as_ref()
    }

    /// Returns the provider state, if it is a `T`.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_deref()?.downcast_ref()
    }

    /// Returns the provider state mutably, if it is a `T`.
    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.as_deref_mut()?.downcast_mut()
    }

    /// Replaces the provider state.
    pub fn set_state<T: Any + Send + Sync>(&mut self, state: T) {
        self.state = Some(Box::new(state));
    }

    /// Removes and returns the provider state.
    pub fn take_state(&mut self) -> Option<Box<dyn Any + Send + Sync>> {
        self.state.take()
    }

    /// Records an error to the lookup's sink.
    pub fn report(&self, error: &LookupError) {
        self.error_sink.record(error);
    }

    fn query_hook<F>(&self, hook: Option<F>, operation: Operation) -> Result<F, LookupError> {
        match hook {
            Some(hook) => Ok(hook),
            None => {
                let err = LookupError::UnsupportedOperation {
                    method: self.method.name,
                    operation,
                };
                self.report(&err);
                Err(err)
            }
        }
    }
}

impl Drop for Lookup {
    fn drop(&mut self) {
        self.destruct();
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("method", &self.method.name)
            .field("initialized", &self.initialized)
            .field("disabled", &self.disabled)
            .field("destroyed", &self.destroyed)
            .field("state", &self.state.as_ref().map(|_| "<state>"))
            .field("store", &self.store)
            .field("config", &self.config)
            .field("name_hasher", &"<NameHasher>")
            .field("trust_anchors", &"<TrustAnchorSource>")
            .field("error_sink", &"<ErrorSink>")
            .finish()
    }
}
