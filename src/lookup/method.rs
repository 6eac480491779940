//! Lookup method descriptors and the built-in registry.

use crate::error::LookupError;
use crate::lookup::dir::HASH_DIR_LOOKUP;
use crate::lookup::file::FILE_LOOKUP;
use crate::lookup::{ControlCommand, Lookup};
use crate::name::X509Name;
use crate::store::{ObjectType, X509Object};
use std::fmt;

/// Sets up provider state when a [`Lookup`] is bound to a method.
pub type ConstructFn = fn(&mut Lookup) -> Result<(), LookupError>;

/// Releases provider state. Runs at most once per lookup.
pub type DestructFn = fn(&mut Lookup);

/// Lifecycle hook (`init` or `shutdown`). `Ok(false)` means the step did not succeed.
pub type LifecycleFn = fn(&mut Lookup) -> Result<bool, LookupError>;

/// Handles a [`ControlCommand`] with its string argument and numeric argument.
pub type ControlFn =
    fn(&mut Lookup, ControlCommand, Option<&str>, i64) -> Result<bool, LookupError>;

/// Resolves an object by subject name (issuer name for CRLs).
pub type BySubjectFn =
    fn(&Lookup, ObjectType, &X509Name) -> Result<Option<X509Object>, LookupError>;

/// Resolves an object by issuer name and raw serial number.
pub type ByIssuerSerialFn =
    fn(&Lookup, ObjectType, &X509Name, &[u8]) -> Result<Option<X509Object>, LookupError>;

/// Resolves an object by fingerprint bytes.
pub type ByFingerprintFn =
    fn(&Lookup, ObjectType, &[u8]) -> Result<Option<X509Object>, LookupError>;

/// Resolves an object by alias.
pub type ByAliasFn = fn(&Lookup, ObjectType, &str) -> Result<Option<X509Object>, LookupError>;

/// A provider: a named table of optional hooks.
///
/// Methods are plain values, usually `static`. A hook left as `None` is skipped for
/// lifecycle steps and reported as [`LookupError::UnsupportedOperation`] for queries.
///
/// # Example
///
/// ```
/// use x509_lookup::{Lookup, LookupMethod, ObjectType, X509Name, X509Object};
/// use x509_lookup::error::LookupError;
///
/// fn nothing(
///     _: &Lookup,
///     _: ObjectType,
///     _: &X509Name,
/// ) -> Result<Option<X509Object>, LookupError> {
///     Ok(None)
/// }
///
/// static EMPTY: LookupMethod = LookupMethod {
///     by_subject: Some(nothing),
///     ..LookupMethod::new("empty")
/// };
///
/// let lookup = Lookup::builder(&EMPTY).build()?;
/// assert_eq!(lookup.method().name, "empty");
/// # Ok::<(), LookupError>(())
/// ```
#[derive(Clone, Copy)]
pub struct LookupMethod {
    /// Human-readable name of the method.
    pub name: &'static str,
    /// Called once when a lookup is built.
    pub construct: Option<ConstructFn>,
    /// Called once when a lookup is destroyed.
    pub destruct: Option<DestructFn>,
    /// Called by [`Lookup::init`].
    pub init: Option<LifecycleFn>,
    /// Called by [`Lookup::shutdown`].
    pub shutdown: Option<LifecycleFn>,
    /// Called by [`Lookup::control`].
    pub control: Option<ControlFn>,
    /// Called by [`Lookup::by_subject`].
    pub by_subject: Option<BySubjectFn>,
    /// Called by [`Lookup::by_issuer_serial`].
    pub by_issuer_serial: Option<ByIssuerSerialFn>,
    /// Called by [`Lookup::by_fingerprint`].
    pub by_fingerprint: Option<ByFingerprintFn>,
    /// Called by [`Lookup::by_alias`].
    pub by_alias: Option<ByAliasFn>,
}

static REGISTRY: [&LookupMethod; 2] = [&FILE_LOOKUP, &HASH_DIR_LOOKUP];

impl LookupMethod {
    /// Creates a method with the given name and no hooks.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            construct: None,
            destruct: None,
            init: None,
            shutdown: None,
            control: None,
            by_subject: None,
            by_issuer_serial: None,
            by_fingerprint: None,
            by_alias: None,
        }
    }

    /// The file provider: loads certificates and CRLs from a named file into the store.
    ///
    /// It only implements `control`; every query on it is unsupported.
    pub fn file() -> &'static LookupMethod {
        &FILE_LOOKUP
    }

    /// The hash-directory provider: resolves subject queries on demand from
    /// directories of `<hash>.<n>` files.
    pub fn hash_dir() -> &'static LookupMethod {
        &HASH_DIR_LOOKUP
    }

    /// Returns the built-in methods.
    pub fn registry() -> &'static [&'static LookupMethod] {
        &REGISTRY
    }

    /// Finds a built-in method by its name.
    pub fn by_name(name: &str) -> Option<&'static LookupMethod> {
        REGISTRY.iter().copied().find(|method| method.name == name)
    }
}

impl fmt::Debug for LookupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn hook<T>(hook: &Option<T>) -> Option<&'static str> {
            hook.as_ref().map(|_| "<fn>")
        }

        f.debug_struct("LookupMethod")
            .field("name", &self.name)
            .field("construct", &hook(&self.construct))
            .field("destruct", &hook(&self.destruct))
            .field("init", &hook(&self.init))
            .field("shutdown", &hook(&self.shutdown))
            .field("control", &hook(&self.control))
            .field("by_subject", &hook(&self.by_subject))
            .field("by_issuer_serial", &hook(&self.by_issuer_serial))
            .field("by_fingerprint", &hook(&self.by_fingerprint))
            .field("by_alias", &hook(&self.by_alias))
            .finish()
    }
}

#[cfg(test)]
mod method_tests {
    use super::*;

    #[test]
    fn test_registry_holds_builtin_methods() {
        let names: Vec<_> = LookupMethod::registry().iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![LookupMethod::file().name, LookupMethod::hash_dir().name]
        );
    }

    #[test]
    fn test_by_name() {
        let method = LookupMethod::by_name(LookupMethod::hash_dir().name).unwrap();
        assert!(std::ptr::eq(method, LookupMethod::hash_dir()));
        assert!(LookupMethod::by_name("no such method").is_none());
    }

    #[test]
    fn test_builtin_hooks() {
        let file = LookupMethod::file();
        assert!(file.control.is_some());
        assert!(file.by_subject.is_none());
        assert!(file.by_alias.is_none());

        let dir = LookupMethod::hash_dir();
        assert!(dir.construct.is_some());
        assert!(dir.destruct.is_some());
        assert!(dir.control.is_some());
        assert!(dir.by_subject.is_some());
        assert!(dir.by_issuer_serial.is_none());
        assert!(dir.by_fingerprint.is_none());
    }

    #[test]
    fn test_debug_hides_function_pointers() {
        let debug = format!("{:?}", LookupMethod::new("bare"));
        assert!(debug.contains("name: \"bare\""));
        assert!(debug.contains("control: None"));
    }
}
