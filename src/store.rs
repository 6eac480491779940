//! The shared object store that lookup providers populate and search.
//!
//! The store is an append-only, ordered collection of [`X509Object`]s behind a single
//! mutex. Providers decode files outside the lock and then append and scan within one
//! [`X509Store::with_exclusive_access`] call, so a scan never observes a half-applied
//! batch.

use crate::cert::{Certificate, Crl};
use crate::name::X509Name;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The kind of object a query asks for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ObjectType {
    /// An X.509 certificate, looked up by subject name.
    Certificate,
    /// A certificate revocation list, looked up by issuer name.
    Crl,
    /// A private key. Never resolved by the built-in providers.
    PrivateKey,
}

impl ObjectType {
    /// Returns a stable string representation of the object type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Crl => "crl",
            Self::PrivateKey => "private_key",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trust object held by the store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum X509Object {
    /// A certificate.
    Certificate(Certificate),
    /// A certificate revocation list.
    Crl(Crl),
}

impl X509Object {
    /// Returns the [`ObjectType`] of this object.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Certificate(_) => ObjectType::Certificate,
            Self::Crl(_) => ObjectType::Crl,
        }
    }

    /// Returns the name this object is looked up by: the subject of a certificate or the
    /// issuer of a CRL.
    pub fn name(&self) -> &X509Name {
        match self {
            Self::Certificate(cert) => cert.subject_name(),
            Self::Crl(crl) => crl.issuer_name(),
        }
    }

    /// Returns `true` if this object has the given type and name.
    pub fn matches(&self, object_type: ObjectType, name: &X509Name) -> bool {
        self.object_type() == object_type && self.name() == name
    }

    /// Returns the certificate, if this object is one.
    pub fn as_certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate(cert) => Some(cert),
            Self::Crl(_) => None,
        }
    }

    /// Returns the CRL, if this object is one.
    pub fn as_crl(&self) -> Option<&Crl> {
        match self {
            Self::Crl(crl) => Some(crl),
            Self::Certificate(_) => None,
        }
    }
}

impl From<Certificate> for X509Object {
    fn from(cert: Certificate) -> Self {
        Self::Certificate(cert)
    }
}

impl From<Crl> for X509Object {
    fn from(crl: Crl) -> Self {
        Self::Crl(crl)
    }
}

/// Result of appending an object to the store. Both outcomes are successes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AddOutcome {
    /// The object was appended.
    Added,
    /// An identical object was already in the store; nothing was appended.
    AlreadyPresent,
}

/// Objects of an [`X509Store`], borrowed under its lock.
#[derive(Debug, Default)]
pub struct StoreObjects {
    objects: Vec<X509Object>,
}

impl StoreObjects {
    /// Appends `object` unless an identical object is already present.
    pub fn insert(&mut self, object: X509Object) -> AddOutcome {
        if self.objects.contains(&object) {
            return AddOutcome::AlreadyPresent;
        }
        self.objects.push(object);
        AddOutcome::Added
    }

    /// Returns the first object, in insertion order, with the given type and name.
    pub fn find(&self, object_type: ObjectType, name: &X509Name) -> Option<&X509Object> {
        self.objects.iter().find(|o| o.matches(object_type, name))
    }

    /// Returns the objects in insertion order.
    pub fn as_slice(&self) -> &[X509Object] {
        &self.objects
    }

    /// Returns the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if there are no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The shared, thread-safe store of certificates and CRLs.
///
/// Share it between lookups (and threads) with an `Arc`.
#[derive(Debug, Default)]
pub struct X509Store {
    objects: Mutex<StoreObjects>,
}

impl X509Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the store's objects.
    ///
    /// Everything done inside `f` is atomic with respect to every other store operation.
    /// Keep `f` short: no I/O, no decoding.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce(&mut StoreObjects) -> R) -> R {
        f(&mut self.lock())
    }

    /// Appends a certificate unless it is already present.
    pub fn add_certificate(&self, cert: Certificate) -> AddOutcome {
        self.lock().insert(X509Object::Certificate(cert))
    }

    /// Appends a CRL unless it is already present.
    pub fn add_crl(&self, crl: Crl) -> AddOutcome {
        self.lock().insert(X509Object::Crl(crl))
    }

    /// Returns a copy of the first object with the given type and name.
    pub fn find(&self, object_type: ObjectType, name: &X509Name) -> Option<X509Object> {
        self.lock().find(object_type, name).cloned()
    }

    /// Returns a snapshot of all objects, in insertion order.
    pub fn objects(&self) -> Vec<X509Object> {
        self.lock().as_slice().to_vec()
    }

    /// Returns the number of objects in the store.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Append-only: a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, StoreObjects> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
