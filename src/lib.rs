#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! This crate resolves X.509 certificates and CRLs into a shared trust store from the
//! filesystem, using the conventions of OpenSSL's `X509_LOOKUP` layer.
//!
//! A [`Lookup`] binds a [`LookupMethod`] (a provider) to an [`X509Store`]. Two providers
//! are built in:
//!
//! - [`LookupMethod::file`] bulk-loads every certificate and CRL of a PEM or DER file.
//! - [`LookupMethod::hash_dir`] answers subject queries lazily from directories laid
//!   out by `c_rehash`, where `<hash>.<n>` names the `n`-th certificate whose subject
//!   hashes to `<hash>`.
//!
//! ## Loading a bundle
//!
//! ```no_run
//! use std::sync::Arc;
//! use x509_lookup::{FileType, Lookup, LookupMethod, X509Store};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(X509Store::new());
//! let mut lookup = Lookup::new(LookupMethod::file(), store.clone())?;
//!
//! lookup.load_file(Some("/etc/ssl/certs/ca-certificates.crt"), FileType::Pem)?;
//! println!("{} trust objects loaded", store.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolving issuers on demand
//!
//! ```no_run
//! use std::sync::Arc;
//! use x509_lookup::{FileType, Lookup, LookupConfig, LookupMethod, ObjectType, X509Store};
//!
//! # fn example(issuer: &x509_lookup::X509Name) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(X509Store::new());
//! let mut lookup = Lookup::builder(LookupMethod::hash_dir())
//!     .store(store)
//!     .config(LookupConfig::from_env())
//!     .build()?;
//!
//! // SSL_CERT_DIR, or /etc/ssl/certs
//! lookup.add_dir(None, FileType::Default)?;
//!
//! if let Some(object) = lookup.by_subject(ObjectType::Certificate, issuer)? {
//!     println!("found {}", object.name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **`logging`** (default): diagnostics through the `log` facade
//! - **`tracing`**: diagnostics as `tracing` events; takes precedence over `logging`

pub mod cert;
pub mod config;
pub mod constants;
pub mod error;
pub mod lookup;
pub mod name;
pub mod sink;
pub mod store;
pub mod trust_anchors;

mod observability;
mod prelude;

pub use crate::cert::error::CertificateError;
pub use crate::cert::{Certificate, Crl};
pub use crate::config::LookupConfig;
pub use crate::error::{ErrorKind, LookupError, Operation};
pub use crate::lookup::dir::{bucket_file_name, CertDir, DirectoryState};
pub use crate::lookup::{ControlCommand, FileType, Lookup, LookupBuilder, LookupMethod};
pub use crate::name::{NameHasher, OpenSslNameHasher, X509Name};
pub use crate::sink::{ErrorQueue, ErrorSink, LogSink, ReportedError};
pub use crate::store::{AddOutcome, ObjectType, StoreObjects, X509Object, X509Store};
pub use crate::trust_anchors::{StaticTrustAnchors, SystemTrustAnchors, TrustAnchorSource};
