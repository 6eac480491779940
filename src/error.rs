//! Error types for lookup operations.

use crate::cert::error::CertificateError;
use crate::store::ObjectType;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The query or control entry point of a lookup method.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Operation {
    /// Query by subject name.
    BySubject,
    /// Query by issuer name and serial number.
    ByIssuerSerial,
    /// Query by fingerprint.
    ByFingerprint,
    /// Query by alias.
    ByAlias,
}

impl Operation {
    /// Returns a stable string representation of the operation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BySubject => "by_subject",
            Self::ByIssuerSerial => "by_issuer_serial",
            Self::ByFingerprint => "by_fingerprint",
            Self::ByAlias => "by_alias",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by lookups and their providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The provider's constructor rejected the binding.
    #[error("invalid lookup method '{method}': {reason}")]
    InvalidConfiguration {
        /// Name of the lookup method.
        method: &'static str,
        /// Why construction failed.
        reason: String,
    },

    /// The lookup method has no hook for the requested query.
    ///
    /// This is the "lookup failed" outcome, distinct from a query that ran and found nothing.
    #[error("lookup method '{method}' does not support {operation}")]
    UnsupportedOperation {
        /// Name of the lookup method.
        method: &'static str,
        /// The unsupported operation.
        operation: Operation,
    },

    /// The query asked for an object type the provider cannot resolve.
    #[error("wrong lookup type: {0}")]
    WrongLookupType(ObjectType),

    /// The file type code is not one of PEM, DER or default.
    #[error("bad X.509 file type: {0}")]
    BadFileType(i64),

    /// A directory list was empty or missing.
    #[error("invalid directory")]
    InvalidDirectory,

    /// The default certificate directories could not be registered.
    #[error("failed loading the default certificate directory")]
    LoadingCertDirFailed,

    /// A certificate or CRL in a file could not be decoded.
    #[error("failed decoding {}", path.display())]
    DecodeFailed {
        /// The file being decoded.
        path: PathBuf,
        /// The decoding error.
        #[source]
        source: CertificateError,
    },

    /// A file could not be read.
    #[error("failed reading {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Neither the configured default bundle nor the platform trust anchors could be loaded.
    #[error("failed loading the default trust anchors")]
    DefaultsLoadFailed,
}

impl LookupError {
    /// Returns the low-cardinality kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::WrongLookupType(_) => ErrorKind::WrongLookupType,
            Self::BadFileType(_) => ErrorKind::BadFileType,
            Self::InvalidDirectory => ErrorKind::InvalidDirectory,
            Self::LoadingCertDirFailed => ErrorKind::LoadingCertDirFailed,
            Self::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            Self::Io { .. } => ErrorKind::IoFailed,
            Self::DefaultsLoadFailed => ErrorKind::DefaultsLoadFailed,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error kinds for diagnostics.
///
/// Use these stable, low-cardinality labels when recording errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Provider setup failed at construction time.
    InvalidConfiguration,
    /// The requested hook is absent.
    UnsupportedOperation,
    /// The query type is not a certificate or CRL.
    WrongLookupType,
    /// Unrecognized file type.
    BadFileType,
    /// Empty or missing directory list.
    InvalidDirectory,
    /// The default directory could not be registered.
    LoadingCertDirFailed,
    /// Malformed certificate or CRL content.
    DecodeFailed,
    /// Filesystem or stream error.
    IoFailed,
    /// Default trust material unavailable.
    DefaultsLoadFailed,
}

impl ErrorKind {
    /// Returns a string representation of the error kind.
    ///
    /// This is useful for log fields and metrics labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::UnsupportedOperation => "unsupported_operation",
            Self::WrongLookupType => "wrong_lookup_type",
            Self::BadFileType => "bad_file_type",
            Self::InvalidDirectory => "invalid_directory",
            Self::LoadingCertDirFailed => "loading_cert_dir_failed",
            Self::DecodeFailed => "decode_failed",
            Self::IoFailed => "io_failed",
            Self::DefaultsLoadFailed => "defaults_load_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
