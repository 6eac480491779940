//! `Certificate` and `Crl` types and helpers.
//!
//! These types wrap DER-encoded bytes and validate them at construction time.

use crate::cert::error::CertificateError;
use crate::cert::parsing::{certificate_from_der, crl_from_der};
use crate::name::X509Name;
use sha1::{Digest, Sha1};

pub mod error;
pub(crate) mod parsing;

/// A single DER-encoded X.509 certificate.
///
/// Invariant: instances are always validated as parseable DER-encoded X.509.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: X509Name,
    issuer: X509Name,
    serial: Vec<u8>,
}

impl Certificate {
    pub(crate) fn new(der: Vec<u8>, subject: X509Name, issuer: X509Name, serial: Vec<u8>) -> Self {
        Self {
            der,
            subject,
            issuer,
            serial,
        }
    }

    /// Returns the certificate bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject name of the certificate.
    pub fn subject_name(&self) -> &X509Name {
        &self.subject
    }

    /// Returns the issuer name of the certificate.
    pub fn issuer_name(&self) -> &X509Name {
        &self.issuer
    }

    /// Returns the raw big-endian serial number of the certificate.
    pub fn raw_serial(&self) -> &[u8] {
        &self.serial
    }

    /// Returns the SHA-1 digest of the DER encoding, the classic certificate fingerprint.
    pub fn sha1_fingerprint(&self) -> [u8; 20] {
        let mut fingerprint = [0u8; 20];
        fingerprint.copy_from_slice(&Sha1::digest(&self.der));
        fingerprint
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: &[u8]) -> Result<Self, Self::Error> {
        certificate_from_der(der_bytes)
    }
}

impl TryFrom<Vec<u8>> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        certificate_from_der(&der_bytes)
    }
}

/// A single DER-encoded X.509 certificate revocation list.
///
/// Invariant: instances are always validated as parseable DER-encoded CRLs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Crl {
    der: Vec<u8>,
    issuer: X509Name,
}

impl Crl {
    pub(crate) fn new(der: Vec<u8>, issuer: X509Name) -> Self {
        Self { der, issuer }
    }

    /// Returns the CRL bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Returns the issuer name of the CRL, the name it is looked up by.
    pub fn issuer_name(&self) -> &X509Name {
        &self.issuer
    }
}

impl AsRef<[u8]> for Crl {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<&[u8]> for Crl {
    type Error = CertificateError;

    fn try_from(der_bytes: &[u8]) -> Result<Self, Self::Error> {
        crl_from_der(der_bytes)
    }
}

impl TryFrom<Vec<u8>> for Crl {
    type Error = CertificateError;

    fn try_from(der_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        crl_from_der(&der_bytes)
    }
}
