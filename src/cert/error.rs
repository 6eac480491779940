//! Error types for certificate and CRL decoding.

use asn1::ASN1EncodeErr;
use x509_parser::error::X509Error;

/// An error that may arise decoding X.509 certificates and CRLs.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// Error returned by the X.509 parsing library for a certificate.
    #[error("failed parsing X.509 certificate")]
    ParseX509Certificate(#[source] X509Error),

    /// Error returned by the X.509 parsing library for a CRL.
    #[error("failed parsing X.509 CRL")]
    ParseX509Crl(#[source] X509Error),

    /// Error returned by the X.509 parsing library for a distinguished name.
    #[error("failed parsing X.509 name")]
    ParseX509Name(#[source] X509Error),

    /// Error returned by the ASN.1/DER processing library while encoding the canonical
    /// form of a name.
    #[error("failed encoding canonical X.509 name")]
    EncodeCanonicalName(#[source] ASN1EncodeErr),

    /// The PEM framing around an object is broken (bad header, bad base64, truncated block).
    #[error("malformed PEM block: {0}")]
    Pem(String),
}
