//! Internal decoding helpers for DER and PEM encoded certificates and CRLs.

use crate::cert::error::CertificateError;
use crate::cert::{Certificate, Crl};
use crate::name::X509Name;
use x509_parser::error::{PEMError, X509Error};
use x509_parser::nom::Err;
use x509_parser::pem::parse_x509_pem;

/// PEM labels accepted for certificates.
const PEM_CERTIFICATE_LABELS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE", "TRUSTED CERTIFICATE"];

/// PEM label of a CRL.
const PEM_CRL_LABEL: &str = "X509 CRL";

/// Parses the leading DER-encoded X.509 certificate of `der_bytes`.
///
/// Bytes following the certificate are ignored, which also covers the auxiliary trust
/// data appended to `TRUSTED CERTIFICATE` blocks.
pub(crate) fn certificate_from_der(der_bytes: &[u8]) -> Result<Certificate, CertificateError> {
    let (rest, cert) = x509_parser::parse_x509_certificate(der_bytes).map_err(|e| match e {
        Err::Incomplete(_) => CertificateError::ParseX509Certificate(X509Error::InvalidCertificate),
        Err::Error(err) | Err::Failure(err) => CertificateError::ParseX509Certificate(err),
    })?;

    // Keep only the bytes of the certificate that was just parsed.
    let cert_len = der_bytes.len() - rest.len();

    Ok(Certificate::new(
        der_bytes[..cert_len].to_vec(),
        X509Name::from_parsed(cert.subject())?,
        X509Name::from_parsed(cert.issuer())?,
        cert.raw_serial().to_vec(),
    ))
}

/// Parses the leading DER-encoded CRL of `der_bytes`.
pub(crate) fn crl_from_der(der_bytes: &[u8]) -> Result<Crl, CertificateError> {
    let (rest, crl) = x509_parser::parse_x509_crl(der_bytes).map_err(|e| match e {
        Err::Incomplete(_) => CertificateError::ParseX509Crl(X509Error::InvalidCertificate),
        Err::Error(err) | Err::Failure(err) => CertificateError::ParseX509Crl(err),
    })?;

    let crl_len = der_bytes.len() - rest.len();

    Ok(Crl::new(
        der_bytes[..crl_len].to_vec(),
        X509Name::from_parsed(crl.issuer())?,
    ))
}

/// The kind of object a typed loader decodes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum ObjectKind {
    Certificate,
    Crl,
}

impl From<ObjectKind> for PemSelection {
    fn from(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Certificate => Self::Certificates,
            ObjectKind::Crl => Self::Crls,
        }
    }
}

/// Which PEM blocks a [`PemObjects`] iterator decodes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum PemSelection {
    Certificates,
    Crls,
    All,
}

impl PemSelection {
    fn certificates(self) -> bool {
        matches!(self, Self::Certificates | Self::All)
    }

    fn crls(self) -> bool {
        matches!(self, Self::Crls | Self::All)
    }
}

/// An object decoded from one PEM block.
#[derive(Debug)]
pub(crate) enum PemObject {
    Certificate(Certificate),
    Crl(Crl),
    /// A block outside the selection (e.g. a private key); carries its label.
    /// Its contents are not decoded.
    Other(String),
}

/// Iterates over the PEM blocks of a buffer, decoding certificates and CRLs.
///
/// Text outside PEM blocks is skipped, as are blocks outside the selection. The
/// iterator ends at end of input. After the first error it yields that error once and
/// then ends, so a malformed block never hides the objects that came before it.
#[derive(Debug)]
pub(crate) struct PemObjects<'a> {
    rest: &'a [u8],
    selection: PemSelection,
    done: bool,
}

impl<'a> PemObjects<'a> {
    pub(crate) fn new(input: &'a [u8], selection: PemSelection) -> Self {
        Self {
            rest: input,
            selection,
            done: false,
        }
    }
}

impl Iterator for PemObjects<'_> {
    type Item = Result<PemObject, CertificateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let pem = match parse_x509_pem(self.rest) {
            Ok((rest, pem)) => {
                self.rest = rest;
                pem
            }
            // No further BEGIN line: clean end of stream.
            Err(Err::Error(PEMError::MissingHeader) | Err::Failure(PEMError::MissingHeader)) => {
                self.done = true;
                return None;
            }
            Err(Err::Incomplete(_)) => {
                self.done = true;
                return Some(Err(CertificateError::Pem("incomplete PEM block".to_string())));
            }
            Err(Err::Error(e) | Err::Failure(e)) => {
                self.done = true;
                return Some(Err(CertificateError::Pem(e.to_string())));
            }
        };

        let decoded = if self.selection.certificates()
            && PEM_CERTIFICATE_LABELS.contains(&pem.label.as_str())
        {
            certificate_from_der(&pem.contents).map(PemObject::Certificate)
        } else if self.selection.crls() && pem.label == PEM_CRL_LABEL {
            crl_from_der(&pem.contents).map(PemObject::Crl)
        } else {
            Ok(PemObject::Other(pem.label))
        };

        if decoded.is_err() {
            self.done = true;
        }
        Some(decoded)
    }
}
