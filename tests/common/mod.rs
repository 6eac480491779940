//! Fixtures shared by the integration tests: generated CAs, CRLs and PEM files.

#![allow(dead_code)]

use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CertificateRevocationListParams,
    DistinguishedName, DnType, IsCa, KeyIdMethod, KeyPair, KeyUsagePurpose, SerialNumber,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use x509_lookup::{
    Certificate, ErrorQueue, Lookup, LookupBuilder, LookupMethod, NameHasher,
    StaticTrustAnchors, X509Name,
};

/// A self-signed CA and its key.
pub struct Authority {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl Authority {
    /// Creates a CA whose subject has the given attributes, in order.
    pub fn new(attributes: &[(DnType, &str)]) -> Self {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        let mut dn = DistinguishedName::new();
        for (ty, value) in attributes {
            dn.push(ty.clone(), *value);
        }
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];

        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    /// Creates a CA with a single common name.
    pub fn named(common_name: &str) -> Self {
        Self::new(&[(DnType::CommonName, common_name)])
    }

    pub fn der(&self) -> Vec<u8> {
        self.cert.der().to_vec()
    }

    pub fn certificate(&self) -> Certificate {
        Certificate::try_from(self.der()).unwrap()
    }

    pub fn subject(&self) -> X509Name {
        self.certificate().subject_name().clone()
    }

    /// Issues an empty CRL signed by this CA. Signatures are randomized, so every call
    /// returns different bytes.
    pub fn crl_der(&self) -> Vec<u8> {
        let params = CertificateRevocationListParams {
            this_update: date_time_ymd(2024, 1, 1),
            next_update: date_time_ymd(2034, 1, 1),
            crl_number: SerialNumber::from(1u64),
            issuing_distribution_point: None,
            revoked_certs: Vec::new(),
            key_identifier_method: KeyIdMethod::Sha256,
        };
        params
            .signed_by(&self.cert, &self.key)
            .unwrap()
            .der()
            .to_vec()
    }
}

pub fn pem_block(label: &str, der: &[u8]) -> String {
    pem::encode_config(
        &pem::Pem::new(label, der.to_vec()),
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

pub fn cert_pem(authority: &Authority) -> String {
    pem_block("CERTIFICATE", &authority.der())
}

pub fn crl_pem(authority: &Authority) -> String {
    pem_block("X509 CRL", &authority.crl_der())
}

/// A PEM block whose contents are not a certificate.
pub fn malformed_cert_pem() -> String {
    "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n".to_string()
}

pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Maps every name to the same hash.
#[derive(Debug)]
pub struct FixedHasher(pub u32);

impl NameHasher for FixedHasher {
    fn hash(&self, _name: &X509Name) -> u32 {
        self.0
    }
}

/// Counts how many names were hashed.
#[derive(Debug, Default)]
pub struct CountingHasher {
    calls: AtomicUsize,
}

impl CountingHasher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NameHasher for CountingHasher {
    fn hash(&self, name: &X509Name) -> u32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        name.openssl_hash()
    }
}

/// A builder recording errors to a fresh queue and with no platform trust anchors.
pub fn builder(method: &'static LookupMethod) -> (LookupBuilder, Arc<ErrorQueue>) {
    let queue = Arc::new(ErrorQueue::new());
    let builder = Lookup::builder(method)
        .error_sink(queue.clone())
        .trust_anchors(Arc::new(StaticTrustAnchors::default()));
    (builder, queue)
}
