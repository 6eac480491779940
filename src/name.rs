//! Distinguished names and the subject-name hash used to key hashed certificate directories.
//!
//! Names compare equal when their canonical encodings are equal. The canonical
//! encoding follows OpenSSL's `x509_name_canon`: string values are converted to UTF-8,
//! trimmed, whitespace-collapsed and ASCII-lowercased, so `CN=Example  Host` and
//! `CN=example host` denote the same name. [`OpenSslNameHasher`] hashes that encoding
//! exactly like `X509_NAME_hash`, which makes the file names it produces interoperable
//! with directories populated by `openssl rehash` / `c_rehash`.

use crate::cert::error::CertificateError;
use asn1::{ASN1Block, ASN1Class, ASN1EncodeErr, BigUint};
use sha1::{Digest, Sha1};
use std::fmt;
use std::hash::{Hash, Hasher};
use x509_parser::asn1_rs::{Any, Class};
use x509_parser::error::X509Error;
use x509_parser::nom::Err;
use x509_parser::prelude::FromDer;
use x509_parser::x509::X509Name as ParsedName;

const OBJECT_IDENTIFIER: u32 = 6;
const UTF8_STRING: u32 = 12;
const PRINTABLE_STRING: u32 = 19;
const T61_STRING: u32 = 20;
const IA5_STRING: u32 = 22;
const VISIBLE_STRING: u32 = 26;
const UNIVERSAL_STRING: u32 = 28;
const BMP_STRING: u32 = 30;

/// An X.509 distinguished name, as found in a certificate subject or a CRL issuer.
#[derive(Clone)]
pub struct X509Name {
    der: Vec<u8>,
    canonical: Vec<u8>,
    display: String,
}

impl X509Name {
    /// Parses a DER-encoded `Name` (the `SEQUENCE OF RelativeDistinguishedName`).
    ///
    /// # Errors
    ///
    /// Returns [`CertificateError::ParseX509Name`] if the input is not a DER-encoded name.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, name) = ParsedName::from_der(der).map_err(|e| match e {
            Err::Incomplete(_) => CertificateError::ParseX509Name(X509Error::InvalidX509Name),
            Err::Error(err) | Err::Failure(err) => CertificateError::ParseX509Name(err),
        })?;
        Self::from_parsed(&name)
    }

    pub(crate) fn from_parsed(name: &ParsedName<'_>) -> Result<Self, CertificateError> {
        Ok(Self {
            der: name.as_raw().to_vec(),
            canonical: canonical_encoding(name).map_err(CertificateError::EncodeCanonicalName)?,
            display: name.to_string(),
        })
    }

    /// Returns the DER encoding of the name, as it appeared in the source object.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the canonical encoding used for comparisons and hashing.
    ///
    /// This is the concatenation of the DER-encoded canonical RDN sets, without the
    /// enclosing `SEQUENCE` header. An empty name has an empty canonical encoding.
    pub fn canonical_encoding(&self) -> &[u8] {
        &self.canonical
    }

    /// Returns the OpenSSL-compatible subject-name hash of this name.
    ///
    /// Shorthand for `OpenSslNameHasher.hash(self)`.
    pub fn openssl_hash(&self) -> u32 {
        OpenSslNameHasher.hash(self)
    }
}

impl PartialEq for X509Name {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for X509Name {}

impl Hash for X509Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for X509Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for X509Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("X509Name").field(&self.display).finish()
    }
}

impl TryFrom<&[u8]> for X509Name {
    type Error = CertificateError;

    fn try_from(der: &[u8]) -> Result<Self, Self::Error> {
        Self::from_der(der)
    }
}

/// Computes the 32-bit subject-name hash that keys hashed certificate directories.
///
/// The hash must be stable across processes: it names files on disk that were
/// written by someone else.
pub trait NameHasher: Send + Sync + 'static {
    /// Returns the hash of `name`.
    fn hash(&self, name: &X509Name) -> u32;
}

/// OpenSSL `X509_NAME_hash` (the default since OpenSSL 1.0.0): the first four bytes of the
/// SHA-1 digest of the canonical name encoding, read as a little-endian integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenSslNameHasher;

impl NameHasher for OpenSslNameHasher {
    fn hash(&self, name: &X509Name) -> u32 {
        let digest = Sha1::digest(name.canonical_encoding());
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

fn canonical_encoding(name: &ParsedName<'_>) -> Result<Vec<u8>, ASN1EncodeErr> {
    let mut out = Vec::new();

    for rdn in name.iter() {
        let mut members = rdn
            .iter()
            .map(|attr| {
                let entry = ASN1Block::Sequence(
                    0,
                    vec![
                        raw_block(
                            Class::Universal,
                            false,
                            OBJECT_IDENTIFIER,
                            attr.attr_type().as_bytes(),
                        ),
                        canonical_value(attr.attr_value()),
                    ],
                );
                Ok((asn1::to_der(&entry)?, entry))
            })
            .collect::<Result<Vec<_>, ASN1EncodeErr>>()?;

        // DER orders SET OF members by their encodings.
        members.sort_by(|a, b| a.0.cmp(&b.0));
        let set = ASN1Block::Set(0, members.into_iter().map(|(_, entry)| entry).collect());
        out.extend(asn1::to_der(&set)?);
    }

    Ok(out)
}

fn canonical_value(value: &Any<'_>) -> ASN1Block {
    if value.header.class() == Class::Universal {
        if let Some(text) = string_to_utf8(value.header.tag().0, value.as_bytes()) {
            return ASN1Block::UTF8String(0, canonicalize_text(&text));
        }
    }

    raw_block(
        value.header.class(),
        value.header.is_constructed(),
        value.header.tag().0,
        value.as_bytes(),
    )
}

/// A block that re-encodes `data` under the given identifier without interpreting it.
fn raw_block(class: Class, constructed: bool, tag: u32, data: &[u8]) -> ASN1Block {
    let class = match class {
        Class::Universal => ASN1Class::Universal,
        Class::Application => ASN1Class::Application,
        Class::ContextSpecific => ASN1Class::ContextSpecific,
        Class::Private => ASN1Class::Private,
    };
    ASN1Block::Unknown(class, constructed, 0, BigUint::from(tag), data.to_vec())
}

/// Converts an ASN.1 string value to UTF-8. Returns `None` for non-string types and for
/// strings that cannot be converted, which are then compared by their raw encoding.
fn string_to_utf8(tag: u32, data: &[u8]) -> Option<String> {
    match tag {
        UTF8_STRING => std::str::from_utf8(data).ok().map(str::to_owned),
        // Single-byte string types are read as Latin-1.
        PRINTABLE_STRING | T61_STRING | IA5_STRING | VISIBLE_STRING => {
            Some(data.iter().map(|&b| char::from(b)).collect())
        }
        UNIVERSAL_STRING => {
            if data.len() % 4 != 0 {
                return None;
            }
            data.chunks_exact(4)
                .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .collect()
        }
        BMP_STRING => {
            if data.len() % 2 != 0 {
                return None;
            }
            data.chunks_exact(2)
                .map(|c| char::from_u32(u32::from(u16::from_be_bytes([c[0], c[1]]))))
                .collect()
        }
        _ => None,
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Strips leading and trailing whitespace, collapses internal whitespace runs to a single
/// space and lowercases ASCII letters. Characters outside ASCII are copied untouched.
fn canonicalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for word in text.split(is_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().map(|c| c.to_ascii_lowercase()));
    }

    out
}

#[cfg(test)]
mod name_tests {
    use super::*;

    const CN: &[u8] = &[0x55, 0x04, 0x03];
    const O: &[u8] = &[0x55, 0x04, 0x0a];

    fn string(tag: u32, value: &[u8]) -> ASN1Block {
        raw_block(Class::Universal, false, tag, value)
    }

    fn utf8(value: &str) -> ASN1Block {
        ASN1Block::UTF8String(0, value.to_string())
    }

    fn attr(oid: &[u8], value: ASN1Block) -> ASN1Block {
        ASN1Block::Sequence(
            0,
            vec![raw_block(Class::Universal, false, OBJECT_IDENTIFIER, oid), value],
        )
    }

    fn rdn(attrs: Vec<ASN1Block>) -> ASN1Block {
        ASN1Block::Set(0, attrs)
    }

    fn name(rdns: Vec<ASN1Block>) -> Vec<u8> {
        asn1::to_der(&ASN1Block::Sequence(0, rdns)).unwrap()
    }

    fn common_name(value: ASN1Block) -> X509Name {
        X509Name::from_der(&name(vec![rdn(vec![attr(CN, value)])])).unwrap()
    }

    fn canonical_rdn(attrs: Vec<ASN1Block>) -> Vec<u8> {
        asn1::to_der(&rdn(attrs)).unwrap()
    }

    #[test]
    fn test_display_uses_short_attribute_names() {
        let n = common_name(utf8("example"));
        assert_eq!(n.to_string(), "CN=example");
    }

    #[test]
    fn test_names_differing_in_case_and_whitespace_are_equal() {
        let a = common_name(utf8("  Example \t  Host "));
        let b = common_name(string(PRINTABLE_STRING, b"example host"));

        assert_eq!(a, b);
        assert_eq!(a.openssl_hash(), b.openssl_hash());
        assert_ne!(a.as_der(), b.as_der());
    }

    #[test]
    fn test_different_names_are_not_equal() {
        let a = common_name(utf8("example"));
        let b = common_name(utf8("example2"));

        assert_ne!(a, b);
        assert_ne!(a.openssl_hash(), b.openssl_hash());
    }

    #[test]
    fn test_canonical_encoding_is_utf8_set_without_outer_sequence() {
        let n = common_name(string(PRINTABLE_STRING, b" Foo  Bar "));

        let expected = canonical_rdn(vec![attr(CN, utf8("foo bar"))]);
        assert_eq!(n.canonical_encoding(), expected.as_slice());
        assert_eq!(&expected[..2], &[0x31, 0x10]);
    }

    #[test]
    fn test_bmp_string_is_converted_to_utf8() {
        let a = common_name(string(BMP_STRING, &[0x00, b'E', 0x00, b'x']));
        let b = common_name(utf8("ex"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_ascii_characters_are_kept() {
        let n = common_name(utf8("Ÿ ÜBER"));

        // Only ASCII letters are lowercased.
        let expected = canonical_rdn(vec![attr(CN, utf8("Ÿ Über"))]);
        assert_eq!(n.canonical_encoding(), expected.as_slice());
    }

    #[test]
    fn test_non_string_value_is_kept_verbatim() {
        let value = string(4, &[0x01, 0x02, 0x03]);
        let n = common_name(value.clone());

        let expected = canonical_rdn(vec![attr(CN, value)]);
        assert_eq!(n.canonical_encoding(), expected.as_slice());
    }

    #[test]
    fn test_multi_valued_rdn_is_order_insensitive() {
        let cn = attr(CN, utf8("example"));
        let org = attr(O, utf8("acme"));

        let a = X509Name::from_der(&name(vec![rdn(vec![cn.clone(), org.clone()])])).unwrap();
        let b = X509Name::from_der(&name(vec![rdn(vec![org, cn])])).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.canonical_encoding(), b.canonical_encoding());
    }

    #[test]
    fn test_rdn_order_matters() {
        let cn = rdn(vec![attr(CN, utf8("example"))]);
        let org = rdn(vec![attr(O, utf8("acme"))]);

        let a = X509Name::from_der(&name(vec![cn.clone(), org.clone()])).unwrap();
        let b = X509Name::from_der(&name(vec![org, cn])).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_name_has_empty_canonical_encoding() {
        let n = X509Name::from_der(&[0x30, 0x00]).unwrap();

        assert!(n.canonical_encoding().is_empty());
        // SHA-1 of the empty string is da39a3ee...
        assert_eq!(n.openssl_hash(), 0xee_a3_39_da);
    }

    #[test]
    fn test_from_der_corrupted() {
        let result = X509Name::from_der(&[0x30, 0x05, 0x31]);
        assert!(matches!(
            result.unwrap_err(),
            CertificateError::ParseX509Name(..)
        ));
    }

    #[test]
    fn test_raw_block_keeps_class_and_form() {
        let block = raw_block(Class::ContextSpecific, true, 1, &[0x05, 0x00]);
        assert_eq!(asn1::to_der(&block).unwrap(), vec![0xa1, 0x02, 0x05, 0x00]);
    }

    #[test]
    fn test_canonicalize_text_only_whitespace() {
        assert!(canonicalize_text(" \t\r\n").is_empty());
        assert_eq!(canonicalize_text("A\x0bB"), "a b");
    }
}
