//! Integration tests for the file provider and the bulk loaders.

mod common;

use common::{builder, cert_pem, crl_pem, malformed_cert_pem, write_file, Authority};
use std::sync::Arc;
use x509_lookup::{
    ErrorKind, FileType, LookupConfig, LookupError, LookupMethod, ObjectType, StaticTrustAnchors,
    X509Object, X509Store,
};

#[test]
fn test_load_pem_bundle_with_certificates_and_crls() {
    let dir = tempfile::tempdir().unwrap();
    let (ca1, ca2, ca3) = (
        Authority::named("CA One"),
        Authority::named("CA Two"),
        Authority::named("CA Three"),
    );
    let bundle = [
        cert_pem(&ca1),
        "some text between blocks\n".to_string(),
        cert_pem(&ca2),
        crl_pem(&ca1),
        cert_pem(&ca3),
        crl_pem(&ca2),
    ]
    .concat();
    let path = write_file(dir.path(), "bundle.pem", bundle);

    let store = Arc::new(X509Store::new());
    let (builder, queue) = builder(LookupMethod::file());
    let mut lookup = builder.store(store.clone()).build().unwrap();

    assert!(lookup
        .load_file(path.to_str(), FileType::Pem)
        .unwrap());
    assert_eq!(store.len(), 5);
    assert!(queue.is_empty());

    let objects = store.objects();
    let certs = objects
        .iter()
        .filter(|o| o.object_type() == ObjectType::Certificate)
        .count();
    assert_eq!(certs, 3);
    assert!(store.find(ObjectType::Crl, &ca2.subject()).is_some());
    assert_eq!(
        store.find(ObjectType::Certificate, &ca3.subject()),
        Some(X509Object::Certificate(ca3.certificate()))
    );
}

#[test]
fn test_typed_loaders_only_take_their_kind() {
    let dir = tempfile::tempdir().unwrap();
    let ca = Authority::named("Mixed CA");
    let path = write_file(
        dir.path(),
        "mixed.pem",
        [cert_pem(&ca), crl_pem(&ca)].concat(),
    );

    let (builder, _) = builder(LookupMethod::file());
    let lookup = builder.build().unwrap();

    assert_eq!(
        lookup
            .load_crl_file(Some(path.as_path()), FileType::Pem)
            .unwrap(),
        1
    );
    assert_eq!(lookup.store().objects()[0].object_type(), ObjectType::Crl);

    assert_eq!(
        lookup
            .load_certificate_file(Some(path.as_path()), FileType::Pem)
            .unwrap(),
        1
    );
    assert_eq!(lookup.store().len(), 2);
}

#[test]
fn test_load_der_certificate_and_crl() {
    let dir = tempfile::tempdir().unwrap();
    let ca = Authority::named("DER CA");
    let cert_path = write_file(dir.path(), "ca.der", ca.der());
    let crl_path = write_file(dir.path(), "ca.crl", ca.crl_der());

    let (builder, queue) = builder(LookupMethod::file());
    let mut lookup = builder.build().unwrap();

    assert!(lookup.load_file(cert_path.to_str(), FileType::Der).unwrap());
    assert_eq!(
        lookup.load_crl_file(Some(crl_path.as_path()), FileType::Der).unwrap(),
        1
    );
    assert_eq!(lookup.store().len(), 2);

    // a CRL is not a certificate
    assert!(!lookup.load_file(crl_path.to_str(), FileType::Der).unwrap());
    assert_eq!(queue.kinds(), vec![ErrorKind::DecodeFailed]);
}

#[test]
fn test_mixed_loader_reads_der_as_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let ca = Authority::named("Mixed DER CA");
    let cert_path = write_file(dir.path(), "ca.der", ca.der());
    let crl_path = write_file(dir.path(), "ca.crl", ca.crl_der());

    let (builder, queue) = builder(LookupMethod::file());
    let lookup = builder.build().unwrap();

    assert_eq!(
        lookup
            .load_certificate_or_crl_file(Some(cert_path.as_path()), FileType::Der)
            .unwrap(),
        1
    );
    assert_eq!(
        lookup
            .load_certificate_or_crl_file(Some(crl_path.as_path()), FileType::Der)
            .unwrap(),
        0
    );
    assert_eq!(lookup.store().len(), 1);
    assert_eq!(queue.kinds(), vec![ErrorKind::DecodeFailed]);
}

#[test]
fn test_malformed_block_keeps_earlier_objects() {
    let dir = tempfile::tempdir().unwrap();
    let (ca1, ca2, ca3) = (
        Authority::named("Before 1"),
        Authority::named("Before 2"),
        Authority::named("After"),
    );
    let path = write_file(
        dir.path(),
        "partial.pem",
        [
            cert_pem(&ca1),
            cert_pem(&ca2),
            malformed_cert_pem(),
            cert_pem(&ca3),
        ]
        .concat(),
    );

    let (builder, queue) = builder(LookupMethod::file());
    let lookup = builder.build().unwrap();

    let count = lookup
        .load_certificate_or_crl_file(Some(path.as_path()), FileType::Pem)
        .unwrap();

    assert_eq!(count, 2);
    assert!(lookup
        .store()
        .find(ObjectType::Certificate, &ca3.subject())
        .is_none());

    let errors = queue.drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::DecodeFailed);
    assert!(errors[0].message.contains("partial.pem"));
}

#[test]
fn test_reloading_counts_duplicates_as_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let ca = Authority::named("Reloaded CA");
    let path = write_file(dir.path(), "ca.pem", cert_pem(&ca));

    let (builder, _) = builder(LookupMethod::file());
    let mut lookup = builder.build().unwrap();

    assert!(lookup.load_file(path.to_str(), FileType::Pem).unwrap());
    assert!(lookup.load_file(path.to_str(), FileType::Pem).unwrap());
    assert_eq!(lookup.store().len(), 1);
}

#[test]
fn test_absent_path_is_success() {
    let (builder, _) = builder(LookupMethod::file());
    let mut lookup = builder.build().unwrap();

    assert!(lookup.load_file(None, FileType::Pem).unwrap());
    assert!(lookup.load_file(None, FileType::Der).unwrap());
    assert!(lookup.store().is_empty());
}

#[test]
fn test_missing_file_is_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pem");

    let (builder, _) = builder(LookupMethod::file());
    let mut lookup = builder.build().unwrap();

    let err = lookup
        .load_file(missing.to_str(), FileType::Pem)
        .unwrap_err();
    assert!(matches!(err, LookupError::Io { ref path, .. } if path == &missing));
}

#[test]
fn test_default_loads_configured_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let ca = Authority::named("Configured CA");
    let path = write_file(dir.path(), "default.pem", [cert_pem(&ca), crl_pem(&ca)].concat());

    let (builder, queue) = builder(LookupMethod::file());
    let mut lookup = builder
        .config(LookupConfig::new().with_default_cert_file(path.clone()))
        .build()
        .unwrap();

    assert!(lookup
        .load_file(Some("/ignored/when/default.pem"), FileType::Default)
        .unwrap());
    assert_eq!(lookup.store().len(), 2);
    assert!(queue.is_empty());
}

#[test]
fn test_default_falls_back_to_trust_anchors() {
    let anchors = vec![
        Authority::named("Root A").certificate(),
        Authority::named("Root B").certificate(),
    ];

    let (builder, _) = builder(LookupMethod::file());
    let mut lookup = builder
        .trust_anchors(Arc::new(StaticTrustAnchors::new(anchors.clone())))
        .build()
        .unwrap();

    assert!(lookup.load_file(None, FileType::Default).unwrap());
    assert_eq!(
        lookup.store().objects(),
        anchors
            .into_iter()
            .map(X509Object::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_default_with_unreadable_bundle_fails() {
    let (builder, queue) = builder(LookupMethod::file());
    let mut lookup = builder
        .config(LookupConfig::new().with_default_cert_file("/nonexistent/x509-lookup/ca.pem"))
        .build()
        .unwrap();

    assert!(!lookup.load_file(None, FileType::Default).unwrap());
    assert_eq!(queue.kinds(), vec![ErrorKind::DefaultsLoadFailed]);
}

#[test]
fn test_queries_are_unsupported() {
    let ca = Authority::named("Query CA");
    let (builder, queue) = builder(LookupMethod::file());
    let lookup = builder.build().unwrap();

    let err = lookup
        .by_subject(ObjectType::Certificate, &ca.subject())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    assert!(lookup
        .by_alias(ObjectType::Certificate, "query-ca")
        .is_err());
    assert_eq!(queue.kinds().len(), 2);
}
