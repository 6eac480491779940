//! Constants shared by the lookup providers.

/// Name of the environment variable naming the default certificate bundle file.
///
/// Read by [`LookupConfig::from_env`](crate::config::LookupConfig::from_env) and used by the
/// file provider when it is asked to load [`FileType::Default`](crate::FileType::Default).
pub const SSL_CERT_FILE_ENV: &str = "SSL_CERT_FILE";

/// Name of the environment variable naming the default certificate directories.
///
/// The value is a list of directories separated by [`PATH_LIST_SEPARATOR`].
pub const SSL_CERT_DIR_ENV: &str = "SSL_CERT_DIR";

/// Directory searched by the hash-directory provider when no default directory is configured.
#[cfg(not(windows))]
pub const DEFAULT_CERT_DIR: &str = "/etc/ssl/certs";

/// Directory searched by the hash-directory provider when no default directory is configured.
#[cfg(windows)]
pub const DEFAULT_CERT_DIR: &str = "C:\\Program Files\\Common Files\\SSL\\certs";

/// Separator between entries of a directory list, as used in `PATH`.
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Separator between entries of a directory list, as used in `PATH`.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';

/// File name suffix marking a CRL bucket in a hashed directory (`<hash>.r<n>`).
pub const CRL_BUCKET_SUFFIX: &str = "r";

/// File name suffix marking a certificate bucket in a hashed directory (`<hash>.<n>`).
pub const CERTIFICATE_BUCKET_SUFFIX: &str = "";

/// Well-known locations of the system trust bundle, probed in order.
pub const SYSTEM_BUNDLE_FILES: &[&str] = &[
    // Debian, Ubuntu, Gentoo, Arch
    "/etc/ssl/certs/ca-certificates.crt",
    // Fedora, RHEL 6
    "/etc/pki/tls/certs/ca-bundle.crt",
    // OpenSUSE
    "/etc/ssl/ca-bundle.pem",
    // OpenELEC
    "/etc/pki/tls/cacert.pem",
    // CentOS, RHEL 7
    "/etc/pki/ca-trust/extracted/pem/tls-ca-bundle.pem",
    // Alpine, BSDs, macOS
    "/etc/ssl/cert.pem",
];
