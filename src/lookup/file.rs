//! The file provider and the bulk loaders it is built on.
//!
//! Loaders decode a whole file outside the store lock, then append every decoded object
//! under one [`X509Store::with_exclusive_access`](crate::X509Store::with_exclusive_access)
//! call. A malformed block ends decoding; objects decoded before it are still added and
//! the failure is reported to the lookup's sink.

use crate::cert::error::CertificateError;
use crate::cert::parsing::{
    certificate_from_der, crl_from_der, ObjectKind, PemObject, PemObjects, PemSelection,
};
use crate::error::LookupError;
use crate::lookup::{ControlCommand, FileType, Lookup, LookupMethod};
use crate::prelude::{debug, info, warn};
use crate::store::{AddOutcome, X509Object};
use std::path::Path;

pub(crate) static FILE_LOOKUP: LookupMethod = LookupMethod {
    control: Some(file_control),
    ..LookupMethod::new("Load file into cache")
};

fn file_control(
    lookup: &mut Lookup,
    command: ControlCommand,
    arg: Option<&str>,
    argl: i64,
) -> Result<bool, LookupError> {
    if command != ControlCommand::LoadFile {
        return Ok(false);
    }

    let file_type = match FileType::try_from(argl) {
        Ok(file_type) => file_type,
        Err(e) => {
            lookup.report(&e);
            return Ok(false);
        }
    };

    let path = arg.map(Path::new);
    let loaded = match file_type {
        FileType::Default => lookup.load_defaults(),
        FileType::Pem => lookup.load_certificate_or_crl_file(path, FileType::Pem)?,
        FileType::Der => lookup.load_certificate_file(path, FileType::Der)?,
    };
    Ok(loaded != 0)
}

impl Lookup {
    /// Loads the certificates of a file into the store.
    ///
    /// A PEM file may hold any number of certificates; other blocks are skipped. A DER
    /// file holds exactly one. Certificates already in the store count as loaded.
    ///
    /// Returns the number of certificates added. `None` as path is a successful no-op
    /// returning `1`. A decoding failure is reported to the sink and the count of
    /// certificates read before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Io`] if the file cannot be read.
    pub fn load_certificate_file(
        &self,
        path: Option<&Path>,
        file_type: FileType,
    ) -> Result<usize, LookupError> {
        let Some(path) = path else {
            return Ok(1);
        };
        let objects = self.read_objects(path, ObjectKind::Certificate, file_type)?;
        Ok(self.add_objects(path, objects))
    }

    /// Loads the CRLs of a file into the store. Same contract as
    /// [`load_certificate_file`](Self::load_certificate_file).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Io`] if the file cannot be read.
    pub fn load_crl_file(
        &self,
        path: Option<&Path>,
        file_type: FileType,
    ) -> Result<usize, LookupError> {
        let Some(path) = path else {
            return Ok(1);
        };
        let objects = self.read_objects(path, ObjectKind::Crl, file_type)?;
        Ok(self.add_objects(path, objects))
    }

    /// Loads every certificate and CRL of a PEM file into the store.
    ///
    /// Any other file type is loaded as a certificate file.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Io`] if the file cannot be read.
    pub fn load_certificate_or_crl_file(
        &self,
        path: Option<&Path>,
        file_type: FileType,
    ) -> Result<usize, LookupError> {
        if file_type != FileType::Pem {
            return self.load_certificate_file(path, file_type);
        }
        let Some(path) = path else {
            return Ok(1);
        };
        let bytes = read_file(path)?;
        let objects = self.decode_pem(path, &bytes, PemSelection::All);
        Ok(self.add_objects(path, objects))
    }

    /// Adds every platform trust anchor to the store and returns how many were accepted.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the [`TrustAnchorSource`](crate::TrustAnchorSource).
    pub fn load_trust_anchors(&self) -> Result<usize, LookupError> {
        let anchors = self.trust_anchors().load_trust_anchors()?;
        let count = anchors.len();
        self.store().with_exclusive_access(|objects| {
            for anchor in anchors {
                objects.insert(anchor.into());
            }
        });
        info!("Loaded platform trust anchors: count={}", count);
        Ok(count)
    }

    /// Loads the configured default bundle, or the platform trust anchors when none is
    /// configured. Returns the number of objects loaded; `0` means failure, reported
    /// as [`LookupError::DefaultsLoadFailed`].
    fn load_defaults(&self) -> usize {
        let result = match &self.config().default_cert_file {
            Some(path) => {
                debug!("Loading default certificate file: path={}", path.display());
                self.load_certificate_or_crl_file(Some(path.as_path()), FileType::Pem)
            }
            None => self.load_trust_anchors(),
        };

        let loaded = result.unwrap_or_else(|e| {
            warn!("Failed loading default trust material: error={}", e);
            0
        });
        if loaded == 0 {
            self.report(&LookupError::DefaultsLoadFailed);
        }
        loaded
    }

    /// Reads and decodes the objects of one kind in a file without touching the store.
    ///
    /// Decoding failures are reported and end decoding; the objects decoded so far are
    /// returned.
    pub(crate) fn read_objects(
        &self,
        path: &Path,
        kind: ObjectKind,
        file_type: FileType,
    ) -> Result<Vec<X509Object>, LookupError> {
        if file_type == FileType::Default {
            self.report(&LookupError::BadFileType(file_type.code()));
            return Ok(Vec::new());
        }

        let bytes = read_file(path)?;

        if file_type == FileType::Der {
            return Ok(match decode_der(&bytes, kind) {
                Ok(object) => vec![object],
                Err(source) => {
                    self.report(&LookupError::DecodeFailed {
                        path: path.to_path_buf(),
                        source,
                    });
                    Vec::new()
                }
            });
        }

        Ok(self.decode_pem(path, &bytes, kind.into()))
    }

    fn decode_pem(&self, path: &Path, bytes: &[u8], selection: PemSelection) -> Vec<X509Object> {
        let mut objects = Vec::new();

        for object in PemObjects::new(bytes, selection) {
            match object {
                Ok(PemObject::Certificate(cert)) => objects.push(cert.into()),
                Ok(PemObject::Crl(crl)) => objects.push(crl.into()),
                Ok(PemObject::Other(label)) => {
                    debug!("Skipping PEM block: path={}, label={}", path.display(), label);
                }
                Err(source) => {
                    self.report(&LookupError::DecodeFailed {
                        path: path.to_path_buf(),
                        source,
                    });
                    break;
                }
            }
        }
        objects
    }

    fn add_objects(&self, path: &Path, objects: Vec<X509Object>) -> usize {
        let count = objects.len();
        let added = self.store().with_exclusive_access(|store| {
            objects
                .into_iter()
                .map(|object| store.insert(object))
                .filter(|outcome| *outcome == AddOutcome::Added)
                .count()
        });
        debug!(
            "Loaded file into store: path={}, accepted={}, new={}",
            path.display(),
            count,
            added
        );
        count
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, LookupError> {
    std::fs::read(path).map_err(|e| LookupError::io(path, e))
}

fn decode_der(bytes: &[u8], kind: ObjectKind) -> Result<X509Object, CertificateError> {
    match kind {
        ObjectKind::Certificate => certificate_from_der(bytes).map(X509Object::from),
        ObjectKind::Crl => crl_from_der(bytes).map(X509Object::from),
    }
}
