//! The hash-directory provider.
//!
//! Directories registered with [`Lookup::add_dir`] hold files named
//! `<hash>.<n>` (certificates) and `<hash>.r<n>` (CRLs), where `<hash>` is the
//! eight-digit lowercase hex [`NameHasher`](crate::NameHasher) value of the subject
//! (issuer for CRLs) and `<n>` counts up from `0`. This is the layout produced by
//! OpenSSL's `c_rehash`.
//!
//! A subject query walks the directories in registration order. For each one it loads
//! the bucket chain `<hash>.0`, `<hash>.1`, ... until a file is missing or yields no
//! object, then scans the store. The first directory whose files put a match into the
//! store wins.

use crate::cert::parsing::ObjectKind;
use crate::constants::{
    CERTIFICATE_BUCKET_SUFFIX, CRL_BUCKET_SUFFIX, DEFAULT_CERT_DIR, PATH_LIST_SEPARATOR,
};
use crate::error::LookupError;
use crate::lookup::{ControlCommand, FileType, Lookup, LookupMethod};
use crate::name::X509Name;
use crate::prelude::debug;
use crate::store::{ObjectType, X509Object};
use std::path::{Path, PathBuf};

pub(crate) static HASH_DIR_LOOKUP: LookupMethod = LookupMethod {
    construct: Some(dir_construct),
    destruct: Some(dir_destruct),
    control: Some(dir_control),
    by_subject: Some(dir_by_subject),
    ..LookupMethod::new("Load certs from files in a directory")
};

/// A registered directory and the encoding of its bucket files.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CertDir {
    path: String,
    file_type: FileType,
}

impl CertDir {
    /// Returns the directory path as registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the encoding of the bucket files.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }
}

/// Provider state of a hash-directory lookup: its directories, in search order.
///
/// Available through [`Lookup::state`].
#[derive(Debug, Default)]
pub struct DirectoryState {
    dirs: Vec<CertDir>,
}

impl DirectoryState {
    /// Returns the registered directories, in search order.
    pub fn entries(&self) -> &[CertDir] {
        &self.dirs
    }

    /// Appends each non-empty entry of a separator-delimited list unless a directory
    /// with the same path is already registered.
    fn add(&mut self, dirs: Option<&str>, file_type: FileType) -> Result<(), LookupError> {
        let dirs = dirs.ok_or(LookupError::InvalidDirectory)?;
        if dirs.is_empty() {
            return Err(LookupError::InvalidDirectory);
        }

        for path in dirs.split(PATH_LIST_SEPARATOR).filter(|p| !p.is_empty()) {
            if self.dirs.iter().any(|d| d.path == path) {
                continue;
            }
            self.dirs.push(CertDir {
                path: path.to_string(),
                file_type,
            });
        }
        Ok(())
    }
}

/// Returns the name of bucket file `index` for `hash`, e.g. `1a2b3c4d.0` for a
/// certificate or `1a2b3c4d.r0` for a CRL.
///
/// Returns `None` for object types that have no buckets.
pub fn bucket_file_name(hash: u32, object_type: ObjectType, index: u32) -> Option<String> {
    bucket_suffix(object_type).map(|suffix| format!("{hash:08x}.{suffix}{index}"))
}

fn bucket_suffix(object_type: ObjectType) -> Option<&'static str> {
    match object_type {
        ObjectType::Certificate => Some(CERTIFICATE_BUCKET_SUFFIX),
        ObjectType::Crl => Some(CRL_BUCKET_SUFFIX),
        _ => None,
    }
}

fn dir_construct(lookup: &mut Lookup) -> Result<(), LookupError> {
    lookup.set_state(DirectoryState::default());
    Ok(())
}

fn dir_destruct(lookup: &mut Lookup) {
    if let Some(state) = lookup.take_state() {
        if let Ok(state) = state.downcast::<DirectoryState>() {
            debug!(
                "Releasing certificate directories: count={}",
                state.dirs.len()
            );
        }
    }
}

fn dir_control(
    lookup: &mut Lookup,
    command: ControlCommand,
    arg: Option<&str>,
    argl: i64,
) -> Result<bool, LookupError> {
    if command != ControlCommand::AddDir {
        return Ok(false);
    }

    let file_type = match FileType::try_from(argl) {
        Ok(file_type) => file_type,
        Err(e) => {
            lookup.report(&e);
            return Ok(false);
        }
    };

    let defaults;
    let (dirs, file_type) = if file_type == FileType::Default {
        defaults = lookup
            .config()
            .default_cert_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_CERT_DIR.to_string());
        (Some(defaults.as_str()), FileType::Pem)
    } else {
        (arg, file_type)
    };

    let Some(state) = lookup.state_mut::<DirectoryState>() else {
        debug!("Directory lookup has no state; ignoring add_dir");
        return Ok(false);
    };

    match state.add(dirs, file_type) {
        Ok(()) => {
            debug!("Registered certificate directories: dirs={}", dirs.unwrap_or_default());
            Ok(true)
        }
        Err(e) => {
            lookup.report(&e);
            if argl == FileType::Default.code() {
                lookup.report(&LookupError::LoadingCertDirFailed);
            }
            Ok(false)
        }
    }
}

fn dir_by_subject(
    lookup: &Lookup,
    object_type: ObjectType,
    name: &X509Name,
) -> Result<Option<X509Object>, LookupError> {
    let kind = match object_type {
        ObjectType::Certificate => ObjectKind::Certificate,
        ObjectType::Crl => ObjectKind::Crl,
        other => {
            lookup.report(&LookupError::WrongLookupType(other));
            return Ok(None);
        }
    };

    let Some(state) = lookup.state::<DirectoryState>() else {
        return Ok(None);
    };
    if state.dirs.is_empty() {
        return Ok(None);
    }

    let hash = lookup.name_hasher().hash(name);
    for dir in &state.dirs {
        let mut loaded = Vec::new();
        let chain = load_bucket_chain(lookup, dir, hash, object_type, kind, &mut loaded);

        // Buckets read before a failure are kept in the store.
        let found = lookup.store().with_exclusive_access(|objects| {
            for object in loaded {
                objects.insert(object);
            }
            objects.find(object_type, name).cloned()
        });
        chain?;

        if let Some(found) = found {
            debug!(
                "Resolved {} from directory: dir={}, hash={:08x}",
                object_type, dir.path, hash
            );
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Decodes `<hash>.<suffix>0`, `<hash>.<suffix>1`, ... in `dir` into `loaded` until a file
/// is missing or yields no object. Objects decoded before an error stay in `loaded`.
fn load_bucket_chain(
    lookup: &Lookup,
    dir: &CertDir,
    hash: u32,
    object_type: ObjectType,
    kind: ObjectKind,
    loaded: &mut Vec<X509Object>,
) -> Result<(), LookupError> {
    for index in 0.. {
        let Some(path) = bucket_path(&dir.path, hash, object_type, index) else {
            break;
        };
        if !path.exists() {
            break;
        }

        let objects = lookup.read_objects(&path, kind, dir.file_type)?;
        if objects.is_empty() {
            debug!("Bucket yielded no objects; stopping: path={}", path.display());
            break;
        }
        loaded.extend(objects);
    }

    Ok(())
}

fn bucket_path(dir: &str, hash: u32, object_type: ObjectType, index: u32) -> Option<PathBuf> {
    bucket_file_name(hash, object_type, index).map(|file| Path::new(dir).join(file))
}
