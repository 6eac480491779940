//! Sources of platform trust anchors.

use crate::cert::parsing::{PemObject, PemObjects, PemSelection};
use crate::cert::Certificate;
use crate::constants::SYSTEM_BUNDLE_FILES;
use crate::error::LookupError;
use crate::prelude::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Represents a source of trusted root certificates.
pub trait TrustAnchorSource: Send + Sync + 'static {
    /// Returns every trust anchor of the source.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Io`] if the underlying source cannot be opened.
    fn load_trust_anchors(&self) -> Result<Vec<Certificate>, LookupError>;
}

/// The host's trust anchors, read from the first well-known system bundle file that exists.
///
/// The candidates are [`SYSTEM_BUNDLE_FILES`] unless overridden with
/// [`SystemTrustAnchors::with_candidates`].
#[derive(Debug, Clone)]
pub struct SystemTrustAnchors {
    candidates: Vec<PathBuf>,
}

impl SystemTrustAnchors {
    /// Creates a source probing the well-known system locations.
    pub fn new() -> Self {
        Self {
            candidates: SYSTEM_BUNDLE_FILES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Creates a source probing the given bundle files, in order.
    pub fn with_candidates<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    fn bundle_path(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.is_file())
    }
}

impl Default for SystemTrustAnchors {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustAnchorSource for SystemTrustAnchors {
    fn load_trust_anchors(&self) -> Result<Vec<Certificate>, LookupError> {
        let Some(path) = self.bundle_path() else {
            return Err(LookupError::io(
                self.candidates.first().cloned().unwrap_or_default(),
                io::Error::new(io::ErrorKind::NotFound, "no system trust bundle found"),
            ));
        };

        debug!("Reading system trust anchors: path={}", path.display());
        let bytes = std::fs::read(path).map_err(|e| LookupError::io(path, e))?;

        let mut anchors = Vec::new();
        for object in PemObjects::new(&bytes, PemSelection::Certificates) {
            match object {
                Ok(PemObject::Certificate(cert)) => anchors.push(cert),
                Ok(PemObject::Crl(_) | PemObject::Other(_)) => {}
                Err(e) => {
                    warn!(
                        "Malformed entry in system trust bundle; keeping {} anchors read before it: path={}, error={}",
                        anchors.len(),
                        path.display(),
                        e
                    );
                    break;
                }
            }
        }

        Ok(anchors)
    }
}

/// A fixed set of trust anchors held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticTrustAnchors {
    anchors: Vec<Certificate>,
}

impl StaticTrustAnchors {
    /// Creates a source returning `anchors`.
    pub fn new(anchors: Vec<Certificate>) -> Self {
        Self { anchors }
    }
}

impl TrustAnchorSource for StaticTrustAnchors {
    fn load_trust_anchors(&self) -> Result<Vec<Certificate>, LookupError> {
        Ok(self.anchors.clone())
    }
}
