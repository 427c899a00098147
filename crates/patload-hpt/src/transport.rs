//! Process transport driving the external hpt uploader
//!
//! The uploader binary speaks the firmware pipe to the tester; this
//! transport runs it once per file and waits for it to finish, keeping the
//! whole batch strictly sequential.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use patload_core::io::{Transport, TransportError};

/// Sends files by invoking the hpt uploader once per file
pub struct HptTransport {
    uploader: PathBuf,
}

impl HptTransport {
    pub fn new(uploader: impl Into<PathBuf>) -> Self {
        Self {
            uploader: uploader.into(),
        }
    }
}

impl Transport for HptTransport {
    fn send(&mut self, path: &Path) -> Result<(), TransportError> {
        info!(path = %path.display(), "Uploading");
        let status = Command::new(&self.uploader).arg(path).status()?;
        debug!(path = %path.display(), %status, "Uploader finished");

        if !status.success() {
            return Err(TransportError::Rejected {
                path: path.to_path_buf(),
                status,
            });
        }
        Ok(())
    }
}
