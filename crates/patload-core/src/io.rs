//! Collaborator seams: stream opening and transmission
//!
//! The dispatcher never touches the filesystem or the uploader directly;
//! both are injected behind these traits so the core stays testable and the
//! decompression/subprocess details live in patload-hpt.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Buffered text stream over a (possibly decompressed) configuration file
pub type LineReader = Box<dyn io::BufRead>;

/// Opens a file as a text stream, decoding compressed inputs transparently
pub trait StreamOpener {
    fn open(&self, path: &Path) -> io::Result<LineReader>;
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Uploader reported failure for {}: {status}", .path.display())]
    Rejected {
        path: PathBuf,
        status: std::process::ExitStatus,
    },
    #[error("Failed to invoke uploader: {0}")]
    Io(#[from] io::Error),
}

/// Performs the external send of one file to the receiving device
///
/// Every send blocks until the device has accepted (or rejected) the file;
/// the device is stateful and order-sensitive, so calls must not overlap.
pub trait Transport {
    fn send(&mut self, path: &Path) -> Result<(), TransportError>;
}
