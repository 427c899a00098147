//! In-memory fakes for the stream and transport seams

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use crate::io::{LineReader, StreamOpener, Transport, TransportError};

/// Opener backed by a path → contents map
#[derive(Debug, Default)]
pub struct MapOpener {
    files: HashMap<PathBuf, String>,
}

impl MapOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.insert(path.into(), contents.to_string());
        self
    }
}

impl StreamOpener for MapOpener {
    fn open(&self, path: &Path) -> io::Result<LineReader> {
        match self.files.get(path) {
            Some(contents) => Ok(Box::new(Cursor::new(contents.clone().into_bytes()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

/// Transport that records every send instead of performing it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<PathBuf>,
    /// Paths whose send should report failure
    pub failing: Vec<PathBuf>,
}

impl Transport for RecordingTransport {
    fn send(&mut self, path: &Path) -> Result<(), TransportError> {
        if self.failing.iter().any(|p| p == path) {
            return Err(TransportError::Io(io::Error::other("device rejected file")));
        }
        self.sent.push(path.to_path_buf());
        Ok(())
    }
}
