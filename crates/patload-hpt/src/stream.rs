//! Suffix-selected decompressing stream opener
//!
//! Configuration files may arrive as `file.gz`, `file.bz2`, or `file.xz`;
//! the suffix picks the codec and everything else is read as plain text.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use xz2::read::XzDecoder;

use patload_core::io::{LineReader, StreamOpener};

/// Compression formats recognized by filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Bzip2,
    Xz,
    Plain,
}

/// Pick the codec for a filename from its suffix
pub fn codec_for(path: &Path) -> Codec {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Codec::Gzip,
        Some("bz2") => Codec::Bzip2,
        Some("xz") => Codec::Xz,
        _ => Codec::Plain,
    }
}

/// Opens configuration files as text, decoding compressed ones by suffix
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixOpener;

impl StreamOpener for SuffixOpener {
    fn open(&self, path: &Path) -> io::Result<LineReader> {
        let file = File::open(path)?;
        Ok(match codec_for(path) {
            Codec::Gzip => Box::new(BufReader::new(GzDecoder::new(file))),
            Codec::Bzip2 => Box::new(BufReader::new(BzDecoder::new(file))),
            Codec::Xz => Box::new(BufReader::new(XzDecoder::new(file))),
            Codec::Plain => Box::new(BufReader::new(file)),
        })
    }
}
