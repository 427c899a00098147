//! Master file parsing
//!
//! A pattern master file lists its members in `path:` / `files:` blocks:
//!
//! ```text
//! hp93000,pattern_master_file,0.1
//! path: scan_patterns          -- directory, relative to the base dir
//! files:
//!     bscan_init
//!     bscan_highz
//! path: func_patterns
//! files:
//!     func_smoke
//! ```
//!
//! Blocks may alternate; each file resolves against the most recent `path:`
//! entry. `--` comments run to the end of their line.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Token opening a "collecting path" block
pub const PATH_INTRODUCER: &str = "path:";
/// Token opening a "collecting files" block
pub const FILES_INTRODUCER: &str = "files:";
/// Prefix that comments out the rest of a line
pub const COMMENT_MARKER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No introducer seen yet; bare tokens are ignored
    Idle,
    CollectingPath,
    CollectingFiles,
}

/// Resolve the member file list of a master file body
///
/// `reader` starts after the header line. The returned list is in listing
/// order; dependency sorting happens later.
pub fn parse_members(reader: impl BufRead, base_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut state = State::Idle;
    let mut prefix = base_dir.to_path_buf();
    let mut files = Vec::new();

    for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            if token.starts_with(COMMENT_MARKER) {
                break;
            }
            match token {
                PATH_INTRODUCER => state = State::CollectingPath,
                FILES_INTRODUCER => state = State::CollectingFiles,
                _ => match state {
                    State::CollectingPath => prefix = base_dir.join(token),
                    State::CollectingFiles => files.push(prefix.join(token)),
                    State::Idle => {}
                },
            }
        }
    }

    Ok(files)
}
