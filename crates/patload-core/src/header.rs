//! Header line parsing and file type classification
//!
//! Every smarTest configuration file opens with a line like
//! `hp93000,timing,0.1`. The type field selects dispatch behavior and names
//! the firmware hook files; the version is only ever checked for a warning.

use thiserror::Error;

/// Product tag every header must carry
pub const PRODUCT_TAG: &str = "hp93000";

/// The one file type that expands into other files instead of being sent
pub const MASTER_FILE_TYPE: &str = "pattern_master_file";

/// Header version this tool was written against
pub const EXPECTED_VERSION: f64 = 0.1;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("First line of file should look like \"hp93000,filetype,0.1\", but is: {0:?}")]
    Malformed(String),
}

/// Parsed first line of a configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// File type, e.g. `config`, `timing`, `pattern_master_file`
    pub file_type: String,
    /// Version field as written in the file
    pub version: String,
}

impl Header {
    /// Parse a `<product>,<type>,<version>` line
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let trimmed = line.trim_end();
        let malformed = || HeaderError::Malformed(line.to_string());

        let mut fields = trimmed.splitn(3, ',');
        let (Some(product), Some(file_type), Some(version)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };

        let type_ok = !file_type.is_empty()
            && file_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        let version_ok = !version.is_empty()
            && version.chars().all(|c| c.is_ascii_digit() || c == '.');

        if product != PRODUCT_TAG || !type_ok || !version_ok {
            return Err(malformed());
        }

        Ok(Self {
            file_type: file_type.to_string(),
            version: version.to_string(),
        })
    }

    /// Whether this file is a pattern master file
    pub fn is_master(&self) -> bool {
        self.file_type == MASTER_FILE_TYPE
    }

    /// Whether the version field parses to the expected value
    pub fn version_matches(&self, expected: f64) -> bool {
        self.version
            .parse::<f64>()
            .map(|v| v == expected)
            .unwrap_or(false)
    }
}
