//! Pattern file scanning for label and call directives
//!
//! Pattern files declare sequencer labels with lines like
//! `SQLB "bscan_highz",MPBU,0,1,,(pnobscan)` and invoke labels from other
//! files with `SQPG 0,CALL,,"bscan_mask_pins",,(pnobscan)`. The scanner
//! reduces one file to the two raw name sets that drive dependency ordering;
//! same-file cancellation happens when the sets become a [`FileNode`].
//!
//! [`FileNode`]: crate::graph::FileNode

use regex::Regex;
use std::collections::HashSet;
use std::io::{self, BufRead};

/// Raw directive names collected from one file, before same-file cancellation
#[derive(Debug, Default)]
pub struct DirectiveNames {
    /// Names defined by `SQLB` lines
    pub labels: HashSet<String>,
    /// Names referenced by `SQPG ...,CALL,...` lines
    pub calls: HashSet<String>,
}

/// Recognizes label/call directives in pattern file text
pub struct Scanner {
    label_re: Regex,
    call_re: Regex,
    vector_re: Regex,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            label_re: Regex::new(r#"^SQLB "([^"]*)""#).unwrap(),
            call_re: Regex::new(r#"^SQPG \d+,CALL,[^,]*,"([^"]*)""#).unwrap(),
            vector_re: Regex::new(r"^VEC[CD]").unwrap(),
        }
    }

    /// Collect every label definition and call reference in a file
    ///
    /// Scanning stops at the first `VECC`/`VECD` line. The format puts all
    /// sequencer directives ahead of the vector data, so nothing relevant
    /// follows that marker; this is an assumption about the format, not a
    /// structural guarantee.
    pub fn scan(&self, reader: impl BufRead) -> io::Result<DirectiveNames> {
        let mut names = DirectiveNames::default();

        for line in reader.lines() {
            let line = line?;
            if let Some(m) = self.label_re.captures(&line) {
                names.labels.insert(m[1].to_string());
            }
            if let Some(m) = self.call_re.captures(&line) {
                names.calls.insert(m[1].to_string());
            }
            if self.vector_re.is_match(&line) {
                break;
            }
        }

        Ok(names)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(text: &str) -> DirectiveNames {
        Scanner::new().scan(Cursor::new(text.to_string())).unwrap()
    }

    #[test]
    fn test_collects_labels_and_calls() {
        let names = scan(concat!(
            "hp93000,pattern,0.1\n",
            "SQLB \"bscan_highz\",MPBU,0,1,,(pnobscan)\n",
            "SQPG 0,CALL,,\"bscan_mask_pins\",,(pnobscan)\n",
        ));
        assert!(names.labels.contains("bscan_highz"));
        assert!(names.calls.contains("bscan_mask_pins"));
    }

    #[test]
    fn test_repeated_names_are_idempotent() {
        let names = scan(concat!(
            "SQLB \"init\",MPBU,0,1\n",
            "SQLB \"init\",MPBU,0,1\n",
            "SQPG 1,CALL,,\"reset\"\n",
            "SQPG 2,CALL,,\"reset\"\n",
        ));
        assert_eq!(names.labels.len(), 1);
        assert_eq!(names.calls.len(), 1);
    }

    #[test]
    fn test_stops_at_vector_data() {
        let names = scan(concat!(
            "SQLB \"before\",MPBU,0,1\n",
            "VECC many vectors follow\n",
            "SQLB \"after\",MPBU,0,1\n",
            "SQPG 0,CALL,,\"after_call\"\n",
        ));
        assert!(names.labels.contains("before"));
        assert!(!names.labels.contains("after"));
        assert!(names.calls.is_empty());

        let names = scan("VECD 0\nSQLB \"x\",MPBU,0,1\n");
        assert!(names.labels.is_empty());
    }

    #[test]
    fn test_directives_must_start_the_line() {
        let names = scan("  SQLB \"indented\"\nsome SQPG 0,CALL,,\"mid\"\n");
        assert!(names.labels.is_empty());
        assert!(names.calls.is_empty());
    }

    #[test]
    fn test_call_with_optional_field() {
        let names = scan("SQPG 12,CALL,3,\"target\",,(pins)\n");
        assert!(names.calls.contains("target"));
    }

    #[test]
    fn test_non_call_sqpg_ignored() {
        let names = scan("SQPG 0,JSUB,,\"not_a_call\"\nSQPG 1,STVA,0\n");
        assert!(names.calls.is_empty());
    }
}
