//! Per-file dispatch: classify by header, wrap with hooks, expand masters
//!
//! One `send_file` call transmits one configuration file. Generic files are
//! wrapped with their `<type>.fw.pre` / `<type>.fw.post` firmware hooks;
//! pattern master files expand into their members, which are re-dispatched
//! one by one in dependency order. Everything is synchronous: the tester is
//! stateful and order-sensitive, so each send completes before the next.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{DependencyGraph, GraphError};
use crate::header::{Header, HeaderError, EXPECTED_VERSION, MASTER_FILE_TYPE};
use crate::io::{LineReader, StreamOpener, Transport, TransportError};
use crate::master;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to open {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Master file {} is listed inside its own expansion", .0.display())]
    CyclicMaster(PathBuf),
    #[error("Transmission of {} failed: {source}", .path.display())]
    Transmission {
        path: PathBuf,
        #[source]
        source: TransportError,
    },
}

/// Settings shared by every dispatch, passed in at construction
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Directory that `path:` entries in master files resolve against
    pub base_dir: PathBuf,
    /// Directory searched for `<type>.fw.pre` / `<type>.fw.post` hook files
    pub hook_dir: PathBuf,
    /// Header version the tool expects; anything else warns
    pub expected_version: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            hook_dir: PathBuf::from("."),
            expected_version: EXPECTED_VERSION,
        }
    }
}

/// Sends configuration files through an injected [`Transport`]
pub struct Dispatcher<'a> {
    config: DispatchConfig,
    opener: &'a dyn StreamOpener,
    transport: &'a mut dyn Transport,
    /// Master files currently being expanded, for cycle detection
    expanding: HashSet<PathBuf>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        config: DispatchConfig,
        opener: &'a dyn StreamOpener,
        transport: &'a mut dyn Transport,
    ) -> Self {
        Self {
            config,
            opener,
            transport,
            expanding: HashSet::new(),
        }
    }

    /// Classify `path` by its header line and send it
    ///
    /// Master files are expanded recursively; everything else is sent as a
    /// single body wrapped in its hooks.
    pub fn send_file(&mut self, path: &Path) -> Result<(), DispatchError> {
        let header = self.read_header(path)?;

        if !header.version_matches(self.config.expected_version) {
            warn!(
                path = %path.display(),
                version = %header.version,
                expected = self.config.expected_version,
                "Unexpected file type version"
            );
        }

        if header.is_master() {
            self.send_master(path)
        } else {
            self.send_with_hooks(path, &header.file_type)
        }
    }

    fn open(&self, path: &Path) -> Result<LineReader, DispatchError> {
        self.opener
            .open(path)
            .map_err(|source| DispatchError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
    }

    fn read_header(&self, path: &Path) -> Result<Header, DispatchError> {
        let mut reader = self.open(path)?;
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|source| DispatchError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Header::parse(&line)?)
    }

    fn send_with_hooks(&mut self, path: &Path, file_type: &str) -> Result<(), DispatchError> {
        self.send_hook(&format!("{file_type}.fw.pre"))?;
        self.transmit(path)?;
        self.send_hook(&format!("{file_type}.fw.post"))
    }

    fn send_master(&mut self, path: &Path) -> Result<(), DispatchError> {
        // Cycle identity is the canonical path when resolvable, the literal
        // path otherwise
        let identity = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.expanding.insert(identity.clone()) {
            return Err(DispatchError::CyclicMaster(path.to_path_buf()));
        }
        let result = self.expand_master(path);
        self.expanding.remove(&identity);
        result
    }

    fn expand_master(&mut self, path: &Path) -> Result<(), DispatchError> {
        info!(path = %path.display(), "Expanding pattern master file");

        self.send_hook(&format!("{MASTER_FILE_TYPE}.fw.pre"))?;

        let mut reader = self.open(path)?;
        let mut header_line = String::new();
        // Discard the header; send_file already validated it
        reader
            .read_line(&mut header_line)
            .map_err(|source| DispatchError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let members = master::parse_members(reader, &self.config.base_dir).map_err(|source| {
            DispatchError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let graph = DependencyGraph::scan(&members, self.opener)?;
        let ordered = graph.into_order()?;
        info!(path = %path.display(), members = ordered.len(), "Resolved transmission order");

        for member in &ordered {
            self.send_file(member)?;
        }

        self.send_hook(&format!("{MASTER_FILE_TYPE}.fw.post"))
    }

    /// Send a firmware hook file if one exists
    ///
    /// An absent or unreadable hook is skipped; a hook that opens but then
    /// fails to transmit is fatal.
    fn send_hook(&mut self, name: &str) -> Result<(), DispatchError> {
        let hook = self.config.hook_dir.join(name);
        match self.opener.open(&hook) {
            Ok(_) => self.transmit(&hook),
            Err(err) => {
                debug!(hook = %hook.display(), error = %err, "No hook file, skipping");
                Ok(())
            }
        }
    }

    fn transmit(&mut self, path: &Path) -> Result<(), DispatchError> {
        self.transport
            .send(path)
            .map_err(|source| DispatchError::Transmission {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MapOpener, RecordingTransport};

    fn config() -> DispatchConfig {
        DispatchConfig {
            base_dir: PathBuf::from("pats"),
            hook_dir: PathBuf::from("hooks"),
            expected_version: EXPECTED_VERSION,
        }
    }

    fn dispatch(opener: &MapOpener, target: &str) -> Result<Vec<PathBuf>, DispatchError> {
        let mut transport = RecordingTransport::default();
        let mut dispatcher = Dispatcher::new(config(), opener, &mut transport);
        dispatcher.send_file(Path::new(target))?;
        Ok(transport.sent)
    }

    #[test]
    fn test_generic_file_without_hooks_sends_once() {
        let opener = MapOpener::new().with("t.tim", "hp93000,timing,0.1\nother lines\n");
        let sent = dispatch(&opener, "t.tim").unwrap();
        assert_eq!(sent, vec![PathBuf::from("t.tim")]);
    }

    #[test]
    fn test_generic_file_with_hooks_sends_pre_body_post() {
        let opener = MapOpener::new()
            .with("c.conf", "hp93000,config,0.1\n")
            .with("hooks/config.fw.pre", "FTST\n")
            .with("hooks/config.fw.post", "FTST\n");
        let sent = dispatch(&opener, "c.conf").unwrap();
        assert_eq!(
            sent,
            vec![
                PathBuf::from("hooks/config.fw.pre"),
                PathBuf::from("c.conf"),
                PathBuf::from("hooks/config.fw.post"),
            ]
        );
    }

    #[test]
    fn test_malformed_header_is_fatal_and_echoed() {
        let opener = MapOpener::new().with("bad", "not a header\n");
        let err = dispatch(&opener, "bad").unwrap_err();
        assert!(err.to_string().contains("not a header"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let opener = MapOpener::new();
        assert!(matches!(
            dispatch(&opener, "absent"),
            Err(DispatchError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_master_members_sent_in_dependency_order() {
        let opener = MapOpener::new()
            .with(
                "all.pmf",
                "hp93000,pattern_master_file,0.1\npath: scan\nfiles: caller callee\n",
            )
            .with(
                "pats/scan/caller",
                "hp93000,pattern,0.1\nSQPG 0,CALL,,\"init\"\n",
            )
            .with("pats/scan/callee", "hp93000,pattern,0.1\nSQLB \"init\",MPBU,0,1\n");
        let sent = dispatch(&opener, "all.pmf").unwrap();
        assert_eq!(
            sent,
            vec![
                PathBuf::from("pats/scan/callee"),
                PathBuf::from("pats/scan/caller"),
            ]
        );
    }

    #[test]
    fn test_master_hooks_wrap_the_batch() {
        let opener = MapOpener::new()
            .with("m.pmf", "hp93000,pattern_master_file,0.1\nfiles: only\n")
            .with("pats/only", "hp93000,pattern,0.1\n")
            .with("hooks/pattern_master_file.fw.pre", "FTST\n")
            .with("hooks/pattern_master_file.fw.post", "FTST\n");
        let sent = dispatch(&opener, "m.pmf").unwrap();
        assert_eq!(
            sent,
            vec![
                PathBuf::from("hooks/pattern_master_file.fw.pre"),
                PathBuf::from("pats/only"),
                PathBuf::from("hooks/pattern_master_file.fw.post"),
            ]
        );
    }

    #[test]
    fn test_nested_master_files_expand() {
        let opener = MapOpener::new()
            .with("outer.pmf", "hp93000,pattern_master_file,0.1\nfiles: inner.pmf\n")
            .with(
                "pats/inner.pmf",
                "hp93000,pattern_master_file,0.1\nfiles: leaf\n",
            )
            .with("pats/leaf", "hp93000,pattern,0.1\n");
        let sent = dispatch(&opener, "outer.pmf").unwrap();
        assert_eq!(sent, vec![PathBuf::from("pats/leaf")]);
    }

    #[test]
    fn test_cyclic_master_files_are_detected() {
        let opener = MapOpener::new()
            .with("a.pmf", "hp93000,pattern_master_file,0.1\nfiles: b.pmf\n")
            .with(
                "pats/b.pmf",
                "hp93000,pattern_master_file,0.1\nfiles: b.pmf\n",
            );
        // pats/b.pmf lists itself; the guard trips instead of recursing
        let err = dispatch(&opener, "a.pmf").unwrap_err();
        match err {
            DispatchError::CyclicMaster(path) => {
                assert_eq!(path, PathBuf::from("pats/b.pmf"));
            }
            other => panic!("expected CyclicMaster, got {other:?}"),
        }
    }

    #[test]
    fn test_unorderable_batch_aborts_before_sending() {
        let opener = MapOpener::new()
            .with("m.pmf", "hp93000,pattern_master_file,0.1\nfiles: a b\n")
            .with("pats/a", "hp93000,pattern,0.1\nSQPG 0,CALL,,\"x\"\nSQLB \"y\",M,0,1\n")
            .with("pats/b", "hp93000,pattern,0.1\nSQPG 0,CALL,,\"y\"\nSQLB \"x\",M,0,1\n");
        let mut transport = RecordingTransport::default();
        let mut dispatcher = Dispatcher::new(config(), &opener, &mut transport);
        let err = dispatcher.send_file(Path::new("m.pmf")).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Graph(GraphError::Unorderable { .. })
        ));
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_body_transmission_failure_is_fatal() {
        let opener = MapOpener::new().with("t.tim", "hp93000,timing,0.1\n");
        let mut transport = RecordingTransport {
            failing: vec![PathBuf::from("t.tim")],
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(config(), &opener, &mut transport);
        let err = dispatcher.send_file(Path::new("t.tim")).unwrap_err();
        assert!(matches!(err, DispatchError::Transmission { .. }));
    }

    #[test]
    fn test_master_aborts_on_first_failed_member() {
        let opener = MapOpener::new()
            .with("m.pmf", "hp93000,pattern_master_file,0.1\nfiles: a b\n")
            .with("pats/a", "hp93000,pattern,0.1\n")
            .with("pats/b", "hp93000,pattern,0.1\n");
        let mut transport = RecordingTransport {
            failing: vec![PathBuf::from("pats/a")],
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(config(), &opener, &mut transport);
        assert!(dispatcher.send_file(Path::new("m.pmf")).is_err());
        assert!(transport.sent.is_empty());
    }
}
