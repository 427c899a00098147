//! Dependency graph construction and topological ordering
//!
//! A pattern master file batch is ordered so that any file calling a label
//! defined in another file is transmitted after the file defining it. The
//! graph lives for one batch: built from the raw member list, ordered once,
//! discarded.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::io::StreamOpener;
use crate::scanner::Scanner;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to open {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No transmission order satisfies all calls; stuck: {}", describe_stuck(.stuck))]
    Unorderable { stuck: Vec<StuckNode> },
}

/// A file the sorter could not place, with the names nothing declared
#[derive(Debug, Clone)]
pub struct StuckNode {
    pub filename: PathBuf,
    pub unmet: Vec<String>,
}

fn describe_stuck(stuck: &[StuckNode]) -> String {
    stuck
        .iter()
        .map(|s| format!("{} (needs {})", s.filename.display(), s.unmet.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Labels declared and calls required by one pattern file
///
/// A name appearing as both a label and a call within the same file is
/// satisfied locally and belongs to neither set; construction takes the raw
/// sets and keeps only the symmetric difference, so the result does not
/// depend on the order directives appeared in the file.
#[derive(Debug, Clone)]
pub struct FileNode {
    filename: PathBuf,
    declares: HashSet<String>,
    requires: HashSet<String>,
}

impl FileNode {
    pub fn new(
        filename: impl Into<PathBuf>,
        labels: HashSet<String>,
        calls: HashSet<String>,
    ) -> Self {
        let declares = labels.difference(&calls).cloned().collect();
        let requires = calls.difference(&labels).cloned().collect();
        Self {
            filename: filename.into(),
            declares,
            requires,
        }
    }

    pub fn filename(&self) -> &PathBuf {
        &self.filename
    }

    /// Names this file makes available to others
    pub fn declares(&self) -> &HashSet<String> {
        &self.declares
    }

    /// Names some other file must declare first
    pub fn requires(&self) -> &HashSet<String> {
        &self.requires
    }
}

/// Per-batch collection of [`FileNode`]s in master-file order
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<FileNode>,
}

impl DependencyGraph {
    /// Scan each member file and build its node
    ///
    /// Files are scanned independently; input order is preserved and later
    /// serves as the tie-break order when sorting. Any unreadable member is
    /// fatal for the whole batch.
    pub fn scan(files: &[PathBuf], opener: &dyn StreamOpener) -> Result<Self, GraphError> {
        let scanner = Scanner::new();
        let mut nodes = Vec::with_capacity(files.len());

        for file in files {
            let reader = opener.open(file).map_err(|source| GraphError::Unreadable {
                path: file.clone(),
                source,
            })?;
            let names = scanner.scan(reader).map_err(|source| GraphError::Unreadable {
                path: file.clone(),
                source,
            })?;
            let node = FileNode::new(file.clone(), names.labels, names.calls);
            debug!(
                file = %file.display(),
                declares = node.declares.len(),
                requires = node.requires.len(),
                "Scanned pattern file"
            );
            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[FileNode] {
        &self.nodes
    }

    /// Produce a transmission order satisfying every cross-file call
    ///
    /// Repeated-pass placement: each pass appends every node whose
    /// requirements are already satisfied, in current order, feeding each
    /// placed node's labels to later nodes of the same pass. A pass that
    /// places nothing means no order exists.
    pub fn into_order(self) -> Result<Vec<PathBuf>, GraphError> {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut satisfied: HashSet<String> = HashSet::new();
        let mut remaining = self.nodes;

        while !remaining.is_empty() {
            let placed_before = ordered.len();
            let mut stalled = Vec::new();

            for node in remaining {
                if node.requires.iter().all(|name| satisfied.contains(name)) {
                    satisfied.extend(node.declares.iter().cloned());
                    ordered.push(node.filename);
                } else {
                    stalled.push(node);
                }
            }

            if ordered.len() == placed_before {
                let stuck = stalled
                    .into_iter()
                    .map(|node| {
                        let mut unmet: Vec<String> = node
                            .requires
                            .difference(&satisfied)
                            .cloned()
                            .collect();
                        unmet.sort();
                        StuckNode {
                            filename: node.filename,
                            unmet,
                        }
                    })
                    .collect();
                return Err(GraphError::Unorderable { stuck });
            }

            remaining = stalled;
        }

        Ok(ordered)
    }
}
