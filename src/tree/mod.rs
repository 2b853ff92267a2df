//! In-memory model of the dataset directory tree.
//!
//! The tree is built once per run and is read-only afterwards; every check
//! walks it instead of touching the directory structure again. Children keep
//! the order in which the filesystem enumerated them unless
//! [`TreeOptions::sort_entries`] is set.

mod traversal;

pub use traversal::{BreadthFirst, FilesBreadthFirst};

use crate::config::TreeConfig;
use crate::errors::{HealthError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One filesystem entry. Files never have children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub path: PathBuf,
    pub is_file: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_file: true,
            children: Vec::new(),
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_file: false,
            children,
        }
    }

    /// Directory children only.
    pub fn subdirectories(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| !c.is_file)
    }

    /// File children only.
    pub fn files(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| c.is_file)
    }

    /// A directory with no subdirectories.
    pub fn is_leaf_directory(&self) -> bool {
        !self.is_file && self.subdirectories().next().is_none()
    }

    /// Lower-cased extension including the dot, e.g. `.png`.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }
}

/// Options controlling how the tree is built.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub sort_entries: bool,
    pub ignore_patterns: Vec<glob::Pattern>,
}

impl TreeOptions {
    pub fn from_config(config: &TreeConfig) -> Result<Self> {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            sort_entries: config.sort_entries,
            ignore_patterns,
        })
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_patterns.iter().any(|p| p.matches(name))
    }
}

/// The dataset tree. The root is always a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTree {
    root: Node,
}

impl DatasetTree {
    /// Build the tree rooted at `root_path` with default options.
    pub fn build(root_path: impl AsRef<Path>) -> Result<Self> {
        Self::build_with_options(root_path, &TreeOptions::default())
    }

    /// Build the tree rooted at `root_path`.
    ///
    /// Fails if the root does not exist, is not a directory, or cannot be
    /// listed. Unlistable subdirectories are logged and kept empty; symlink
    /// loops are logged and skipped.
    pub fn build_with_options(root_path: impl AsRef<Path>, options: &TreeOptions) -> Result<Self> {
        let root_path = root_path.as_ref();
        let metadata = fs::metadata(root_path).map_err(|e| {
            HealthError::filesystem_with_source("Dataset root does not exist", root_path, e)
        })?;
        if !metadata.is_dir() {
            return Err(HealthError::filesystem(
                "Dataset root is not a directory",
                root_path,
            ));
        }

        let children = walk_children(root_path, options).map_err(|e| {
            HealthError::filesystem_with_source("Failed to list dataset root", root_path, e.into())
        })?;

        log::debug!(
            "Built dataset tree for {} ({} top-level entries)",
            root_path.display(),
            children.len()
        );

        Ok(Self {
            root: Node::directory(entry_name(root_path), root_path, children),
        })
    }

    /// Wrap an already-built root node.
    ///
    /// Returns `None` if the root is a file.
    pub fn from_root(root: Node) -> Option<Self> {
        (!root.is_file).then_some(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Every node, breadth-first, starting with the root.
    pub fn bfs(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(&self.root)
    }

    /// File nodes in breadth-first discovery order.
    pub fn files_bfs(&self) -> FilesBreadthFirst<'_> {
        FilesBreadthFirst::new(&self.root)
    }

    /// File nodes in depth-first (pre-order) order.
    pub fn files_dfs(&self) -> Vec<&Node> {
        fn visit<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
            if node.is_file {
                out.push(node);
            } else {
                for child in &node.children {
                    visit(child, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.root, &mut out);
        out
    }

    pub fn file_count(&self) -> usize {
        self.bfs().filter(|n| n.is_file).count()
    }

    /// Directory count, including the root.
    pub fn directory_count(&self) -> usize {
        self.bfs().filter(|n| !n.is_file).count()
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Walk everything below `root` and assemble the child nodes.
///
/// Entries arrive depth-first with each directory before its contents, so
/// `open` holds the chain of directories from the root to the current parent.
fn walk_children(root: &Path, options: &TreeOptions) -> std::result::Result<Vec<Node>, walkdir::Error> {
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(true);
    if options.sort_entries {
        walker = walker.sort_by_file_name();
    }

    let entries = walker.into_iter().filter_entry(|entry| {
        let ignored = options.is_ignored(&entry.file_name().to_string_lossy());
        if ignored {
            log::debug!("Ignoring {}", entry.path().display());
        }
        !ignored
    });

    let mut open = vec![Node::directory(String::new(), root, Vec::new())];
    for entry in entries {
        let (depth, node) = match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                let node = if entry.file_type().is_dir() {
                    Node::directory(name, entry.path(), Vec::new())
                } else {
                    Node::file(name, entry.path())
                };
                (entry.depth(), node)
            }
            Err(err) if err.depth() == 0 || err.path() == Some(root) => return Err(err),
            Err(err) => match dangling_link(&err) {
                Some(node) => (err.depth(), node),
                None => {
                    log::warn!("Skipping entry: {}", err);
                    continue;
                }
            },
        };

        close_deeper_than(&mut open, depth);
        if node.is_file {
            if let Some(parent) = open.last_mut() {
                parent.children.push(node);
            }
        } else {
            open.push(node);
        }
    }

    close_deeper_than(&mut open, 1);
    Ok(open.pop().map(|root| root.children).unwrap_or_default())
}

/// Pop open directories until the one at `depth - 1` is innermost.
fn close_deeper_than(open: &mut Vec<Node>, depth: usize) {
    while open.len() > depth {
        if let Some(done) = open.pop() {
            if let Some(parent) = open.last_mut() {
                parent.children.push(done);
            }
        }
    }
}

/// A symlink whose target is gone stays in the tree as a file, so the
/// corrupt-file check reports it as unreadable.
fn dangling_link(err: &walkdir::Error) -> Option<Node> {
    let path = err.path()?;
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    (is_link && fs::metadata(path).is_err()).then(|| Node::file(entry_name(path), path))
}
