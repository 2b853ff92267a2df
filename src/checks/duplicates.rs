use super::{Check, CheckContext, CheckKind};
use crate::config::{weighted_penalty, HealthConfig};
use crate::pool::{sort_by_index, WorkerPool};
use crate::report::lossy_path;
use crate::tree::DatasetTree;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const HASH_CHUNK_SIZE: usize = 8192;

/// Files sharing one content digest. The first path is the copy to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub hash: String,
    #[serde(serialize_with = "lossy_path::serialize_all")]
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn kept(&self) -> Option<&PathBuf> {
        self.files.first()
    }

    /// Every copy after the first.
    pub fn extras(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableFile {
    #[serde(serialize_with = "lossy_path::serialize")]
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub groups_found: usize,
    /// Sum over groups of `len - 1`.
    pub total_duplicates: usize,
    pub examples: Vec<DuplicateGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<UnreadableFile>,
}

pub struct DuplicateCheck {
    weight: u32,
    cap: Option<u32>,
}

impl DuplicateCheck {
    pub fn new(weight: u32, cap: Option<u32>) -> Self {
        Self { weight, cap }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.penalties.duplicate_file, config.penalties.duplicate_cap)
    }
}

impl Check for DuplicateCheck {
    type Output = DuplicateReport;

    fn kind(&self) -> CheckKind {
        CheckKind::Duplicate
    }

    fn run(&self, tree: &DatasetTree, ctx: &CheckContext<'_>) -> DuplicateReport {
        let paths: Vec<PathBuf> = tree.files_bfs().map(|node| node.path.clone()).collect();
        log::debug!("Hashing {} files", paths.len());

        let outcomes = sort_by_index(ctx.pools.io.run_batch(paths, |path| hash_file(path)));

        let mut digests = Vec::with_capacity(outcomes.len());
        let mut unreadable = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(Ok(digest)) => digests.push((outcome.item, digest)),
                Ok(Err(e)) => {
                    log::warn!("Could not hash {}: {}", outcome.item.display(), e);
                    unreadable.push(UnreadableFile {
                        path: outcome.item,
                        error: e.to_string(),
                    });
                }
                Err(failure) => {
                    log::warn!("Could not hash {}: {}", outcome.item.display(), failure);
                    unreadable.push(UnreadableFile {
                        path: outcome.item,
                        error: failure.to_string(),
                    });
                }
            }
        }

        let examples = group_by_digest(digests);
        DuplicateReport {
            groups_found: examples.len(),
            total_duplicates: examples.iter().map(|g| g.files.len() - 1).sum(),
            examples,
            unreadable,
        }
    }

    fn penalty(&self, output: &DuplicateReport) -> u32 {
        weighted_penalty(output.total_duplicates, self.weight, self.cap)
    }
}

/// Hex SHA-256 of a file's contents, read in fixed-size chunks.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Group paths by digest, keeping only digests seen more than once.
///
/// Groups are ordered by the first time their digest was seen, and paths
/// inside a group keep input order.
pub fn group_by_digest(digests: impl IntoIterator<Item = (PathBuf, String)>) -> Vec<DuplicateGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (path, hash) in digests {
        match positions.get(&hash) {
            Some(&i) => groups[i].files.push(path),
            None => {
                positions.insert(hash.clone(), groups.len());
                groups.push(DuplicateGroup {
                    hash,
                    files: vec![path],
                });
            }
        }
    }

    groups.retain(|g| g.files.len() > 1);
    groups
}
