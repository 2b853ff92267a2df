//! Empty, unreadable and undecodable files.
//!
//! Runs in two phases. The light phase stats every file and reads a short
//! prefix on the I/O pool. Files with a decodable image extension that pass
//! it go on to the heavy phase, a full decode on the CPU pool.

use super::decode::{decode_image, DecodeError};
use super::file_kind::is_verifiable_image;
use super::{Check, CheckContext, CheckKind};
use crate::config::{weighted_penalty, HealthConfig};
use crate::pool::{TaskFailure, WorkerPool};
use crate::report::lossy_path;
use crate::tree::DatasetTree;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

const PROBE_BYTES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorruptReason {
    #[serde(rename = "empty file")]
    EmptyFile,
    #[serde(rename = "unreadable")]
    Unreadable,
    #[serde(rename = "image corrupted")]
    ImageCorrupted,
}

impl std::fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::EmptyFile => "empty file",
            Self::Unreadable => "unreadable",
            Self::ImageCorrupted => "image corrupted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptFile {
    #[serde(serialize_with = "lossy_path::serialize")]
    pub path: PathBuf,
    pub reason: CorruptReason,
    /// Underlying error text, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CorruptFile {
    fn new(path: PathBuf, reason: CorruptReason, detail: Option<String>) -> Self {
        Self {
            path,
            reason,
            detail,
        }
    }
}

pub struct CorruptFileCheck {
    weight: u32,
    cap: Option<u32>,
}

impl CorruptFileCheck {
    pub fn new(weight: u32, cap: Option<u32>) -> Self {
        Self { weight, cap }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.penalties.corrupt_file, config.penalties.corrupt_cap)
    }
}

impl Check for CorruptFileCheck {
    type Output = Vec<CorruptFile>;

    fn kind(&self) -> CheckKind {
        CheckKind::CorruptFile
    }

    fn run(&self, tree: &DatasetTree, ctx: &CheckContext<'_>) -> Vec<CorruptFile> {
        let files: Vec<(PathBuf, bool)> = tree
            .files_dfs()
            .into_iter()
            .map(|node| (node.path.clone(), is_verifiable_image(node)))
            .collect();

        let mut corrupt = Vec::new();
        let mut to_decode = Vec::new();

        for outcome in ctx.pools.io.run_batch(files, |(path, _)| light_check(path)) {
            let (path, is_image) = outcome.item;
            match outcome.result {
                Ok(Some(found)) => corrupt.push(CorruptFile::new(path, found.0, found.1)),
                Ok(None) if is_image => to_decode.push(path),
                Ok(None) => {}
                Err(failure) => corrupt.push(panicked(path, CorruptReason::Unreadable, failure)),
            }
        }

        log::debug!(
            "Light phase flagged {} files; decoding {} images",
            corrupt.len(),
            to_decode.len()
        );

        for outcome in ctx.pools.cpu.run_batch(to_decode, |path| verify_image(path)) {
            match outcome.result {
                Ok(Ok(())) => {}
                Ok(Err(DecodeError::TooLarge(limit))) => {
                    log::warn!("Not verifying {}: {}", outcome.item.display(), limit);
                }
                Ok(Err(e)) => corrupt.push(CorruptFile::new(
                    outcome.item,
                    CorruptReason::ImageCorrupted,
                    Some(e.to_string()),
                )),
                Err(failure) => corrupt.push(panicked(
                    outcome.item,
                    CorruptReason::ImageCorrupted,
                    failure,
                )),
            }
        }

        corrupt.sort_by(|a, b| a.path.cmp(&b.path));
        corrupt
    }

    fn penalty(&self, output: &Vec<CorruptFile>) -> u32 {
        weighted_penalty(output.len(), self.weight, self.cap)
    }
}

fn panicked(path: PathBuf, reason: CorruptReason, failure: TaskFailure) -> CorruptFile {
    log::warn!("Check of {} failed: {}", path.display(), failure);
    CorruptFile::new(path, reason, Some(failure.to_string()))
}

/// Stat the file and read its first bytes.
pub fn light_check(path: &Path) -> Option<(CorruptReason, Option<String>)> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => return Some((CorruptReason::Unreadable, Some(e.to_string()))),
    };
    if metadata.len() == 0 {
        return Some((CorruptReason::EmptyFile, None));
    }

    let mut prefix = [0u8; PROBE_BYTES];
    File::open(path)
        .and_then(|mut file| file.read(&mut prefix))
        .err()
        .map(|e| (CorruptReason::Unreadable, Some(e.to_string())))
}

/// Fully decode an image, detecting the format from its content.
pub fn verify_image(path: &Path) -> Result<(), DecodeError> {
    decode_image(path).map(|_| ())
}
