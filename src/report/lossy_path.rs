//! Report paths are written as strings, replacing invalid UTF-8 with U+FFFD.
//!
//! Use with `#[serde(serialize_with = "...")]`; paths deserialize as usual.

use serde::Serializer;
use std::path::{Path, PathBuf};

pub fn serialize<P, S>(path: P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

pub fn serialize_all<'a, I, S>(paths: I, serializer: S) -> Result<S::Ok, S::Error>
where
    I: IntoIterator<Item = &'a PathBuf>,
    S: Serializer,
{
    serializer.collect_seq(paths.into_iter().map(|p| p.to_string_lossy()))
}
