//! JSON documents kept under the workspace root.
//!  - [analytics::AnalyticsStorage] owns the analytics document: lazy creation, appends and the
//!    status summary.
//!  - [tasks] merges the strategy task list into the master one.
//!
//! Every write replaces the whole document through [crate::fs::operations::replace_file] while
//! holding a [crate::fs::operations::WriterLock].

pub mod analytics;
pub mod entities;
pub mod tasks;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Serializes a document the way it's written to disk: pretty printed, trailing newline.
pub fn to_document(value: &impl Serialize) -> Result<Vec<u8>> {
    let mut buffer = serde_json::to_vec_pretty(value)?;
    buffer.push(b'\n');
    Ok(buffer)
}

pub fn parse_document<T: DeserializeOwned>(path: &Path, raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).with_context(|| format!("Malformed JSON in {path:?}"))
}
