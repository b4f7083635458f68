//! Value snapshots on disk
//!
//! A snapshot is a JSON document wrapping one value, closures included.
//! Because closures carry their function body and captured locals, a value
//! built with `fix` keeps working after it is loaded into a session that has
//! never seen its definition.

use crate::value::Value;
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const SNAPSHOT_FORMAT: &str = "knot-value";
pub const SNAPSHOT_VERSION: u32 = 1;

/// Deepest JSON nesting a snapshot may have.
///
/// Decoding recurses once per level, so the limit is checked on the raw
/// text before decoding and on the encoded text before anything is written.
pub const MAX_SNAPSHOT_DEPTH: usize = 1024;

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {}", path.display())]
    #[diagnostic(code(knot::snapshot::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write snapshot {}", path.display())]
    #[diagnostic(code(knot::snapshot::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode value")]
    #[diagnostic(code(knot::snapshot::encode))]
    Encode(#[source] serde_json::Error),

    #[error("Snapshot {} is malformed", path.display())]
    #[diagnostic(code(knot::snapshot::decode))]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported snapshot format '{found}'")]
    #[diagnostic(
        code(knot::snapshot::unsupported_format),
        help("Only files written by dump() can be loaded")
    )]
    UnsupportedFormat { found: String },

    #[error("Value is nested {depth} levels deep, more than a snapshot allows ({max})")]
    #[diagnostic(
        code(knot::snapshot::too_deep),
        help("Snapshots hold values nested at most {max} levels deep once encoded")
    )]
    TooDeep { depth: usize, max: usize },

    #[error("Unsupported snapshot version {found}")]
    #[diagnostic(
        code(knot::snapshot::unsupported_version),
        help("This build reads snapshot version 1")
    )]
    UnsupportedVersion { found: u32 },
}

/// On-disk envelope for a single value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub format: String,
    pub version: u32,
    pub value: Value,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    format: String,
    version: u32,
}

impl ValueSnapshot {
    pub fn new(value: Value) -> Self {
        Self {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            value,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Encode)
    }
}

/// Write `value` to `path`, replacing any existing file
pub fn save(value: &Value, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let json = ValueSnapshot::new(value.clone()).to_json()?;
    check_depth(&json)?;
    fs::write(path, json).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), type_name = value.type_name(), "value dumped");
    Ok(())
}

/// Read a value previously written by [`save`]
pub fn load(path: impl AsRef<Path>) -> Result<Value, SnapshotError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = decode(&json, path)?;
    info!(path = %path.display(), type_name = value.type_name(), "value loaded");
    Ok(value)
}

fn decode(json: &str, path: &Path) -> Result<Value, SnapshotError> {
    let malformed = |source: serde_json::Error| SnapshotError::Decode {
        path: path.to_path_buf(),
        source,
    };

    check_depth(json)?;

    // Check the envelope first so a foreign file reports why it was rejected.
    let header: SnapshotHeader = from_json(json).map_err(malformed)?;
    if header.format != SNAPSHOT_FORMAT {
        return Err(SnapshotError::UnsupportedFormat {
            found: header.format,
        });
    }
    if header.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: header.version,
        });
    }

    let snapshot: ValueSnapshot = from_json(json).map_err(malformed)?;
    debug!(bytes = json.len(), "snapshot decoded");
    Ok(snapshot.value)
}

/// `serde_json::from_str` with the recursion limit lifted; the input is
/// bounded by [`check_depth`] instead
fn from_json<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

fn check_depth(json: &str) -> Result<(), SnapshotError> {
    let depth = nesting_depth(json);
    if depth > MAX_SNAPSHOT_DEPTH {
        return Err(SnapshotError::TooDeep {
            depth,
            max: MAX_SNAPSHOT_DEPTH,
        });
    }
    Ok(())
}

/// Deepest bracket nesting in JSON text, ignoring brackets inside strings
fn nesting_depth(json: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;

    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    deepest
}
