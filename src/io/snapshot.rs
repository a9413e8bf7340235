//! Binary state snapshots: dump and load of cycle state in a directory.
//!
//! Snapshots use a compact binary encoding because payloads may carry
//! opaque model bytes with no sensible text form. Writes go to a temp file
//! first and are renamed into place, so a crash mid-write never leaves a
//! half-written snapshot where a later load would find it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::state::CycleState;
use crate::error::CycleError;

/// File name of the snapshot within a state directory.
pub const SNAPSHOT_FILE: &str = "state.bin";

/// Path of the snapshot file for a state directory.
pub fn snapshot_path(directory: &Path) -> PathBuf {
    directory.join(SNAPSHOT_FILE)
}

/// Serialize `state` into `directory`, atomically replacing any prior
/// snapshot. Creates the directory if needed.
pub fn dump_state(directory: &Path, state: &CycleState) -> Result<(), CycleError> {
    let path = snapshot_path(directory);
    debug!(
        path = %path.display(),
        history_len = state.history().len(),
        "writing snapshot"
    );
    let bytes = bincode::serialize(state).map_err(|err| {
        CycleError::io(
            format!("encode snapshot {}", path.display()),
            io::Error::new(io::ErrorKind::InvalidData, err),
        )
    })?;
    write_atomic(&path, &bytes)
}

/// Decode the snapshot stored in `directory`.
///
/// Returns [`CycleError::StateNotFound`] when no snapshot exists and
/// [`CycleError::StateCorrupt`] when one exists but does not decode.
pub fn load_state(directory: &Path) -> Result<CycleState, CycleError> {
    let path = snapshot_path(directory);
    if !path.exists() {
        return Err(CycleError::StateNotFound { path });
    }
    let bytes = fs::read(&path)
        .map_err(|err| CycleError::io(format!("read snapshot {}", path.display()), err))?;
    let state: CycleState = bincode::deserialize(&bytes).map_err(|err| CycleError::StateCorrupt {
        reason: err.to_string(),
        path,
    })?;
    debug!(history_len = state.history().len(), "snapshot decoded");
    Ok(state)
}

/// Write to a temp file in the target directory, then rename over the
/// destination.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CycleError> {
    let parent = path.parent().ok_or_else(|| {
        CycleError::io(
            format!("resolve parent of {}", path.display()),
            io::Error::new(io::ErrorKind::NotFound, "path has no parent directory"),
        )
    })?;
    fs::create_dir_all(parent)
        .map_err(|err| CycleError::io(format!("create directory {}", parent.display()), err))?;

    let tmp_path = path.with_extension("bin.tmp");
    fs::write(&tmp_path, bytes)
        .map_err(|err| CycleError::io(format!("write temp snapshot {}", tmp_path.display()), err))?;
    fs::rename(&tmp_path, path)
        .map_err(|err| CycleError::io(format!("replace snapshot {}", path.display()), err))
}
