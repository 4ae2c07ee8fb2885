//! Output and checkpoint path handling.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the output path for the resume checkpoint.
pub const CHECKPOINT_SUFFIX: &str = ".dl-info";

/// Path of the resume checkpoint belonging to `output`.
pub fn checkpoint_path(output: &Path) -> PathBuf {
    let mut path = OsString::from(output.as_os_str());
    path.push(CHECKPOINT_SUFFIX);
    PathBuf::from(path)
}

/// Use the explicit output path if given, otherwise the proposed filename.
pub fn resolve_output_path(explicit: Option<&Path>, proposed: &str) -> PathBuf {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => PathBuf::from(proposed),
    }
}
