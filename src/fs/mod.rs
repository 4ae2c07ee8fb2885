//! Filesystem module.
//!
//! Provides:
//! - Filename sanitization
//! - Output and checkpoint path handling
//! - The resume checkpoint file

pub mod checkpoint;
pub mod naming;
pub mod paths;

pub use checkpoint::ResumeCheckpoint;
pub use naming::sanitize_filename;
pub use paths::{checkpoint_path, resolve_output_path, CHECKPOINT_SUFFIX};
