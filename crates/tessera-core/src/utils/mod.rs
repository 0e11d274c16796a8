//! Filesystem helpers shared by the installer.
pub mod fs;

pub use fs::{CopyOutcome, copy_dir_shallow, copy_tree, find_files, remove_files};

#[cfg(test)]
mod tests;
