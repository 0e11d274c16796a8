use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{DocumentError, load_document};
use crate::kernel::constants::{DEFAULT_DEPLOY_DIR, DEFAULT_WORK_DIR};

/// Runtime-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Log and skip components that fail to start instead of unwinding the unit.
    pub permit_partial_startup: bool,
    /// Keep a unit whose startup failed in the registry, in the `Failed` state.
    pub retain_failed_units: bool,
    /// Root below which unit home locations are created.
    pub deploy_dir: PathBuf,
    /// Root below which unit work areas are created.
    pub work_dir: PathBuf,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            permit_partial_startup: false,
            retain_failed_units: false,
            deploy_dir: PathBuf::from(DEFAULT_DEPLOY_DIR),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
        }
    }
}

impl KernelConfig {
    /// Load from a JSON/YAML/TOML file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        load_document(path)
    }

    /// Place deploy and work directories below `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            deploy_dir: root.join(DEFAULT_DEPLOY_DIR),
            work_dir: root.join(DEFAULT_WORK_DIR),
            ..Self::default()
        }
    }

    pub fn with_partial_startup(mut self, permit: bool) -> Self {
        self.permit_partial_startup = permit;
        self
    }

    pub fn with_retain_failed_units(mut self, retain: bool) -> Self {
        self.retain_failed_units = retain;
        self
    }
}
