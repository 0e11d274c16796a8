use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::LevelFilter;

use crate::lifecycle::ComponentLogger;

/// Per-unit isolation handle.
///
/// The kernel never looks inside; only collaborators (validators, resource
/// lookups) interpret the entries or the attached extension.
#[derive(Clone, Default)]
pub struct IsolationScope {
    name: String,
    entries: Vec<PathBuf>,
    properties: BTreeMap<String, String>,
    extension: Option<Arc<dyn Any + Send + Sync>>,
}

impl IsolationScope {
    pub fn new(name: &str, entries: Vec<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            entries,
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Attach builder-specific state.
    pub fn with_extension<T: Any + Send + Sync>(mut self, extension: T) -> Self {
        self.extension = Some(Arc::new(extension));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved classpath-style entries.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }

    pub fn extension<T: Any>(&self) -> Option<&T> {
        self.extension.as_ref().and_then(|e| e.downcast_ref::<T>())
    }
}

impl fmt::Debug for IsolationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsolationScope")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("properties", &self.properties)
            .field("extension", &self.extension.is_some())
            .finish()
    }
}

/// Logging hierarchy for one unit: every component logs under `<root>.<component>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingScope {
    root: String,
    level: LevelFilter,
}

impl LoggingScope {
    pub fn new(root: &str, level: LevelFilter) -> Self {
        Self {
            root: root.to_string(),
            level,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Logger for a component of this unit.
    pub fn logger(&self, component: &str) -> ComponentLogger {
        ComponentLogger::new(&format!("{}.{}", self.root, component), self.level)
    }
}

impl Default for LoggingScope {
    fn default() -> Self {
        Self::new("tessera", LevelFilter::Info)
    }
}
