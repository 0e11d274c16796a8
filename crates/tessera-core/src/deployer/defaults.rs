//! Default collaborators used by [`Runtime`](crate::kernel::bootstrap::Runtime).
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use log::{LevelFilter, warn};

use crate::assembly::{AssemblyDocument, ComponentProfile, ConfigurationDocument, EnvironmentDocument};
use crate::config::{Configuration, load_document};
use crate::deployer::collaborators::{
    ConfigurationProcessor, ConfigurationValidator, DocumentReader, IsolationScopeBuilder, LoggingScopeBuilder,
};
use crate::kernel::constants::{CLASSES_DIR, CONTEXT_COMPONENT_NAME, CONTEXT_UNIT_NAME, LIB_DIR};
use crate::kernel::error::{Error, Result};
use crate::kernel::scope::{IsolationScope, LoggingScope};

/// Reads unit documents from disk in any supported format.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentReader;

impl DocumentReader for FileDocumentReader {
    fn read_assembly(&self, path: &Path) -> Result<AssemblyDocument> {
        Ok(load_document(path)?)
    }

    fn read_configuration(&self, path: &Path) -> Result<ConfigurationDocument> {
        Ok(load_document(path)?)
    }

    fn read_environment(&self, path: &Path) -> Result<EnvironmentDocument> {
        Ok(load_document(path)?)
    }
}

/// Prefix marking a classpath entry relative to the work area.
pub const WORK_PREFIX: &str = "work:";

/// Resolves classpath entries to paths below the unit home or work area.
///
/// The work area's `classes` folder and every file in its `lib` folder are
/// appended after the declared entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIsolationScopeBuilder;

#[async_trait]
impl IsolationScopeBuilder for DefaultIsolationScopeBuilder {
    async fn build(
        &self,
        unit: &str,
        environment: &EnvironmentDocument,
        home: &Path,
        work: &Path,
    ) -> Result<IsolationScope> {
        let mut entries: Vec<PathBuf> = environment
            .classpath
            .iter()
            .map(|entry| match entry.strip_prefix(WORK_PREFIX) {
                Some(relative) => work.join(relative),
                None => home.join(entry),
            })
            .collect();

        let classes = work.join(CLASSES_DIR);
        if classes.is_dir() {
            entries.push(classes);
        }

        let lib = work.join(LIB_DIR);
        if lib.is_dir() {
            let mut libs: Vec<PathBuf> = std::fs::read_dir(&lib)
                .map_err(|e| Error::Other(format!("Failed to read '{}': {}", lib.display(), e)))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            libs.sort();
            entries.extend(libs);
        }

        Ok(IsolationScope::new(unit, entries).with_properties(environment.properties.clone()))
    }
}

/// Builds a logging scope rooted at the unit name with the document's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoggingScopeBuilder;

#[async_trait]
impl LoggingScopeBuilder for DefaultLoggingScopeBuilder {
    async fn build(
        &self,
        unit: &str,
        environment: &EnvironmentDocument,
        _home: &Path,
        _work: &Path,
    ) -> Result<LoggingScope> {
        let level = LevelFilter::from_str(&environment.logging.level).map_err(|_| {
            Error::Other(format!(
                "Invalid log level '{}' in environment of unit '{}'",
                environment.logging.level, unit
            ))
        })?;
        Ok(LoggingScope::new(unit, level))
    }
}

/// Accepts a configuration when every key required by the component's
/// schema reference is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaKeysValidator;

#[async_trait]
impl ConfigurationValidator for SchemaKeysValidator {
    async fn validate(&self, profile: &ComponentProfile, _scope: &IsolationScope) -> Result<bool> {
        let Some(schema) = profile.descriptor.schema() else {
            return Ok(true);
        };

        let configuration = &profile.metadata.configuration;
        let missing: Vec<&str> = schema
            .required_keys
            .iter()
            .filter(|key| !configuration.contains_key(key))
            .map(|key| key.as_str())
            .collect();

        if !missing.is_empty() {
            warn!(
                "Configuration of '{}' is missing required key(s) {} (schema '{}')",
                profile.name(),
                missing.join(", "),
                schema.location
            );
            return Ok(false);
        }
        Ok(true)
    }
}

/// Substitutes `${name}` placeholders in string values.
///
/// `${unit.name}` and `${component.name}` are always known; more variables
/// can be added. Unknown placeholders are left as written.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderProcessor {
    variables: BTreeMap<String, String>,
}

impl PlaceholderProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, key: &str, value: &str) -> Self {
        self.variables.insert(key.to_string(), value.to_string());
        self
    }

    /// Replace every known `${key}` in `input`.
    pub fn substitute(input: &str, variables: &BTreeMap<String, String>) -> String {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("${") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match variables.get(key) {
                        Some(value) => output.push_str(value),
                        None => output.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    output.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        output.push_str(rest);
        output
    }
}

#[async_trait]
impl ConfigurationProcessor for PlaceholderProcessor {
    async fn process(&self, unit: &str, component: &str, configuration: Configuration) -> Result<Configuration> {
        let mut variables = self.variables.clone();
        variables.insert(CONTEXT_UNIT_NAME.to_string(), unit.to_string());
        variables.insert(CONTEXT_COMPONENT_NAME.to_string(), component.to_string());

        Ok(configuration.map_strings(|s| Self::substitute(s, &variables)))
    }
}
