use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::assembly::{AssemblyDocument, ComponentProfile, ConfigurationDocument, EnvironmentDocument};
use crate::config::Configuration;
use crate::kernel::error::Result;
use crate::kernel::scope::{IsolationScope, LoggingScope};

/// Where an installed unit lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRecord {
    pub name: String,
    pub source: PathBuf,
    pub home: PathBuf,
    pub work: PathBuf,
    pub assembly: PathBuf,
    pub configuration: PathBuf,
    pub environment: PathBuf,
    /// Files written into `home`, removed again on uninstall
    pub installed_files: Vec<PathBuf>,
    /// Whether `home` was created by the install
    pub created_home: bool,
}

/// Unpacks a deployment source into a home and a work area.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, name: &str, source: &Path) -> Result<InstallationRecord>;

    async fn uninstall(&self, record: &InstallationRecord) -> Result<()>;
}

/// Reads the three unit documents.
pub trait DocumentReader: Send + Sync {
    fn read_assembly(&self, path: &Path) -> Result<AssemblyDocument>;

    fn read_configuration(&self, path: &Path) -> Result<ConfigurationDocument>;

    fn read_environment(&self, path: &Path) -> Result<EnvironmentDocument>;
}

#[async_trait]
pub trait IsolationScopeBuilder: Send + Sync {
    async fn build(&self, unit: &str, environment: &EnvironmentDocument, home: &Path, work: &Path)
    -> Result<IsolationScope>;
}

#[async_trait]
pub trait LoggingScopeBuilder: Send + Sync {
    async fn build(&self, unit: &str, environment: &EnvironmentDocument, home: &Path, work: &Path)
    -> Result<LoggingScope>;
}

/// Checks a component's configuration before the unit is activated.
#[async_trait]
pub trait ConfigurationValidator: Send + Sync {
    async fn validate(&self, profile: &ComponentProfile, scope: &IsolationScope) -> Result<bool>;
}

/// Rewrites a component's configuration before the unit is activated.
#[async_trait]
pub trait ConfigurationProcessor: Send + Sync {
    async fn process(&self, unit: &str, component: &str, configuration: Configuration) -> Result<Configuration>;
}
