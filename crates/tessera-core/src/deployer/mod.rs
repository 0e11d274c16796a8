//! # Tessera Deployment Coordinator
//!
//! Turns a deployment source into a running unit and back.
//!
//! `deploy` runs install → read documents → build scopes → build profiles →
//! verify → validate and process configuration → add to the kernel, and
//! uninstalls again if anything after installation fails. `redeploy` holds
//! the kernel lock across undeploy and deploy and restores the original
//! source when the new one cannot be deployed.
//!
//! The collaborators ([`Installer`], [`DocumentReader`], the scope builders,
//! [`ConfigurationValidator`], [`ConfigurationProcessor`]) are traits; the
//! [`defaults`] and [`installer`] modules provide file-based implementations.
pub mod collaborators;
pub mod coordinator;
pub mod defaults;
pub mod error;
pub mod installer;

pub use collaborators::{
    ConfigurationProcessor, ConfigurationValidator, DocumentReader, InstallationRecord, Installer,
    IsolationScopeBuilder, LoggingScopeBuilder,
};
pub use coordinator::Deployer;
pub use defaults::{
    DefaultIsolationScopeBuilder, DefaultLoggingScopeBuilder, FileDocumentReader, PlaceholderProcessor,
    SchemaKeysValidator,
};
pub use error::InstallationError;
pub use installer::DirectoryInstaller;
