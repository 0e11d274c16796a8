//! # Tessera Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and the `Result` alias used by every
//! public operation.
//!
//! Subsystems keep their own typed errors ([`DependencyError`],
//! [`StageFailure`], [`VerificationError`], [`InstallationError`],
//! [`DocumentError`]) and convert into [`Error`] through `#[from]`, so callers
//! can match on the precise failure while still propagating with `?`.
use std::fmt;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::assembly::error::VerificationError;
use crate::config::DocumentError;
use crate::dependency::DependencyError;
use crate::deployer::error::InstallationError;
use crate::lifecycle::error::StageFailure;

/// Crate-wide error type.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The dependency graph of a partition (or of sibling partitions) has no valid order.
    #[error("Dependency resolution failed: {0}")]
    Dependency(#[from] DependencyError),

    /// One lifecycle stage failed for one component.
    #[error(transparent)]
    Stage(#[from] StageFailure),

    /// Structural problem in an assembly, always detected before activation.
    #[error("Assembly verification failed: {0}")]
    Verification(#[from] VerificationError),

    /// Installing a deployment unit failed.
    #[error("Installation failed: {0}")]
    Installation(#[from] InstallationError),

    /// Removing an installed deployment unit failed.
    #[error("Uninstallation of unit '{unit}' failed: {source}")]
    Uninstallation {
        unit: String,
        #[source]
        source: Box<Error>,
    },

    /// Reading or parsing a document failed.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// The operation is invalid in the current running/stopped state.
    #[error("Precondition failed for '{subject}': {message}")]
    Precondition { subject: String, message: String },

    /// Operation on an unknown unit, component, installation or type.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    /// A name is already in use.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    /// A component's configuration was rejected by the configuration validator.
    #[error("Invalid configuration for component '{component}' in unit '{unit}': {message}")]
    InvalidConfiguration {
        unit: String,
        component: String,
        message: String,
    },

    /// Registration with the management collaborator failed.
    #[error("Management operation '{operation}' failed for '{name}': {message}")]
    Management {
        operation: &'static str,
        name: String,
        message: String,
    },

    /// Several independent steps failed; every failure is kept.
    #[error("{operation} failed with {} error(s): {}", .errors.len(), join_errors(.errors))]
    Multiple { operation: String, errors: Vec<Error> },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// The kind of named entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Unit,
    Partition,
    Component,
    Listener,
    ComponentType,
    ServiceType,
    Installation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Unit => "Unit",
            EntityKind::Partition => "Partition",
            EntityKind::Component => "Component",
            EntityKind::Listener => "Listener",
            EntityKind::ComponentType => "Component type",
            EntityKind::ServiceType => "Service type",
            EntityKind::Installation => "Installation",
        };
        f.write_str(label)
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound { kind, name: name.into() }
    }

    pub fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::AlreadyExists { kind, name: name.into() }
    }

    pub fn precondition(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Precondition {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Collapses a list of failures: `Ok` when empty, the error itself when
    /// there is exactly one, `Multiple` otherwise.
    pub fn collect(operation: impl Into<String>, mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple {
                operation: operation.into(),
                errors,
            }),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition { .. })
    }

    /// The stage failure behind this error, if any.
    pub fn stage_failure(&self) -> Option<&StageFailure> {
        match self {
            Error::Stage(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
