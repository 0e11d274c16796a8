//! # Tessera Kernel
//!
//! The `kernel` module tracks deployment units and wires the runtime together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Unit Registry**: [`KernelRegistry`](registry::KernelRegistry) maps unit
//!   names to running [`Application`](crate::application::Application)s and
//!   offers reentrant locking of the name listing.
//! - **Management**: the [`ManagementRegistrar`](management::ManagementRegistrar)
//!   seam and an in-memory implementation.
//! - **Scopes**: opaque per-unit [`IsolationScope`](scope::IsolationScope) and
//!   the [`LoggingScope`](scope::LoggingScope) hierarchy.
//! - **Bootstrap**: [`Runtime`](bootstrap::Runtime) builds a kernel, catalog and
//!   deployer from a [`KernelConfig`](crate::config::KernelConfig).
//! - **Errors and constants**: the crate-wide [`Error`](error::Error) and
//!   `Result`, and the archive layout names.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod management;
pub mod registry;
pub mod scope;

pub use bootstrap::Runtime;
pub use error::{EntityKind, Error, Result};
pub use management::{InMemoryRegistrar, ManagementRegistrar};
pub use registry::{KernelRegistry, OperationReport, RegistryLock};
pub use scope::{IsolationScope, LoggingScope};

#[cfg(test)]
mod tests;
