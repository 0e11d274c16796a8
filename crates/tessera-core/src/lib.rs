pub mod application;
pub mod assembly;
pub mod config;
pub mod dependency;
pub mod deployer;
pub mod descriptor;
pub mod kernel;
pub mod lifecycle;
pub mod utils;

// Re-export key public types/traits for easier use by the binary
pub use application::{Application, UnitDefinition, UnitEvent, UnitListener, UnitState};
pub use assembly::{AssemblyProfile, AssemblyVerifier, ComponentCatalog, ComponentProfile};
pub use config::{Configuration, KernelConfig};
pub use deployer::Deployer;
pub use descriptor::{CapabilitySet, ComponentDescriptor, DependencyDescriptor, ServiceDescriptor, ServiceType};
pub use kernel::error::Error as KernelError;
pub use kernel::{KernelRegistry, Runtime};
pub use lifecycle::{Component, ComponentError, ComponentHandle, ComponentResult, LifecycleStage};

#[cfg(test)]
mod tests;
