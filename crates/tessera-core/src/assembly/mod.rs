//! # Tessera Assembly Model
//!
//! The tree of partitions and components making up a deployment unit.
//!
//! Metadata ([`metadata`]) is what the unit's documents say; profiles
//! ([`profile`]) pair each component with its type's descriptor from the
//! [`ComponentCatalog`]. The [`AssemblyVerifier`] checks a profile tree for
//! structural problems before anything is instantiated.
pub mod catalog;
pub mod document;
pub mod error;
pub mod metadata;
pub mod profile;
pub mod verifier;

pub use catalog::{ComponentCatalog, ComponentFactory, ComponentType, ListenerFactory};
pub use document::{AssemblyDocument, ConfigurationDocument, EnvironmentDocument};
pub use error::VerificationError;
pub use metadata::{AssemblyMetaData, ComponentMetaData, DependencyDirective, ListenerMetaData, PartitionMetaData};
pub use profile::{AssemblyProfile, ComponentProfile, PartitionProfile};
pub use verifier::AssemblyVerifier;

#[cfg(test)]
mod tests;
