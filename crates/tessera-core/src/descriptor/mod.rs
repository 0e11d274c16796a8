//! # Tessera Descriptor Model
//!
//! Immutable value objects describing a component *type*: the services it
//! provides, the dependencies it requires, the context entries it reads, its
//! configuration schema and the lifecycle capabilities it declares.
//!
//! Descriptors are built once when a type is registered in the
//! [`ComponentCatalog`](crate::assembly::ComponentCatalog) and shared as
//! `Arc<ComponentDescriptor>` afterwards; nothing mutates them.
//!
//! - **[`capability`]**: the [`CapabilitySet`] bitset and the exclusive pairs.
//! - **[`service`]**: the [`ServiceCatalog`] of known service types and
//!   assignability between them.
pub mod capability;
pub mod service;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

pub use capability::CapabilitySet;
pub use service::{ServiceCatalog, ServiceKind, ServiceType, Visibility};

/// A service a component type provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub service_type: String,
    pub attributes: BTreeMap<String, String>,
}

impl ServiceDescriptor {
    pub fn new(service_type: &str) -> Self {
        Self {
            service_type: service_type.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// How many providers a dependency accepts and how they are handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Exactly one provider.
    Single,
    /// Any number of providers, in directive order.
    Array,
    /// Any number of providers keyed by directive alias.
    Map,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Array => write!(f, "array"),
            Cardinality::Map => write!(f, "map"),
        }
    }
}

/// A dependency a component type requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    /// Key the consumer uses to look the dependency up.
    pub key: String,
    /// Service type every provider must be assignable to.
    pub service_type: String,
    pub optional: bool,
    pub cardinality: Cardinality,
}

impl DependencyDescriptor {
    /// Create a new required single-provider dependency
    pub fn single(key: &str, service_type: &str) -> Self {
        Self {
            key: key.to_string(),
            service_type: service_type.to_string(),
            optional: false,
            cardinality: Cardinality::Single,
        }
    }

    /// Create a new array dependency (zero or more providers)
    pub fn array(key: &str, service_type: &str) -> Self {
        Self {
            cardinality: Cardinality::Array,
            optional: true,
            ..Self::single(key, service_type)
        }
    }

    /// Create a new map dependency (zero or more providers keyed by alias)
    pub fn map(key: &str, service_type: &str) -> Self {
        Self {
            cardinality: Cardinality::Map,
            optional: true,
            ..Self::single(key, service_type)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }
}

impl fmt::Display for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requirement = if self.optional { "Optional" } else { "Requires" };
        write!(f, "{} {} '{}' ({})", requirement, self.service_type, self.key, self.cardinality)
    }
}

/// A context entry a component type reads during contextualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntryDescriptor {
    pub key: String,
    pub optional: bool,
}

/// Reference to the schema a component's configuration is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationSchemaRef {
    /// Schema location, meaningful to the configuration validator only.
    pub location: String,
    /// Top-level keys that must be present in the configuration.
    pub required_keys: Vec<String>,
}

/// Immutable description of a component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    implementation_key: String,
    services: Vec<ServiceDescriptor>,
    dependencies: Vec<DependencyDescriptor>,
    context_entries: Vec<ContextEntryDescriptor>,
    schema: Option<ConfigurationSchemaRef>,
    capabilities: CapabilitySet,
}

impl ComponentDescriptor {
    /// Start describing the type registered under `implementation_key`.
    pub fn new(implementation_key: &str) -> Self {
        Self {
            implementation_key: implementation_key.to_string(),
            services: Vec::new(),
            dependencies: Vec::new(),
            context_entries: Vec::new(),
            schema: None,
            capabilities: CapabilitySet::empty(),
        }
    }

    pub fn provides(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }

    pub fn requires(mut self, dependency: DependencyDescriptor) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn reads_context(mut self, key: &str, optional: bool) -> Self {
        self.context_entries.push(ContextEntryDescriptor {
            key: key.to_string(),
            optional,
        });
        self
    }

    pub fn with_schema(mut self, schema: ConfigurationSchemaRef) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn implementation_key(&self) -> &str {
        &self.implementation_key
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn service_types(&self) -> Vec<String> {
        self.services.iter().map(|s| s.service_type.clone()).collect()
    }

    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }

    pub fn dependency(&self, key: &str) -> Option<&DependencyDescriptor> {
        self.dependencies.iter().find(|d| d.key == key)
    }

    pub fn context_entries(&self) -> &[ContextEntryDescriptor] {
        &self.context_entries
    }

    pub fn schema(&self) -> Option<&ConfigurationSchemaRef> {
        self.schema.as_ref()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn supports(&self, capability: CapabilitySet) -> bool {
        self.capabilities.contains(capability)
    }
}

#[cfg(test)]
mod tests;
