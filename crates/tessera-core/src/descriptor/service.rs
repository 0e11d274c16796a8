use std::collections::{HashMap, HashSet, VecDeque};

use crate::descriptor::capability::{LIFECYCLE_TYPES, is_lifecycle_type};
use crate::kernel::error::{EntityKind, Error, Result};

/// Whether a service type is an interface or a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Interface,
    Concrete,
}

/// Visibility of a service type outside the crate/unit that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A known service type and the types it extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceType {
    pub name: String,
    pub kind: ServiceKind,
    pub visibility: Visibility,
    pub extends: Vec<String>,
}

impl ServiceType {
    /// A public interface type with no parents.
    pub fn interface(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ServiceKind::Interface,
            visibility: Visibility::Public,
            extends: Vec::new(),
        }
    }

    /// A public concrete type with no parents.
    pub fn concrete(name: &str) -> Self {
        Self {
            kind: ServiceKind::Concrete,
            ..Self::interface(name)
        }
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn extending(mut self, parent: &str) -> Self {
        self.extends.push(parent.to_string());
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ServiceKind::Interface
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// Catalog of service types used for assignability checks.
///
/// A new catalog already knows the lifecycle capability types, so provided
/// services that extend them can be detected.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    types: HashMap<String, ServiceType>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        let types = LIFECYCLE_TYPES
            .iter()
            .map(|(_, name)| (name.to_string(), ServiceType::interface(name)))
            .collect();
        Self { types }
    }

    /// Register a service type. Names must be unique.
    pub fn register(&mut self, service_type: ServiceType) -> Result<()> {
        if self.types.contains_key(&service_type.name) {
            return Err(Error::already_exists(EntityKind::ServiceType, &service_type.name));
        }
        self.types.insert(service_type.name.clone(), service_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ServiceType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All types `name` extends, transitively. Does not include `name` itself.
    /// Unknown parents are included by name but not expanded.
    pub fn ancestors(&self, name: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(name);

        while let Some(current) = queue.pop_front() {
            if let Some(service_type) = self.types.get(current) {
                for parent in &service_type.extends {
                    if seen.insert(parent.clone()) {
                        queue.push_back(parent);
                    }
                }
            }
        }
        seen.remove(name);
        seen
    }

    /// Whether a value of type `provided` can be used where `required` is expected.
    pub fn is_assignable(&self, provided: &str, required: &str) -> bool {
        provided == required || self.ancestors(provided).contains(required)
    }

    /// The first lifecycle type `name` extends, if any.
    pub fn lifecycle_ancestor(&self, name: &str) -> Option<String> {
        let mut ancestors: Vec<String> = self
            .ancestors(name)
            .into_iter()
            .filter(|a| is_lifecycle_type(a))
            .collect();
        ancestors.sort();
        ancestors.into_iter().next()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
