use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::application::listener::UnitListener;
use crate::assembly::metadata::ListenerMetaData;
use crate::assembly::profile::ComponentProfile;
use crate::descriptor::{ComponentDescriptor, ServiceCatalog, ServiceType};
use crate::kernel::error::{EntityKind, Error, Result};
use crate::lifecycle::component::{Component, ComponentError};

/// Builds a component instance from its profile.
pub type ComponentFactory =
    Arc<dyn Fn(&ComponentProfile) -> std::result::Result<Arc<dyn Component>, ComponentError> + Send + Sync>;

/// Builds a unit listener from its declaration.
pub type ListenerFactory =
    Arc<dyn Fn(&ListenerMetaData) -> std::result::Result<Arc<dyn UnitListener>, ComponentError> + Send + Sync>;

/// A registered component type.
#[derive(Clone)]
pub struct ComponentType {
    pub descriptor: Arc<ComponentDescriptor>,
    /// Service types the implementation actually satisfies
    pub implements: BTreeSet<String>,
    pub factory: ComponentFactory,
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("descriptor", &self.descriptor)
            .field("implements", &self.implements)
            .finish()
    }
}

/// Registry of component and listener types, keyed by implementation key.
#[derive(Default)]
pub struct ComponentCatalog {
    types: BTreeMap<String, ComponentType>,
    listeners: BTreeMap<String, ListenerFactory>,
    services: ServiceCatalog,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type. `implements` lists the service types the
    /// implementation satisfies; the descriptor's provided services are
    /// verified against it.
    pub fn register<F>(&mut self, descriptor: ComponentDescriptor, implements: &[&str], factory: F) -> Result<()>
    where
        F: Fn(&ComponentProfile) -> std::result::Result<Arc<dyn Component>, ComponentError> + Send + Sync + 'static,
    {
        let key = descriptor.implementation_key().to_string();
        if self.types.contains_key(&key) {
            return Err(Error::already_exists(EntityKind::ComponentType, key));
        }

        let component_type = ComponentType {
            descriptor: Arc::new(descriptor),
            implements: implements.iter().map(|s| s.to_string()).collect(),
            factory: Arc::new(factory),
        };
        log::debug!("Registered component type '{}'", key);
        self.types.insert(key, component_type);
        Ok(())
    }

    /// Register a listener type.
    pub fn register_listener<F>(&mut self, implementation_key: &str, factory: F) -> Result<()>
    where
        F: Fn(&ListenerMetaData) -> std::result::Result<Arc<dyn UnitListener>, ComponentError> + Send + Sync + 'static,
    {
        if self.listeners.contains_key(implementation_key) {
            return Err(Error::already_exists(EntityKind::Listener, implementation_key));
        }
        self.listeners.insert(implementation_key.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Register a service type with the embedded service catalog.
    pub fn register_service(&mut self, service_type: ServiceType) -> Result<()> {
        self.services.register(service_type)
    }

    pub fn get(&self, implementation_key: &str) -> Option<&ComponentType> {
        self.types.get(implementation_key)
    }

    pub fn descriptor(&self, implementation_key: &str) -> Option<Arc<ComponentDescriptor>> {
        self.types.get(implementation_key).map(|t| t.descriptor.clone())
    }

    pub fn contains(&self, implementation_key: &str) -> bool {
        self.types.contains_key(implementation_key)
    }

    pub fn has_listener(&self, implementation_key: &str) -> bool {
        self.listeners.contains_key(implementation_key)
    }

    /// Registered implementation keys, sorted.
    pub fn type_keys(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn listener_keys(&self) -> Vec<String> {
        self.listeners.keys().cloned().collect()
    }

    pub fn services(&self) -> &ServiceCatalog {
        &self.services
    }

    /// Whether the type registered under `implementation_key` satisfies `service`.
    pub fn implements(&self, implementation_key: &str, service: &str) -> bool {
        self.types.get(implementation_key).is_some_and(|t| {
            t.implements
                .iter()
                .any(|implemented| self.services.is_assignable(implemented, service))
        })
    }

    /// Instantiate the component described by `profile`.
    pub fn create(&self, profile: &ComponentProfile) -> std::result::Result<Arc<dyn Component>, ComponentError> {
        let key = profile.descriptor.implementation_key();
        let component_type = self
            .types
            .get(key)
            .ok_or_else(|| ComponentError::from(format!("Component type '{}' is not registered", key)))?;
        (component_type.factory)(profile)
    }

    /// Instantiate a unit listener.
    pub fn create_listener(
        &self,
        metadata: &ListenerMetaData,
    ) -> std::result::Result<Arc<dyn UnitListener>, ComponentError> {
        let factory = self.listeners.get(&metadata.implementation_key).ok_or_else(|| {
            ComponentError::from(format!("Listener type '{}' is not registered", metadata.implementation_key))
        })?;
        factory(metadata)
    }
}

impl fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
