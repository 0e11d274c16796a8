use std::sync::Arc;

use crate::assembly::catalog::ComponentCatalog;
use crate::assembly::error::VerificationError;
use crate::assembly::metadata::{AssemblyMetaData, ComponentMetaData, ListenerMetaData, PartitionMetaData};
use crate::descriptor::ComponentDescriptor;

/// A component instance: its type's descriptor plus its assembly metadata.
#[derive(Debug, Clone)]
pub struct ComponentProfile {
    pub descriptor: Arc<ComponentDescriptor>,
    pub metadata: ComponentMetaData,
}

impl ComponentProfile {
    pub fn new(descriptor: Arc<ComponentDescriptor>, metadata: ComponentMetaData) -> Self {
        Self { descriptor, metadata }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn implementation_key(&self) -> &str {
        &self.metadata.implementation_key
    }
}

/// A partition with its components resolved against the catalog.
#[derive(Debug, Clone)]
pub struct PartitionProfile {
    pub name: String,
    pub depends: Vec<String>,
    pub partitions: Vec<PartitionProfile>,
    pub components: Vec<ComponentProfile>,
}

impl PartitionProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn build(unit: &str, metadata: &PartitionMetaData, catalog: &ComponentCatalog) -> Result<Self, VerificationError> {
        let components = metadata
            .components
            .iter()
            .map(|component| {
                let descriptor = catalog.descriptor(&component.implementation_key).ok_or_else(|| {
                    VerificationError::UnknownImplementation {
                        unit: unit.to_string(),
                        name: component.name.clone(),
                        implementation: component.implementation_key.clone(),
                    }
                })?;
                Ok(ComponentProfile::new(descriptor, component.clone()))
            })
            .collect::<Result<Vec<_>, VerificationError>>()?;

        let partitions = metadata
            .partitions
            .iter()
            .map(|child| PartitionProfile::build(unit, child, catalog))
            .collect::<Result<Vec<_>, VerificationError>>()?;

        Ok(Self {
            name: metadata.name.clone(),
            depends: metadata.depends.clone(),
            partitions,
            components,
        })
    }

    fn collect_components<'a>(&'a self, out: &mut Vec<&'a ComponentProfile>) {
        for child in &self.partitions {
            child.collect_components(out);
        }
        out.extend(self.components.iter());
    }

    fn collect_components_mut<'a>(&'a mut self, out: &mut Vec<&'a mut ComponentProfile>) {
        for child in self.partitions.iter_mut() {
            child.collect_components_mut(out);
        }
        out.extend(self.components.iter_mut());
    }

    fn collect_partitions<'a>(&'a self, out: &mut Vec<&'a PartitionProfile>) {
        out.push(self);
        for child in &self.partitions {
            child.collect_partitions(out);
        }
    }
}

/// The resolved profile tree of a whole deployment unit.
#[derive(Debug, Clone)]
pub struct AssemblyProfile {
    pub name: String,
    pub root: PartitionProfile,
    pub listeners: Vec<ListenerMetaData>,
}

impl AssemblyProfile {
    /// Resolve every component's implementation key against `catalog`.
    pub fn build(metadata: &AssemblyMetaData, catalog: &ComponentCatalog) -> Result<Self, VerificationError> {
        let root = PartitionProfile::build(&metadata.name, &metadata.root, catalog)?;

        for listener in &metadata.listeners {
            if !catalog.has_listener(&listener.implementation_key) {
                return Err(VerificationError::UnknownImplementation {
                    unit: metadata.name.clone(),
                    name: listener.name.clone(),
                    implementation: listener.implementation_key.clone(),
                });
            }
        }

        Ok(Self {
            name: metadata.name.clone(),
            root,
            listeners: metadata.listeners.clone(),
        })
    }

    /// All components, child partitions before their parent's own components.
    pub fn components(&self) -> Vec<&ComponentProfile> {
        let mut out = Vec::new();
        self.root.collect_components(&mut out);
        out
    }

    pub fn components_mut(&mut self) -> Vec<&mut ComponentProfile> {
        let mut out = Vec::new();
        self.root.collect_components_mut(&mut out);
        out
    }

    /// All partitions, root first.
    pub fn partitions(&self) -> Vec<&PartitionProfile> {
        let mut out = Vec::new();
        self.root.collect_partitions(&mut out);
        out
    }

    pub fn find(&self, name: &str) -> Option<&ComponentProfile> {
        self.components().into_iter().find(|c| c.name() == name)
    }

    pub fn component_names(&self) -> Vec<String> {
        self.components().iter().map(|c| c.name().to_string()).collect()
    }
}
