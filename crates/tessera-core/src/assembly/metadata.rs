use std::collections::BTreeMap;

use crate::config::Configuration;

/// Wires one provider into a consumer's dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDirective {
    /// Dependency key on the consumer's descriptor
    pub consumer_key: String,
    /// Name of the providing component in the same unit
    pub provider_name: String,
    /// Map key for `Map` dependencies
    pub alias: Option<String>,
}

impl DependencyDirective {
    pub fn new(consumer_key: &str, provider_name: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            provider_name: provider_name.to_string(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Key used in a `Map` dependency: the alias, or the provider name without one.
    pub fn map_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.provider_name)
    }
}

/// Per-instance data for one component in an assembly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentMetaData {
    pub name: String,
    pub implementation_key: String,
    pub directives: Vec<DependencyDirective>,
    pub context_overrides: BTreeMap<String, String>,
    pub configuration: Configuration,
    pub parameters: BTreeMap<String, String>,
}

impl ComponentMetaData {
    pub fn new(name: &str, implementation_key: &str) -> Self {
        Self {
            name: name.to_string(),
            implementation_key: implementation_key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_directive(mut self, directive: DependencyDirective) -> Self {
        self.directives.push(directive);
        self
    }

    /// Shorthand for a directive without alias.
    pub fn depends_on(self, consumer_key: &str, provider_name: &str) -> Self {
        self.with_directive(DependencyDirective::new(consumer_key, provider_name))
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context_overrides.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }

    /// Directives targeting one dependency key, in declaration order.
    pub fn directives_for(&self, key: &str) -> Vec<&DependencyDirective> {
        self.directives.iter().filter(|d| d.consumer_key == key).collect()
    }
}

/// A unit listener declared in the assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerMetaData {
    pub name: String,
    pub implementation_key: String,
}

impl ListenerMetaData {
    pub fn new(name: &str, implementation_key: &str) -> Self {
        Self {
            name: name.to_string(),
            implementation_key: implementation_key.to_string(),
        }
    }
}

/// A partition: components plus nested partitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartitionMetaData {
    pub name: String,
    /// Sibling partitions that must start first
    pub depends: Vec<String>,
    pub partitions: Vec<PartitionMetaData>,
    pub components: Vec<ComponentMetaData>,
}

impl PartitionMetaData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_component(mut self, component: ComponentMetaData) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_partition(mut self, partition: PartitionMetaData) -> Self {
        self.partitions.push(partition);
        self
    }

    pub fn depends_on(mut self, sibling: &str) -> Self {
        self.depends.push(sibling.to_string());
        self
    }
}

/// Everything parsed from a unit's assembly document.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyMetaData {
    pub name: String,
    pub root: PartitionMetaData,
    pub listeners: Vec<ListenerMetaData>,
}

impl AssemblyMetaData {
    pub fn new(name: &str, root: PartitionMetaData) -> Self {
        Self {
            name: name.to_string(),
            root,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: ListenerMetaData) -> Self {
        self.listeners.push(listener);
        self
    }
}
