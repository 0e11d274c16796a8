//! Serde models of the three unit documents kept under `UNIT-INF`.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assembly::metadata::{
    AssemblyMetaData, ComponentMetaData, DependencyDirective, ListenerMetaData, PartitionMetaData,
};
use crate::config::Configuration;

/// `dependencies` entry of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDocument {
    pub key: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub name: String,
    pub implementation: String,
    #[serde(default)]
    pub dependencies: Vec<DirectiveDocument>,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDocument {
    pub name: String,
    pub implementation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartitionDocument {
    pub name: String,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
    #[serde(default)]
    pub partitions: Vec<PartitionDocument>,
}

/// `assembly.toml`: the root partition's contents plus listeners.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblyDocument {
    #[serde(default)]
    pub listeners: Vec<ListenerDocument>,
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
    #[serde(default)]
    pub partitions: Vec<PartitionDocument>,
}

/// `config.toml`: one table per component name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationDocument {
    pub components: BTreeMap<String, Configuration>,
}

impl ConfigurationDocument {
    pub fn for_component(&self, name: &str) -> Configuration {
        self.components.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `environment.toml`: isolation and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentDocument {
    /// Entries relative to the unit home, or `work:`-prefixed for the work area
    pub classpath: Vec<String>,
    pub logging: LoggingSection,
    pub properties: BTreeMap<String, String>,
}

fn component_metadata(document: &ComponentDocument, configuration: &ConfigurationDocument) -> ComponentMetaData {
    ComponentMetaData {
        name: document.name.clone(),
        implementation_key: document.implementation.clone(),
        directives: document
            .dependencies
            .iter()
            .map(|d| DependencyDirective {
                consumer_key: d.key.clone(),
                provider_name: d.provider.clone(),
                alias: d.alias.clone(),
            })
            .collect(),
        context_overrides: document.context.clone(),
        configuration: configuration.for_component(&document.name),
        parameters: document.parameters.clone(),
    }
}

fn partition_metadata(
    name: &str,
    depends: &[String],
    components: &[ComponentDocument],
    partitions: &[PartitionDocument],
    configuration: &ConfigurationDocument,
) -> PartitionMetaData {
    PartitionMetaData {
        name: name.to_string(),
        depends: depends.to_vec(),
        components: components
            .iter()
            .map(|c| component_metadata(c, configuration))
            .collect(),
        partitions: partitions
            .iter()
            .map(|p| partition_metadata(&p.name, &p.depends, &p.components, &p.partitions, configuration))
            .collect(),
    }
}

impl AssemblyDocument {
    /// Turn the document into assembly metadata. The root partition takes the unit name.
    pub fn into_metadata(&self, unit: &str, configuration: &ConfigurationDocument) -> AssemblyMetaData {
        let root = partition_metadata(unit, &[], &self.components, &self.partitions, configuration);
        AssemblyMetaData {
            name: unit.to_string(),
            root,
            listeners: self
                .listeners
                .iter()
                .map(|l| ListenerMetaData::new(&l.name, &l.implementation))
                .collect(),
        }
    }
}
