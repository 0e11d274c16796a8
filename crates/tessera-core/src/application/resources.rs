use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::block::BlockEntry;
use crate::assembly::{ComponentCatalog, ComponentProfile};
use crate::config::Configuration;
use crate::descriptor::Cardinality;
use crate::kernel::scope::LoggingScope;
use crate::lifecycle::{
    Component, ComponentContext, ComponentError, ComponentHandle, ComponentLogger, DependencyValue, Parameters,
    ResolvedDependencies, ResourceProvider,
};

/// Resource provider for one unit, resolving dependencies from the
/// components already running in it.
pub struct UnitResourceProvider<'a> {
    pub(crate) unit: &'a str,
    pub(crate) home: &'a std::path::Path,
    pub(crate) work: &'a std::path::Path,
    pub(crate) catalog: &'a ComponentCatalog,
    pub(crate) logging_scope: &'a LoggingScope,
    pub(crate) blocks: &'a BTreeMap<String, BlockEntry>,
}

impl UnitResourceProvider<'_> {
    fn running(&self, name: &str) -> Option<&ComponentHandle> {
        self.blocks.get(name).and_then(|b| b.proxy.as_ref())
    }
}

impl ResourceProvider for UnitResourceProvider<'_> {
    fn create(&self, _name: &str, profile: &ComponentProfile) -> Result<Arc<dyn Component>, ComponentError> {
        self.catalog.create(profile)
    }

    fn logger(&self, name: &str, _profile: &ComponentProfile) -> ComponentLogger {
        self.logging_scope.logger(name)
    }

    fn context(&self, name: &str, profile: &ComponentProfile) -> Result<ComponentContext, ComponentError> {
        let mut context = ComponentContext::new(self.unit, name, self.home, self.work);
        for (key, value) in &profile.metadata.context_overrides {
            context.set_value(key, value);
        }

        for entry in profile.descriptor.context_entries() {
            if !entry.optional && !context.contains(&entry.key) {
                return Err(format!("Required context entry '{}' is not available", entry.key).into());
            }
        }
        Ok(context)
    }

    fn dependencies(&self, name: &str, profile: &ComponentProfile) -> Result<ResolvedDependencies, ComponentError> {
        let mut resolved = ResolvedDependencies::new();

        for dependency in profile.descriptor.dependencies() {
            let mut providers: Vec<(String, ComponentHandle)> = Vec::new();
            for directive in profile.metadata.directives_for(&dependency.key) {
                match self.running(&directive.provider_name) {
                    Some(handle) => providers.push((directive.map_key().to_string(), handle.clone())),
                    None if dependency.optional => {
                        log::debug!(
                            "Optional provider '{}' for '{}' of '{}' is not running",
                            directive.provider_name,
                            dependency.key,
                            name
                        );
                    }
                    None => {
                        return Err(format!(
                            "Provider '{}' for dependency '{}' is not running",
                            directive.provider_name, dependency.key
                        )
                        .into());
                    }
                }
            }

            let value = match dependency.cardinality {
                Cardinality::Single => match providers.pop() {
                    Some((_, handle)) => DependencyValue::Single(handle),
                    None => continue,
                },
                Cardinality::Array => DependencyValue::Array(providers.into_iter().map(|(_, h)| h).collect()),
                Cardinality::Map => DependencyValue::Map(providers.into_iter().collect()),
            };
            resolved.insert(&dependency.key, value);
        }
        Ok(resolved)
    }

    fn configuration(&self, _name: &str, profile: &ComponentProfile) -> Result<Configuration, ComponentError> {
        Ok(profile.metadata.configuration.clone())
    }

    fn parameters(&self, _name: &str, profile: &ComponentProfile) -> Result<Parameters, ComponentError> {
        Ok(Parameters::new(profile.metadata.parameters.clone()))
    }
}
