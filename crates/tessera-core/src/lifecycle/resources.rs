use std::collections::BTreeMap;
use std::sync::Arc;

use log::{Level, LevelFilter};

use crate::assembly::profile::ComponentProfile;
use crate::config::Configuration;
use crate::lifecycle::component::{Component, ComponentError, ComponentHandle};
use crate::lifecycle::context::ComponentContext;

/// Logger bound to one component, writing under the `<unit>.<component>` target.
#[derive(Debug, Clone)]
pub struct ComponentLogger {
    target: String,
    level: LevelFilter,
}

impl ComponentLogger {
    pub fn new(target: &str, level: LevelFilter) -> Self {
        Self {
            target: target.to_string(),
            level,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: Level, message: &str) {
        if self.enabled(level) {
            log::log!(target: self.target.as_str(), level, "{}", message);
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// Providers resolved for one dependency key, shaped by its cardinality.
#[derive(Debug, Clone)]
pub enum DependencyValue {
    Single(ComponentHandle),
    Array(Vec<ComponentHandle>),
    Map(BTreeMap<String, ComponentHandle>),
}

impl DependencyValue {
    pub fn handles(&self) -> Vec<ComponentHandle> {
        match self {
            DependencyValue::Single(handle) => vec![handle.clone()],
            DependencyValue::Array(handles) => handles.clone(),
            DependencyValue::Map(handles) => handles.values().cloned().collect(),
        }
    }
}

/// Dependencies resolved for a component, keyed by dependency key.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDependencies {
    entries: BTreeMap<String, DependencyValue>,
}

impl ResolvedDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: DependencyValue) {
        self.entries.insert(key.to_string(), value);
    }

    /// Look up a dependency by key
    pub fn service(&self, key: &str) -> Option<&DependencyValue> {
        self.entries.get(key)
    }

    /// The provider of a single-cardinality dependency.
    pub fn single(&self, key: &str) -> Option<&ComponentHandle> {
        match self.entries.get(key) {
            Some(DependencyValue::Single(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every resolved provider, flattened.
    pub fn handles(&self) -> Vec<ComponentHandle> {
        self.entries.values().flat_map(|v| v.handles()).collect()
    }
}

/// Flat string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Parse a parameter into `T`, `None` if absent or unparsable.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Supplies a component's instance and everything its lifecycle stages need.
///
/// The executor calls exactly one method per stage, and only for the stages
/// the component declares.
pub trait ResourceProvider: Send + Sync {
    fn create(&self, name: &str, profile: &ComponentProfile) -> Result<Arc<dyn Component>, ComponentError>;

    fn logger(&self, name: &str, profile: &ComponentProfile) -> ComponentLogger;

    fn context(&self, name: &str, profile: &ComponentProfile) -> Result<ComponentContext, ComponentError>;

    fn dependencies(&self, name: &str, profile: &ComponentProfile) -> Result<ResolvedDependencies, ComponentError>;

    fn configuration(&self, name: &str, profile: &ComponentProfile) -> Result<Configuration, ComponentError>;

    fn parameters(&self, name: &str, profile: &ComponentProfile) -> Result<Parameters, ComponentError>;
}
