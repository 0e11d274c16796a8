use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::constants::{CONTEXT_COMPONENT_NAME, CONTEXT_UNIT_HOME, CONTEXT_UNIT_NAME, CONTEXT_UNIT_WORK};

/// Context handed to a component during the contextualize stage.
#[derive(Clone, Default)]
pub struct ComponentContext {
    /// String entries, including the unit and component names
    values: BTreeMap<String, String>,
    /// Typed entries shared by the unit
    shared_data: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ComponentContext {
    /// Create a context carrying the standard unit entries.
    pub fn new(unit: &str, component: &str, home: &Path, work: &Path) -> Self {
        let mut context = Self::default();
        context.set_value(CONTEXT_UNIT_NAME, unit);
        context.set_value(CONTEXT_COMPONENT_NAME, component);
        context.set_value(CONTEXT_UNIT_HOME, &home.display().to_string());
        context.set_value(CONTEXT_UNIT_WORK, &work.display().to_string());
        context
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Get a context value
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key) || self.shared_data.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn unit_name(&self) -> Option<&str> {
        self.value(CONTEXT_UNIT_NAME)
    }

    pub fn component_name(&self) -> Option<&str> {
        self.value(CONTEXT_COMPONENT_NAME)
    }

    pub fn home(&self) -> Option<PathBuf> {
        self.value(CONTEXT_UNIT_HOME).map(PathBuf::from)
    }

    pub fn work(&self) -> Option<PathBuf> {
        self.value(CONTEXT_UNIT_WORK).map(PathBuf::from)
    }

    /// Set a shared data value
    pub fn set_data<T: 'static + Send + Sync>(&mut self, key: &str, value: T) {
        self.shared_data.insert(key.to_string(), Arc::new(value));
    }

    /// Get a shared data value
    pub fn get_data<T: 'static>(&self, key: &str) -> Option<&T> {
        self.shared_data.get(key).and_then(|data| data.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentContext")
            .field("values", &self.values)
            .field("shared_data", &self.shared_data.keys().collect::<Vec<_>>())
            .finish()
    }
}
