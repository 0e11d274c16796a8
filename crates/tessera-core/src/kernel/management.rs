use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::kernel::error::{Error, Result};
use crate::lifecycle::ComponentHandle;

/// Exposes running components to a management facility. Best effort: the
/// kernel reports failures but never rolls back because of them.
#[async_trait]
pub trait ManagementRegistrar: Send + Sync {
    async fn register(&self, name: &str, handle: &ComponentHandle, interfaces: &[String]) -> Result<()>;

    async fn unregister(&self, name: &str) -> Result<()>;
}

/// Registrar that records registrations in memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistrar {
    entries: parking_lot::Mutex<BTreeMap<String, Vec<String>>>,
}

impl InMemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn interfaces(&self, name: &str) -> Option<Vec<String>> {
        self.entries.lock().get(name).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }
}

#[async_trait]
impl ManagementRegistrar for InMemoryRegistrar {
    async fn register(&self, name: &str, _handle: &ComponentHandle, interfaces: &[String]) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(name) {
            return Err(Error::Management {
                operation: "register",
                name: name.to_string(),
                message: "name is already registered".to_string(),
            });
        }
        entries.insert(name.to_string(), interfaces.to_vec());
        Ok(())
    }

    async fn unregister(&self, name: &str) -> Result<()> {
        match self.entries.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(Error::Management {
                operation: "unregister",
                name: name.to_string(),
                message: "name is not registered".to_string(),
            }),
        }
    }
}
