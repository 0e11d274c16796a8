use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::application::{Application, UnitDefinition};
use crate::assembly::ComponentCatalog;
use crate::config::KernelConfig;
use crate::kernel::error::{EntityKind, Error, Result};
use crate::kernel::management::ManagementRegistrar;

/// Non-fatal problems reported by a registry operation.
#[derive(Debug, Default)]
pub struct OperationReport {
    pub warnings: Vec<Error>,
}

impl OperationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

struct UnitEntry {
    app: Arc<Application>,
    /// Names registered with the management registrar
    managed: Vec<String>,
}

#[derive(Default)]
struct RegistryState {
    units: BTreeMap<String, UnitEntry>,
    /// Names with an add in progress
    reserved: HashSet<String>,
    lock_count: usize,
    snapshot: Option<Vec<String>>,
}

/// Tracks deployment units by name.
///
/// All state sits behind one mutex that is only held for short,
/// non-awaiting sections; unit startup and shutdown run outside it.
pub struct KernelRegistry {
    config: KernelConfig,
    catalog: Arc<ComponentCatalog>,
    registrar: Arc<dyn ManagementRegistrar>,
    state: parking_lot::Mutex<RegistryState>,
}

/// Releases a name reserved by `add_unit`, whatever the outcome.
struct Reservation<'a> {
    registry: &'a KernelRegistry,
    name: String,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.registry.state.lock().reserved.remove(&self.name);
    }
}

/// Guard returned by [`KernelRegistry::lock_scope`]; unlocks on drop.
#[must_use = "the registry is unlocked as soon as the guard is dropped"]
pub struct RegistryLock<'a> {
    registry: &'a KernelRegistry,
}

impl Drop for RegistryLock<'_> {
    fn drop(&mut self) {
        self.registry.unlock();
    }
}

impl KernelRegistry {
    pub fn new(config: KernelConfig, catalog: Arc<ComponentCatalog>, registrar: Arc<dyn ManagementRegistrar>) -> Self {
        Self {
            config,
            catalog,
            registrar,
            state: parking_lot::Mutex::new(RegistryState::default()),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.catalog
    }

    fn reserve(&self, name: &str) -> Result<Reservation<'_>> {
        let mut state = self.state.lock();
        if state.units.contains_key(name) || state.reserved.contains(name) {
            return Err(Error::already_exists(EntityKind::Unit, name));
        }
        state.reserved.insert(name.to_string());
        Ok(Reservation {
            registry: self,
            name: name.to_string(),
        })
    }

    /// Construct and start a unit, then track it under its name.
    ///
    /// When startup fails the unit is dropped and the error returned, unless
    /// `retain_failed_units` is set: then the unit is kept in the `Failed`
    /// state and the startup error is reported as a warning.
    pub async fn add_unit(&self, definition: UnitDefinition) -> Result<OperationReport> {
        let name = definition.name.clone();
        let _reservation = self.reserve(&name)?;

        let app = Arc::new(Application::new(
            definition,
            self.catalog.clone(),
            self.config.permit_partial_startup,
        )?);

        let mut report = OperationReport::default();
        let managed = match app.start().await {
            Ok(()) => self.register_management(&app, &mut report).await,
            Err(e) if self.config.retain_failed_units => {
                warn!("Unit '{}' failed to start and is retained: {}", name, e);
                report.warnings.push(e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        self.state.lock().units.insert(name.clone(), UnitEntry { app, managed });
        info!("Unit '{}' added", name);
        Ok(report)
    }

    async fn register_management(&self, app: &Application, report: &mut OperationReport) -> Vec<String> {
        let mut managed = Vec::new();
        for handle in app.running_components().await {
            let name = format!("{}/{}", app.name(), handle.name());
            match self.registrar.register(&name, &handle, handle.services()).await {
                Ok(()) => managed.push(name),
                Err(e) => {
                    warn!("Management registration of '{}' failed: {}", name, e);
                    report.warnings.push(e);
                }
            }
        }
        managed
    }

    /// Stop and forget a unit. The entry is removed even if stopping fails.
    /// A stop failure is returned together with any unregistration warnings.
    pub async fn remove_unit(&self, name: &str) -> Result<OperationReport> {
        let entry = self
            .state
            .lock()
            .units
            .remove(name)
            .ok_or_else(|| Error::not_found(EntityKind::Unit, name))?;

        let mut report = OperationReport::default();
        for managed in &entry.managed {
            if let Err(e) = self.registrar.unregister(managed).await {
                warn!("Management unregistration of '{}' failed: {}", managed, e);
                report.warnings.push(e);
            }
        }

        if entry.app.is_running() {
            if let Err(e) = entry.app.stop().await {
                let mut errors = vec![e];
                errors.append(&mut report.warnings);
                return Error::collect(format!("Removal of unit '{}'", name), errors).map(|()| report);
            }
        }
        info!("Unit '{}' removed", name);
        Ok(report)
    }

    /// Freeze the name listing. Reentrant; every call needs a matching [`unlock`](Self::unlock).
    pub fn lock(&self) {
        let mut state = self.state.lock();
        state.lock_count += 1;
        if state.lock_count == 1 {
            state.snapshot = Some(state.units.keys().cloned().collect());
        }
        debug!("Registry locked (depth {})", state.lock_count);
    }

    /// Release one [`lock`](Self::lock).
    ///
    /// # Panics
    ///
    /// Panics when called without a matching `lock()`.
    pub fn unlock(&self) {
        let mut state = self.state.lock();
        if state.lock_count == 0 {
            drop(state);
            panic!("KernelRegistry::unlock() called without a matching lock()");
        }
        state.lock_count -= 1;
        if state.lock_count == 0 {
            state.snapshot = None;
        }
        debug!("Registry unlocked (depth {})", state.lock_count);
    }

    /// Lock until the returned guard is dropped.
    pub fn lock_scope(&self) -> RegistryLock<'_> {
        self.lock();
        RegistryLock { registry: self }
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().lock_count > 0
    }

    /// Unit names, sorted. While locked, the names captured by the outermost lock.
    pub fn list_unit_names(&self) -> Vec<String> {
        let state = self.state.lock();
        match &state.snapshot {
            Some(snapshot) => snapshot.clone(),
            None => state.units.keys().cloned().collect(),
        }
    }

    pub fn unit(&self, name: &str) -> Option<Arc<Application>> {
        self.state.lock().units.get(name).map(|e| e.app.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().units.contains_key(name)
    }

    /// Stop and remove every unit, collecting failures.
    pub async fn dispose_all(&self) -> Result<()> {
        let names: Vec<String> = self.state.lock().units.keys().cloned().collect();
        let mut errors = Vec::new();
        for name in names.iter().rev() {
            if let Err(e) = self.remove_unit(name).await {
                errors.push(e);
            }
        }
        Error::collect("Dispose of all units", errors)
    }
}
