//! # Tessera Application Controller
//!
//! An [`Application`] is one deployment unit at runtime: its assembly
//! profile tree, its scopes and one [`BlockEntry`] per component.
//!
//! Startup walks partitions in `depends` order (child partitions before a
//! partition's own components) and components in dependency order, handing
//! each to the [`LifecycleExecutor`]. The first failure unwinds every
//! component already started, in reverse start order, unless partial startup
//! is permitted. Start and stop of one unit are serialized by a
//! `tokio::sync::Mutex`.
pub mod block;
pub mod listener;
pub mod resources;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::assembly::{AssemblyProfile, ComponentCatalog, PartitionProfile};
use crate::dependency::{self, DependencyError};
use crate::kernel::error::{EntityKind, Error, Result};
use crate::kernel::scope::{IsolationScope, LoggingScope};
use crate::lifecycle::{ComponentHandle, LifecycleExecutor, LifecycleStage, StageFailure};

pub use block::BlockEntry;
pub use listener::{UnitEvent, UnitListener};
pub use resources::UnitResourceProvider;

/// Everything needed to construct an [`Application`].
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub name: String,
    pub assembly: AssemblyProfile,
    pub home: PathBuf,
    pub work: PathBuf,
    pub isolation_scope: IsolationScope,
    pub logging_scope: LoggingScope,
}

/// Runtime state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Stopped,
    Running,
    /// Startup failed and the unit was kept in the registry
    Failed,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Stopped => write!(f, "stopped"),
            UnitState::Running => write!(f, "running"),
            UnitState::Failed => write!(f, "failed"),
        }
    }
}

struct UnitRuntime {
    blocks: BTreeMap<String, BlockEntry>,
    /// Names in the order they finished startup
    started: Vec<String>,
    /// Components skipped under partial startup
    failed: Vec<String>,
}

/// A deployment unit and its components.
pub struct Application {
    name: String,
    home: PathBuf,
    work: PathBuf,
    assembly: AssemblyProfile,
    isolation_scope: IsolationScope,
    logging_scope: LoggingScope,
    catalog: Arc<ComponentCatalog>,
    permit_partial_startup: bool,
    executor: LifecycleExecutor,
    listeners: Vec<(String, Arc<dyn UnitListener>)>,
    runtime: tokio::sync::Mutex<UnitRuntime>,
    /// Only written while `runtime` is held
    state: parking_lot::Mutex<UnitState>,
}

impl Application {
    /// Build the unit from its definition. Components are not started.
    pub fn new(definition: UnitDefinition, catalog: Arc<ComponentCatalog>, permit_partial_startup: bool) -> Result<Self> {
        let blocks = definition
            .assembly
            .components()
            .into_iter()
            .map(|profile| (profile.name().to_string(), BlockEntry::new(profile.clone())))
            .collect();

        let mut listeners = Vec::with_capacity(definition.assembly.listeners.len());
        for metadata in &definition.assembly.listeners {
            let listener = catalog.create_listener(metadata).map_err(|e| {
                Error::Other(format!(
                    "Failed to create listener '{}' for unit '{}': {}",
                    metadata.name, definition.name, e
                ))
            })?;
            listeners.push((metadata.name.clone(), listener));
        }

        Ok(Self {
            name: definition.name,
            home: definition.home,
            work: definition.work,
            assembly: definition.assembly,
            isolation_scope: definition.isolation_scope,
            logging_scope: definition.logging_scope,
            catalog,
            permit_partial_startup,
            executor: LifecycleExecutor::new(),
            listeners,
            runtime: tokio::sync::Mutex::new(UnitRuntime {
                blocks,
                started: Vec::new(),
                failed: Vec::new(),
            }),
            state: parking_lot::Mutex::new(UnitState::Stopped),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn work(&self) -> &Path {
        &self.work
    }

    pub fn assembly(&self) -> &AssemblyProfile {
        &self.assembly
    }

    pub fn isolation_scope(&self) -> &IsolationScope {
        &self.isolation_scope
    }

    pub fn logging_scope(&self) -> &LoggingScope {
        &self.logging_scope
    }

    pub fn state(&self) -> UnitState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == UnitState::Running
    }

    /// All component names declared in the unit, in assembly order.
    pub fn component_names(&self) -> Vec<String> {
        self.assembly.component_names()
    }

    /// Handle of a running component.
    pub async fn component(&self, name: &str) -> Result<ComponentHandle> {
        let runtime = self.runtime.lock().await;
        runtime
            .blocks
            .get(name)
            .and_then(|block| block.proxy.clone())
            .ok_or_else(|| Error::not_found(EntityKind::Component, format!("{}/{}", self.name, name)))
    }

    /// Handles of every running component, in start order.
    pub async fn running_components(&self) -> Vec<ComponentHandle> {
        let runtime = self.runtime.lock().await;
        runtime
            .started
            .iter()
            .filter_map(|name| runtime.blocks.get(name).and_then(|b| b.proxy.clone()))
            .collect()
    }

    /// Last stage reached by every component.
    pub async fn block_states(&self) -> BTreeMap<String, LifecycleStage> {
        let runtime = self.runtime.lock().await;
        runtime.blocks.iter().map(|(name, b)| (name.clone(), b.stage)).collect()
    }

    /// Snapshot of every block entry.
    pub async fn blocks(&self) -> Vec<BlockEntry> {
        let runtime = self.runtime.lock().await;
        runtime.blocks.values().cloned().collect()
    }

    /// Components skipped during the last partial startup.
    pub async fn failed_components(&self) -> Vec<String> {
        self.runtime.lock().await.failed.clone()
    }

    /// Component names in startup order.
    pub fn startup_order(&self) -> std::result::Result<Vec<String>, DependencyError> {
        startup_order(&self.assembly)
    }

    fn set_state(&self, state: UnitState) {
        *self.state.lock() = state;
    }

    async fn notify(&self, event: UnitEvent) {
        for (name, listener) in &self.listeners {
            if let Err(e) = listener.on_event(&event).await {
                warn!("Listener '{}' of unit '{}' failed on {}: {}", name, self.name, event, e);
            }
        }
    }

    /// Start every component. Fails with `Precondition` if already running.
    pub async fn start(&self) -> Result<()> {
        let mut runtime = self.runtime.lock().await;
        if self.state() == UnitState::Running {
            return Err(Error::precondition(&self.name, "unit is already running"));
        }

        info!("Starting unit '{}'", self.name);
        self.notify(UnitEvent::Starting { unit: self.name.clone() }).await;
        runtime.failed.clear();

        let order = match self.startup_order() {
            Ok(order) => order,
            Err(e) => {
                self.set_state(UnitState::Failed);
                self.notify(UnitEvent::Failed {
                    unit: self.name.clone(),
                    message: e.to_string(),
                })
                .await;
                return Err(e.into());
            }
        };

        for name in order {
            let Some(profile) = self.assembly.find(&name) else {
                continue;
            };

            let result = {
                let provider = UnitResourceProvider {
                    unit: &self.name,
                    home: &self.home,
                    work: &self.work,
                    catalog: &self.catalog,
                    logging_scope: &self.logging_scope,
                    blocks: &runtime.blocks,
                };
                self.executor.startup(&name, profile, &provider).await
            };

            match result {
                Ok(handle) => {
                    if let Some(block) = runtime.blocks.get_mut(&name) {
                        block.activate(handle);
                    }
                    runtime.started.push(name.clone());
                    self.notify(UnitEvent::ComponentStarted {
                        unit: self.name.clone(),
                        component: name,
                    })
                    .await;
                }
                Err(failure) => {
                    if let Some(block) = runtime.blocks.get_mut(&name) {
                        block.clear(failure.stage);
                    }

                    if self.permit_partial_startup {
                        warn!("Skipping component '{}' of unit '{}': {}", name, self.name, failure);
                        runtime.failed.push(name);
                        continue;
                    }

                    return Err(self.abort_startup(&mut runtime, failure).await);
                }
            }
        }

        self.set_state(UnitState::Running);
        info!(
            "Unit '{}' started ({} component(s), {} skipped)",
            self.name,
            runtime.started.len(),
            runtime.failed.len()
        );
        self.notify(UnitEvent::Started { unit: self.name.clone() }).await;
        Ok(())
    }

    async fn abort_startup(&self, runtime: &mut UnitRuntime, failure: StageFailure) -> Error {
        error!("Startup of unit '{}' failed: {}", self.name, failure);

        for e in self.shutdown_started(runtime).await {
            error!("Error while unwinding unit '{}': {}", self.name, e);
        }

        self.set_state(UnitState::Failed);
        self.notify(UnitEvent::Failed {
            unit: self.name.clone(),
            message: failure.to_string(),
        })
        .await;
        Error::Stage(failure)
    }

    /// Shut down started components in reverse start order. Every component
    /// is cleared even when its shutdown fails.
    async fn shutdown_started(&self, runtime: &mut UnitRuntime) -> Vec<Error> {
        let mut errors = Vec::new();

        while let Some(name) = runtime.started.pop() {
            let Some(block) = runtime.blocks.get_mut(&name) else {
                continue;
            };
            let Some(handle) = block.proxy.clone() else {
                continue;
            };

            let stage = match self.executor.shutdown(&name, &block.profile, &handle).await {
                Ok(()) => LifecycleStage::Disposed,
                Err(failure) => {
                    let stage = failure.stage;
                    errors.push(Error::Stage(failure));
                    stage
                }
            };
            block.clear(stage);
            debug!("Component '{}' of unit '{}' shut down", name, self.name);

            self.notify(UnitEvent::ComponentStopped {
                unit: self.name.clone(),
                component: name,
            })
            .await;
        }
        errors
    }

    /// Stop every running component in reverse start order.
    pub async fn stop(&self) -> Result<()> {
        let mut runtime = self.runtime.lock().await;
        if self.state() != UnitState::Running {
            return Err(Error::precondition(&self.name, "unit is not running"));
        }

        info!("Stopping unit '{}'", self.name);
        self.notify(UnitEvent::Stopping { unit: self.name.clone() }).await;

        let errors = self.shutdown_started(&mut runtime).await;
        runtime.failed.clear();
        self.set_state(UnitState::Stopped);

        self.notify(UnitEvent::Stopped { unit: self.name.clone() }).await;
        Error::collect(format!("Stop of unit '{}'", self.name), errors)
    }

    /// Stop then start. A failed stop is returned without attempting the start.
    pub async fn restart(&self) -> Result<()> {
        self.stop().await?;
        self.start().await
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("home", &self.home)
            .field("work", &self.work)
            .field("state", &self.state())
            .finish()
    }
}

/// Component names of `assembly` in the order a unit starts them.
pub fn startup_order(assembly: &AssemblyProfile) -> std::result::Result<Vec<String>, DependencyError> {
    let mut order = Vec::new();
    partition_order(&assembly.root, &mut order)?;
    Ok(order)
}

fn partition_order(partition: &PartitionProfile, out: &mut Vec<String>) -> std::result::Result<(), DependencyError> {
    for child_name in dependency::order_partitions(partition.name(), &partition.partitions, true)? {
        if let Some(child) = partition.partitions.iter().find(|p| p.name() == child_name) {
            partition_order(child, out)?;
        }
    }
    out.extend(dependency::order_in(partition.name(), &partition.components, true)?);
    Ok(())
}
