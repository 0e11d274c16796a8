//! # Tessera Lifecycle
//!
//! Drives a single component through its lifecycle stages.
//!
//! Startup runs `Created → LoggingBound → Contextualized →
//! DependenciesResolved → Configured → Parameterized → Initialized →
//! Started`; shutdown runs `Stopped → Disposed`. A stage only runs when the
//! component's descriptor declares the matching capability.
//!
//! - **[`Component`]**: the trait every managed component implements.
//! - **[`ResourceProvider`]**: supplies the instance and everything the stages
//!   hand to it.
//! - **[`LifecycleExecutor`]**: sequences the stages and reports the first
//!   failure as a [`StageFailure`].
pub mod component;
pub mod context;
pub mod error;
pub mod executor;
pub mod resources;

use std::fmt;

use crate::descriptor::CapabilitySet;

pub use component::{Component, ComponentError, ComponentHandle, ComponentResult};
pub use context::ComponentContext;
pub use error::StageFailure;
pub use executor::LifecycleExecutor;
pub use resources::{ComponentLogger, DependencyValue, Parameters, ResolvedDependencies, ResourceProvider};

/// A point in a component's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleStage {
    /// Nothing constructed yet
    Pending,
    Created,
    LoggingBound,
    Contextualized,
    DependenciesResolved,
    Configured,
    Parameterized,
    Initialized,
    Started,
    Stopped,
    Disposed,
}

impl LifecycleStage {
    /// Startup stages in execution order.
    pub const STARTUP: [LifecycleStage; 8] = [
        LifecycleStage::Created,
        LifecycleStage::LoggingBound,
        LifecycleStage::Contextualized,
        LifecycleStage::DependenciesResolved,
        LifecycleStage::Configured,
        LifecycleStage::Parameterized,
        LifecycleStage::Initialized,
        LifecycleStage::Started,
    ];

    /// Shutdown stages in execution order.
    pub const SHUTDOWN: [LifecycleStage; 2] = [LifecycleStage::Stopped, LifecycleStage::Disposed];

    /// The capability a component must declare for this stage to run.
    /// `None` means the stage always runs.
    pub fn capability(self) -> Option<CapabilitySet> {
        match self {
            LifecycleStage::Pending | LifecycleStage::Created => None,
            LifecycleStage::LoggingBound => Some(CapabilitySet::LOG_ENABLED),
            LifecycleStage::Contextualized => Some(CapabilitySet::CONTEXTUALIZABLE),
            LifecycleStage::DependenciesResolved => {
                Some(CapabilitySet::SERVICEABLE | CapabilitySet::COMPOSABLE)
            }
            LifecycleStage::Configured => Some(CapabilitySet::CONFIGURABLE),
            LifecycleStage::Parameterized => Some(CapabilitySet::PARAMETERIZABLE),
            LifecycleStage::Initialized => Some(CapabilitySet::INITIALIZABLE),
            LifecycleStage::Started | LifecycleStage::Stopped => Some(CapabilitySet::STARTABLE),
            LifecycleStage::Disposed => Some(CapabilitySet::DISPOSABLE),
        }
    }

    /// Whether a component declaring `capabilities` goes through this stage.
    pub fn applies_to(self, capabilities: CapabilitySet) -> bool {
        match self.capability() {
            None => true,
            Some(required) => capabilities.intersects(required),
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStage::Pending => "Pending",
            LifecycleStage::Created => "Created",
            LifecycleStage::LoggingBound => "LoggingBound",
            LifecycleStage::Contextualized => "Contextualized",
            LifecycleStage::DependenciesResolved => "DependenciesResolved",
            LifecycleStage::Configured => "Configured",
            LifecycleStage::Parameterized => "Parameterized",
            LifecycleStage::Initialized => "Initialized",
            LifecycleStage::Started => "Started",
            LifecycleStage::Stopped => "Stopped",
            LifecycleStage::Disposed => "Disposed",
        };
        f.write_str(name)
    }
}
