use std::fmt;

use async_trait::async_trait;

use crate::lifecycle::ComponentError;

/// Lifecycle notifications about a deployment unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    Starting { unit: String },
    ComponentStarted { unit: String, component: String },
    Started { unit: String },
    Stopping { unit: String },
    ComponentStopped { unit: String, component: String },
    Stopped { unit: String },
    Failed { unit: String, message: String },
}

impl UnitEvent {
    pub fn unit(&self) -> &str {
        match self {
            UnitEvent::Starting { unit }
            | UnitEvent::ComponentStarted { unit, .. }
            | UnitEvent::Started { unit }
            | UnitEvent::Stopping { unit }
            | UnitEvent::ComponentStopped { unit, .. }
            | UnitEvent::Stopped { unit }
            | UnitEvent::Failed { unit, .. } => unit,
        }
    }
}

impl fmt::Display for UnitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitEvent::Starting { unit } => write!(f, "unit '{}' starting", unit),
            UnitEvent::ComponentStarted { unit, component } => {
                write!(f, "component '{}' of unit '{}' started", component, unit)
            }
            UnitEvent::Started { unit } => write!(f, "unit '{}' started", unit),
            UnitEvent::Stopping { unit } => write!(f, "unit '{}' stopping", unit),
            UnitEvent::ComponentStopped { unit, component } => {
                write!(f, "component '{}' of unit '{}' stopped", component, unit)
            }
            UnitEvent::Stopped { unit } => write!(f, "unit '{}' stopped", unit),
            UnitEvent::Failed { unit, message } => write!(f, "unit '{}' failed: {}", unit, message),
        }
    }
}

/// Receives [`UnitEvent`]s. Errors are logged and never change an outcome.
#[async_trait]
pub trait UnitListener: Send + Sync + fmt::Debug {
    async fn on_event(&self, event: &UnitEvent) -> Result<(), ComponentError>;
}
