use thiserror::Error;

use crate::lifecycle::LifecycleStage;
use crate::lifecycle::component::ComponentError;

/// One lifecycle stage failed for one component.
#[derive(Debug, Error)]
#[error("Component '{name}' failed at stage {stage}: {cause}")]
pub struct StageFailure {
    pub stage: LifecycleStage,
    pub name: String,
    #[source]
    pub cause: ComponentError,
}

impl StageFailure {
    pub fn new(stage: LifecycleStage, name: &str, cause: impl Into<ComponentError>) -> Self {
        Self {
            stage,
            name: name.to_string(),
            cause: cause.into(),
        }
    }
}
