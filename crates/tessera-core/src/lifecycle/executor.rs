use std::sync::Arc;

use log::debug;

use crate::assembly::profile::ComponentProfile;
use crate::descriptor::CapabilitySet;
use crate::lifecycle::LifecycleStage;
use crate::lifecycle::component::{Component, ComponentError, ComponentHandle, ComponentResult};
use crate::lifecycle::error::StageFailure;
use crate::lifecycle::resources::ResourceProvider;

/// Sequences lifecycle stages for one component at a time.
///
/// Stage support comes from the descriptor's [`CapabilitySet`]. The executor
/// never rolls anything back; on failure it reports the stage and stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleExecutor;

fn stage_result(stage: LifecycleStage, name: &str, result: ComponentResult) -> Result<(), StageFailure> {
    result.map_err(|cause| StageFailure::new(stage, name, cause))
}

impl LifecycleExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Construct `name` and run every declared startup stage.
    pub async fn startup(
        &self,
        name: &str,
        profile: &ComponentProfile,
        provider: &dyn ResourceProvider,
    ) -> Result<ComponentHandle, StageFailure> {
        let capabilities = profile.descriptor.capabilities();

        let instance = provider
            .create(name, profile)
            .map_err(|cause| StageFailure::new(LifecycleStage::Created, name, cause))?;
        debug!("Component '{}' created ({})", name, capabilities);

        for stage in LifecycleStage::STARTUP
            .into_iter()
            .filter(|stage| *stage != LifecycleStage::Created && stage.applies_to(capabilities))
        {
            self.enter(stage, name, profile, provider, &instance).await?;
        }

        debug!("Component '{}' started", name);
        Ok(ComponentHandle::new(name, profile.descriptor.service_types(), instance))
    }

    async fn enter(
        &self,
        stage: LifecycleStage,
        name: &str,
        profile: &ComponentProfile,
        provider: &dyn ResourceProvider,
        instance: &Arc<dyn Component>,
    ) -> Result<(), StageFailure> {
        let failed = |cause: ComponentError| StageFailure::new(stage, name, cause);

        let result = match stage {
            LifecycleStage::LoggingBound => instance.enable_logging(provider.logger(name, profile)).await,
            LifecycleStage::Contextualized => {
                let context = provider.context(name, profile).map_err(failed)?;
                instance.contextualize(&context).await
            }
            LifecycleStage::DependenciesResolved => {
                let dependencies = provider.dependencies(name, profile).map_err(failed)?;
                if profile.descriptor.supports(CapabilitySet::SERVICEABLE) {
                    instance.service(&dependencies).await
                } else {
                    let handles: Vec<ComponentHandle> = profile
                        .descriptor
                        .dependencies()
                        .iter()
                        .filter_map(|d| dependencies.service(&d.key))
                        .flat_map(|value| value.handles())
                        .collect();
                    instance.compose(&handles).await
                }
            }
            LifecycleStage::Configured => {
                let configuration = provider.configuration(name, profile).map_err(failed)?;
                instance.configure(&configuration).await
            }
            LifecycleStage::Parameterized => {
                let parameters = provider.parameters(name, profile).map_err(failed)?;
                instance.parameterize(&parameters).await
            }
            LifecycleStage::Initialized => instance.initialize().await,
            LifecycleStage::Started => instance.start().await,
            LifecycleStage::Stopped => instance.stop().await,
            LifecycleStage::Disposed => instance.dispose().await,
            LifecycleStage::Pending | LifecycleStage::Created => Ok(()),
        };
        stage_result(stage, name, result)
    }

    /// Run `stop` then `dispose` for the declared capabilities, halting at the first failure.
    pub async fn shutdown(
        &self,
        name: &str,
        profile: &ComponentProfile,
        handle: &ComponentHandle,
    ) -> Result<(), StageFailure> {
        let capabilities = profile.descriptor.capabilities();
        let instance = handle.instance();

        for stage in LifecycleStage::SHUTDOWN
            .into_iter()
            .filter(|stage| stage.applies_to(capabilities))
        {
            let result = match stage {
                LifecycleStage::Stopped => instance.stop().await,
                _ => instance.dispose().await,
            };
            stage_result(stage, name, result)?;
        }

        debug!("Component '{}' shut down", name);
        Ok(())
    }
}
