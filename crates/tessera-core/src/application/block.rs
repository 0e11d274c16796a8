use std::sync::Arc;

use crate::assembly::ComponentProfile;
use crate::lifecycle::{Component, ComponentHandle, LifecycleStage};

/// Runtime slot for one component of a unit.
#[derive(Debug, Clone)]
pub struct BlockEntry {
    pub profile: ComponentProfile,
    /// Set once startup succeeds, cleared on shutdown or failed startup
    pub instance: Option<Arc<dyn Component>>,
    /// Handle exposed to consumers and the kernel
    pub proxy: Option<ComponentHandle>,
    /// Last stage reached
    pub stage: LifecycleStage,
}

impl BlockEntry {
    pub fn new(profile: ComponentProfile) -> Self {
        Self {
            profile,
            instance: None,
            proxy: None,
            stage: LifecycleStage::Pending,
        }
    }

    pub fn is_running(&self) -> bool {
        self.proxy.is_some()
    }

    pub(crate) fn activate(&mut self, handle: ComponentHandle) {
        self.instance = Some(handle.instance().clone());
        self.proxy = Some(handle);
        self.stage = LifecycleStage::Started;
    }

    pub(crate) fn clear(&mut self, stage: LifecycleStage) {
        self.instance = None;
        self.proxy = None;
        self.stage = stage;
    }
}
