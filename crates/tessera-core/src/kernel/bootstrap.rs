use std::sync::Arc;

use crate::assembly::ComponentCatalog;
use crate::config::KernelConfig;
use crate::deployer::{Deployer, DirectoryInstaller, Installer};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::kernel::management::{InMemoryRegistrar, ManagementRegistrar};
use crate::kernel::registry::KernelRegistry;

/// A kernel, its component catalog and a deployer wired with the default
/// collaborators.
pub struct Runtime {
    config: KernelConfig,
    kernel: Arc<KernelRegistry>,
    deployer: Deployer,
}

impl Runtime {
    /// Build a runtime using a [`DirectoryInstaller`] and an [`InMemoryRegistrar`].
    pub fn new(config: KernelConfig, catalog: ComponentCatalog) -> Self {
        let installer = Arc::new(DirectoryInstaller::new(&config.deploy_dir, &config.work_dir));
        Self::with_collaborators(config, catalog, installer, Arc::new(InMemoryRegistrar::new()))
    }

    pub fn with_collaborators(
        config: KernelConfig,
        catalog: ComponentCatalog,
        installer: Arc<dyn Installer>,
        registrar: Arc<dyn ManagementRegistrar>,
    ) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        log::debug!(
            "Deploy directory: {}, work directory: {}",
            config.deploy_dir.display(),
            config.work_dir.display()
        );

        let kernel = Arc::new(KernelRegistry::new(config.clone(), Arc::new(catalog), registrar));
        let deployer = Deployer::new(kernel.clone(), installer);
        Self {
            config,
            kernel,
            deployer,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        self.kernel.catalog()
    }

    pub fn kernel(&self) -> &Arc<KernelRegistry> {
        &self.kernel
    }

    pub fn deployer(&self) -> &Deployer {
        &self.deployer
    }

    /// Undeploy every tracked unit, then remove any unit added to the kernel directly.
    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down {}", constants::APP_NAME);
        let mut errors = Vec::new();
        if let Err(e) = self.deployer.dispose().await {
            errors.push(e);
        }
        if let Err(e) = self.kernel.dispose_all().await {
            errors.push(e);
        }
        Error::collect("Runtime shutdown", errors)
    }
}
