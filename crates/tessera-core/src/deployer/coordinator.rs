use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use log::{error, info, warn};

use crate::application::UnitDefinition;
use crate::assembly::{AssemblyProfile, AssemblyVerifier, ComponentCatalog};
use crate::deployer::collaborators::{
    ConfigurationProcessor, ConfigurationValidator, DocumentReader, InstallationRecord, Installer,
    IsolationScopeBuilder, LoggingScopeBuilder,
};
use crate::deployer::defaults::{
    DefaultIsolationScopeBuilder, DefaultLoggingScopeBuilder, FileDocumentReader, PlaceholderProcessor,
    SchemaKeysValidator,
};
use crate::kernel::error::{EntityKind, Error, Result};
use crate::kernel::registry::{KernelRegistry, OperationReport};
use crate::kernel::scope::{IsolationScope, LoggingScope};

#[derive(Default)]
struct DeployerState {
    installations: BTreeMap<String, InstallationRecord>,
    /// Names with a deploy in progress
    pending: HashSet<String>,
}

/// Releases a name reserved by `deploy`.
struct PendingDeploy<'a> {
    deployer: &'a Deployer,
    name: String,
}

impl Drop for PendingDeploy<'_> {
    fn drop(&mut self) {
        self.deployer.state.lock().pending.remove(&self.name);
    }
}

/// A unit that was installed, assembled and verified, but not activated.
struct PreparedUnit {
    assembly: AssemblyProfile,
    isolation_scope: IsolationScope,
    logging_scope: LoggingScope,
}

/// Ties installation, verification and activation together.
///
/// Anything that fails after installation uninstalls the unit again before
/// the error is returned.
pub struct Deployer {
    kernel: Arc<KernelRegistry>,
    catalog: Arc<ComponentCatalog>,
    installer: Arc<dyn Installer>,
    documents: Arc<dyn DocumentReader>,
    isolation: Arc<dyn IsolationScopeBuilder>,
    logging: Arc<dyn LoggingScopeBuilder>,
    validator: Arc<dyn ConfigurationValidator>,
    processor: Arc<dyn ConfigurationProcessor>,
    state: parking_lot::Mutex<DeployerState>,
}

impl Deployer {
    /// Create a deployer with the default document reader, scope builders,
    /// validator and processor.
    pub fn new(kernel: Arc<KernelRegistry>, installer: Arc<dyn Installer>) -> Self {
        let catalog = kernel.catalog().clone();
        Self {
            kernel,
            catalog,
            installer,
            documents: Arc::new(FileDocumentReader),
            isolation: Arc::new(DefaultIsolationScopeBuilder),
            logging: Arc::new(DefaultLoggingScopeBuilder),
            validator: Arc::new(SchemaKeysValidator),
            processor: Arc::new(PlaceholderProcessor::new()),
            state: parking_lot::Mutex::new(DeployerState::default()),
        }
    }

    pub fn with_document_reader(mut self, documents: Arc<dyn DocumentReader>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_isolation_builder(mut self, isolation: Arc<dyn IsolationScopeBuilder>) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_logging_builder(mut self, logging: Arc<dyn LoggingScopeBuilder>) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ConfigurationValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_processor(mut self, processor: Arc<dyn ConfigurationProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn kernel(&self) -> &Arc<KernelRegistry> {
        &self.kernel
    }

    /// Names of tracked installations, sorted.
    pub fn installed_units(&self) -> Vec<String> {
        self.state.lock().installations.keys().cloned().collect()
    }

    pub fn installation(&self, name: &str) -> Option<InstallationRecord> {
        self.state.lock().installations.get(name).cloned()
    }

    fn reserve(&self, name: &str) -> Result<PendingDeploy<'_>> {
        let mut state = self.state.lock();
        if state.installations.contains_key(name) || state.pending.contains(name) || self.kernel.contains(name) {
            return Err(Error::already_exists(EntityKind::Installation, name));
        }
        state.pending.insert(name.to_string());
        Ok(PendingDeploy {
            deployer: self,
            name: name.to_string(),
        })
    }

    /// Install, assemble, verify and activate the unit at `source`.
    pub async fn deploy(&self, name: &str, source: &Path) -> Result<OperationReport> {
        let _pending = self.reserve(name)?;
        info!("Deploying unit '{}' from '{}'", name, source.display());

        let record = self.installer.install(name, source).await?;

        let outcome = match self.prepare(name, &record).await {
            Ok(prepared) => {
                let definition = UnitDefinition {
                    name: name.to_string(),
                    assembly: prepared.assembly,
                    home: record.home.clone(),
                    work: record.work.clone(),
                    isolation_scope: prepared.isolation_scope,
                    logging_scope: prepared.logging_scope,
                };
                self.kernel.add_unit(definition).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!("Deploy of '{}': {}", name, warning);
                }
                self.state.lock().installations.insert(name.to_string(), record);
                info!("Unit '{}' deployed", name);
                Ok(report)
            }
            Err(e) => {
                error!("Deploy of '{}' failed: {}", name, e);
                match self.installer.uninstall(&record).await {
                    Ok(()) => Err(e),
                    Err(uninstall) => Err(Error::Multiple {
                        operation: format!("Deploy of '{}'", name),
                        errors: vec![e, uninstall],
                    }),
                }
            }
        }
    }

    /// Read documents, build scopes and profiles, verify, validate and process configuration.
    async fn prepare(&self, name: &str, record: &InstallationRecord) -> Result<PreparedUnit> {
        let assembly_document = self.documents.read_assembly(&record.assembly)?;
        let configuration_document = self.documents.read_configuration(&record.configuration)?;
        let environment = self.documents.read_environment(&record.environment)?;

        let isolation_scope = self
            .isolation
            .build(name, &environment, &record.home, &record.work)
            .await?;
        let logging_scope = self
            .logging
            .build(name, &environment, &record.home, &record.work)
            .await?;

        let metadata = assembly_document.into_metadata(name, &configuration_document);
        let mut assembly = AssemblyProfile::build(&metadata, &self.catalog)?;
        AssemblyVerifier::new(&self.catalog).verify(&assembly)?;

        for component in assembly.components() {
            if !self.validator.validate(component, &isolation_scope).await? {
                return Err(Error::InvalidConfiguration {
                    unit: name.to_string(),
                    component: component.name().to_string(),
                    message: "configuration rejected by validator".to_string(),
                });
            }
        }

        for component in assembly.components_mut() {
            let configuration = std::mem::take(&mut component.metadata.configuration);
            component.metadata.configuration = self
                .processor
                .process(name, &component.metadata.name, configuration)
                .await?;
        }

        Ok(PreparedUnit {
            assembly,
            isolation_scope,
            logging_scope,
        })
    }

    /// Install `source` into a scratch location, assemble and verify it, and
    /// uninstall again. Nothing is activated or tracked.
    pub async fn inspect(&self, name: &str, source: &Path) -> Result<AssemblyProfile> {
        let record = self.installer.install(name, source).await?;
        let prepared = self.prepare(name, &record).await;

        if let Err(e) = self.installer.uninstall(&record).await {
            warn!("Cleanup after inspecting '{}' failed: {}", name, e);
        }
        prepared.map(|p| p.assembly)
    }

    /// Remove the unit from the kernel, uninstall it and forget the record.
    /// Every step runs; failures are collected.
    pub async fn undeploy(&self, name: &str) -> Result<()> {
        let record = self
            .installation(name)
            .ok_or_else(|| Error::not_found(EntityKind::Installation, name))?;
        info!("Undeploying unit '{}'", name);

        let mut errors = Vec::new();
        match self.kernel.remove_unit(name).await {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!("Undeploy of '{}': {}", name, warning);
                }
            }
            Err(e) => errors.push(e),
        }

        if let Err(e) = self.installer.uninstall(&record).await {
            errors.push(e);
        }

        self.state.lock().installations.remove(name);
        Error::collect(format!("Undeploy of '{}'", name), errors)
    }

    /// Replace a deployed unit, from `new_source` or from its original source.
    ///
    /// The kernel stays locked for the whole operation. Undeploy failures do
    /// not stop the replacement: when the new deploy succeeds they are reported
    /// as warnings. If the new deploy fails, the original source is deployed
    /// again and every failure is returned.
    pub async fn redeploy(&self, name: &str, new_source: Option<&Path>) -> Result<OperationReport> {
        let _lock = self.kernel.lock_scope();

        let original = self
            .installation(name)
            .map(|record| record.source)
            .ok_or_else(|| Error::not_found(EntityKind::Installation, name))?;
        let source = new_source.map(Path::to_path_buf).unwrap_or_else(|| original.clone());

        info!("Redeploying unit '{}' from '{}'", name, source.display());
        let mut errors = Vec::new();
        if let Err(e) = self.undeploy(name).await {
            warn!("Undeploy during redeploy of '{}' failed: {}", name, e);
            errors.push(e);
        }

        match self.deploy(name, &source).await {
            Ok(mut report) => {
                errors.append(&mut report.warnings);
                report.warnings = errors;
                Ok(report)
            }
            Err(e) => {
                warn!("Redeploy of '{}' failed, restoring '{}': {}", name, original.display(), e);
                errors.push(e);
                if let Err(restore) = self.deploy(name, &original).await {
                    errors.push(restore);
                }
                if errors.len() == 1 {
                    return Err(errors.remove(0));
                }
                Err(Error::Multiple {
                    operation: format!("Redeploy of '{}'", name),
                    errors,
                })
            }
        }
    }

    /// Undeploy every tracked unit, collecting failures.
    pub async fn dispose(&self) -> Result<()> {
        let names = self.installed_units();
        let mut errors = Vec::new();
        for name in names.iter().rev() {
            if let Err(e) = self.undeploy(name).await {
                errors.push(e);
            }
        }
        Error::collect("Dispose of deployer", errors)
    }
}
