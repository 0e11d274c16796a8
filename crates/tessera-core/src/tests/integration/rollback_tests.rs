use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::{TempDir, tempdir};

use crate::config::KernelConfig;
use crate::deployer::{DirectoryInstaller, InstallationError, InstallationRecord, Installer};
use crate::kernel::Runtime;
use crate::kernel::error::{Error, Result};
use crate::kernel::management::InMemoryRegistrar;
use crate::tests::fixtures::{self, Fixture};

/// Directory installer that can be told to refuse sources or fail uninstalls.
struct FlakyInstaller {
    inner: DirectoryInstaller,
    refused: Mutex<HashSet<PathBuf>>,
    fail_uninstall: AtomicBool,
}

impl FlakyInstaller {
    fn refuse(&self, source: &Path) {
        self.refused.lock().unwrap().insert(source.to_path_buf());
    }
}

#[async_trait]
impl Installer for FlakyInstaller {
    async fn install(&self, name: &str, source: &Path) -> Result<InstallationRecord> {
        if self.refused.lock().unwrap().contains(source) {
            return Err(InstallationError::SourceNotFound(source.to_path_buf()).into());
        }
        self.inner.install(name, source).await
    }

    async fn uninstall(&self, record: &InstallationRecord) -> Result<()> {
        if self.fail_uninstall.load(Ordering::SeqCst) {
            return Err(Error::Uninstallation {
                unit: record.name.clone(),
                source: Box::new(Error::from("disk is read-only")),
            });
        }
        self.inner.uninstall(record).await
    }
}

struct Setup {
    root: TempDir,
    installer: Arc<FlakyInstaller>,
    runtime: Runtime,
}

fn setup() -> Setup {
    let root = tempdir().unwrap();
    let config = KernelConfig::rooted_at(root.path());
    let installer = Arc::new(FlakyInstaller {
        inner: DirectoryInstaller::new(&config.deploy_dir, &config.work_dir),
        refused: Mutex::new(HashSet::new()),
        fail_uninstall: AtomicBool::new(false),
    });
    let runtime = Runtime::with_collaborators(
        config,
        Fixture::new().catalog(),
        installer.clone(),
        Arc::new(InMemoryRegistrar::new()),
    );
    Setup {
        root,
        installer,
        runtime,
    }
}

const BROKEN_ASSEMBLY: &str = r#"
[[components]]
name = "a"
implementation = "test.Missing"
"#;

impl Setup {
    fn source(&self, name: &str, assembly: &str) -> PathBuf {
        fixtures::write_unit(&self.root.path().join(name), assembly, fixtures::PAIR_CONFIG)
    }
}

#[tokio::test]
async fn test_failed_restore_reports_both_errors() {
    let setup = setup();
    let original = setup.source("pair", fixtures::PAIR_ASSEMBLY);
    let broken = setup.source("broken", BROKEN_ASSEMBLY);
    let deployer = setup.runtime.deployer();
    deployer.deploy("shop", &original).await.unwrap();

    setup.installer.refuse(&original);
    let err = deployer.redeploy("shop", Some(&broken)).await.unwrap_err();

    match err {
        Error::Multiple { errors, .. } => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], Error::Verification(_)));
            assert!(matches!(errors[1], Error::Installation(InstallationError::SourceNotFound(_))));
        }
        other => panic!("expected Multiple, got {:?}", other),
    }
    assert!(deployer.installed_units().is_empty());
    assert!(!setup.runtime.kernel().contains("shop"));
    assert!(!setup.runtime.kernel().is_locked());
}

#[tokio::test]
async fn test_failed_rollback_uninstall_is_reported() {
    let setup = setup();
    let broken = setup.source("broken", BROKEN_ASSEMBLY);
    setup.installer.fail_uninstall.store(true, Ordering::SeqCst);

    let err = setup.runtime.deployer().deploy("shop", &broken).await.unwrap_err();

    match err {
        Error::Multiple { operation, errors } => {
            assert!(operation.contains("shop"));
            assert!(matches!(errors[0], Error::Verification(_)));
            assert!(matches!(errors[1], Error::Uninstallation { .. }));
        }
        other => panic!("expected Multiple, got {:?}", other),
    }
    assert!(setup.runtime.deployer().installed_units().is_empty());
}

#[tokio::test]
async fn test_undeploy_continues_after_uninstall_failure() {
    let setup = setup();
    let source = setup.source("pair", fixtures::PAIR_ASSEMBLY);
    let deployer = setup.runtime.deployer();
    deployer.deploy("shop", &source).await.unwrap();
    setup.installer.fail_uninstall.store(true, Ordering::SeqCst);

    let err = deployer.undeploy("shop").await.unwrap_err();

    assert!(matches!(err, Error::Uninstallation { ref unit, .. } if unit == "shop"));
    assert!(!setup.runtime.kernel().contains("shop"));
    assert!(deployer.installed_units().is_empty());

    // A later deploy under the same name still works.
    setup.installer.fail_uninstall.store(false, Ordering::SeqCst);
    deployer.deploy("shop", &source).await.unwrap();
}
