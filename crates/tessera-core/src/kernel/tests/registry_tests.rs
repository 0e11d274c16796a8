use std::sync::Arc;

use crate::application::UnitState;
use crate::assembly::PartitionMetaData;
use crate::config::KernelConfig;
use crate::kernel::error::{EntityKind, Error};
use crate::kernel::management::{InMemoryRegistrar, ManagementRegistrar};
use crate::kernel::registry::KernelRegistry;
use crate::lifecycle::LifecycleStage;
use crate::application::UnitDefinition;
use crate::tests::fixtures::{self, Fixture};

struct Harness {
    fixture: Fixture,
    registrar: Arc<InMemoryRegistrar>,
    registry: KernelRegistry,
}

impl Harness {
    fn new(config: KernelConfig) -> Self {
        let fixture = Fixture::new();
        let registrar = Arc::new(InMemoryRegistrar::new());
        let registry = KernelRegistry::new(config, Arc::new(fixture.catalog()), registrar.clone());
        Self {
            fixture,
            registrar,
            registry,
        }
    }

    fn unit(&self, name: &str) -> UnitDefinition {
        let metadata = fixtures::assembly(
            name,
            PartitionMetaData::default()
                .with_component(fixtures::consumer("a", "b"))
                .with_component(fixtures::provider("b")),
        );
        fixtures::definition(&metadata, self.registry.catalog())
    }
}

#[tokio::test]
async fn test_add_and_remove() {
    let harness = Harness::new(KernelConfig::default());

    let report = harness.registry.add_unit(harness.unit("shop")).await.unwrap();
    assert!(report.is_clean());
    assert!(harness.registry.contains("shop"));
    assert_eq!(harness.registry.list_unit_names(), vec!["shop"]);
    assert!(harness.registry.unit("shop").unwrap().is_running());

    harness.registry.remove_unit("shop").await.unwrap();
    assert!(!harness.registry.contains("shop"));
    assert_eq!(harness.fixture.names_at(LifecycleStage::Stopped), vec!["a", "b"]);

    let err = harness.registry.remove_unit("shop").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: EntityKind::Unit, .. }));
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let harness = Harness::new(KernelConfig::default());
    harness.registry.add_unit(harness.unit("shop")).await.unwrap();
    harness.fixture.clear_events();

    let err = harness.registry.add_unit(harness.unit("shop")).await.unwrap_err();

    assert!(matches!(err, Error::AlreadyExists { kind: EntityKind::Unit, .. }));
    // The second unit was never started.
    assert!(harness.fixture.events().is_empty());
    assert!(harness.registry.unit("shop").unwrap().is_running());
}

#[tokio::test]
async fn test_failed_start_not_added() {
    let harness = Harness::new(KernelConfig::default());
    harness.fixture.fail("a", LifecycleStage::Initialized);

    let err = harness.registry.add_unit(harness.unit("shop")).await.unwrap_err();

    assert_eq!(err.stage_failure().map(|f| f.name.as_str()), Some("a"));
    assert!(!harness.registry.contains("shop"));
    assert!(harness.registrar.names().is_empty());

    // The name is free again.
    harness.fixture.clear_failures();
    harness.registry.add_unit(harness.unit("shop")).await.unwrap();
}

#[tokio::test]
async fn test_failed_start_retained() {
    let harness = Harness::new(KernelConfig::default().with_retain_failed_units(true));
    harness.fixture.fail("a", LifecycleStage::Initialized);

    let report = harness.registry.add_unit(harness.unit("shop")).await.unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].stage_failure().is_some());
    let unit = harness.registry.unit("shop").unwrap();
    assert_eq!(unit.state(), UnitState::Failed);
    assert!(harness.registrar.names().is_empty());

    harness.fixture.clear_events();
    harness.registry.remove_unit("shop").await.unwrap();
    assert!(harness.fixture.events().is_empty());
}

#[tokio::test]
async fn test_partial_startup_config() {
    let harness = Harness::new(KernelConfig::default().with_partial_startup(true));
    harness.fixture.fail("a", LifecycleStage::Started);

    harness.registry.add_unit(harness.unit("shop")).await.unwrap();

    let unit = harness.registry.unit("shop").unwrap();
    assert!(unit.is_running());
    assert_eq!(unit.failed_components().await, vec!["a"]);
    assert_eq!(harness.registrar.names(), vec!["shop/b"]);
}

#[tokio::test]
async fn test_management_registration() {
    let harness = Harness::new(KernelConfig::default());
    harness.registry.add_unit(harness.unit("shop")).await.unwrap();

    assert_eq!(harness.registrar.names(), vec!["shop/a", "shop/b"]);
    assert_eq!(
        harness.registrar.interfaces("shop/b"),
        Some(vec![fixtures::SERVICE.to_string()])
    );

    harness.registry.remove_unit("shop").await.unwrap();
    assert!(harness.registrar.names().is_empty());
}

#[tokio::test]
async fn test_remove_reports_stop_failure_with_warnings() {
    let harness = Harness::new(KernelConfig::default());
    harness.fixture.fail("a", LifecycleStage::Stopped);
    harness.registry.add_unit(harness.unit("shop")).await.unwrap();
    // Unregistering "shop/a" a second time fails during removal.
    harness.registrar.unregister("shop/a").await.unwrap();

    let err = harness.registry.remove_unit("shop").await.unwrap_err();

    match err {
        Error::Multiple { operation, errors } => {
            assert!(operation.contains("shop"));
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].stage_failure().unwrap().stage, LifecycleStage::Stopped);
            assert!(matches!(errors[1], Error::Management { .. }));
        }
        other => panic!("expected Multiple, got {:?}", other),
    }
    assert!(!harness.registry.contains("shop"));
    assert_eq!(harness.fixture.names_at(LifecycleStage::Stopped), vec!["a", "b"]);
}

#[tokio::test]
async fn test_lock_freezes_listing() {
    let harness = Harness::new(KernelConfig::default());
    let registry = &harness.registry;
    registry.add_unit(harness.unit("alpha")).await.unwrap();

    registry.lock();
    registry.add_unit(harness.unit("beta")).await.unwrap();
    assert_eq!(registry.list_unit_names(), vec!["alpha"]);
    assert!(registry.contains("beta"));

    // Nested lock keeps the outer snapshot.
    registry.lock();
    registry.remove_unit("alpha").await.unwrap();
    registry.unlock();
    assert!(registry.is_locked());
    assert_eq!(registry.list_unit_names(), vec!["alpha"]);

    registry.unlock();
    assert!(!registry.is_locked());
    assert_eq!(registry.list_unit_names(), vec!["beta"]);
}

#[tokio::test]
async fn test_lock_scope_unlocks_on_drop() {
    let harness = Harness::new(KernelConfig::default());
    {
        let _guard = harness.registry.lock_scope();
        assert!(harness.registry.is_locked());
        harness.registry.add_unit(harness.unit("shop")).await.unwrap();
        assert!(harness.registry.list_unit_names().is_empty());
    }
    assert!(!harness.registry.is_locked());
    assert_eq!(harness.registry.list_unit_names(), vec!["shop"]);
}

#[test]
#[should_panic(expected = "without a matching lock")]
fn test_unbalanced_unlock_panics() {
    let harness = Harness::new(KernelConfig::default());
    harness.registry.lock();
    harness.registry.unlock();
    harness.registry.unlock();
}

#[tokio::test]
async fn test_dispose_all() {
    let harness = Harness::new(KernelConfig::default());
    harness.registry.add_unit(harness.unit("alpha")).await.unwrap();
    harness.registry.add_unit(harness.unit("beta")).await.unwrap();

    harness.registry.dispose_all().await.unwrap();

    assert!(harness.registry.list_unit_names().is_empty());
    assert!(harness.registrar.names().is_empty());
}
