use std::fs;

use tempfile::tempdir;

use crate::config::KernelConfig;
use crate::kernel::Runtime;
use crate::kernel::error::{EntityKind, Error};
use crate::lifecycle::LifecycleStage;
use crate::tests::fixtures::{self, Fixture};

const LAYERED_ASSEMBLY: &str = r#"
[[listeners]]
name = "audit"
implementation = "test.Listener"

[[components]]
name = "front"
implementation = "test.Collector"

[[components.dependencies]]
key = "services"
provider = "db"

[[components.dependencies]]
key = "services"
provider = "cache"

[[partitions]]
name = "data"

[[partitions.components]]
name = "db"
implementation = "test.Provider"

[[partitions]]
name = "edge"
depends = ["data"]

[[partitions.components]]
name = "cache"
implementation = "test.Provider"
"#;

#[tokio::test]
async fn test_runtime_deploy_and_shutdown() {
    let root = tempdir().unwrap();
    let fixture = Fixture::new();
    let runtime = Runtime::new(KernelConfig::rooted_at(root.path()), fixture.catalog());
    let source = fixtures::write_unit(&root.path().join("layered"), LAYERED_ASSEMBLY, "");

    runtime.deployer().deploy("layered", &source).await.unwrap();

    assert_eq!(fixture.names_at(LifecycleStage::Started), vec!["db", "cache", "front"]);
    assert_eq!(runtime.kernel().list_unit_names(), vec!["layered"]);
    assert!(fixture.events().contains(&"event:unit 'layered' started".to_string()));

    runtime.shutdown().await.unwrap();

    assert_eq!(fixture.names_at(LifecycleStage::Stopped), vec!["front", "cache", "db"]);
    assert!(runtime.kernel().list_unit_names().is_empty());
    assert!(!root.path().join("apps/layered").exists());
}

#[tokio::test]
async fn test_runtime_shutdown_includes_direct_units() {
    let root = tempdir().unwrap();
    let fixture = Fixture::new();
    let runtime = Runtime::new(KernelConfig::rooted_at(root.path()), fixture.catalog());

    let metadata = fixtures::assembly(
        "direct",
        crate::assembly::PartitionMetaData::default().with_component(fixtures::provider("solo")),
    );
    let definition = fixtures::definition(&metadata, runtime.catalog());
    runtime.kernel().add_unit(definition).await.unwrap();

    runtime.shutdown().await.unwrap();
    assert_eq!(fixture.names_at(LifecycleStage::Disposed), vec!["solo"]);
}

#[tokio::test]
async fn test_concurrent_deploys_of_one_name() {
    let root = tempdir().unwrap();
    let fixture = Fixture::new();
    let runtime = Runtime::new(KernelConfig::rooted_at(root.path()), fixture.catalog());
    let source = fixtures::write_unit(&root.path().join("pair"), fixtures::PAIR_ASSEMBLY, fixtures::PAIR_CONFIG);

    let (first, second) = tokio::join!(
        runtime.deployer().deploy("shop", &source),
        runtime.deployer().deploy("shop", &source)
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(Error::AlreadyExists { kind: EntityKind::Installation, .. })
    )));
    assert_eq!(fixture.names_at(LifecycleStage::Started), vec!["b", "a"]);
}

#[tokio::test]
async fn test_kernel_config_from_file() {
    let root = tempdir().unwrap();
    let path = root.path().join("kernel.json");
    fs::write(
        &path,
        format!(
            r#"{{ "permit_partial_startup": true, "deploy_dir": "{}", "work_dir": "{}" }}"#,
            root.path().join("deployed").display(),
            root.path().join("scratch").display()
        ),
    )
    .unwrap();
    let config = KernelConfig::load(&path).unwrap();
    assert!(config.permit_partial_startup);

    let fixture = Fixture::new();
    fixture.fail("b", LifecycleStage::Initialized);
    let runtime = Runtime::new(config, fixture.catalog());
    let source = fixtures::write_unit(&root.path().join("pair"), fixtures::PAIR_ASSEMBLY, fixtures::PAIR_CONFIG);

    runtime.deployer().deploy("shop", &source).await.unwrap();

    let unit = runtime.kernel().unit("shop").unwrap();
    assert_eq!(unit.failed_components().await, vec!["b", "a"]);
    assert!(root.path().join("deployed/shop").is_dir());

    runtime.shutdown().await.unwrap();
}
