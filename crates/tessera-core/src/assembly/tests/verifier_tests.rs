use std::sync::Arc;

use crate::assembly::error::VerificationError;
use crate::assembly::metadata::DependencyDirective;
use crate::assembly::verifier::is_valid_name;
use crate::assembly::{
    AssemblyMetaData, AssemblyProfile, AssemblyVerifier, ComponentCatalog, ComponentMetaData, ComponentProfile,
    ListenerMetaData, PartitionMetaData,
};
use crate::descriptor::{CapabilitySet, ComponentDescriptor, ServiceDescriptor, ServiceType};
use crate::kernel::error::Error;
use crate::lifecycle::{Component, ComponentError};
use crate::tests::fixtures::{self, Fixture};

fn unused(_: &ComponentProfile) -> Result<Arc<dyn Component>, ComponentError> {
    Err("not instantiated in verifier tests".into())
}

/// Fixture catalog plus types that break one service rule each.
fn catalog() -> ComponentCatalog {
    let mut catalog = Fixture::new().catalog();
    catalog.register_service(ServiceType::concrete("test.Impl")).unwrap();
    catalog.register_service(ServiceType::interface("test.Hidden").private()).unwrap();
    catalog
        .register_service(ServiceType::interface("test.Managed").extending("tessera.lifecycle.Startable"))
        .unwrap();

    let single = |key: &str, service: &str| ComponentDescriptor::new(key).provides(ServiceDescriptor::new(service));
    catalog.register(single("bad.Concrete", "test.Impl"), &["test.Impl"], unused).unwrap();
    catalog.register(single("bad.Hidden", "test.Hidden"), &["test.Hidden"], unused).unwrap();
    catalog.register(single("bad.Managed", "test.Managed"), &["test.Managed"], unused).unwrap();
    catalog.register(single("bad.Unknown", "test.Nowhere"), &["test.Nowhere"], unused).unwrap();
    catalog.register(single("bad.Liar", fixtures::SERVICE), &[], unused).unwrap();
    catalog
        .register(
            ComponentDescriptor::new("bad.Hybrid")
                .with_capabilities(CapabilitySet::SERVICEABLE | CapabilitySet::COMPOSABLE),
            &[],
            unused,
        )
        .unwrap();
    catalog
}

fn verify(root: PartitionMetaData) -> Vec<Error> {
    verify_assembly(fixtures::assembly("shop", root))
}

fn verify_assembly(metadata: AssemblyMetaData) -> Vec<Error> {
    let catalog = catalog();
    let profile = AssemblyProfile::build(&metadata, &catalog).unwrap();
    match AssemblyVerifier::new(&catalog).verify(&profile) {
        Ok(()) => Vec::new(),
        Err(Error::Multiple { errors, .. }) => errors,
        Err(e) => vec![e],
    }
}

fn verification(errors: &[Error]) -> Vec<VerificationError> {
    errors
        .iter()
        .filter_map(|e| match e {
            Error::Verification(v) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_name_rules() {
    assert!(is_valid_name("web-1.primary"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("web server"));
    assert!(!is_valid_name("web/1"));
}

#[test]
fn test_valid_assembly_passes() {
    let errors = verify(
        PartitionMetaData::default()
            .with_component(fixtures::consumer("a", "b"))
            .with_component(fixtures::provider("b")),
    );
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_invalid_and_duplicate_names() {
    let metadata = fixtures::assembly(
        "shop",
        PartitionMetaData::default()
            .with_component(fixtures::provider("bad name"))
            .with_component(fixtures::provider("db"))
            .with_partition(PartitionMetaData::new("inner").with_component(fixtures::provider("db")))
            .with_partition(PartitionMetaData::new("inner")),
    )
    .with_listener(ListenerMetaData::new("db", fixtures::LISTENER));

    let errors = verification(&verify_assembly(metadata));
    assert!(errors.iter().any(|e| matches!(e, VerificationError::InvalidName { name, .. } if name == "bad name")));
    let duplicates: Vec<(&str, &str)> = errors
        .iter()
        .filter_map(|e| match e {
            VerificationError::DuplicateName { kind, name, .. } => Some((*kind, name.as_str())),
            _ => None,
        })
        .collect();
    assert!(duplicates.contains(&("component", "db")));
    assert!(duplicates.contains(&("listener", "db")));
    assert!(duplicates.contains(&("partition", "inner")));
}

#[test]
fn test_directive_errors() {
    let errors = verification(&verify(
        PartitionMetaData::default()
            .with_component(fixtures::consumer("a", "ghost"))
            .with_component(fixtures::consumer("b", "a"))
            .with_component(fixtures::provider("p").depends_on("nothing", "b"))
            .with_component(ComponentMetaData::new("c", fixtures::CONSUMER)),
    ));

    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::MissingProvider { component, provider, .. } if component == "a" && provider == "ghost")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::UnassignableProvider { component, .. } if component == "b")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::UnknownDependencyKey { key, .. } if key == "nothing")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::MissingRequiredDependency { component, .. } if component == "c")));
}

#[test]
fn test_optional_dependency_may_be_unwired() {
    let errors = verify(PartitionMetaData::default().with_component(ComponentMetaData::new("o", fixtures::OPTIONAL_CONSUMER)));
    assert!(errors.is_empty());
}

#[test]
fn test_cardinality_rules() {
    let errors = verification(&verify(
        PartitionMetaData::default()
            .with_component(fixtures::provider("p1"))
            .with_component(fixtures::provider("p2"))
            .with_component(
                fixtures::consumer("single", "p1").depends_on("service", "p2"),
            )
            .with_component(
                ComponentMetaData::new("dir", fixtures::DIRECTORY)
                    .with_directive(DependencyDirective::new("services", "p1").with_alias("main"))
                    .with_directive(DependencyDirective::new("services", "p2").with_alias("main")),
            )
            .with_component(
                ComponentMetaData::new("all", fixtures::COLLECTOR)
                    .depends_on("services", "p1")
                    .depends_on("services", "p2"),
            ),
    ));

    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::TooManyProviders { count: 2, .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, VerificationError::DuplicateAlias { alias, .. } if alias == "main")));
}

#[test]
fn test_exclusive_capabilities() {
    let errors = verification(&verify(PartitionMetaData::default().with_component(ComponentMetaData::new("h", "bad.Hybrid"))));
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], VerificationError::ExclusiveCapabilities { first, second, .. }
        if first == "SERVICEABLE" && second == "COMPOSABLE"));
}

fn service_errors<'a>(errors: &'a [VerificationError], name: &str) -> Vec<&'a VerificationError> {
    errors
        .iter()
        .filter(|e| match e {
            VerificationError::NotAnInterface { component, .. }
            | VerificationError::NotPublic { component, .. }
            | VerificationError::ExtendsLifecycle { component, .. }
            | VerificationError::UnknownServiceType { component, .. }
            | VerificationError::UnimplementedService { component, .. } => component == name,
            _ => false,
        })
        .collect()
}

#[test]
fn test_service_rules() {
    let errors = verification(&verify(
        PartitionMetaData::default()
            .with_component(ComponentMetaData::new("concrete", "bad.Concrete"))
            .with_component(ComponentMetaData::new("hidden", "bad.Hidden"))
            .with_component(ComponentMetaData::new("managed", "bad.Managed"))
            .with_component(ComponentMetaData::new("unknown", "bad.Unknown"))
            .with_component(ComponentMetaData::new("liar", "bad.Liar")),
    ));

    assert!(matches!(service_errors(&errors, "concrete").as_slice(), [VerificationError::NotAnInterface { .. }]));
    assert!(matches!(service_errors(&errors, "hidden").as_slice(), [VerificationError::NotPublic { .. }]));
    assert!(matches!(service_errors(&errors, "managed").as_slice(), [VerificationError::ExtendsLifecycle { lifecycle, .. }]
        if lifecycle == "tessera.lifecycle.Startable"));
    assert!(matches!(service_errors(&errors, "unknown").as_slice(), [VerificationError::UnknownServiceType { .. }]));
    assert!(matches!(service_errors(&errors, "liar").as_slice(), [VerificationError::UnimplementedService { .. }]));
}

#[test]
fn test_component_cycle() {
    let errors = verify(
        PartitionMetaData::default()
            .with_component(fixtures::consumer("x", "y"))
            .with_component(
                ComponentMetaData::new("y", fixtures::PROVIDER).depends_on("service", "x"),
            ),
    );
    // y has no "service" key, so the cycle comes with an unknown key error.
    assert!(errors.iter().any(|e| matches!(e, Error::Dependency(_))));
}

#[test]
fn test_partition_rules() {
    let errors = verify(
        PartitionMetaData::default()
            .with_partition(PartitionMetaData::new("a").depends_on("b"))
            .with_partition(PartitionMetaData::new("b").depends_on("a"))
            .with_partition(PartitionMetaData::new("c").depends_on("missing")),
    );

    assert!(verification(&errors)
        .iter()
        .any(|e| matches!(e, VerificationError::UnknownPartitionDependency { dependency, .. } if dependency == "missing")));
    let cycle = errors
        .iter()
        .find_map(|e| match e {
            Error::Dependency(d) => Some(d.cycle_members().to_vec()),
            _ => None,
        })
        .unwrap();
    assert!(cycle.contains(&"a".to_string()) && cycle.contains(&"b".to_string()));
}

fn unordered(errors: &[Error]) -> Vec<(String, String)> {
    verification(errors)
        .into_iter()
        .filter_map(|e| match e {
            VerificationError::UnorderedProvider { component, provider, .. } => Some((component, provider)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_cross_partition_wiring_needs_partition_order() {
    let unordered_siblings = verify(
        PartitionMetaData::default()
            .with_partition(PartitionMetaData::new("web").with_component(fixtures::consumer("w", "k")))
            .with_partition(PartitionMetaData::new("core").with_component(fixtures::provider("k"))),
    );
    assert_eq!(unordered(&unordered_siblings), vec![("w".to_string(), "k".to_string())]);

    let provider_in_parent = verify(
        PartitionMetaData::default()
            .with_component(fixtures::provider("k"))
            .with_partition(PartitionMetaData::new("web").with_component(fixtures::consumer("w", "k"))),
    );
    assert_eq!(unordered(&provider_in_parent), vec![("w".to_string(), "k".to_string())]);

    let ordered = verify(
        PartitionMetaData::default()
            .with_component(fixtures::consumer("top", "k"))
            .with_partition(
                PartitionMetaData::new("web")
                    .depends_on("mid")
                    .with_component(fixtures::consumer("w", "k")),
            )
            .with_partition(PartitionMetaData::new("mid").depends_on("core"))
            .with_partition(
                PartitionMetaData::new("core")
                    .with_partition(PartitionMetaData::new("store").with_component(fixtures::provider("k"))),
            ),
    );
    assert!(ordered.is_empty(), "unexpected errors: {:?}", ordered);
}
