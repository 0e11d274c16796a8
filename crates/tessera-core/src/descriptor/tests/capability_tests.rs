use crate::descriptor::capability::{CapabilitySet, is_lifecycle_type};
use crate::descriptor::{ComponentDescriptor, DependencyDescriptor, ServiceDescriptor, Cardinality};

#[test]
fn test_exclusive_conflicts() {
    let ok = CapabilitySet::SERVICEABLE | CapabilitySet::STARTABLE;
    assert!(ok.exclusive_conflicts().is_empty());

    let bad = CapabilitySet::SERVICEABLE | CapabilitySet::COMPOSABLE;
    assert_eq!(
        bad.exclusive_conflicts(),
        vec![(CapabilitySet::SERVICEABLE, CapabilitySet::COMPOSABLE)]
    );
}

#[test]
fn test_display() {
    assert_eq!(CapabilitySet::empty().to_string(), "NONE");
    assert_eq!(
        (CapabilitySet::STARTABLE | CapabilitySet::LOG_ENABLED).to_string(),
        "LOG_ENABLED | STARTABLE"
    );
}

#[test]
fn test_resolves_dependencies() {
    assert!(CapabilitySet::COMPOSABLE.resolves_dependencies());
    assert!(CapabilitySet::SERVICEABLE.resolves_dependencies());
    assert!(!CapabilitySet::STARTABLE.resolves_dependencies());
}

#[test]
fn test_lifecycle_type_names() {
    assert!(is_lifecycle_type("tessera.lifecycle.Startable"));
    assert!(!is_lifecycle_type("demo.Ticker"));
}

#[test]
fn test_descriptor_builder() {
    let descriptor = ComponentDescriptor::new("demo.Greeter")
        .provides(ServiceDescriptor::new("demo.Greeting").with_attribute("lang", "en"))
        .requires(DependencyDescriptor::single("ticker", "demo.Ticker"))
        .requires(DependencyDescriptor::map("listeners", "demo.Listener"))
        .reads_context("unit.name", false)
        .with_capabilities(CapabilitySet::SERVICEABLE | CapabilitySet::STARTABLE);

    assert_eq!(descriptor.implementation_key(), "demo.Greeter");
    assert_eq!(descriptor.service_types(), vec!["demo.Greeting".to_string()]);
    assert_eq!(descriptor.dependencies().len(), 2);

    let ticker = descriptor.dependency("ticker").unwrap();
    assert!(!ticker.optional);
    assert_eq!(ticker.cardinality, Cardinality::Single);

    let listeners = descriptor.dependency("listeners").unwrap();
    assert!(listeners.optional);
    assert_eq!(listeners.cardinality, Cardinality::Map);

    assert!(descriptor.dependency("missing").is_none());
    assert!(descriptor.supports(CapabilitySet::STARTABLE));
    assert!(!descriptor.supports(CapabilitySet::DISPOSABLE));
    assert_eq!(descriptor.context_entries()[0].key, "unit.name");
}
