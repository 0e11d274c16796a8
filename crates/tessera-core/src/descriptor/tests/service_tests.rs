use crate::descriptor::service::{ServiceCatalog, ServiceType};
use crate::kernel::error::Error;

fn catalog() -> ServiceCatalog {
    let mut catalog = ServiceCatalog::new();
    catalog.register(ServiceType::interface("demo.Base")).unwrap();
    catalog
        .register(ServiceType::interface("demo.Middle").extending("demo.Base"))
        .unwrap();
    catalog
        .register(ServiceType::interface("demo.Leaf").extending("demo.Middle"))
        .unwrap();
    catalog
        .register(ServiceType::interface("demo.Lifecycled").extending("tessera.lifecycle.Startable"))
        .unwrap();
    catalog
}

#[test]
fn test_register_duplicate_rejected() {
    let mut catalog = catalog();
    let result = catalog.register(ServiceType::concrete("demo.Base"));
    assert!(matches!(result, Err(Error::AlreadyExists { .. })));
}

#[test]
fn test_lifecycle_types_preregistered() {
    let catalog = ServiceCatalog::new();
    let startable = catalog.get("tessera.lifecycle.Startable").unwrap();
    assert!(startable.is_interface());
    assert!(startable.is_public());
}

#[test]
fn test_assignability_is_transitive() {
    let catalog = catalog();
    assert!(catalog.is_assignable("demo.Leaf", "demo.Leaf"));
    assert!(catalog.is_assignable("demo.Leaf", "demo.Middle"));
    assert!(catalog.is_assignable("demo.Leaf", "demo.Base"));
    assert!(!catalog.is_assignable("demo.Base", "demo.Leaf"));
    assert!(!catalog.is_assignable("demo.Unknown", "demo.Base"));
}

#[test]
fn test_lifecycle_ancestor() {
    let catalog = catalog();
    assert_eq!(
        catalog.lifecycle_ancestor("demo.Lifecycled").as_deref(),
        Some("tessera.lifecycle.Startable")
    );
    assert_eq!(catalog.lifecycle_ancestor("demo.Leaf"), None);
}

#[test]
fn test_cyclic_extends_terminates() {
    let mut catalog = ServiceCatalog::new();
    catalog.register(ServiceType::interface("x.A").extending("x.B")).unwrap();
    catalog.register(ServiceType::interface("x.B").extending("x.A")).unwrap();

    assert!(catalog.is_assignable("x.A", "x.B"));
    assert!(!catalog.ancestors("x.A").contains("x.A"));
}
