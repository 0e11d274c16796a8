use crate::dependency::DependencyError;
use crate::kernel::error::{EntityKind, Error};

#[test]
fn test_collect() {
    assert!(Error::collect("op", Vec::new()).is_ok());

    let single = Error::collect("op", vec![Error::not_found(EntityKind::Unit, "shop")]).unwrap_err();
    assert!(single.is_not_found());

    let many = Error::collect(
        "Undeploy of 'shop'",
        vec![Error::from("first"), Error::precondition("shop", "not running")],
    )
    .unwrap_err();
    match many {
        Error::Multiple { operation, errors } => {
            assert_eq!(operation, "Undeploy of 'shop'");
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected Multiple, got {:?}", other),
    }
}

#[test]
fn test_display_names_entity() {
    let err = Error::already_exists(EntityKind::Installation, "shop");
    assert!(err.to_string().contains("shop"));

    let err: Error = DependencyError::CyclicDependency {
        scope: "shop".to_string(),
        members: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    }
    .into();
    assert!(err.to_string().contains("a -> b -> a"));
    assert!(err.stage_failure().is_none());
}
