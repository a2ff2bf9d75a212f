use component_permissions::handlers::HandlerSelection;
use component_permissions::{PermissionError, PermissionStore};
use serde_json::json;
use std::collections::BTreeMap;

mod common;
use common::*;

#[test]
fn test_failed_save_leaves_document_untouched() {
    let mut storage = MockStorage::new();
    storage.put_permissions(&component(), json!({ "foo": postal_code_json() }));
    storage.write_error_mode = true;
    let registry = dummy_registry();

    let err = PermissionStore::new(&mut storage, &registry)
        .set_permission(&component(), FOO, HandlerSelection::handler(ANOTHER_HANDLER), options(&[("passport_number", "AXXXXXXXX")]))
        .unwrap_err();

    assert!(matches!(err, PermissionError::PersistenceFailure(_)));
    assert!(!err.is_validation());
    assert_eq!(storage.permissions(&component()), Some(json!({ "foo": postal_code_json() })));

    storage.write_error_mode = false;
    let mut store = PermissionStore::new(&mut storage, &registry);
    assert_eq!(store.resolve_effective_permission(&component(), FOO).unwrap().permission, postal_code_permission());
}

#[test]
fn test_failed_clear_keeps_previous_entry() {
    let mut storage = MockStorage::new();
    storage.put_permissions(&component(), json!({ "foo": postal_code_json() }));
    storage.write_error_mode = true;
    let registry = dummy_registry();

    let result = PermissionStore::new(&mut storage, &registry).set_permission(&component(), FOO, HandlerSelection::Everyone, BTreeMap::new());

    assert!(matches!(result, Err(PermissionError::PersistenceFailure(_))));
    assert_eq!(storage.permissions(&component()), Some(json!({ "foo": postal_code_json() })));
}

#[test]
fn test_read_failure_is_reported() {
    let mut storage = MockStorage::new();
    storage.error_mode = true;
    let registry = dummy_registry();
    let mut store = PermissionStore::new(&mut storage, &registry);

    assert!(matches!(store.resolve_effective_permission(&resource(), FOO), Err(PermissionError::Storage(_))));
    assert!(matches!(
        store.set_permission(&component(), FOO, HandlerSelection::handler(DUMMY_HANDLER), BTreeMap::new()),
        Err(PermissionError::Storage(_))
    ));
}

#[test]
fn test_corrupt_document_is_reported() {
    let mut storage = MockStorage::new();
    storage.data.insert(component().storage_key(), "{\"permissions\": 3".to_string());
    let registry = dummy_registry();

    let err = PermissionStore::new(&mut storage, &registry).resolve_effective_permission(&component(), FOO).unwrap_err();

    match err {
        PermissionError::CorruptDocument { key, .. } => assert_eq!(key, "C1"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_validation_runs_before_storage_access() {
    let mut storage = MockStorage::new();
    storage.error_mode = true;
    let registry = dummy_registry();

    let err = PermissionStore::new(&mut storage, &registry)
        .set_permission(&component(), FOO, HandlerSelection::handler("unknown"), BTreeMap::new())
        .unwrap_err();

    assert!(matches!(err, PermissionError::InvalidHandlerSelection(_)));
}

#[test]
fn test_settings_read_failure_is_reported() {
    let mut storage = MockStorage::new();
    storage.put_permissions(&component(), json!({ "foo": postal_code_json() }));
    storage.error_mode = true;
    let registry = dummy_registry();
    let mut store = PermissionStore::new(&mut storage, &registry);

    assert!(matches!(store.resources_permissions_enabled(&resource()), Err(PermissionError::Storage(_))));
    assert!(matches!(store.permissions_form(&resource(), &[FOO]), Err(PermissionError::Storage(_))));
    assert_eq!(storage.writes, 0);
}
