#![allow(dead_code)]

use component_permissions::common::{save_component_settings, ComponentSettings, EntityRef, Storage};
use component_permissions::handlers::{HandlerDescriptor, HandlerRegistry};
use component_permissions::ActionPermission;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::Once;

static INIT: Once = Once::new();

pub const FOO: &str = "foo";
pub const DUMMY_HANDLER: &str = "dummy_authorization_handler";
pub const ANOTHER_HANDLER: &str = "another_dummy_authorization_handler";

pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().filter_level(log::LevelFilter::Debug).is_test(true).try_init();
    });
}

/// Mock Storage implementation for testing
#[derive(Default, Clone)]
pub struct MockStorage {
    pub data: HashMap<String, String>,
    /// Fail every `get`.
    pub error_mode: bool,
    /// Fail every `put`.
    pub write_error_mode: bool,
    pub writes: usize,
}

impl MockStorage {
    pub fn new() -> Self {
        init_test_env();
        MockStorage::default()
    }

    /// Stores a raw permissions hash as the platform would, e.g. from a fixture.
    pub fn put_permissions(&mut self, entity: &EntityRef, permissions: Value) {
        let stored = json!({
            "permissions": permissions,
            "updated_at": "2024-01-01T00:00:00Z"
        });
        self.data.insert(entity.storage_key(), stored.to_string());
    }

    /// The persisted permissions hash, `None` when the entity has no document.
    pub fn permissions(&self, entity: &EntityRef) -> Option<Value> {
        self.data.get(&entity.storage_key()).map(|src| {
            let stored: Value = serde_json::from_str(src).unwrap();
            stored["permissions"].clone()
        })
    }

    /// Stores component settings without counting the write.
    pub fn set_resources_permissions_enabled(&mut self, component_id: &str, enabled: bool) {
        let writes = self.writes;
        let settings = ComponentSettings {
            resources_permissions_enabled: Some(enabled),
        };
        save_component_settings(self, component_id, &settings).unwrap();
        self.writes = writes;
    }
}

impl Storage for MockStorage {
    fn get(&mut self, key: &str) -> io::Result<Option<String>> {
        if self.error_mode {
            return Err(io::Error::new(io::ErrorKind::Other, "mock read failure"));
        }
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Option<&str>) -> io::Result<()> {
        if self.write_error_mode {
            return Err(io::Error::new(io::ErrorKind::Other, "mock write failure"));
        }
        self.writes += 1;
        match value {
            Some(v) => {
                self.data.insert(key.to_string(), v.to_string());
            },
            None => {
                self.data.remove(key);
            },
        }
        Ok(())
    }
}

/// Handlers available to the test organization.
pub fn dummy_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(HandlerDescriptor::new(DUMMY_HANDLER, "Example authorization", &["postal_code"]));
    registry.register(HandlerDescriptor::new(ANOTHER_HANDLER, "Another example authorization", &["passport_number"]));
    registry
}

pub fn component() -> EntityRef {
    EntityRef::component("1")
}

pub fn resource() -> EntityRef {
    EntityRef::resource("1", "dummy_resource", "10")
}

pub fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn postal_code_permission() -> ActionPermission {
    ActionPermission::restricted(DUMMY_HANDLER, options(&[("postal_code", "08002")]))
}

pub fn passport_permission() -> ActionPermission {
    ActionPermission::restricted(ANOTHER_HANDLER, options(&[("passport_number", "AXXXXXXXX")]))
}

pub fn postal_code_json() -> Value {
    json!({
        "authorization_handler_name": [DUMMY_HANDLER],
        "options": { "postal_code": "08002" }
    })
}

pub fn passport_json() -> Value {
    json!({
        "authorization_handler_name": [ANOTHER_HANDLER],
        "options": { "passport_number": "AXXXXXXXX" }
    })
}
