use crate::document::{decode_document, encode_document, PermissionDocument, StoredDocument};
use crate::error::{PermissionError, Result};
use crate::handlers::HandlerDescriptor;
use chrono::Utc;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::io;

pub const COMPONENT_PREFIX: &str = "C";
pub const RESOURCE_PREFIX: &str = "R";
pub const SETTINGS_PREFIX: &str = "S";

pub const UNRESTRICTED_SENTINEL: &str = "unrestricted";
pub const NONE_SENTINEL: &str = "none";
pub const EVERYONE_LABEL: &str = "Everyone";

/// Entity storage. Values are opaque strings; `put` with `None` removes the key.
pub trait Storage {
    fn get(&mut self, key: &str) -> io::Result<Option<String>>;
    fn put(&mut self, key: &str, value: Option<&str>) -> io::Result<()>;
}

/// Registry of the authorization handlers an organization may use.
pub trait AuthorizationHandlers {
    fn descriptor(&self, id: &str) -> Option<&HandlerDescriptor>;
    fn available(&self) -> Vec<&HandlerDescriptor>;
}

/// Owner of a permission document.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Component {
        id: String,
    },
    Resource {
        component_id: String,
        resource_name: String,
        id: String,
    },
}

impl EntityRef {
    pub fn component(id: &str) -> Self {
        EntityRef::Component {
            id: id.to_string(),
        }
    }

    pub fn resource(component_id: &str, resource_name: &str, id: &str) -> Self {
        EntityRef::Resource {
            component_id: component_id.to_string(),
            resource_name: resource_name.to_string(),
            id: id.to_string(),
        }
    }

    pub fn component_id(&self) -> &str {
        match self {
            EntityRef::Component { id } => id,
            EntityRef::Resource { component_id, .. } => component_id,
        }
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, EntityRef::Resource { .. })
    }

    /// The component this entity belongs to (itself for a component).
    pub fn owning_component(&self) -> EntityRef {
        EntityRef::component(self.component_id())
    }

    /// Key segments are escaped, so ids containing `/` never collide.
    pub fn storage_key(&self) -> String {
        match self {
            EntityRef::Component { id } => COMPONENT_PREFIX.to_owned() + &key_segment(id),
            EntityRef::Resource { component_id, resource_name, id } => {
                format!("{}{}/{}/{}", RESOURCE_PREFIX, key_segment(component_id), key_segment(resource_name), key_segment(id))
            },
        }
    }
}

fn key_segment(value: &str) -> String {
    value.replace('%', "%25").replace('/', "%2F")
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityRef::Component { id } => write!(f, "component {}", id),
            EntityRef::Resource { component_id, resource_name, id } => write!(f, "{} {} of component {}", resource_name, id, component_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSettings {
    #[serde(default)]
    pub resources_permissions_enabled: Option<bool>,
}

pub(crate) fn load_document(db: &mut dyn Storage, entity: &EntityRef) -> Result<Option<StoredDocument>> {
    let key = entity.storage_key();
    match db.get(&key) {
        Ok(Some(src)) => decode_document(&key, &src).map(Some),
        Ok(None) => Ok(None),
        Err(e) => {
            log::error!("failed to load permissions of {:?}: {}", entity, e);
            Err(PermissionError::Storage(e))
        },
    }
}

pub(crate) fn save_document(db: &mut dyn Storage, entity: &EntityRef, document: Option<&PermissionDocument>) -> Result<()> {
    let key = entity.storage_key();
    let value = match document {
        Some(doc) => Some(encode_document(&key, doc, Utc::now())?),
        None => None,
    };

    db.put(&key, value.as_deref()).map_err(|e| {
        log::error!("failed to save permissions of {:?}: {}", entity, e);
        PermissionError::PersistenceFailure(e)
    })
}

/// Reads `resources_permissions_enabled` for a component, falling back to `default`.
pub(crate) fn resources_permissions_enabled(db: &mut dyn Storage, component_id: &str, default: bool) -> Result<bool> {
    let key = SETTINGS_PREFIX.to_owned() + &key_segment(component_id);
    let src = db.get(&key).map_err(|e| {
        log::error!("failed to load settings of component {}: {}", component_id, e);
        PermissionError::Storage(e)
    })?;
    match src {
        Some(src) => {
            let settings: ComponentSettings = serde_json::from_str(&src).map_err(|source| PermissionError::CorruptDocument {
                key,
                source,
            })?;
            Ok(settings.resources_permissions_enabled.unwrap_or(default))
        },
        None => Ok(default),
    }
}

pub fn save_component_settings(db: &mut dyn Storage, component_id: &str, settings: &ComponentSettings) -> Result<()> {
    let key = SETTINGS_PREFIX.to_owned() + &key_segment(component_id);
    let value = serde_json::to_string(settings).map_err(|source| PermissionError::CorruptDocument {
        key: key.clone(),
        source,
    })?;
    db.put(&key, Some(&value)).map_err(PermissionError::PersistenceFailure)
}
