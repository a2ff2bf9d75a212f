use crate::error::{PermissionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Requirement attached to a single action.
///
/// An empty list of handler names means the action is open to everyone. The
/// empty configuration serializes as `{}`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPermission {
    #[serde(rename = "authorization_handler_name", default, skip_serializing_if = "Vec::is_empty")]
    pub authorization_handler_names: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl ActionPermission {
    pub fn restricted(handler: &str, options: BTreeMap<String, String>) -> Self {
        ActionPermission {
            authorization_handler_names: vec![handler.to_string()],
            options,
        }
    }

    pub fn unrestricted() -> Self {
        ActionPermission::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.authorization_handler_names.is_empty()
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.authorization_handler_names.first().map(String::as_str)
    }

    // options without a handler are meaningless
    fn normalize(&mut self) {
        if self.authorization_handler_names.is_empty() {
            self.options.clear();
        }
    }
}

impl fmt::Debug for ActionPermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_unrestricted() {
            return write!(f, "(everyone)");
        }
        write!(f, "({}, {:?})", self.authorization_handler_names.join(" "), self.options)
    }
}

/// Per-action permissions of one component or resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionDocument {
    actions: BTreeMap<String, ActionPermission>,
}

impl PermissionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, action: &str) -> Option<&ActionPermission> {
        self.actions.get(action)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub fn set(&mut self, action: &str, permission: ActionPermission) {
        self.actions.insert(action.to_string(), permission);
    }

    pub fn remove(&mut self, action: &str) -> Option<ActionPermission> {
        self.actions.remove(action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> impl Iterator<Item = (&str, &ActionPermission)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl<const N: usize> From<[(&str, ActionPermission); N]> for PermissionDocument {
    fn from(entries: [(&str, ActionPermission); N]) -> Self {
        PermissionDocument {
            actions: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Envelope written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub permissions: PermissionDocument,
    pub updated_at: DateTime<Utc>,
}

pub fn encode_document(key: &str, document: &PermissionDocument, updated_at: DateTime<Utc>) -> Result<String> {
    let stored = StoredDocument {
        permissions: document.clone(),
        updated_at,
    };
    serde_json::to_string(&stored).map_err(|source| PermissionError::CorruptDocument {
        key: key.to_string(),
        source,
    })
}

pub fn decode_document(key: &str, src: &str) -> Result<StoredDocument> {
    let mut stored: StoredDocument = serde_json::from_str(src).map_err(|source| {
        log::warn!("corrupt permissions document at {}: {}", key, source);
        PermissionError::CorruptDocument {
            key: key.to_string(),
            source,
        }
    })?;
    for permission in stored.permissions.actions.values_mut() {
        permission.normalize();
    }
    Ok(stored)
}
