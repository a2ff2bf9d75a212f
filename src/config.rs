//! Configuration of the authorization handlers available to an organization.
//!
//! ```toml
//! resources_permissions_enabled = true
//!
//! [[handlers]]
//! id = "dummy_authorization_handler"
//! label = "Example authorization"
//! options = [{ name = "postal_code" }]
//! ```

use crate::error::{PermissionError, Result};
use crate::handlers::HandlerDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Used for components that have no stored settings.
    #[serde(default = "default_resources_permissions_enabled")]
    pub resources_permissions_enabled: bool,
    #[serde(default)]
    pub handlers: Vec<HandlerDescriptor>,
}

fn default_resources_permissions_enabled() -> bool {
    true
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        PermissionsConfig {
            resources_permissions_enabled: default_resources_permissions_enabled(),
            handlers: Vec::new(),
        }
    }
}

impl PermissionsConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: PermissionsConfig = toml::from_str(src).map_err(|e| PermissionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PermissionError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loading permissions config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PermissionError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for handler in &self.handlers {
            if handler.id.trim().is_empty() {
                return Err(PermissionError::Config("handler id must not be empty".to_string()));
            }
            if !seen.insert(handler.id.as_str()) {
                return Err(PermissionError::Config(format!("duplicate handler {}", handler.id)));
            }
            let mut fields = HashSet::new();
            for field in &handler.option_schema {
                if !fields.insert(field.name.as_str()) {
                    return Err(PermissionError::Config(format!("duplicate option {} for handler {}", field.name, handler.id)));
                }
            }
        }
        Ok(())
    }
}
