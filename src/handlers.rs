use crate::common::{AuthorizationHandlers, EVERYONE_LABEL, NONE_SENTINEL, UNRESTRICTED_SENTINEL};
use crate::config::PermissionsConfig;
use crate::error::{PermissionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One option an authorization handler accepts, e.g. `postal_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionField {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default, rename = "options")]
    pub option_schema: Vec<OptionField>,
}

impl HandlerDescriptor {
    pub fn new(id: &str, label: &str, options: &[&str]) -> Self {
        HandlerDescriptor {
            id: id.to_string(),
            label: label.to_string(),
            option_schema: options
                .iter()
                .map(|name| OptionField {
                    name: name.to_string(),
                    required: false,
                })
                .collect(),
        }
    }

    /// Checks submitted options against the schema and returns them without blank values.
    pub fn validate_options(&self, options: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
        for key in options.keys() {
            if !self.option_schema.iter().any(|f| &f.name == key) {
                return Err(self.invalid(format!("unknown option {}", key)));
            }
        }

        let cleaned: BTreeMap<String, String> = options
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for field in self.option_schema.iter().filter(|f| f.required) {
            if !cleaned.contains_key(&field.name) {
                return Err(self.invalid(format!("missing required option {}", field.name)));
            }
        }

        Ok(cleaned)
    }

    fn invalid(&self, reason: String) -> PermissionError {
        PermissionError::InvalidOptions {
            handler: self.id.clone(),
            reason,
        }
    }
}

/// What the administrator picked in a permission section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerSelection {
    Everyone,
    Handler(String),
}

impl HandlerSelection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == UNRESTRICTED_SENTINEL || value == NONE_SENTINEL {
            HandlerSelection::Everyone
        } else {
            HandlerSelection::Handler(value.to_string())
        }
    }

    pub fn handler(id: &str) -> Self {
        HandlerSelection::Handler(id.to_string())
    }

    pub fn as_form_value(&self) -> &str {
        match self {
            HandlerSelection::Everyone => "",
            HandlerSelection::Handler(id) => id,
        }
    }
}

/// Handlers available to the organization, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    order: Vec<String>,
    handlers: HashMap<String, HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PermissionsConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = HandlerRegistry::new();
        for handler in &config.handlers {
            registry.register(handler.clone());
        }
        Ok(registry)
    }

    /// Registers a handler, replacing any previous one with the same id.
    pub fn register(&mut self, descriptor: HandlerDescriptor) {
        if !self.handlers.contains_key(&descriptor.id) {
            self.order.push(descriptor.id.clone());
        }
        self.handlers.insert(descriptor.id.clone(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl AuthorizationHandlers for HandlerRegistry {
    fn descriptor(&self, id: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(id)
    }

    fn available(&self) -> Vec<&HandlerDescriptor> {
        self.order.iter().filter_map(|id| self.handlers.get(id)).collect()
    }
}

/// Select box entries: `Everyone` first, then the available handlers.
pub fn handler_choices(handlers: &dyn AuthorizationHandlers) -> Vec<(String, String)> {
    let mut choices = vec![(String::new(), EVERYONE_LABEL.to_string())];
    choices.extend(handlers.available().into_iter().map(|h| (h.id.clone(), h.label.clone())));
    choices
}
