use crate::common::EntityRef;
use crate::handlers::HandlerSelection;
use crate::resolve_permission::ResolvedPermission;
use std::collections::BTreeMap;

/// One action section of a submitted permissions form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSubmission {
    pub action: String,
    pub selection: HandlerSelection,
    pub options: BTreeMap<String, String>,
}

impl PermissionSubmission {
    pub fn new(action: &str, selection: HandlerSelection, options: BTreeMap<String, String>) -> Self {
        PermissionSubmission {
            action: action.to_string(),
            selection,
            options,
        }
    }

    /// Builds a submission from raw form values; an empty handler value means `Everyone`.
    pub fn from_form(action: &str, handler_value: &str, options: &[(&str, &str)]) -> Self {
        PermissionSubmission {
            action: action.to_string(),
            selection: HandlerSelection::parse(handler_value),
            options: options.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn everyone(action: &str) -> Self {
        Self::new(action, HandlerSelection::Everyone, BTreeMap::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSection {
    pub action: String,
    pub selection: HandlerSelection,
    pub options: BTreeMap<String, String>,
    /// Value shown comes from the component, not from the resource itself.
    pub inherited: bool,
}

impl PermissionSection {
    pub(crate) fn from_resolved(action: &str, resolved: ResolvedPermission) -> Self {
        let inherited = resolved.is_inherited();
        let selection = match resolved.permission.handler_name() {
            Some(id) => HandlerSelection::handler(id),
            None => HandlerSelection::Everyone,
        };
        PermissionSection {
            action: action.to_string(),
            selection,
            options: resolved.permission.options,
            inherited,
        }
    }
}

/// State of the administrative permissions form of a component or resource.
#[derive(Debug, Clone)]
pub struct PermissionsForm {
    pub entity: EntityRef,
    pub sections: Vec<PermissionSection>,
    /// `(value, label)` pairs of the handler select box.
    pub choices: Vec<(String, String)>,
}

impl PermissionsForm {
    pub fn section(&self, action: &str) -> Option<&PermissionSection> {
        self.sections.iter().find(|s| s.action == action)
    }

    pub fn label_of(&self, selection: &HandlerSelection) -> Option<&str> {
        self.choices.iter().find(|(value, _)| value == selection.as_form_value()).map(|(_, label)| label.as_str())
    }

    /// Submits the form unchanged.
    pub fn submissions(&self) -> Vec<PermissionSubmission> {
        self.sections.iter().map(|s| PermissionSubmission::new(&s.action, s.selection.clone(), s.options.clone())).collect()
    }
}
