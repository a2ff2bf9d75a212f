use crate::common::{AuthorizationHandlers, EntityRef};
use crate::document::{ActionPermission, PermissionDocument};
use crate::error::{PermissionError, Result};
use crate::form::PermissionSubmission;
use crate::handlers::HandlerSelection;
use std::collections::HashSet;

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActionChange {
    Clear,
    Set(ActionPermission),
}

/// Validates every submission before anything is touched.
pub(crate) fn validate_submissions<'s>(handlers: &dyn AuthorizationHandlers, submissions: &'s [PermissionSubmission]) -> Result<Vec<(&'s str, ActionChange)>> {
    let mut seen = HashSet::new();
    let mut changes = Vec::with_capacity(submissions.len());

    for submission in submissions {
        let action = submission.action.as_str();
        if action.trim().is_empty() {
            return Err(PermissionError::InvalidAction);
        }
        if !seen.insert(action) {
            return Err(PermissionError::DuplicateAction(action.to_string()));
        }

        let change = match &submission.selection {
            HandlerSelection::Everyone => ActionChange::Clear,
            HandlerSelection::Handler(id) => {
                let descriptor = handlers.descriptor(id).ok_or_else(|| PermissionError::InvalidHandlerSelection(id.clone()))?;
                let options = descriptor.validate_options(&submission.options)?;
                ActionChange::Set(ActionPermission::restricted(&descriptor.id, options))
            },
        };
        changes.push((action, change));
    }

    Ok(changes)
}

/// Applies one action change to an entity's document.
///
/// Clearing a component removes the key and drops the document once it is
/// empty. Clearing a resource keeps the key with an empty configuration, so
/// the resource stays explicitly unrestricted; a resource that had no
/// document before the submission only gets an entry when it has to
/// override a component restriction.
pub(crate) fn apply_change(
    entity: &EntityRef,
    document: Option<PermissionDocument>,
    had_document: bool,
    component_document: Option<&PermissionDocument>,
    action: &str,
    change: &ActionChange,
) -> Option<PermissionDocument> {
    match change {
        ActionChange::Set(permission) => {
            let mut doc = document.unwrap_or_default();
            doc.set(action, permission.clone());
            Some(doc)
        },
        ActionChange::Clear if entity.is_resource() => {
            let overrides = component_document.and_then(|doc| doc.get(action)).map_or(false, |p| !p.is_unrestricted());
            if had_document || overrides {
                let mut doc = document.unwrap_or_default();
                doc.set(action, ActionPermission::unrestricted());
                Some(doc)
            } else {
                document
            }
        },
        ActionChange::Clear => document.and_then(|mut doc| {
            doc.remove(action);
            if doc.is_empty() {
                None
            } else {
                Some(doc)
            }
        }),
    }
}
