/// This module manages the authorization requirements of component and resource actions
pub mod apply_permission;
pub mod common;
pub mod config;
pub mod document;
pub mod error;
pub mod form;
pub mod handlers;
pub mod resolve_permission;
pub mod trace;

use crate::apply_permission::{apply_change, validate_submissions};
use crate::common::*;
use crate::config::PermissionsConfig;
use crate::document::PermissionDocument;
use crate::form::{PermissionSection, PermissionSubmission, PermissionsForm};
use crate::handlers::{handler_choices, HandlerSelection};
use crate::resolve_permission::resolve_permission;
use crate::trace::{TraceInfo, TraceMode};
use std::collections::BTreeMap;

pub use crate::document::{ActionPermission, StoredDocument};
pub use crate::error::{PermissionError, Result};
pub use crate::resolve_permission::{PermissionSource, ResolvedPermission};

/// Outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionChange {
    /// The entity's document was written.
    Saved,
    /// There was nothing to clear; no write happened.
    Unchanged,
}

pub struct PermissionStore<'a> {
    db: &'a mut dyn Storage,
    handlers: &'a dyn AuthorizationHandlers,
    resources_permissions_default: bool,
}

impl<'a> PermissionStore<'a> {
    pub fn new(db: &'a mut dyn Storage, handlers: &'a dyn AuthorizationHandlers) -> Self {
        PermissionStore {
            db,
            handlers,
            resources_permissions_default: PermissionsConfig::default().resources_permissions_enabled,
        }
    }

    pub fn with_config(db: &'a mut dyn Storage, handlers: &'a dyn AuthorizationHandlers, config: &PermissionsConfig) -> Self {
        PermissionStore {
            db,
            handlers,
            resources_permissions_default: config.resources_permissions_enabled,
        }
    }

    /// Configures a single action of `entity`.
    ///
    /// `HandlerSelection::Everyone` clears the action; any other selection
    /// replaces the action's entry with the handler and its validated options.
    pub fn set_permission(&mut self, entity: &EntityRef, action: &str, selection: HandlerSelection, options: BTreeMap<String, String>) -> Result<PermissionChange> {
        self.update_permissions(entity, &[PermissionSubmission::new(action, selection, options)])
    }

    /// Applies a whole form submission with a single write.
    pub fn update_permissions(&mut self, entity: &EntityRef, submissions: &[PermissionSubmission]) -> Result<PermissionChange> {
        let changes = validate_submissions(self.handlers, submissions).map_err(|e| {
            log::warn!("rejected permissions of {:?}: {}", entity, e);
            e
        })?;

        if entity.is_resource() && !self.resources_permissions_enabled(entity)? {
            log::warn!("rejected permissions of {:?}: resource permissions disabled", entity);
            return Err(PermissionError::ResourcePermissionsDisabled(entity.component_id().to_string()));
        }

        let current = self.load_permissions(entity)?;
        let component_document = match (&current, entity.is_resource()) {
            (None, true) => self.load_permissions(&entity.owning_component())?,
            _ => None,
        };

        let had_document = current.is_some();
        let updated = changes
            .iter()
            .fold(current.clone(), |doc, (action, change)| apply_change(entity, doc, had_document, component_document.as_ref(), action, change));

        if current.is_none() && updated.is_none() {
            log::debug!("nothing to clear on {:?}", entity);
            return Ok(PermissionChange::Unchanged);
        }

        save_document(self.db, entity, updated.as_ref())?;
        log::info!("saved permissions of {:?}: {} action(s)", entity, updated.as_ref().map_or(0, PermissionDocument::len));
        Ok(PermissionChange::Saved)
    }

    /// The entity's own document, `None` when never configured.
    pub fn load_permissions(&mut self, entity: &EntityRef) -> Result<Option<PermissionDocument>> {
        Ok(load_document(self.db, entity)?.map(|stored| stored.permissions))
    }

    pub fn load_stored(&mut self, entity: &EntityRef) -> Result<Option<StoredDocument>> {
        load_document(self.db, entity)
    }

    /// Permission that applies to `action` on `entity`.
    ///
    /// A resource entry wins whenever the key is present, even when it is
    /// empty; otherwise the component entry applies.
    pub fn resolve_effective_permission(&mut self, entity: &EntityRef, action: &str) -> Result<ResolvedPermission> {
        let mut trace_info = TraceInfo::new(TraceMode::Disabled);
        resolve_permission(self.db, entity, action, self.resources_permissions_default, &mut trace_info)
    }

    pub fn trace(&mut self, entity: &EntityRef, action: &str, mode: TraceMode) -> Result<TraceInfo> {
        let mut trace_info = TraceInfo::new(mode).with_details(&format!("{:?}", entity), action);
        resolve_permission(self.db, entity, action, self.resources_permissions_default, &mut trace_info)?;
        Ok(trace_info)
    }

    /// Form state for `actions`, pre-filled with the resolved permissions.
    pub fn permissions_form(&mut self, entity: &EntityRef, actions: &[&str]) -> Result<PermissionsForm> {
        if entity.is_resource() && !self.resources_permissions_enabled(entity)? {
            return Err(PermissionError::ResourcePermissionsDisabled(entity.component_id().to_string()));
        }

        let mut sections = Vec::with_capacity(actions.len());
        for action in actions {
            let resolved = self.resolve_effective_permission(entity, action)?;
            sections.push(PermissionSection::from_resolved(action, resolved));
        }

        Ok(PermissionsForm {
            entity: entity.clone(),
            sections,
            choices: handler_choices(self.handlers),
        })
    }

    pub fn resources_permissions_enabled(&mut self, entity: &EntityRef) -> Result<bool> {
        resources_permissions_enabled(self.db, entity.component_id(), self.resources_permissions_default)
    }
}
