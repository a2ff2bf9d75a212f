use crate::common::{load_document, resources_permissions_enabled, EntityRef, Storage};
use crate::document::{ActionPermission, PermissionDocument};
use crate::error::Result;
use crate::trace::TraceInfo;
use std::collections::HashMap;

/// Level a resolved permission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSource {
    Resource,
    Component,
    /// Nothing configured at any level.
    Default,
}

impl PermissionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionSource::Resource => "resource",
            PermissionSource::Component => "component",
            PermissionSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPermission {
    pub source: PermissionSource,
    pub permission: ActionPermission,
}

impl ResolvedPermission {
    pub fn is_unrestricted(&self) -> bool {
        self.permission.is_unrestricted()
    }

    pub fn is_inherited(&self) -> bool {
        self.source != PermissionSource::Resource
    }
}

pub(crate) fn resolve_permission(
    db: &mut dyn Storage,
    entity: &EntityRef,
    action: &str,
    resources_enabled_default: bool,
    trace: &mut TraceInfo,
) -> Result<ResolvedPermission> {
    if entity.is_resource() {
        let enabled = resources_permissions_enabled(db, entity.component_id(), resources_enabled_default)?;
        if enabled {
            if let Some(resolved) = lookup(db, entity, action, PermissionSource::Resource, trace)? {
                return Ok(resolved);
            }
        } else {
            trace.add_info("resource permissions disabled, using component");
            log::debug!("resource permissions disabled for component {}", entity.component_id());
        }
    }

    if let Some(resolved) = lookup(db, &entity.owning_component(), action, PermissionSource::Component, trace)? {
        return Ok(resolved);
    }

    let permission = ActionPermission::unrestricted();
    trace.add_decision(PermissionSource::Default, &permission);
    log::debug!("{} on {:?}: not configured", action, entity);
    Ok(ResolvedPermission {
        source: PermissionSource::Default,
        permission,
    })
}

fn lookup(db: &mut dyn Storage, entity: &EntityRef, action: &str, source: PermissionSource, trace: &mut TraceInfo) -> Result<Option<ResolvedPermission>> {
    let key = entity.storage_key();
    trace.start_step(source.as_str(), HashMap::from([("key".to_string(), key.clone())]));

    let document = load_document(db, entity)?.map(|stored| stored.permissions);
    trace.add_document(&key, document.as_ref());

    let found = document.as_ref().and_then(|doc: &PermissionDocument| doc.get(action)).cloned();
    let resolved = found.map(|permission| {
        trace.add_decision(source, &permission);
        log::debug!("{} on {:?}: {:?} from {}", action, entity, permission, source.as_str());
        ResolvedPermission {
            source,
            permission,
        }
    });

    trace.end_step();
    Ok(resolved)
}
