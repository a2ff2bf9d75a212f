use crate::document::{ActionPermission, PermissionDocument};
use crate::resolve_permission::PermissionSource;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum TraceNode {
    Step {
        name: String,
        details: HashMap<String, String>,
        children: Vec<TraceNode>,
    },
    Document {
        key: String,
        present: bool,
        content: Option<Value>,
    },
    Decision {
        source: PermissionSource,
        permission: ActionPermission,
    },
    Info(String),
}

/// Records how a permission was resolved.
pub struct TraceInfo {
    root: Option<TraceNode>,
    current_path: Vec<usize>,
    mode: TraceMode,
    entity: Option<String>,
    action: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TraceMode {
    Disabled,
    Enabled,
    /// Also records the full content of every loaded document.
    Detailed,
}

impl TraceInfo {
    pub fn new(mode: TraceMode) -> Self {
        let root = match mode {
            TraceMode::Disabled => None,
            _ => Some(TraceNode::Step {
                name: "resolve".to_string(),
                details: HashMap::new(),
                children: Vec::new(),
            }),
        };
        TraceInfo {
            root,
            current_path: Vec::new(),
            mode,
            entity: None,
            action: None,
        }
    }

    pub fn with_details(mut self, entity: &str, action: &str) -> Self {
        if self.mode != TraceMode::Disabled {
            self.entity = Some(entity.to_string());
            self.action = Some(action.to_string());
        }
        self
    }

    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    pub fn start_step(&mut self, name: &str, details: HashMap<String, String>) {
        if self.mode == TraceMode::Disabled {
            return;
        }
        self.add_node(TraceNode::Step {
            name: name.to_string(),
            details,
            children: Vec::new(),
        });
        let new_index = self.get_current_children_len() - 1;
        self.current_path.push(new_index);
    }

    pub fn end_step(&mut self) {
        if self.mode == TraceMode::Disabled {
            return;
        }
        self.current_path.pop();
    }

    pub fn add_document(&mut self, key: &str, document: Option<&PermissionDocument>) {
        if self.mode == TraceMode::Disabled {
            return;
        }
        let content = match self.mode {
            TraceMode::Detailed => document.map(PermissionDocument::to_json),
            _ => None,
        };
        self.add_node(TraceNode::Document {
            key: key.to_string(),
            present: document.is_some(),
            content,
        });
    }

    pub fn add_decision(&mut self, source: PermissionSource, permission: &ActionPermission) {
        if self.mode == TraceMode::Disabled {
            return;
        }
        self.add_node(TraceNode::Decision {
            source,
            permission: permission.clone(),
        });
    }

    pub fn add_info(&mut self, info: &str) {
        if self.mode == TraceMode::Disabled {
            return;
        }
        self.add_node(TraceNode::Info(info.to_string()));
    }

    /// The last decision recorded anywhere in the tree.
    pub fn decision(&self) -> Option<(PermissionSource, &ActionPermission)> {
        fn walk(node: &TraceNode) -> Option<(PermissionSource, &ActionPermission)> {
            match node {
                TraceNode::Decision { source, permission } => Some((*source, permission)),
                TraceNode::Step { children, .. } => children.iter().rev().find_map(walk),
                _ => None,
            }
        }
        self.root.as_ref().and_then(walk)
    }

    fn add_node(&mut self, node: TraceNode) {
        if let Some(TraceNode::Step { children, .. }) = self.get_current_node_mut() {
            children.push(node);
        }
    }

    fn get_current_node(&self) -> Option<&TraceNode> {
        self.root.as_ref().and_then(|root| {
            let mut current = root;
            for &index in &self.current_path {
                if let TraceNode::Step { children, .. } = current {
                    current = children.get(index)?;
                } else {
                    return None;
                }
            }
            Some(current)
        })
    }

    fn get_current_node_mut(&mut self) -> Option<&mut TraceNode> {
        self.root.as_mut().and_then(|root| {
            let mut current = root;
            for &index in &self.current_path {
                if let TraceNode::Step { children, .. } = current {
                    current = children.get_mut(index)?;
                } else {
                    return None;
                }
            }
            Some(current)
        })
    }

    fn get_current_children_len(&self) -> usize {
        match self.get_current_node() {
            Some(TraceNode::Step { children, .. }) => children.len(),
            _ => 0,
        }
    }

    pub fn finalize(self) -> Option<String> {
        match self.mode {
            TraceMode::Disabled => None,
            _ => serde_json::to_string_pretty(&self.to_json()).ok(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "entity": self.entity,
            "action": self.action,
            "trace": self.root.as_ref().map(node_to_json)
        })
    }
}

fn node_to_json(node: &TraceNode) -> Value {
    match node {
        TraceNode::Step { name, details, children } => {
            json!({
                "type": "step",
                "name": name,
                "details": details,
                "children": children.iter().map(node_to_json).collect::<Vec<_>>()
            })
        },
        TraceNode::Document { key, present, content } => {
            json!({
                "type": "document",
                "key": key,
                "present": present,
                "content": content
            })
        },
        TraceNode::Decision { source, permission } => {
            json!({
                "type": "decision",
                "source": source.as_str(),
                "unrestricted": permission.is_unrestricted(),
                "permission": permission
            })
        },
        TraceNode::Info(info) => {
            json!({
                "type": "info",
                "message": info
            })
        },
    }
}
