use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BlockKind;

/// Open key-value bag of block configuration. Opaque to the tree.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Stable block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn default_visible() -> bool {
    true
}

/// One placed element in the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub kind: BlockKind,

    /// Visual sub-style within the kind
    #[serde(default)]
    pub variant: String,

    #[serde(default)]
    pub settings: Settings,

    /// Sibling display order. Consumers sort by this, never by array index.
    #[serde(default)]
    pub order: i64,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default)]
    pub locked: bool,

    /// Present only on container kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BlockNode>>,

    /// Advisory tag shared by siblings the user grouped together
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl BlockNode {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            variant: "default".to_string(),
            settings: Settings::new(),
            order: 0,
            visible: true,
            locked: false,
            children: kind.is_container().then(Vec::new),
            group_id: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Attach children; only meaningful on container kinds.
    pub fn with_children(mut self, children: Vec<BlockNode>) -> Self {
        self.children = Some(children);
        self.renumber_children();
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn children(&self) -> &[BlockNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<BlockNode>> {
        self.children.as_mut()
    }

    /// Visit this node and every descendant in depth-first pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a BlockNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut BlockNode)) {
        visit(self);
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }

    /// Ids of this node and all of its descendants, pre-order.
    pub fn subtree_ids(&self) -> Vec<BlockId> {
        let mut ids = Vec::new();
        self.walk(&mut |node| ids.push(node.id.clone()));
        ids
    }

    /// True if this node or any descendant satisfies `predicate`.
    pub fn any_in_subtree(&self, predicate: &impl Fn(&BlockNode) -> bool) -> bool {
        predicate(self) || self.children().iter().any(|c| c.any_in_subtree(predicate))
    }

    /// Sort every child list in this subtree by `order`.
    pub fn sort_by_order(&mut self) {
        self.walk_mut(&mut |node| {
            if let Some(children) = node.children.as_mut() {
                children.sort_by_key(|child| child.order);
            }
        });
    }

    fn renumber_children(&mut self) {
        if let Some(children) = self.children.as_mut() {
            for (index, child) in children.iter_mut().enumerate() {
                child.order = index as i64;
            }
        }
    }
}
