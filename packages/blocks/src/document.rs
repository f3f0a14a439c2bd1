//! # Page Document
//!
//! The envelope handed to the save/publish pipeline. The tree engine never
//! looks at persistence timing; it only produces consistent trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{BlockTree, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub id: String,

    #[serde(default)]
    pub title: String,

    pub status: PageStatus,

    pub blocks: BlockTree,

    pub updated_at: DateTime<Utc>,
}

impl PageDocument {
    pub fn draft(id: impl Into<String>, title: impl Into<String>, blocks: BlockTree) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: PageStatus::Draft,
            blocks,
            updated_at: Utc::now(),
        }
    }

    pub fn from_json(source: &str) -> Result<Self, TreeError> {
        let mut doc: PageDocument = serde_json::from_str(source)?;
        doc.blocks = doc.blocks.normalized();
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self, crate::PageIoError> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&source)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), crate::PageIoError> {
        let json = serde_json::to_string_pretty(self).map_err(TreeError::from)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Mark the document published, stamping the update time.
    pub fn publish(&mut self) {
        self.status = PageStatus::Published;
        self.updated_at = Utc::now();
    }
}
