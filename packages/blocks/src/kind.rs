use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// The fixed set of block types a page can be composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    Footer,
    Hero,
    Heading,
    Text,
    Image,
    Button,
    Video,
    ProductGrid,
    FeaturedProduct,
    Testimonials,
    Newsletter,
    Spacer,
    Divider,
    Section,
    Columns,
    Column,
    Group,
}

impl BlockKind {
    pub const ALL: [BlockKind; 18] = [
        BlockKind::Header,
        BlockKind::Footer,
        BlockKind::Hero,
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Button,
        BlockKind::Video,
        BlockKind::ProductGrid,
        BlockKind::FeaturedProduct,
        BlockKind::Testimonials,
        BlockKind::Newsletter,
        BlockKind::Spacer,
        BlockKind::Divider,
        BlockKind::Section,
        BlockKind::Columns,
        BlockKind::Column,
        BlockKind::Group,
    ];

    /// Kinds that may hold children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            BlockKind::Section | BlockKind::Columns | BlockKind::Column | BlockKind::Group
        )
    }

    /// Kinds restricted to a single instance per page.
    pub fn is_singleton(self) -> bool {
        matches!(self, BlockKind::Header | BlockKind::Footer)
    }

    /// Whether a node of this kind may directly contain a node of `child` kind.
    ///
    /// `columns` holds only `column`, and `column` lives only inside `columns`.
    pub fn accepts_child(self, child: BlockKind) -> bool {
        if !self.is_container() {
            return false;
        }
        match (self, child) {
            (BlockKind::Columns, BlockKind::Column) => true,
            (BlockKind::Columns, _) => false,
            (_, BlockKind::Column) => false,
            _ => true,
        }
    }

    /// Whether a node of this kind may sit at the top level of a page.
    pub fn allowed_at_root(self) -> bool {
        self != BlockKind::Column
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Header => "header",
            BlockKind::Footer => "footer",
            BlockKind::Hero => "hero",
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Video => "video",
            BlockKind::ProductGrid => "product_grid",
            BlockKind::FeaturedProduct => "featured_product",
            BlockKind::Testimonials => "testimonials",
            BlockKind::Newsletter => "newsletter",
            BlockKind::Spacer => "spacer",
            BlockKind::Divider => "divider",
            BlockKind::Section => "section",
            BlockKind::Columns => "columns",
            BlockKind::Column => "column",
            BlockKind::Group => "group",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlockKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| TreeError::UnknownKind(s.to_string()))
    }
}
