//! Classified blocks: positioned blocks with a structural role.

use super::{ImageReference, PositionedBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// List numbering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ListKind {
    /// Numbered item with its declared number
    Ordered {
        /// Declared item number
        number: u64,
    },
    /// Bulleted item
    Unordered,
}

/// Structural role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Role {
    /// Heading with level 1-6
    Heading {
        /// Heading level
        level: u8,
    },
    /// Body paragraph
    Paragraph,
    /// List item
    ListItem {
        /// Numbering style
        kind: ListKind,
        /// Nesting depth (0 = top level)
        level: u8,
    },
    /// Cell of a detected table
    TableCell {
        /// Table index within the page
        table: usize,
        /// Row index (0 = first row)
        row: usize,
        /// Column index
        column: usize,
    },
    /// Image placement
    Image,
}

impl Role {
    /// Short role name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Heading { .. } => "heading",
            Role::Paragraph => "paragraph",
            Role::ListItem {
                kind: ListKind::Ordered { .. },
                ..
            } => "ordered-item",
            Role::ListItem {
                kind: ListKind::Unordered,
                ..
            } => "unordered-item",
            Role::TableCell { .. } => "table-cell",
            Role::Image => "image",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Heading { level } => write!(f, "heading-{}", level),
            Role::ListItem {
                kind: ListKind::Ordered { number },
                level,
            } => write!(f, "ordered-item #{} (level {})", number, level),
            Role::ListItem { level, .. } => write!(f, "unordered-item (level {})", level),
            Role::TableCell { table, row, column } => {
                write!(f, "table-cell t{} r{} c{}", table, row, column)
            }
            other => f.write_str(other.name()),
        }
    }
}

/// A block with its assigned role.
///
/// Classified blocks are never mutated; re-classification builds new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBlock {
    /// Source block (merged continuation lines share one union box)
    pub source: PositionedBlock,
    /// Assigned role
    pub role: Role,
    /// Text to emit, with any list marker stripped; alt text for images
    pub content: String,
}

impl ClassifiedBlock {
    /// Create a classified block.
    pub fn new(source: PositionedBlock, role: Role, content: impl Into<String>) -> Self {
        Self {
            source,
            role,
            content: content.into(),
        }
    }

    /// Link target of the block.
    pub fn link(&self) -> Option<&str> {
        self.source.link.as_deref()
    }

    /// Image reference of an image block.
    pub fn image(&self) -> Option<&ImageReference> {
        self.source.image()
    }

    /// Geometry-free comparison key.
    pub fn signature(&self) -> BlockSignature {
        BlockSignature {
            role: self.role,
            content: self.content.clone(),
            link: self.source.link.clone(),
            image: self.source.image().cloned(),
        }
    }
}

/// What a block means independent of where it sits on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSignature {
    /// Assigned role
    pub role: Role,
    /// Emitted text
    pub content: String,
    /// Link target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Image reference for image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

impl fmt::Display for BlockSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.role, self.content)?;
        if let Some(ref link) = self.link {
            write!(f, " -> {}", link)?;
        }
        if let Some(ref image) = self.image {
            write!(f, " [{}]", image.path)?;
        }
        Ok(())
    }
}

/// Kind of classification ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityKind {
    /// More than one rule matched; the higher-priority rule won
    CompetingRoles,
    /// Heading-sized text too long to be a heading
    OversizedHeading,
    /// List marker with no item content
    LoneMarker,
}

/// A recorded classification ambiguity. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationAmbiguity {
    /// Page number
    pub page: u32,
    /// Index of the positioned block
    pub block: usize,
    /// What was ambiguous
    pub kind: AmbiguityKind,
    /// Role the block ended up with
    pub resolution: Role,
}

/// Shape of one table on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    /// Number of rows
    pub rows: usize,
    /// Number of columns (set by the first row)
    pub columns: usize,
}

/// Classification result for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageClassification {
    /// Page number
    pub page: u32,
    /// Classified blocks in reading order
    pub blocks: Vec<ClassifiedBlock>,
    /// Detected tables, indexed by `Role::TableCell::table`
    pub tables: Vec<TableShape>,
    /// Ambiguities encountered while classifying
    pub diagnostics: Vec<ClassificationAmbiguity>,
}

impl PageClassification {
    /// Signatures of all blocks in order.
    pub fn signatures(&self) -> Vec<BlockSignature> {
        self.blocks.iter().map(|b| b.signature()).collect()
    }

    /// Count blocks whose role satisfies `pred`.
    pub fn count_roles(&self, pred: impl Fn(&Role) -> bool) -> usize {
        self.blocks.iter().filter(|b| pred(&b.role)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, BoundingBox, FontInfo};

    fn text_block(text: &str) -> PositionedBlock {
        PositionedBlock {
            page: 1,
            index: 0,
            line: 0,
            bbox: BoundingBox::new(72.0, 72.0, 100.0, 12.0),
            kind: BlockKind::TextRun {
                text: text.to_string(),
                font: FontInfo::new("Helvetica", 12.0),
            },
            link: None,
        }
    }

    #[test]
    fn test_signature_ignores_geometry() {
        let a = ClassifiedBlock::new(text_block("1. First"), Role::Paragraph, "1. First");
        let mut moved = text_block("1. First");
        moved.bbox = BoundingBox::new(10.0, 500.0, 40.0, 9.0);
        moved.index = 7;
        let b = ClassifiedBlock::new(moved, Role::Paragraph, "1. First");

        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_distinguishes_roles() {
        let block = text_block("First");
        let ordered = ClassifiedBlock::new(
            block.clone(),
            Role::ListItem {
                kind: ListKind::Ordered { number: 1 },
                level: 0,
            },
            "First",
        );
        let unordered = ClassifiedBlock::new(
            block,
            Role::ListItem {
                kind: ListKind::Unordered,
                level: 0,
            },
            "First",
        );
        assert_ne!(ordered.signature(), unordered.signature());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Heading { level: 2 }.to_string(), "heading-2");
        assert_eq!(Role::Paragraph.to_string(), "paragraph");
        assert_eq!(
            Role::TableCell {
                table: 0,
                row: 1,
                column: 2
            }
            .to_string(),
            "table-cell t0 r1 c2"
        );
    }

    #[test]
    fn test_role_serialization() {
        let role = Role::ListItem {
            kind: ListKind::Ordered { number: 3 },
            level: 1,
        };
        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("\"type\":\"list_item\""));
        assert!(json.contains("\"style\":\"ordered\""));
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }
}
