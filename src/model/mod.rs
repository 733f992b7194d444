//! Data model shared by the pipeline stages.
//!
//! Decoded input (`SourceDocument`, `SourcePage`, `RawObject`) flows through
//! layout extraction into `PositionedBlock`s, through classification into
//! `ClassifiedBlock`s and `TableGrid`s, and finally into Markdown.

mod block;
mod classified;
mod document;
mod geometry;
mod source;
mod table;

pub use block::{BlockKind, FontInfo, ImageReference, PositionedBlock};
pub use classified::{
    AmbiguityKind, BlockSignature, ClassificationAmbiguity, ClassifiedBlock, ListKind,
    PageClassification, Role, TableShape,
};
pub use document::Metadata;
pub use geometry::BoundingBox;
pub use source::{RawImage, RawLink, RawObject, RawTextRun, SourceDocument, SourcePage};
pub use table::{GridCell, TableGrid};
