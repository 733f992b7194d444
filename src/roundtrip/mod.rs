//! Round-trip verification of emitted Markdown.
//!
//! A classified page is emitted, the Markdown is parsed back with
//! `pulldown-cmark`, typeset onto a synthetic page with canonical fonts and
//! run through extraction and classification again. The page is stable when
//! both classifications have the same block signatures.

mod parse;
mod typeset;
mod verify;

use serde::Serialize;

use crate::error::Result;
use crate::model::{BlockSignature, PageClassification};

pub use parse::{parse_blocks, CellText, MarkdownBlock};
pub use typeset::{typeset, wrap};
pub use verify::RoundTripVerifier;

/// First block where the re-classified page differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    /// Block index
    pub index: usize,
    /// Signature on the original page, if it has that many blocks
    pub expected: Option<BlockSignature>,
    /// Signature after the round trip, if it has that many blocks
    pub actual: Option<BlockSignature>,
}

/// Outcome of a round trip for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTripReport {
    /// Page number
    pub page: u32,
    /// Blocks on the original page
    pub original: usize,
    /// Blocks after the round trip
    pub reparsed: usize,
    /// First differing block
    pub first_mismatch: Option<Mismatch>,
    /// Markdown emitted for the page
    pub markdown: String,
}

impl RoundTripReport {
    /// Check if the round trip reproduced every block.
    pub fn is_stable(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Verify one page with default options.
pub fn verify_page(page: &PageClassification) -> Result<RoundTripReport> {
    RoundTripVerifier::new().verify_page(page)
}
