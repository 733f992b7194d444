//! Emit, re-parse, re-typeset and re-classify pages.

use rayon::prelude::*;

use super::parse::parse_blocks;
use super::typeset::typeset;
use super::{Mismatch, RoundTripReport};
use crate::classify::{ClassifyOptions, FontStatistics, StructureClassifier};
use crate::error::Result;
use crate::layout::LayoutExtractor;
use crate::model::PageClassification;
use crate::render::{MarkdownEmitter, RenderOptions};

/// Checks that emitted Markdown classifies back to the same blocks.
#[derive(Debug, Clone)]
pub struct RoundTripVerifier {
    extractor: LayoutExtractor,
    classifier: StructureClassifier,
    emitter: MarkdownEmitter,
    stats: FontStatistics,
}

impl RoundTripVerifier {
    /// Create a verifier with default classification options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify re-typeset pages with these options.
    pub fn with_classify_options(mut self, options: ClassifyOptions) -> Self {
        self.classifier = StructureClassifier::with_options(options);
        self
    }

    /// Verify one classified page.
    pub fn verify_page(&self, page: &PageClassification) -> Result<RoundTripReport> {
        let emitted = self.emitter.emit_page(page)?;
        let blocks = parse_blocks(&emitted.markdown);
        let source = typeset(page.page, &blocks);

        let reparsed = if source.objects.is_empty() {
            PageClassification {
                page: page.page,
                ..Default::default()
            }
        } else {
            let positioned = self.extractor.extract_all(&source)?;
            self.classifier.classify(page.page, &positioned, &self.stats)
        };

        let expected = page.signatures();
        let actual = reparsed.signatures();
        let first_mismatch = (0..expected.len().max(actual.len()))
            .find(|&i| expected.get(i) != actual.get(i))
            .map(|index| Mismatch {
                index,
                expected: expected.get(index).cloned(),
                actual: actual.get(index).cloned(),
            });

        if let Some(ref mismatch) = first_mismatch {
            log::debug!(
                "RoundTripVerifier: page {} differs at block {}",
                page.page,
                mismatch.index
            );
        }

        Ok(RoundTripReport {
            page: page.page,
            original: expected.len(),
            reparsed: actual.len(),
            first_mismatch,
            markdown: emitted.markdown,
        })
    }

    /// Verify pages in parallel, in page order.
    pub fn verify_document(&self, pages: &[PageClassification]) -> Result<Vec<RoundTripReport>> {
        pages
            .par_iter()
            .map(|page| self.verify_page(page))
            .collect()
    }
}

impl Default for RoundTripVerifier {
    fn default() -> Self {
        Self {
            extractor: LayoutExtractor::new(),
            classifier: StructureClassifier::new(),
            emitter: MarkdownEmitter::new(RenderOptions::roundtrip()),
            stats: FontStatistics::canonical(),
        }
    }
}
