//! Document conversion pipeline.
//!
//! Pages are extracted independently, font statistics are gathered once for
//! the whole document, then pages are classified and emitted independently
//! and joined in page order.
//!
//! # Example
//!
//! ```no_run
//! use pagemark::convert::{ConvertOptions, Converter};
//! use pagemark::SourceDocument;
//!
//! fn main() -> pagemark::Result<()> {
//!     let json = std::fs::read_to_string("document.json")?;
//!     let document = SourceDocument::from_json(&json)?;
//!
//!     let result = Converter::new(ConvertOptions::default()).convert(&document)?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifyOptions, FontStatistics, StructureClassifier};
use crate::error::Result;
use crate::layout::{ExtractOptions, LayoutExtractor};
use crate::model::{Metadata, PageClassification, PositionedBlock, SourceDocument, SourcePage};
use crate::render::{EmissionStats, MarkdownEmitter, PageMarkdown, PageSelection, RenderOptions};

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Layout extraction options
    pub extract: ExtractOptions,

    /// Classification options
    pub classify: ClassifyOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Pages to convert
    pub pages: PageSelection,

    /// Process pages in parallel
    pub parallel: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Set classification options.
    pub fn with_classify_options(mut self, options: ClassifyOptions) -> Self {
        self.classify = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Process pages one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            classify: ClassifyOptions::default(),
            render: RenderOptions::default(),
            pages: PageSelection::All,
            parallel: true,
        }
    }
}

/// A page left out of the output because extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// Page number
    pub page: u32,
    /// Why the page was skipped
    pub reason: String,
}

/// What happened to the pages of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Pages in the source document
    pub total_pages: u32,
    /// Pages matching the page selection
    pub selected_pages: u32,
    /// Selected pages that failed extraction
    pub skipped: Vec<SkippedPage>,
    /// Classification ambiguities across all pages
    pub ambiguities: usize,
}

impl ConversionReport {
    /// Check if every selected page was converted.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A classified document, before emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedDocument {
    /// Source metadata
    pub metadata: Metadata,
    /// Font statistics shared by all pages
    pub font_stats: FontStatistics,
    /// Classified pages in page order
    pub pages: Vec<PageClassification>,
    /// Page outcomes
    pub report: ConversionReport,
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Markdown output
    pub content: String,

    /// Classified document the Markdown was emitted from
    pub document: ClassifiedDocument,

    /// Emission statistics
    pub stats: EmissionStats,
}

impl ConvertResult {
    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Page outcomes.
    pub fn report(&self) -> &ConversionReport {
        &self.document.report
    }
}

/// Runs the extract, classify and emit stages over a document.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    extractor: LayoutExtractor,
    classifier: StructureClassifier,
    emitter: MarkdownEmitter,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            extractor: LayoutExtractor::with_options(options.extract.clone()),
            classifier: StructureClassifier::with_options(options.classify.clone()),
            emitter: MarkdownEmitter::new(options.render.clone()),
            options,
        }
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Extract and classify the selected pages.
    ///
    /// Pages failing extraction are logged and recorded in the report; any
    /// other error aborts.
    pub fn classify(&self, document: &SourceDocument) -> Result<ClassifiedDocument> {
        let selected: Vec<&SourcePage> = document
            .pages
            .iter()
            .filter(|page| self.options.pages.includes(page.number))
            .collect();

        let extracted: Vec<Result<Vec<PositionedBlock>>> = if self.options.parallel {
            selected
                .par_iter()
                .map(|page| self.extractor.extract_all(page))
                .collect()
        } else {
            selected
                .iter()
                .map(|page| self.extractor.extract_all(page))
                .collect()
        };

        let mut report = ConversionReport {
            total_pages: document.page_count(),
            selected_pages: selected.len() as u32,
            ..Default::default()
        };
        let mut pages: Vec<(u32, Vec<PositionedBlock>)> = Vec::with_capacity(selected.len());
        for (page, result) in selected.iter().zip(extracted) {
            match result {
                Ok(blocks) => pages.push((page.number, blocks)),
                Err(e) if e.is_page_local() => {
                    log::warn!("Skipping page {}: {}", page.number, e);
                    report.skipped.push(SkippedPage {
                        page: page.number,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let mut font_stats = FontStatistics::new(self.options.classify.heading_min_delta);
        for block in pages.iter().flat_map(|(_, blocks)| blocks) {
            font_stats.add_block(block);
        }
        font_stats.analyze();

        let classified: Vec<PageClassification> = if self.options.parallel {
            pages
                .par_iter()
                .map(|(number, blocks)| self.classifier.classify(*number, blocks, &font_stats))
                .collect()
        } else {
            pages
                .iter()
                .map(|(number, blocks)| self.classifier.classify(*number, blocks, &font_stats))
                .collect()
        };
        report.ambiguities = classified.iter().map(|p| p.diagnostics.len()).sum();

        log::debug!(
            "Converter: {} of {} pages classified, {} skipped",
            classified.len(),
            report.total_pages,
            report.skipped.len()
        );

        Ok(ClassifiedDocument {
            metadata: document.metadata.clone(),
            font_stats,
            pages: classified,
            report,
        })
    }

    /// Emit a classified document. An emission error on any page aborts.
    pub fn emit(&self, document: ClassifiedDocument) -> Result<ConvertResult> {
        let parts: Vec<PageMarkdown> = if self.options.parallel {
            document
                .pages
                .par_iter()
                .map(|page| self.emitter.emit_page(page))
                .collect::<Result<Vec<_>>>()?
        } else {
            document
                .pages
                .iter()
                .map(|page| self.emitter.emit_page(page))
                .collect::<Result<Vec<_>>>()?
        };

        let rendered =
            self.emitter
                .join_pages(&parts, &document.metadata, document.report.total_pages);
        let mut stats = rendered.stats;
        for _ in &document.report.skipped {
            stats.add_skipped_page();
        }

        Ok(ConvertResult {
            content: rendered.content,
            document,
            stats,
        })
    }

    /// Convert a document to Markdown.
    pub fn convert(&self, document: &SourceDocument) -> Result<ConvertResult> {
        let classified = self.classify(document)?;
        self.emit(classified)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{BoundingBox, RawTextRun, Role};

    fn run(text: &str, x: f32, y: f32, size: f32) -> RawTextRun {
        let width = text.chars().count() as f32 * size * 0.5;
        RawTextRun::new(text, BoundingBox::new(x, y, width, size), size, "Helvetica")
    }

    fn document() -> SourceDocument {
        SourceDocument::new(vec![
            SourcePage::new(1, 612.0, 792.0)
                .with_object(run("Report", 72.0, 40.0, 24.0))
                .with_object(run(
                    "The body text of the first page is the most common size.",
                    72.0,
                    100.0,
                    12.0,
                )),
            SourcePage::new(2, 612.0, 792.0),
            SourcePage::new(3, 612.0, 792.0).with_object(run(
                "Third page body text, also at the body size of twelve points.",
                72.0,
                72.0,
                12.0,
            )),
        ])
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_pages(PageSelection::Range(1..=2))
            .sequential();

        assert!(!options.parallel);
        assert_eq!(options.pages, PageSelection::Range(1..=2));
    }

    #[test]
    fn test_empty_page_is_skipped() {
        let result = Converter::default().convert(&document()).unwrap();

        assert_eq!(result.report().skipped.len(), 1);
        assert_eq!(result.report().skipped[0].page, 2);
        assert_eq!(result.stats.skipped_pages, 1);
        assert_eq!(result.stats.page_count, 2);
        assert_eq!(result.document.pages.len(), 2);
        assert!(result.content.starts_with("# Report\n\n"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = Converter::default().convert(&document()).unwrap();
        let sequential = Converter::new(ConvertOptions::new().sequential())
            .convert(&document())
            .unwrap();
        assert_eq!(parallel.content, sequential.content);
    }

    #[test]
    fn test_font_statistics_span_pages() {
        let classified = Converter::default().classify(&document()).unwrap();
        assert_eq!(classified.font_stats.body_size, 12.0);
        assert_eq!(classified.pages[0].blocks[0].role, Role::Heading { level: 1 });
    }

    #[test]
    fn test_page_selection() {
        let options = ConvertOptions::new().with_pages(PageSelection::Pages(vec![3]));
        let result = Converter::new(options).convert(&document()).unwrap();

        assert_eq!(result.report().selected_pages, 1);
        assert!(result.report().is_complete());
        assert!(result.content.starts_with("Third page"));
    }

    #[test]
    fn test_emission_error_aborts() {
        let mut classified = Converter::default().classify(&document()).unwrap();
        classified.pages[1].blocks[0].role = Role::Heading { level: 9 };

        let err = Converter::default().emit(classified).unwrap_err();
        assert!(matches!(err, Error::Emission { page: 3, .. }));
    }
}
