//! Layout extraction: raw page objects to positioned blocks in reading order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::normalize::{needs_space, TextNormalizer};
use super::ExtractOptions;
use crate::classify::markers::is_bare_marker;
use crate::error::{Error, Result};
use crate::model::{
    BlockKind, BoundingBox, FontInfo, ImageReference, PositionedBlock, RawLink, RawObject,
    SourcePage,
};

/// Turns a page's raw objects into positioned blocks.
#[derive(Debug, Clone, Default)]
pub struct LayoutExtractor {
    options: ExtractOptions,
    normalizer: TextNormalizer,
}

impl LayoutExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with custom options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self {
            options,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Get the extraction options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the page's blocks.
    ///
    /// Objects are validated, normalized and grouped into line bands here;
    /// runs are merged lazily as the returned sequence is iterated.
    pub fn extract(&self, page: &SourcePage) -> Result<PageBlocks> {
        let mut items = Vec::with_capacity(page.objects.len());
        let mut links = Vec::new();

        for object in &page.objects {
            if !object.bbox().is_valid() {
                log::warn!(
                    "Page {}: dropping {} object with invalid geometry {:?}",
                    page.number,
                    object_kind(object),
                    object.bbox()
                );
                continue;
            }

            match object {
                RawObject::Text(run) => {
                    if !run.font_size.is_finite() || run.font_size <= 0.0 {
                        log::warn!(
                            "Page {}: dropping text run with invalid font size {}",
                            page.number,
                            run.font_size
                        );
                        continue;
                    }
                    let text = self.normalizer.normalize(&run.text);
                    if text.trim().is_empty() {
                        continue;
                    }
                    items.push(Item::Text(TextItem {
                        text,
                        bbox: run.bbox,
                        font: FontInfo::with_flags(
                            run.font_name.clone(),
                            run.font_size,
                            run.bold,
                            run.italic,
                        ),
                    }));
                }
                RawObject::Image(image) => {
                    items.push(Item::Image {
                        bbox: image.bbox,
                        image: ImageReference::new(
                            image.path.clone(),
                            image.alt.clone(),
                            image.title.clone(),
                        ),
                    });
                }
                RawObject::Link(link) => links.push(link.clone()),
            }
        }

        if items.is_empty() {
            return Err(Error::extraction(page.number, "no extractable objects"));
        }

        let placed = self.group_into_bands(items);
        let bands = placed.last().map(|p| p.band + 1).unwrap_or(0);
        log::debug!(
            "LayoutExtractor: page {} has {} objects in {} bands, {} link areas",
            page.number,
            placed.len(),
            bands,
            links.len()
        );

        Ok(PageBlocks {
            page: page.number,
            items: placed.into(),
            links: links.into(),
            options: self.options.clone(),
            cursor: 0,
            emitted: 0,
        })
    }

    /// Extract the page's blocks into a vector.
    pub fn extract_all(&self, page: &SourcePage) -> Result<Vec<PositionedBlock>> {
        Ok(self.extract(page)?.collect())
    }

    /// Group items into line bands by bottom edge, top to bottom, each band
    /// ordered left to right.
    fn group_into_bands(&self, mut items: Vec<Item>) -> Vec<Placed> {
        items.sort_by(|a, b| {
            a.bbox()
                .bottom()
                .partial_cmp(&b.bbox().bottom())
                .unwrap_or(Ordering::Equal)
        });

        let mut bands: Vec<Vec<Item>> = Vec::new();
        let mut current: Vec<Item> = Vec::new();
        let mut band_bottom = 0.0f32;
        let mut band_size = 0.0f32;

        for item in items {
            let size = item.font_size().unwrap_or(self.options.default_font_size);
            if !current.is_empty() {
                let tolerance = size.max(band_size) * self.options.band_tolerance_ratio;
                if (item.bbox().bottom() - band_bottom).abs() <= tolerance {
                    current.push(item);
                    continue;
                }
                bands.push(std::mem::take(&mut current));
            }
            band_bottom = item.bbox().bottom();
            band_size = size;
            current.push(item);
        }
        if !current.is_empty() {
            bands.push(current);
        }

        let mut placed = Vec::new();
        for (band, mut members) in bands.into_iter().enumerate() {
            members.sort_by(|a, b| a.bbox().x.partial_cmp(&b.bbox().x).unwrap_or(Ordering::Equal));
            placed.extend(members.into_iter().map(|item| Placed { band, item }));
        }
        placed
    }
}

fn object_kind(object: &RawObject) -> &'static str {
    match object {
        RawObject::Text(_) => "text",
        RawObject::Image(_) => "image",
        RawObject::Link(_) => "link",
    }
}

#[derive(Debug, Clone)]
struct TextItem {
    text: String,
    bbox: BoundingBox,
    font: FontInfo,
}

impl TextItem {
    /// Average character width, falling back to half the font size.
    fn avg_char_width(&self) -> f32 {
        let chars = self.text.trim().chars().count();
        if chars > 0 && self.bbox.width > 0.0 {
            self.bbox.width / chars as f32
        } else {
            self.font.size * 0.5
        }
    }
}

#[derive(Debug, Clone)]
enum Item {
    Text(TextItem),
    Image {
        bbox: BoundingBox,
        image: ImageReference,
    },
}

impl Item {
    fn bbox(&self) -> &BoundingBox {
        match self {
            Item::Text(t) => &t.bbox,
            Item::Image { bbox, .. } => bbox,
        }
    }

    fn font_size(&self) -> Option<f32> {
        match self {
            Item::Text(t) => Some(t.font.size),
            Item::Image { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Placed {
    band: usize,
    item: Item,
}

/// Positioned blocks of one page in reading order.
///
/// The sequence is finite and lazy: adjacent runs are merged as it is
/// advanced. It can be restarted or cloned to iterate again.
#[derive(Debug, Clone)]
pub struct PageBlocks {
    page: u32,
    items: Arc<[Placed]>,
    links: Arc<[RawLink]>,
    options: ExtractOptions,
    cursor: usize,
    emitted: usize,
}

impl PageBlocks {
    /// Page number the blocks come from.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of objects before merging.
    pub fn object_count(&self) -> usize {
        self.items.len()
    }

    /// Rewind to the first block.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.emitted = 0;
    }

    /// Check if the accumulated text can absorb `run`, and how.
    fn join_mode(&self, text: &str, font: &FontInfo, last: &BoundingBox, run: &TextItem) -> Join {
        let gap = last.hgap(&run.bbox);
        let size = font.size.max(run.font.size);
        if gap < -size {
            return Join::No;
        }

        if is_bare_marker(text) && gap <= self.options.marker_gap_ratio * size {
            return Join::Marker;
        }

        let same_baseline = (last.bottom() - run.bbox.bottom()).abs() <= 0.15 * size;
        if font.matches(&run.font)
            && same_baseline
            && gap <= self.options.merge_gap_ratio * font.size
        {
            let word_gap = gap > run.avg_char_width() * self.options.word_space_ratio;
            return Join::Run { space: word_gap };
        }

        Join::No
    }

    fn link_for(&self, bbox: &BoundingBox) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.bbox.covers(bbox, self.options.link_tolerance))
            .map(|l| l.url.clone())
    }
}

/// Check if `run` redraws `previous` at a small offset (simulated bold).
fn is_overprint(previous: &TextItem, run: &TextItem) -> bool {
    let size = previous.font.size.max(run.font.size);
    previous.text.trim() == run.text.trim()
        && previous.font.matches(&run.font)
        && (previous.bbox.x - run.bbox.x).abs() <= 0.25 * size
        && (previous.bbox.bottom() - run.bbox.bottom()).abs() <= 0.15 * size
}

enum Join {
    No,
    Marker,
    Run { space: bool },
}

impl Iterator for PageBlocks {
    type Item = PositionedBlock;

    fn next(&mut self) -> Option<PositionedBlock> {
        let items = Arc::clone(&self.items);
        let placed = items.get(self.cursor)?;
        self.cursor += 1;

        let (bbox, kind, link) = match &placed.item {
            Item::Image { bbox, image } => {
                (*bbox, BlockKind::Image(image.clone()), self.link_for(bbox))
            }
            Item::Text(first) => {
                let mut text = first.text.clone();
                let mut font = first.font.clone();
                let mut bbox = first.bbox;
                let mut last = first.bbox;
                let mut previous = first;

                while let Some(next) = items.get(self.cursor) {
                    if next.band != placed.band {
                        break;
                    }
                    let Item::Text(run) = &next.item else {
                        break;
                    };
                    if is_overprint(previous, run) {
                        bbox = bbox.union(&run.bbox);
                        last = last.union(&run.bbox);
                        self.cursor += 1;
                        continue;
                    }
                    match self.join_mode(text.trim(), &font, &last, run) {
                        Join::No => break,
                        Join::Marker => {
                            text = format!("{} {}", text.trim(), run.text.trim_start());
                            font = run.font.clone();
                        }
                        Join::Run { space } => {
                            if space && needs_space(&text, &run.text) {
                                text.push(' ');
                            }
                            text.push_str(&run.text);
                        }
                    }
                    bbox = bbox.union(&run.bbox);
                    last = run.bbox;
                    previous = run;
                    self.cursor += 1;
                }

                let text = text.trim().to_string();
                let link = self.link_for(&bbox);
                (bbox, BlockKind::TextRun { text, font }, link)
            }
        };

        let block = PositionedBlock {
            page: self.page,
            index: self.emitted,
            line: placed.band,
            bbox,
            kind,
            link,
        };
        self.emitted += 1;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.cursor);
        (remaining.min(1), Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawImage, RawTextRun};

    fn run(text: &str, x: f32, y: f32, width: f32, size: f32) -> RawTextRun {
        RawTextRun::new(text, BoundingBox::new(x, y, width, size), size, "Helvetica")
    }

    fn texts(page: &SourcePage) -> Vec<String> {
        LayoutExtractor::new()
            .extract_all(page)
            .unwrap()
            .iter()
            .map(|b| b.text().unwrap_or("<image>").to_string())
            .collect()
    }

    // ===== Reading order =====

    #[test]
    fn test_reading_order_top_to_bottom_left_to_right() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("second", 72.0, 100.0, 40.0, 12.0))
            .with_object(run("right", 300.0, 60.0, 30.0, 12.0))
            .with_object(run("left", 72.0, 61.0, 24.0, 12.0));

        assert_eq!(texts(&page), vec!["left", "right", "second"]);
    }

    #[test]
    fn test_band_indices() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("a", 72.0, 60.0, 6.0, 12.0))
            .with_object(run("b", 300.0, 60.0, 6.0, 12.0))
            .with_object(run("c", 72.0, 90.0, 6.0, 12.0));

        let blocks = LayoutExtractor::new().extract_all(&page).unwrap();
        let lines: Vec<usize> = blocks.iter().map(|b| b.line).collect();
        assert_eq!(lines, vec![0, 0, 1]);
        let indices: Vec<usize> = blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    // ===== Merging =====

    #[test]
    fn test_same_font_runs_merge_with_space() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Hello", 72.0, 60.0, 30.0, 12.0))
            .with_object(run("world", 106.0, 60.0, 30.0, 12.0));

        assert_eq!(texts(&page), vec!["Hello world"]);
    }

    #[test]
    fn test_abutting_runs_merge_without_space() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Hel", 72.0, 60.0, 18.0, 12.0))
            .with_object(run("lo", 90.0, 60.0, 12.0, 12.0));

        assert_eq!(texts(&page), vec!["Hello"]);
    }

    #[test]
    fn test_overprinted_run_is_drawn_once() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Hello", 72.0, 60.0, 30.0, 12.0))
            .with_object(run("Hello", 72.5, 60.0, 30.0, 12.0))
            .with_object(run("world", 106.5, 60.0, 30.0, 12.0));

        let blocks = LayoutExtractor::new().extract_all(&page).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), Some("Hello world"));
        assert_eq!(blocks[0].bbox.right(), 136.5);
    }

    #[test]
    fn test_repeated_word_is_kept() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("ha", 72.0, 60.0, 12.0, 12.0))
            .with_object(run("ha", 84.0, 60.0, 12.0, 12.0));

        assert_eq!(texts(&page), vec!["haha"]);
    }

    #[test]
    fn test_cjk_runs_merge_without_space() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("中文", 72.0, 60.0, 24.0, 12.0))
            .with_object(run("文本", 100.0, 60.0, 24.0, 12.0));

        assert_eq!(texts(&page), vec!["中文文本"]);
    }

    #[test]
    fn test_different_fonts_do_not_merge() {
        let bold = RawTextRun::new(
            "Bold",
            BoundingBox::new(110.0, 60.0, 24.0, 12.0),
            12.0,
            "Helvetica-Bold",
        );
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Plain", 72.0, 60.0, 30.0, 12.0))
            .with_object(bold);

        assert_eq!(texts(&page), vec!["Plain", "Bold"]);
    }

    #[test]
    fn test_wide_gap_does_not_merge() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Name", 72.0, 60.0, 24.0, 12.0))
            .with_object(run("Age", 200.0, 60.0, 18.0, 12.0));

        assert_eq!(texts(&page), vec!["Name", "Age"]);
    }

    #[test]
    fn test_bare_marker_attaches_to_text() {
        let bullet = RawTextRun::new(
            "•",
            BoundingBox::new(72.0, 60.0, 5.0, 12.0),
            12.0,
            "Symbol",
        );
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(bullet)
            .with_object(run("First item", 90.0, 60.0, 60.0, 12.0))
            .with_object(run("1.", 72.0, 90.0, 10.0, 12.0))
            .with_object(run("Numbered", 92.0, 90.0, 50.0, 12.0));

        let blocks = LayoutExtractor::new().extract_all(&page).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), Some("• First item"));
        assert_eq!(blocks[0].font().map(|f| f.name.as_str()), Some("Helvetica"));
        assert_eq!(blocks[1].text(), Some("1. Numbered"));
    }

    // ===== Links and images =====

    #[test]
    fn test_link_assigned_when_covering() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("Docs", 72.0, 60.0, 24.0, 12.0))
            .with_object(run("elsewhere", 72.0, 90.0, 54.0, 12.0))
            .with_object(RawLink::new(
                BoundingBox::new(71.0, 59.0, 27.0, 14.0),
                "https://example.com/docs",
            ));

        let blocks = LayoutExtractor::new().extract_all(&page).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].link.as_deref(), Some("https://example.com/docs"));
        assert!(blocks[1].link.is_none());
    }

    #[test]
    fn test_image_block() {
        let page = SourcePage::new(1, 612.0, 792.0).with_object(
            RawImage::new(BoundingBox::new(72.0, 100.0, 200.0, 100.0), "img/chart.png")
                .with_title("Chart"),
        );

        let blocks = LayoutExtractor::new().extract_all(&page).unwrap();
        let image = blocks[0].image().unwrap();
        assert_eq!(image.alt, "chart");
        assert_eq!(image.title.as_deref(), Some("Chart"));
    }

    // ===== Errors and edge cases =====

    #[test]
    fn test_empty_page_is_extraction_error() {
        let page = SourcePage::new(5, 612.0, 792.0);
        let err = LayoutExtractor::new().extract(&page).unwrap_err();
        assert!(matches!(err, Error::Extraction { page: 5, .. }));
    }

    #[test]
    fn test_links_only_page_is_extraction_error() {
        let page = SourcePage::new(2, 612.0, 792.0).with_object(RawLink::new(
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            "https://example.com",
        ));
        assert!(LayoutExtractor::new().extract(&page).is_err());
    }

    #[test]
    fn test_invalid_geometry_dropped() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("bad", f32::NAN, 60.0, 10.0, 12.0))
            .with_object(run("negative", 72.0, 60.0, -5.0, 12.0))
            .with_object(run("good", 72.0, 90.0, 24.0, 12.0));

        assert_eq!(texts(&page), vec!["good"]);
    }

    #[test]
    fn test_whitespace_only_runs_dropped() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("  ", 72.0, 60.0, 10.0, 12.0))
            .with_object(run("\u{00AD}", 72.0, 70.0, 10.0, 12.0));

        assert!(LayoutExtractor::new().extract(&page).is_err());
    }

    #[test]
    fn test_restart_and_clone() {
        let page = SourcePage::new(1, 612.0, 792.0)
            .with_object(run("one", 72.0, 60.0, 18.0, 12.0))
            .with_object(run("two", 72.0, 90.0, 18.0, 12.0));

        let mut blocks = LayoutExtractor::new().extract(&page).unwrap();
        let first = blocks.next().unwrap();
        let copy = blocks.clone();
        assert_eq!(copy.count(), 1);

        blocks.restart();
        let again = blocks.next().unwrap();
        assert_eq!(first, again);
        assert_eq!(blocks.count(), 1);
    }
}
