//! Structure classification of positioned blocks.
//!
//! Rules apply in priority order: size-based heading, list item, table
//! cell, image, paragraph. A block that no rule claims is a paragraph.
//! Continuation lines of one paragraph, heading or list item are merged
//! into a single classified block before roles are assigned.

use super::font_stats::FontStatistics;
use super::markers::{parse_marker, MarkerKind};
use super::table_detector::TableDetector;
use super::ClassifyOptions;
use crate::layout::join_words;
use crate::model::{
    AmbiguityKind, BlockKind, ClassificationAmbiguity, ClassifiedBlock, ListKind,
    PageClassification, PositionedBlock, Role, TableShape,
};

/// What a single block could be before continuation lines are merged.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    Image,
    Heading { level: u8, marker: bool },
    /// Short bold line at body size
    Emphasis,
    Item { oversized: bool },
    Cell { table: usize, row: usize, column: usize },
    Text { lone_marker: bool, oversized: bool },
}

/// Consecutive blocks that form one classified block.
#[derive(Debug, Clone)]
struct Unit {
    members: Vec<usize>,
    candidate: Candidate,
}

/// Assigns roles to positioned blocks.
#[derive(Debug, Clone, Default)]
pub struct StructureClassifier {
    options: ClassifyOptions,
    tables: TableDetector,
}

impl StructureClassifier {
    /// Create a classifier with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom options.
    pub fn with_options(options: ClassifyOptions) -> Self {
        let tables = TableDetector::with_config(options.table.clone());
        Self { options, tables }
    }

    /// Get the classification options.
    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    /// Classify one page's blocks, preserving their order.
    pub fn classify(
        &self,
        page: u32,
        blocks: &[PositionedBlock],
        stats: &FontStatistics,
    ) -> PageClassification {
        let mut candidates: Vec<Candidate> =
            blocks.iter().map(|b| self.candidate(b, stats)).collect();

        let mut tables = Vec::new();
        if self.options.detect_tables {
            let eligible: Vec<bool> = candidates
                .iter()
                .map(|c| matches!(c, Candidate::Text { .. }))
                .collect();
            for (table, detected) in self.tables.detect(blocks, &eligible).into_iter().enumerate() {
                for (row, cells) in detected.rows.iter().enumerate() {
                    for &(i, column) in cells {
                        candidates[i] = Candidate::Cell { table, row, column };
                    }
                }
                tables.push(TableShape {
                    rows: detected.row_count(),
                    columns: detected.column_count(),
                });
            }
        }

        if self.options.bold_headings {
            self.mark_emphasis(blocks, &mut candidates, stats);
        }

        let units = self.group_units(blocks, &candidates);
        let levels = self.list_levels(blocks, &units);

        let mut diagnostics = Vec::new();
        let classified = self.assign_roles(page, blocks, &units, &levels, stats, &mut diagnostics);

        for d in &diagnostics {
            log::warn!(
                "Page {}: ambiguous block {} ({:?}), classified as {}",
                d.page,
                d.block,
                d.kind,
                d.resolution
            );
        }
        log::debug!(
            "StructureClassifier: page {}: {} blocks -> {} classified, {} tables",
            page,
            blocks.len(),
            classified.len(),
            tables.len()
        );

        PageClassification {
            page,
            blocks: classified,
            tables,
            diagnostics,
        }
    }

    fn candidate(&self, block: &PositionedBlock, stats: &FontStatistics) -> Candidate {
        let (Some(text), Some(font)) = (block.text(), block.font()) else {
            return Candidate::Image;
        };

        let marker = parse_marker(text);
        let item_marker = marker.is_some_and(|m| !m.is_bare());
        let lone_marker = marker.is_some_and(|m| m.is_bare());

        let mut oversized = false;
        if let Some(level) = stats.heading_level(font.size) {
            if block.char_count() <= self.options.max_heading_chars {
                return Candidate::Heading {
                    level: level.clamp(1, self.options.max_heading_level.max(1)),
                    marker: item_marker,
                };
            }
            oversized = true;
        }

        if item_marker {
            Candidate::Item { oversized }
        } else {
            Candidate::Text {
                lone_marker,
                oversized,
            }
        }
    }

    /// Mark short bold lines standing alone on their band as headings.
    fn mark_emphasis(
        &self,
        blocks: &[PositionedBlock],
        candidates: &mut [Candidate],
        stats: &FontStatistics,
    ) {
        for (i, block) in blocks.iter().enumerate() {
            if candidates[i]
                != (Candidate::Text {
                    lone_marker: false,
                    oversized: false,
                })
            {
                continue;
            }
            let (Some(text), Some(font)) = (block.text(), block.font()) else {
                continue;
            };

            let alone = (i == 0 || blocks[i - 1].line != block.line)
                && blocks.get(i + 1).map_or(true, |next| next.line != block.line);
            let short = block.char_count() <= self.options.bold_heading_max_chars;
            let sentence = text.ends_with(['.', ',', ';']);
            let wordy = text.chars().any(char::is_alphabetic);

            if font.bold && !stats.is_heading_size(font.size) && alone && short && !sentence && wordy
            {
                candidates[i] = Candidate::Emphasis;
            }
        }
    }

    fn group_units(&self, blocks: &[PositionedBlock], candidates: &[Candidate]) -> Vec<Unit> {
        let mut units: Vec<Unit> = Vec::new();

        for (i, &candidate) in candidates.iter().enumerate() {
            if self.options.merge_lines {
                if let Some(unit) = units.last_mut() {
                    if self.continues(blocks, unit, i, candidate) {
                        unit.members.push(i);
                        continue;
                    }
                }
            }
            units.push(Unit {
                members: vec![i],
                candidate,
            });
        }

        units
    }

    /// Check if block `i` is a continuation line of `unit`.
    fn continues(&self, blocks: &[PositionedBlock], unit: &Unit, i: usize, next: Candidate) -> bool {
        let Some(&last) = unit.members.last() else {
            return false;
        };
        if last + 1 != i {
            return false;
        }

        let prev = &blocks[last];
        let cur = &blocks[i];
        if prev.line == cur.line {
            return false;
        }
        let (Some(pf), Some(cf)) = (prev.font(), cur.font()) else {
            return false;
        };
        if (pf.size - cf.size).abs() > 0.1 || pf.bold != cf.bold {
            return false;
        }

        let gap = prev.bbox.vgap(&cur.bbox);
        if gap > self.options.line_gap_ratio * cf.size || gap < -0.5 * cf.size {
            return false;
        }
        let aligned = (prev.bbox.x - cur.bbox.x).abs() <= self.options.continuation_indent;

        match (unit.candidate, next) {
            (Candidate::Heading { level: a, .. }, Candidate::Heading { level: b, marker }) => {
                a == b && !marker && aligned
            }
            (Candidate::Emphasis, Candidate::Emphasis) => aligned,
            (
                Candidate::Text {
                    lone_marker: false,
                    ..
                },
                Candidate::Text {
                    lone_marker: false,
                    ..
                },
            ) => aligned,
            // Wrapped item text sits right of the marker
            (
                Candidate::Item { .. },
                Candidate::Text {
                    lone_marker: false,
                    ..
                },
            ) => {
                let indent = cur.bbox.x - blocks[unit.members[0]].bbox.x;
                indent > 0.5 && indent <= (4.0 * cf.size).max(self.options.continuation_indent)
            }
            _ => false,
        }
    }

    /// Nesting level of each list unit from its indentation.
    fn list_levels(&self, blocks: &[PositionedBlock], units: &[Unit]) -> Vec<u8> {
        let tolerance = self.options.list_indent_tolerance;
        let mut levels = vec![0u8; units.len()];
        let mut stack: Vec<f32> = Vec::new();

        for (u, unit) in units.iter().enumerate() {
            if !matches!(unit.candidate, Candidate::Item { .. }) {
                stack.clear();
                continue;
            }
            let x = blocks[unit.members[0]].bbox.x;
            while stack.last().is_some_and(|&top| x < top - tolerance) {
                stack.pop();
            }
            match stack.last() {
                Some(&top) if x <= top + tolerance => {}
                _ => stack.push(x),
            }
            levels[u] = (stack.len() - 1).min(u8::MAX as usize) as u8;
        }

        levels
    }

    /// Number of the next item at the same level in the same list run.
    fn successor(
        &self,
        blocks: &[PositionedBlock],
        units: &[Unit],
        levels: &[u8],
        u: usize,
    ) -> Option<u64> {
        let level = levels[u];
        for (v, unit) in units.iter().enumerate().skip(u + 1) {
            if !matches!(unit.candidate, Candidate::Item { .. }) || levels[v] < level {
                return None;
            }
            if levels[v] > level {
                continue;
            }
            let text = blocks[unit.members[0]].text()?;
            return match parse_marker(text)?.kind {
                MarkerKind::Numeral { number, .. } => Some(number),
                MarkerKind::Bullet(_) => None,
            };
        }
        None
    }

    fn assign_roles(
        &self,
        page: u32,
        blocks: &[PositionedBlock],
        units: &[Unit],
        levels: &[u8],
        stats: &FontStatistics,
        diagnostics: &mut Vec<ClassificationAmbiguity>,
    ) -> Vec<ClassifiedBlock> {
        let mut classified = Vec::with_capacity(units.len());
        // Last ordered number per nesting level of the current list run
        let mut last_ordered: Vec<Option<u64>> = Vec::new();

        for (u, unit) in units.iter().enumerate() {
            let source = merged_source(blocks, unit);
            let text = source.text().unwrap_or_default().to_string();
            let mut ambiguity = None;

            if !matches!(unit.candidate, Candidate::Item { .. }) {
                last_ordered.clear();
            }

            let (role, content) = match unit.candidate {
                Candidate::Image => {
                    let alt = source.image().map(|i| i.alt.clone()).unwrap_or_default();
                    (Role::Image, alt)
                }
                Candidate::Heading { level, marker } => {
                    if marker {
                        ambiguity = Some(AmbiguityKind::CompetingRoles);
                    }
                    (Role::Heading { level }, text)
                }
                Candidate::Emphasis => {
                    let level = stats
                        .emphasis_heading_level()
                        .min(self.options.max_heading_level)
                        .max(1);
                    (Role::Heading { level }, text)
                }
                Candidate::Cell { table, row, column } => {
                    (Role::TableCell { table, row, column }, text)
                }
                Candidate::Text {
                    lone_marker,
                    oversized,
                } => {
                    if oversized {
                        ambiguity = Some(AmbiguityKind::OversizedHeading);
                    } else if lone_marker {
                        ambiguity = Some(AmbiguityKind::LoneMarker);
                    }
                    (Role::Paragraph, text)
                }
                Candidate::Item { oversized } => {
                    if oversized {
                        ambiguity = Some(AmbiguityKind::OversizedHeading);
                    }
                    let level = levels[u];
                    let depth = level as usize;
                    last_ordered.truncate(depth + 1);
                    last_ordered.resize(depth + 1, None);

                    let first_text = blocks[unit.members[0]].text().unwrap_or_default();
                    let (kind, head) = match parse_marker(first_text) {
                        Some(marker) => match marker.kind {
                            MarkerKind::Numeral { number, .. } => {
                                let continues =
                                    number > 0 && last_ordered[depth] == Some(number - 1);
                                let ordered = number == 1
                                    || continues
                                    || self.successor(blocks, units, levels, u)
                                        == Some(number + 1);
                                if ordered {
                                    last_ordered[depth] = Some(number);
                                    (ListKind::Ordered { number }, marker.content)
                                } else {
                                    last_ordered[depth] = None;
                                    (ListKind::Unordered, first_text)
                                }
                            }
                            MarkerKind::Bullet(_) => {
                                last_ordered[depth] = None;
                                (ListKind::Unordered, marker.content)
                            }
                        },
                        None => (ListKind::Unordered, first_text),
                    };

                    let content = unit.members[1..]
                        .iter()
                        .filter_map(|&i| blocks[i].text())
                        .fold(head.to_string(), |acc, line| join_words(&acc, line));
                    (Role::ListItem { kind, level }, content)
                }
            };

            if let Some(kind) = ambiguity {
                diagnostics.push(ClassificationAmbiguity {
                    page,
                    block: source.index,
                    kind,
                    resolution: role,
                });
            }
            classified.push(ClassifiedBlock::new(source, role, content));
        }

        classified
    }
}

/// The unit's blocks as one positioned block: union box, joined text, and a
/// link only when every line shares it.
fn merged_source(blocks: &[PositionedBlock], unit: &Unit) -> PositionedBlock {
    let mut source = blocks[unit.members[0]].clone();
    if unit.members.len() == 1 {
        return source;
    }

    let mut text = source.text().unwrap_or_default().to_string();
    for &i in &unit.members[1..] {
        let line = &blocks[i];
        source.bbox = source.bbox.union(&line.bbox);
        text = join_words(&text, line.text().unwrap_or_default());
        if source.link != line.link {
            source.link = None;
        }
    }
    if let BlockKind::TextRun { text: merged, .. } = &mut source.kind {
        *merged = text;
    }
    source
}
