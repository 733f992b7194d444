//! Typesetting of Markdown blocks onto a synthetic page.
//!
//! Blocks are laid out top to bottom with one canonical font profile: 12pt
//! body text, one size per heading level, fixed list indentation and table
//! columns separated by a wide gutter. The layout is chosen so that layout
//! extraction and classification recover each block as it was written.

use super::parse::{CellText, MarkdownBlock};
use crate::classify::{canonical_heading_size, parse_marker, CANONICAL_BODY_SIZE};
use crate::layout::needs_space;
use crate::model::{BoundingBox, RawImage, RawLink, RawTextRun, SourcePage};

const BODY_FONT: &str = "Helvetica";
const HEADING_FONT: &str = "Helvetica-Bold";
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
/// Glyph advance as a fraction of the font size
const CHAR_WIDTH: f32 = 0.5;
/// Indentation per list level
const LIST_INDENT: f32 = 24.0;
/// Indentation of wrapped list item lines past the marker column
const HANGING_INDENT: f32 = 12.0;
/// Space between table columns
const COLUMN_GAP: f32 = 48.0;
/// Characters per line before wrapping
const WRAP_CHARS: usize = 60;
const IMAGE_WIDTH: f32 = 100.0;
const IMAGE_HEIGHT: f32 = 80.0;

/// Lays out blocks on a page.
#[derive(Debug)]
struct Typesetter {
    page: SourcePage,
    y: f32,
    previous_table: bool,
}

impl Typesetter {
    fn new(number: u32) -> Self {
        Self {
            page: SourcePage::new(number, PAGE_WIDTH, PAGE_HEIGHT),
            y: MARGIN,
            previous_table: false,
        }
    }

    /// Leave space before a block whose largest font size is `size`.
    fn advance(&mut self, size: f32, table: bool) {
        if self.page.objects.is_empty() {
            return;
        }
        let gap = if table && self.previous_table {
            3.0 * CANONICAL_BODY_SIZE
        } else {
            size.max(CANONICAL_BODY_SIZE)
        };
        self.y += gap;
        self.previous_table = table;
    }

    fn line(&mut self, text: &str, x: f32, size: f32, font: &str, link: Option<&str>) {
        let width = text.chars().count() as f32 * size * CHAR_WIDTH;
        let bbox = BoundingBox::new(x, self.y, width, size);
        self.page.push(RawTextRun::new(text, bbox, size, font));
        if let Some(url) = link {
            self.page.push(RawLink::new(bbox, url));
        }
    }

    /// Wrapped lines of one block; continuation lines start at `hanging`.
    fn lines(
        &mut self,
        lines: &[String],
        x: f32,
        hanging: f32,
        size: f32,
        font: &str,
        link: Option<&str>,
    ) {
        for (i, text) in lines.iter().enumerate() {
            if i > 0 {
                self.y += size * 1.2;
            }
            let x = if i == 0 { x } else { hanging };
            self.line(text, x, size, font, link);
        }
        self.y += size;
    }

    fn block(&mut self, block: &MarkdownBlock) {
        match block {
            MarkdownBlock::Heading { level, text, link } => {
                let size = canonical_heading_size(*level);
                self.advance(size, false);
                let lines = wrap(text, WRAP_CHARS);
                self.lines(&lines, MARGIN, MARGIN, size, HEADING_FONT, link.as_deref());
            }
            MarkdownBlock::Paragraph { text, link } => {
                if text.is_empty() {
                    return;
                }
                self.advance(CANONICAL_BODY_SIZE, false);
                let lines = wrap(text, WRAP_CHARS);
                self.lines(
                    &lines,
                    MARGIN,
                    MARGIN,
                    CANONICAL_BODY_SIZE,
                    BODY_FONT,
                    link.as_deref(),
                );
            }
            MarkdownBlock::ListItem {
                number,
                level,
                text,
                link,
            } => {
                self.advance(CANONICAL_BODY_SIZE, false);
                let marker = match number {
                    Some(n) => format!("{}.", n),
                    None => "•".to_string(),
                };
                let mut lines = wrap(text, WRAP_CHARS);
                match lines.first_mut() {
                    Some(first) => *first = format!("{} {}", marker, first),
                    None => lines.push(marker),
                }
                let x = MARGIN + *level as f32 * LIST_INDENT;
                self.lines(
                    &lines,
                    x,
                    x + HANGING_INDENT,
                    CANONICAL_BODY_SIZE,
                    BODY_FONT,
                    link.as_deref(),
                );
            }
            MarkdownBlock::Table { rows } => {
                self.advance(CANONICAL_BODY_SIZE, true);
                self.table(rows);
            }
            MarkdownBlock::Image {
                path,
                alt,
                title,
                link,
            } => {
                self.advance(CANONICAL_BODY_SIZE, false);
                let bbox = BoundingBox::new(MARGIN, self.y, IMAGE_WIDTH, IMAGE_HEIGHT);
                let mut image = RawImage::new(bbox, path.clone()).with_alt(alt.clone());
                if let Some(title) = title {
                    image = image.with_title(title.clone());
                }
                self.page.push(image);
                if let Some(url) = link {
                    self.page.push(RawLink::new(bbox, url.clone()));
                }
                self.y += IMAGE_HEIGHT;
            }
        }
        if !matches!(block, MarkdownBlock::Table { .. }) {
            self.previous_table = false;
        }
    }

    fn table(&mut self, rows: &[Vec<CellText>]) {
        let size = CANONICAL_BODY_SIZE;
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let advance = |text: &str| text.chars().count() as f32 * size * CHAR_WIDTH;

        let mut lefts = Vec::with_capacity(columns);
        let mut x = MARGIN;
        for c in 0..columns {
            lefts.push(x);
            let width = rows
                .iter()
                .filter_map(|row| row.get(c))
                .map(|cell| advance(&cell.text))
                .fold(0.0f32, f32::max);
            x += width + COLUMN_GAP;
        }

        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                self.y += size * 1.5;
            }
            for (cell, &left) in row.iter().zip(&lefts) {
                if !cell.text.is_empty() {
                    self.line(&cell.text, left, size, BODY_FONT, cell.link.as_deref());
                }
            }
        }
        self.y += size;
    }

    fn finish(mut self) -> SourcePage {
        self.page.height = self.page.height.max(self.y + MARGIN);
        self.page
    }
}

/// Typeset blocks onto a page numbered `number`.
pub fn typeset(number: u32, blocks: &[MarkdownBlock]) -> SourcePage {
    let mut typesetter = Typesetter::new(number);
    for block in blocks {
        typesetter.block(block);
    }
    typesetter.finish()
}

/// Break `text` into lines of about `limit` characters.
///
/// Lines only break at spaces that layout extraction would restore when
/// joining the lines, and never before text that reads as a list marker.
pub fn wrap(text: &str, limit: usize) -> Vec<String> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == ' ' && i > start && breakable(&text[..i], &text[i + 1..]) {
            pieces.push(&text[start..i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        let len = current.chars().count();
        if len > 0 && len + 1 + piece.chars().count() > limit {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(piece);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn breakable(before: &str, after: &str) -> bool {
    !after.is_empty()
        && !after.starts_with(' ')
        && needs_space(before, after)
        && parse_marker(after).is_none()
}
