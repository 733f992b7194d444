//! Markdown emission from classified pages.
//!
//! The emitter walks a page's blocks as a small state machine: entering a
//! table cell opens a table, entering a list item opens or continues a list,
//! and any other block closes whatever was open. Every block ends with a
//! newline; blocks are separated by a blank line, list items of one list are
//! not.

use crate::error::{Error, Result};
use crate::model::{
    ClassifiedBlock, GridCell, ListKind, Metadata, PageClassification, Role, TableGrid,
};

use super::{EmissionStats, PageMarkdown, PageSeparator, RenderOptions, RenderResult, TableHeader};

/// Convert classified pages to Markdown.
pub fn to_markdown(pages: &[PageClassification], options: &RenderOptions) -> Result<String> {
    let emitter = MarkdownEmitter::new(options.clone());
    Ok(emitter.emit_document(pages, &Metadata::default())?.content)
}

/// Markdown emitter.
#[derive(Debug, Clone, Default)]
pub struct MarkdownEmitter {
    options: RenderOptions,
}

impl MarkdownEmitter {
    /// Create a new Markdown emitter.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Get the render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Emit one page.
    ///
    /// Fails with an emission error on a malformed table grid, a heading
    /// level outside 1-6 or an invalid image reference.
    pub fn emit_page(&self, page: &PageClassification) -> Result<PageMarkdown> {
        let mut writer = PageWriter::new(&self.options, page.page);
        let blocks = &page.blocks;
        let mut seen_tables: Vec<usize> = Vec::new();

        let mut i = 0;
        while i < blocks.len() {
            let block = &blocks[i];
            match block.role {
                Role::TableCell { table, .. } => {
                    let len = blocks[i..]
                        .iter()
                        .take_while(|b| matches!(b.role, Role::TableCell { table: t, .. } if t == table))
                        .count();
                    if seen_tables.contains(&table) {
                        return Err(Error::emission(
                            page.page,
                            block.source.index,
                            format!("table {} is split by other blocks", table),
                        ));
                    }
                    seen_tables.push(table);

                    let shape = page.tables.get(table).copied().ok_or_else(|| {
                        Error::emission(
                            page.page,
                            block.source.index,
                            format!("table {} has no recorded shape", table),
                        )
                    })?;
                    let cells: Vec<(usize, &ClassifiedBlock)> =
                        blocks[i..i + len].iter().map(|b| (b.source.index, b)).collect();
                    let grid = TableGrid::from_cells(page.page, table, shape, &cells)?;
                    writer.table(&grid);
                    i += len;
                    continue;
                }
                Role::Heading { level } => writer.heading(block, level)?,
                Role::Paragraph => writer.paragraph(block),
                Role::ListItem { kind, level } => writer.list_item(block, kind, level),
                Role::Image => writer.image(block)?,
            }
            i += 1;
        }

        let (markdown, stats) = writer.finish();
        log::debug!(
            "MarkdownEmitter: page {}: {} blocks -> {} bytes",
            page.page,
            blocks.len(),
            markdown.len()
        );
        Ok(PageMarkdown {
            page: page.page,
            markdown,
            stats,
        })
    }

    /// Emit pages in order and join them.
    pub fn emit_document(
        &self,
        pages: &[PageClassification],
        metadata: &Metadata,
    ) -> Result<RenderResult> {
        let parts = pages
            .iter()
            .map(|page| self.emit_page(page))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.join_pages(&parts, metadata, pages.len() as u32))
    }

    /// Join emitted pages with the configured separator, adding frontmatter
    /// when enabled. Pages without content are left out.
    pub fn join_pages(
        &self,
        parts: &[PageMarkdown],
        metadata: &Metadata,
        page_count: u32,
    ) -> RenderResult {
        let mut output = String::new();
        let mut stats = EmissionStats::new();

        if self.options.include_frontmatter {
            output.push_str(&metadata.to_yaml_frontmatter(page_count));
        }

        let mut first = true;
        for part in parts {
            stats.merge(&part.stats);
            if part.markdown.is_empty() {
                continue;
            }
            if !first {
                match self.options.page_separator {
                    PageSeparator::Blank => output.push('\n'),
                    PageSeparator::Rule => output.push_str("\n---\n\n"),
                    PageSeparator::Comment => {
                        output.push_str(&format!("\n<!-- page {} -->\n\n", part.page))
                    }
                }
            } else if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&part.markdown);
            first = false;
        }

        RenderResult::new(output, metadata.clone(), stats)
    }
}

/// An open list at one nesting level.
#[derive(Debug, Clone)]
struct ListFrame {
    ordered: bool,
    /// Number the next item must carry to continue this list
    next: u64,
    delimiter: char,
    /// Column of the marker
    indent: usize,
    /// Column of the latest item's content
    content_indent: usize,
}

/// Emission state for one page.
struct PageWriter<'a> {
    options: &'a RenderOptions,
    page: u32,
    out: String,
    lists: Vec<ListFrame>,
    stats: EmissionStats,
}

impl<'a> PageWriter<'a> {
    fn new(options: &'a RenderOptions, page: u32) -> Self {
        let mut stats = EmissionStats::new();
        stats.add_page();
        Self {
            options,
            page,
            out: String::new(),
            lists: Vec::new(),
            stats,
        }
    }

    fn finish(self) -> (String, EmissionStats) {
        (self.out, self.stats)
    }

    fn blank_line(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
    }

    /// Close open lists and separate the next block.
    fn start_block(&mut self) {
        self.lists.clear();
        self.blank_line();
    }

    fn heading(&mut self, block: &ClassifiedBlock, level: u8) -> Result<()> {
        if !(1..=6).contains(&level) {
            return Err(Error::emission(
                self.page,
                block.source.index,
                format!("heading level {} is outside 1-6", level),
            ));
        }

        let text = self.inline(&block.content, block.link(), false);
        self.start_block();
        self.out.push_str(&"#".repeat(level as usize));
        if !text.is_empty() {
            self.out.push(' ');
            self.out.push_str(&text);
        }
        self.out.push('\n');

        self.stats.add_heading();
        self.stats.count_text(&block.content);
        Ok(())
    }

    fn paragraph(&mut self, block: &ClassifiedBlock) {
        if block.content.is_empty() {
            return;
        }
        let text = self.inline(&block.content, block.link(), true);
        self.start_block();
        self.out.push_str(&text);
        self.out.push('\n');

        self.stats.add_paragraph();
        self.stats.count_text(&block.content);
    }

    fn list_item(&mut self, block: &ClassifiedBlock, kind: ListKind, level: u8) {
        let level = (level as usize).min(self.lists.len());
        let mut separate = self.lists.is_empty();
        let mut delimiter = '.';

        self.lists.truncate(level + 1);
        if let Some(frame) = self.lists.get(level) {
            let continues = match kind {
                ListKind::Ordered { number } => frame.ordered && frame.next == number,
                ListKind::Unordered => !frame.ordered,
            };
            if !continues {
                // Adjacent ordered lists only stay apart with different delimiters
                if frame.ordered && frame.delimiter == '.' && !matches!(kind, ListKind::Unordered)
                {
                    delimiter = ')';
                }
                self.lists.truncate(level);
                separate = true;
            }
        }

        if self.lists.len() == level {
            let indent = self.lists.last().map_or(0, |parent| parent.content_indent);
            let (ordered, start) = match kind {
                ListKind::Ordered { number } => (true, number),
                ListKind::Unordered => (false, 0),
            };
            // Only a list starting at 1 may interrupt the parent's text
            if level > 0 && ordered && start != 1 {
                separate = true;
            }
            self.lists.push(ListFrame {
                ordered,
                next: start,
                delimiter,
                indent,
                content_indent: indent,
            });
        }

        let text = self.inline(&block.content, block.link(), true);
        if separate {
            self.blank_line();
        }

        let bullet = self.options.list_marker;
        let Some(frame) = self.lists.last_mut() else {
            return;
        };
        let marker = match kind {
            ListKind::Ordered { number } => {
                frame.next = number.saturating_add(1);
                format!("{}{}", number, frame.delimiter)
            }
            ListKind::Unordered => bullet.to_string(),
        };
        frame.content_indent = frame.indent + marker.chars().count() + 1;

        self.out.push_str(&" ".repeat(frame.indent));
        self.out.push_str(&marker);
        if !text.is_empty() {
            self.out.push(' ');
            self.out.push_str(&text);
        }
        self.out.push('\n');

        self.stats.add_list_item();
        self.stats.count_text(&block.content);
    }

    fn image(&mut self, block: &ClassifiedBlock) -> Result<()> {
        let Some(image) = block.image() else {
            return Err(Error::emission(
                self.page,
                block.source.index,
                "image role on a block without an image reference",
            ));
        };
        image
            .validate()
            .map_err(|reason| Error::emission(self.page, block.source.index, reason))?;

        let path = format!("{}{}", self.options.image_path_prefix, image.path);
        let mut markdown = format!("![{}]({}", self.escape(&image.alt, false), destination(&path));
        if let Some(ref title) = image.title {
            markdown.push_str(&format!(" \"{}\"", escape_title(title)));
        }
        markdown.push(')');
        if let Some(url) = block.link() {
            markdown = format!("[{}]({})", markdown, destination(url));
        }

        self.start_block();
        self.out.push_str(&markdown);
        self.out.push('\n');
        self.stats.add_image();
        Ok(())
    }

    fn table(&mut self, grid: &TableGrid) {
        let columns = grid.column_count();
        let cells: Vec<Vec<String>> = grid
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| self.cell(cell)).collect())
            .collect();

        let (header, body): (Vec<String>, &[Vec<String>]) = match self.options.table_header {
            TableHeader::FirstRow => match cells.split_first() {
                Some((first, rest)) => (first.clone(), rest),
                None => return,
            },
            TableHeader::Synthesized => (vec![String::new(); columns], &cells[..]),
        };

        let widths: Vec<usize> = if self.options.pad_tables {
            (0..columns)
                .map(|c| {
                    std::iter::once(&header)
                        .chain(body.iter())
                        .filter_map(|row| row.get(c))
                        .map(|text| text.chars().count())
                        .max()
                        .unwrap_or(0)
                        .max(3)
                })
                .collect()
        } else {
            vec![0; columns]
        };

        self.start_block();
        write_row(&mut self.out, &header, &widths);
        self.out.push('|');
        for &width in &widths {
            self.out.push(' ');
            self.out.push_str(&"-".repeat(width.max(3)));
            self.out.push_str(" |");
        }
        self.out.push('\n');
        for row in body {
            write_row(&mut self.out, row, &widths);
        }

        self.stats.add_table();
        for cell in grid.rows.iter().flatten() {
            self.stats.count_text(&cell.content);
        }
    }

    fn cell(&self, cell: &GridCell) -> String {
        match cell.link.as_deref() {
            // A bare pipe in the destination would end the cell
            Some(url) => format!(
                "[{}]({})",
                self.escape(&cell.content, false),
                destination(url).replace('|', "\\|")
            ),
            None => self.escape(&cell.content, false),
        }
    }

    /// Escaped text, wrapped in a link when the block has one.
    fn inline(&self, text: &str, link: Option<&str>, line_start: bool) -> String {
        match link {
            Some(url) => format!("[{}]({})", self.escape(text, false), destination(url)),
            None => self.escape(text, line_start),
        }
    }

    fn escape(&self, text: &str, line_start: bool) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text, line_start)
        } else {
            text.to_string()
        }
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (c, &width) in widths.iter().enumerate() {
        let text = cells.get(c).map(String::as_str).unwrap_or("");
        out.push_str(&format!(" {:<width$} |", text, width = width));
    }
    out.push('\n');
}

/// Escape text so it re-parses as plain inline content.
///
/// With `line_start`, characters that only have meaning at the start of a
/// line (block quotes, list markers, setext underlines, fences) are escaped
/// too.
fn escape_markdown(text: &str, line_start: bool) -> String {
    let mut result = String::with_capacity(text.len() + 4);

    // Position of a leading ordered-list delimiter (`12.` / `3)`)
    let mut numeral_delimiter = None;
    if line_start {
        if text.starts_with(['-', '+', '=', '>', '~']) {
            result.push('\\');
        }
        let digits = text.bytes().take_while(u8::is_ascii_digit).count();
        if (1..=9).contains(&digits) && text[digits..].starts_with(['.', ')']) {
            numeral_delimiter = Some(digits);
        }
    }

    for (i, c) in text.char_indices() {
        if numeral_delimiter == Some(i) {
            result.push('\\');
        }
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '#' | '<' | '&' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Link or image destination, in angle brackets when it holds spaces or
/// parentheses.
fn destination(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '<' => escaped.push_str("%3C"),
            '>' => escaped.push_str("%3E"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    if escaped.is_empty() || escaped.contains([' ', '(', ')']) {
        format!("<{}>", escaped)
    } else {
        escaped
    }
}

fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}
