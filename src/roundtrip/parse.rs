//! Emitted Markdown back to a flat block list.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// A block recovered from emitted Markdown.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownBlock {
    /// ATX heading
    Heading {
        /// Level 1-6
        level: u8,
        /// Plain text
        text: String,
        /// Link wrapping the heading text
        link: Option<String>,
    },
    /// Paragraph
    Paragraph {
        /// Plain text
        text: String,
        /// Link wrapping the paragraph text
        link: Option<String>,
    },
    /// List item, flattened with its depth
    ListItem {
        /// Item number for ordered lists
        number: Option<u64>,
        /// Nesting depth (0 = top level)
        level: usize,
        /// Plain text
        text: String,
        /// Link wrapping the item text
        link: Option<String>,
    },
    /// Pipe table; row 0 is the header row
    Table {
        /// Cells by row
        rows: Vec<Vec<CellText>>,
    },
    /// Image standing alone in a paragraph
    Image {
        /// Destination
        path: String,
        /// Alt text
        alt: String,
        /// Title, if any
        title: Option<String>,
        /// Link wrapping the image
        link: Option<String>,
    },
}

/// Text of one table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellText {
    /// Plain text
    pub text: String,
    /// Link wrapping the cell text
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct PendingImage {
    path: String,
    alt: String,
    title: Option<String>,
}

#[derive(Debug, Default)]
struct Collector {
    blocks: Vec<MarkdownBlock>,
    text: String,
    link: Option<String>,
    image: Option<PendingImage>,
    found_image: Option<PendingImage>,
    heading: Option<u8>,
    /// Next item number per open list (`None` for bullet lists)
    lists: Vec<Option<u64>>,
    /// Number of the item whose text is being collected
    item: Option<Option<u64>>,
    rows: Option<Vec<Vec<CellText>>>,
}

impl Collector {
    fn reset(&mut self) {
        self.text.clear();
        self.link = None;
        self.found_image = None;
    }

    fn push_text(&mut self, text: &str) {
        match self.image.as_mut() {
            Some(image) => image.alt.push_str(text),
            None => self.text.push_str(text),
        }
    }

    fn take_text(&mut self) -> (String, Option<String>) {
        let text = self.text.trim().to_string();
        self.text.clear();
        (text, self.link.take())
    }

    fn finish_paragraph(&mut self) {
        let found = self.found_image.take();
        let (text, link) = self.take_text();
        match found {
            Some(image) if text.is_empty() => self.blocks.push(MarkdownBlock::Image {
                path: image.path,
                alt: image.alt,
                title: image.title,
                link,
            }),
            _ => self.blocks.push(MarkdownBlock::Paragraph { text, link }),
        }
    }

    /// Emit the pending item before its nested list or at its end.
    fn flush_item(&mut self) {
        if let Some(number) = self.item.take() {
            let level = self.lists.len().saturating_sub(1);
            let (text, link) = self.take_text();
            self.blocks.push(MarkdownBlock::ListItem {
                number,
                level,
                text,
                link,
            });
        }
    }
}

/// Parse Markdown into blocks in document order.
pub fn parse_blocks(markdown: &str) -> Vec<MarkdownBlock> {
    let mut c = Collector::default();

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                c.reset();
                c.heading = Some(level as u8);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = c.heading.take() {
                    let (text, link) = c.take_text();
                    c.blocks.push(MarkdownBlock::Heading { level, text, link });
                }
            }

            Event::Start(Tag::Paragraph) => {
                if c.item.is_none() {
                    c.reset();
                } else if !c.text.is_empty() {
                    c.text.push(' ');
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if c.item.is_none() {
                    c.finish_paragraph();
                }
            }

            Event::Start(Tag::List(start)) => {
                c.flush_item();
                c.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                c.flush_item();
                c.lists.pop();
            }
            Event::Start(Tag::Item) => {
                c.flush_item();
                c.reset();
                let number = match c.lists.last_mut() {
                    Some(Some(next)) => {
                        let current = *next;
                        *next += 1;
                        Some(current)
                    }
                    _ => None,
                };
                c.item = Some(number);
            }
            Event::End(TagEnd::Item) => c.flush_item(),

            Event::Start(Tag::Table(_)) => c.rows = Some(Vec::new()),
            Event::End(TagEnd::Table) => {
                if let Some(rows) = c.rows.take() {
                    c.blocks.push(MarkdownBlock::Table { rows });
                }
            }
            Event::Start(Tag::TableHead | Tag::TableRow) => {
                if let Some(rows) = c.rows.as_mut() {
                    rows.push(Vec::new());
                }
            }
            Event::Start(Tag::TableCell) => c.reset(),
            Event::End(TagEnd::TableCell) => {
                let (text, link) = c.take_text();
                if let Some(row) = c.rows.as_mut().and_then(|rows| rows.last_mut()) {
                    row.push(CellText { text, link });
                }
            }

            Event::Start(Tag::Link { dest_url, .. }) => c.link = Some(dest_url.to_string()),
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                c.image = Some(PendingImage {
                    path: dest_url.to_string(),
                    alt: String::new(),
                    title: (!title.is_empty()).then(|| title.to_string()),
                });
            }
            Event::End(TagEnd::Image) => c.found_image = c.image.take(),

            Event::Text(text) | Event::Code(text) | Event::InlineHtml(text) => c.push_text(&text),
            Event::SoftBreak | Event::HardBreak => c.push_text(" "),
            _ => {}
        }
    }

    c.blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> MarkdownBlock {
        MarkdownBlock::Paragraph {
            text: text.to_string(),
            link: None,
        }
    }

    fn item(number: Option<u64>, level: usize, text: &str) -> MarkdownBlock {
        MarkdownBlock::ListItem {
            number,
            level,
            text: text.to_string(),
            link: None,
        }
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = parse_blocks("# Title\n\nSome \\*escaped\\* text\n\n### Small\n");
        assert_eq!(
            blocks,
            vec![
                MarkdownBlock::Heading {
                    level: 1,
                    text: "Title".to_string(),
                    link: None
                },
                paragraph("Some *escaped* text"),
                MarkdownBlock::Heading {
                    level: 3,
                    text: "Small".to_string(),
                    link: None
                },
            ]
        );
    }

    #[test]
    fn test_escaped_markers_stay_paragraphs() {
        let blocks = parse_blocks("\\- dash\n\n12\\. twelve\n");
        assert_eq!(blocks, vec![paragraph("- dash"), paragraph("12. twelve")]);
    }

    #[test]
    fn test_nested_lists() {
        let blocks = parse_blocks("1. One\n   - Sub\n2. Two\n\n5) Five\n");
        assert_eq!(
            blocks,
            vec![
                item(Some(1), 0, "One"),
                item(None, 1, "Sub"),
                item(Some(2), 0, "Two"),
                item(Some(5), 0, "Five"),
            ]
        );
    }

    #[test]
    fn test_loose_nested_list() {
        let blocks = parse_blocks("- Parent\n\n  4. Fourth\n");
        assert_eq!(
            blocks,
            vec![item(None, 0, "Parent"), item(Some(4), 1, "Fourth")]
        );
    }

    #[test]
    fn test_table() {
        let blocks = parse_blocks("| Name | Age |\n| --- | --- |\n| Alice |  |\n");
        let MarkdownBlock::Table { rows } = &blocks[0] else {
            panic!("expected a table, got {:?}", blocks);
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1].text, "Age");
        assert_eq!(rows[1][0].text, "Alice");
        assert_eq!(rows[1][1].text, "");
    }

    #[test]
    fn test_image_and_links() {
        let blocks = parse_blocks(
            "![Test Image 1](test/data/picture.png \"Picture 1\")\n\n[Docs](<https://e.com/a b>)\n",
        );
        assert_eq!(
            blocks,
            vec![
                MarkdownBlock::Image {
                    path: "test/data/picture.png".to_string(),
                    alt: "Test Image 1".to_string(),
                    title: Some("Picture 1".to_string()),
                    link: None,
                },
                MarkdownBlock::Paragraph {
                    text: "Docs".to_string(),
                    link: Some("https://e.com/a b".to_string()),
                },
            ]
        );
    }
}
