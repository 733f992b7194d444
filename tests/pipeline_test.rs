//! Integration tests for the extract, classify and emit pipeline.

use pagemark::classify::parse_marker;
use pagemark::render::{to_markdown, RenderOptions};
use pagemark::{
    convert_file, load_file, BoundingBox, Converter, Error, LayoutExtractor, PageSeparator,
    Pagemark, RawImage, RawTextRun, Role, SourceDocument, SourcePage, TableHeader,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/document.json");

fn run(text: &str, x: f32, y: f32, size: f32) -> RawTextRun {
    let width = text.chars().count() as f32 * size * 0.5;
    RawTextRun::new(text, BoundingBox::new(x, y, width, size), size, "Helvetica")
}

fn convert_page(page: SourcePage) -> String {
    Converter::default()
        .convert(&SourceDocument::new(vec![page]))
        .unwrap()
        .content
}

// ==================== Emission Properties ====================

#[test]
fn test_single_image_line() {
    let page = SourcePage::new(1, 612.0, 792.0).with_object(
        RawImage::new(BoundingBox::new(72.0, 72.0, 200.0, 150.0), "test/data/picture.png")
            .with_alt("Test Image 1")
            .with_title("Picture 1"),
    );

    assert_eq!(
        convert_page(page),
        "![Test Image 1](test/data/picture.png \"Picture 1\")\n"
    );
}

#[test]
fn test_image_alt_defaults_to_file_stem() {
    let page = SourcePage::new(1, 612.0, 792.0).with_object(RawImage::new(
        BoundingBox::new(72.0, 72.0, 200.0, 150.0),
        "figures/chart.png",
    ));
    assert_eq!(convert_page(page), "![chart](figures/chart.png)\n");
}

#[test]
fn test_two_by_two_grid_is_table() {
    let page = SourcePage::new(1, 612.0, 792.0)
        .with_object(run("Name", 72.0, 72.0, 12.0))
        .with_object(run("Age", 200.0, 72.0, 12.0))
        .with_object(run("Alice", 72.0, 90.0, 12.0))
        .with_object(run("30", 200.0, 90.0, 12.0));

    assert_eq!(
        convert_page(page),
        "| Name | Age |\n| --- | --- |\n| Alice | 30 |\n"
    );
}

#[test]
fn test_two_by_two_grid_with_synthesized_header() {
    let page = SourcePage::new(1, 612.0, 792.0)
        .with_object(run("Name", 72.0, 72.0, 12.0))
        .with_object(run("Age", 200.0, 72.0, 12.0))
        .with_object(run("Alice", 72.0, 90.0, 12.0))
        .with_object(run("30", 200.0, 90.0, 12.0));

    let markdown = Pagemark::new()
        .with_table_header(TableHeader::Synthesized)
        .convert(&SourceDocument::new(vec![page]))
        .unwrap()
        .content;

    assert_eq!(
        markdown,
        "|  |  |\n| --- | --- |\n| Name | Age |\n| Alice | 30 |\n"
    );
    let data_rows: Vec<&str> = markdown.lines().skip(2).collect();
    assert_eq!(data_rows.len(), 2);
    assert!(data_rows.iter().all(|row| row.matches('|').count() == 3));
}

#[test]
fn test_table_rows_share_column_count() {
    let page = SourcePage::new(1, 612.0, 792.0)
        .with_object(run("A", 72.0, 72.0, 12.0))
        .with_object(run("B", 200.0, 72.0, 12.0))
        .with_object(run("C", 330.0, 72.0, 12.0))
        .with_object(run("a1", 72.0, 90.0, 12.0))
        .with_object(run("c1", 330.0, 90.0, 12.0))
        .with_object(run("a2", 72.0, 108.0, 12.0))
        .with_object(run("b2", 200.0, 108.0, 12.0));

    let markdown = convert_page(page);
    let rows: Vec<&str> = markdown.lines().collect();
    assert_eq!(rows.len(), 4);
    for row in rows {
        assert!(row.starts_with('|') && row.ends_with('|'), "{}", row);
        assert_eq!(row.matches('|').count(), 4, "{}", row);
    }
}

#[test]
fn test_ordered_numbering_increases_by_one() {
    let mut page = SourcePage::new(1, 612.0, 792.0);
    for (i, text) in ["Plan", "Build", "Test", "Ship"].iter().enumerate() {
        page.push(run(
            &format!("{}. {}", i + 3, text),
            72.0,
            72.0 + 20.0 * i as f32,
            12.0,
        ));
    }

    let markdown = convert_page(page);
    let numbers: Vec<u64> = markdown
        .lines()
        .filter_map(parse_marker)
        .filter_map(|m| match m.kind {
            pagemark::classify::MarkerKind::Numeral { number, .. } => Some(number),
            _ => None,
        })
        .collect();

    assert_eq!(numbers, vec![3, 4, 5, 6]);
    assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn test_emit_classified_pages_directly() {
    let page = SourcePage::new(1, 612.0, 792.0)
        .with_object(run("Heading", 72.0, 60.0, 24.0))
        .with_object(run("Body text of the page goes here.", 72.0, 100.0, 12.0));
    let classified = Converter::default()
        .classify(&SourceDocument::new(vec![page]))
        .unwrap();

    let markdown = to_markdown(&classified.pages, &RenderOptions::default()).unwrap();
    assert_eq!(markdown, "# Heading\n\nBody text of the page goes here.\n");
}

// ==================== Page Failures ====================

#[test]
fn test_empty_page_raises_extraction_error() {
    let page = SourcePage::new(7, 612.0, 792.0);
    let err = LayoutExtractor::new().extract_all(&page).unwrap_err();
    assert!(matches!(err, Error::Extraction { page: 7, .. }));
}

#[test]
fn test_empty_page_contributes_no_output() {
    let document = SourceDocument::new(vec![
        SourcePage::new(1, 612.0, 792.0).with_object(run("First page.", 72.0, 72.0, 12.0)),
        SourcePage::new(2, 612.0, 792.0),
        SourcePage::new(3, 612.0, 792.0).with_object(run("Third page.", 72.0, 72.0, 12.0)),
    ]);

    let result = Pagemark::new()
        .with_page_separator(PageSeparator::Comment)
        .convert(&document)
        .unwrap();

    assert_eq!(
        result.content,
        "First page.\n\n<!-- page 3 -->\n\nThird page.\n"
    );
    assert_eq!(result.report().skipped.len(), 1);
    assert_eq!(result.report().skipped[0].page, 2);
}

// ==================== Fixture Document ====================

#[test]
fn test_fixture_document() {
    let result = convert_file(FIXTURE).unwrap();
    let content = &result.content;

    assert!(content.starts_with("# User Guide\n\n"));
    assert!(content.contains(
        "This guide explains how positioned page content becomes structured Markdown.\n"
    ));
    assert!(content.contains("## Getting started\n"));
    assert!(content.contains("1. Install the tool\n2. Run the converter\n3. Read the output\n"));
    assert!(content.contains("| Option | Meaning |\n| --- | --- |\n| pages | Page range |\n"));
    assert!(content.contains("![Test Image 1](test/data/picture.png \"Picture 1\")"));
    assert!(content.contains("[See the project documentation.](https://example.com/docs)"));
    assert!(content.contains("- First bullet\n- Second bullet\n"));

    assert_eq!(result.report().total_pages, 3);
    assert_eq!(result.report().skipped.len(), 1);
    assert_eq!(result.stats.table_count, 1);
    assert_eq!(result.stats.image_count, 1);
}

#[test]
fn test_fixture_roles() {
    let document = load_file(FIXTURE).unwrap();
    let classified = Converter::default().classify(&document).unwrap();

    let first = &classified.pages[0];
    assert_eq!(first.blocks[0].role, Role::Heading { level: 1 });
    assert_eq!(first.tables.len(), 1);
    assert_eq!(first.tables[0].rows, 3);
    assert_eq!(first.tables[0].columns, 2);
    assert_eq!(classified.metadata.author.as_deref(), Some("Docs Team"));
}

#[test]
fn test_fixture_frontmatter() {
    let result = Pagemark::new().with_frontmatter().convert_file(FIXTURE).unwrap();
    assert!(result.content.starts_with(
        "---\ntitle: \"User Guide\"\nauthor: \"Docs Team\"\ncreated: 2024-03-01T12:00:00+00:00\npages: 3\n---\n"
    ));
}

// ==================== File Input ====================

#[test]
fn test_convert_json_lines_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.jsonl");

    let pages = [
        SourcePage::new(1, 612.0, 792.0).with_object(run("Alpha page.", 72.0, 72.0, 12.0)),
        SourcePage::new(2, 612.0, 792.0).with_object(run("Beta page.", 72.0, 72.0, 12.0)),
    ];
    let lines: Vec<String> = pages
        .iter()
        .map(|p| serde_json::to_string(p).unwrap())
        .collect();
    std::fs::write(&path, lines.join("\n")).unwrap();

    let result = convert_file(&path).unwrap();
    assert_eq!(result.content, "Alpha page.\n\nBeta page.\n");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}
