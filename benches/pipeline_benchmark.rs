//! Benchmarks for pagemark conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic page streams.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagemark::{
    BoundingBox, ConvertOptions, Converter, RawImage, RawTextRun, RoundTripVerifier,
    SourceDocument, SourcePage,
};

fn run(text: &str, x: f32, y: f32, size: f32) -> RawTextRun {
    let width = text.chars().count() as f32 * size * 0.5;
    RawTextRun::new(text, BoundingBox::new(x, y, width, size), size, "Helvetica")
}

/// Creates a page with a heading, paragraphs, a list and a small table.
fn create_test_page(number: u32) -> SourcePage {
    let mut page = SourcePage::new(number, 612.0, 792.0)
        .with_object(run(&format!("Section {}", number), 72.0, 60.0, 20.0));

    let mut y = 100.0;
    for i in 0..6 {
        page.push(run(
            &format!("Paragraph {} line of benchmark text for pagemark measurement.", i),
            72.0,
            y,
            12.0,
        ));
        y += 14.4;
        page.push(run("and its continuation line closing the paragraph.", 72.0, y, 12.0));
        y += 30.0;
    }
    for i in 1..=5 {
        page.push(run(&format!("{}. Item number {}", i, i), 72.0, y, 12.0));
        y += 20.0;
    }
    y += 20.0;
    for row in 0..4 {
        for (col, x) in [72.0, 200.0, 330.0].iter().enumerate() {
            page.push(run(&format!("r{}c{}", row, col), *x, y, 12.0));
        }
        y += 18.0;
    }
    page.push(RawImage::new(
        BoundingBox::new(72.0, y + 20.0, 100.0, 80.0),
        format!("images/page{}.png", number),
    ));
    page
}

fn create_test_document(page_count: u32) -> SourceDocument {
    SourceDocument::new((1..=page_count).map(create_test_page).collect())
}

/// Benchmark conversion at various sizes.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    for page_count in [1, 10, 50].iter() {
        let document = create_test_document(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            let converter = Converter::default();
            b.iter(|| converter.convert(black_box(&document)).unwrap());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let converter = Converter::new(ConvertOptions::new().sequential());
            b.iter(|| converter.convert(black_box(&document)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark round-trip verification.
fn bench_roundtrip(c: &mut Criterion) {
    let document = create_test_document(10);
    let classified = Converter::default().classify(&document).unwrap();
    let verifier = RoundTripVerifier::new();

    c.bench_function("roundtrip_10_pages", |b| {
        b.iter(|| verifier.verify_document(black_box(&classified.pages)).unwrap());
    });
}

/// Benchmark page stream parsing.
fn bench_load(c: &mut Criterion) {
    let json = serde_json::to_string(&create_test_document(10)).unwrap();

    c.bench_function("load_10_pages", |b| {
        b.iter(|| pagemark::load_document(black_box(&json)).unwrap());
    });
}

criterion_group!(benches, bench_conversion, bench_roundtrip, bench_load);
criterion_main!(benches);
