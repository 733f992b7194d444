//! pagemark CLI - Markdown from decoded PDF page content

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagemark::{
    load_file, ClassifyOptions, ConvertOptions, Converter, InputFormat, JsonFormat,
    PageSelection, PageSeparator, RawObject, RenderOptions, RoundTripVerifier, TableHeader,
};

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(version)]
#[command(about = "Reconstruct Markdown from positioned PDF page content", long_about = None)]
struct Cli {
    /// Input page stream (JSON document, page array or JSON Lines)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert pages to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input page stream
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// What to put between pages
        #[arg(long, value_enum, default_value = "blank")]
        separator: SeparatorMode,

        /// Which row becomes the table header
        #[arg(long, value_enum, default_value = "first-row")]
        table_header: HeaderMode,

        /// Pad table cells so columns line up
        #[arg(long)]
        pad: bool,

        /// Prefix for image paths
        #[arg(long, env = "PAGEMARK_IMAGE_PREFIX", default_value = "")]
        image_prefix: String,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,

        /// Do not detect tables
        #[arg(long)]
        no_tables: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Dump classified pages as JSON
    Json {
        /// Input page stream
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Check that emitted Markdown classifies back to the same blocks
    Check {
        /// Input page stream
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Print the Markdown of unstable pages
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show document information
    Info {
        /// Input page stream
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SeparatorMode {
    /// Blank line
    Blank,
    /// Thematic break
    Rule,
    /// HTML comment with the page number
    Comment,
}

impl From<SeparatorMode> for PageSeparator {
    fn from(mode: SeparatorMode) -> Self {
        match mode {
            SeparatorMode::Blank => PageSeparator::Blank,
            SeparatorMode::Rule => PageSeparator::Rule,
            SeparatorMode::Comment => PageSeparator::Comment,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum HeaderMode {
    /// First grid row is the header
    FirstRow,
    /// Empty header row; every grid row is data
    Synthesized,
}

impl From<HeaderMode> for TableHeader {
    fn from(mode: HeaderMode) -> Self {
        match mode {
            HeaderMode::FirstRow => TableHeader::FirstRow,
            HeaderMode::Synthesized => TableHeader::Synthesized,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            frontmatter,
            separator,
            table_header,
            pad,
            image_prefix,
            max_heading,
            no_tables,
            pages,
            sequential,
        }) => {
            let render = RenderOptions::new()
                .with_frontmatter(frontmatter)
                .with_page_separator(separator.into())
                .with_table_header(table_header.into())
                .with_padded_tables(pad)
                .with_image_prefix(image_prefix);
            let classify = ClassifyOptions::new()
                .with_max_heading_level(max_heading)
                .with_tables(!no_tables);
            convert_options(pages.as_deref(), sequential).and_then(|options| {
                let options = options
                    .with_render_options(render)
                    .with_classify_options(classify);
                cmd_markdown(&input, output.as_deref(), options)
            })
        }
        Some(Commands::Json {
            input,
            output,
            compact,
            pages,
        }) => cmd_json(&input, output.as_deref(), compact, pages.as_deref()),
        Some(Commands::Check {
            input,
            pages,
            verbose,
        }) => cmd_check(&input, pages.as_deref(), verbose),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: Markdown to stdout if input is provided
            if let Some(input) = cli.input {
                cmd_markdown(&input, None, ConvertOptions::default())
            } else {
                println!("{}", "Usage: pagemark <FILE>".yellow());
                println!("       pagemark --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn convert_options(
    pages: Option<&str>,
    sequential: bool,
) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };
    let options = ConvertOptions::new().with_pages(page_selection);
    Ok(if sequential {
        options.sequential()
    } else {
        options
    })
}

fn report_skipped(report: &pagemark::ConversionReport) {
    for skipped in &report.skipped {
        eprintln!(
            "{} page {}: {}",
            "Skipped".yellow(),
            skipped.page,
            skipped.reason
        );
    }
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    options: ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = output.map(|_| ProgressBar::new_spinner());
    if let Some(ref pb) = pb {
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Reading pages...");
    }

    let document = load_file(input)?;
    log::debug!("Loaded {} pages from {}", document.page_count(), input.display());
    let converter = Converter::new(options);

    if let Some(ref pb) = pb {
        pb.set_message(format!("Converting {} pages...", document.page_count()));
    }
    let result = converter.convert(&document)?;

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }
    report_skipped(result.report());

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!("{} {}", "Saved to".green(), path.display());
        println!(
            "  {} pages, {} headings, {} tables, {} images",
            result.stats.page_count,
            result.stats.heading_count,
            result.stats.table_count,
            result.stats.image_count
        );
    } else {
        print!("{}", result.content);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_file(input)?;
    let classified = Converter::new(convert_options(pages, false)?).classify(&document)?;
    report_skipped(&classified.report);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = pagemark::render::to_json(&classified, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_check(
    input: &Path,
    pages: Option<&str>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_file(input)?;
    let options = convert_options(pages, false)?;
    let classify = options.classify.clone();
    let classified = Converter::new(options).classify(&document)?;
    report_skipped(&classified.report);

    let verifier = RoundTripVerifier::new().with_classify_options(classify);
    let reports = verifier.verify_document(&classified.pages)?;

    let mut unstable = 0;
    for report in &reports {
        match report.first_mismatch {
            None => println!(
                "{} page {} ({} blocks)",
                "✓".green(),
                report.page,
                report.original
            ),
            Some(ref mismatch) => {
                unstable += 1;
                println!(
                    "{} page {} differs at block {}",
                    "✗".red(),
                    report.page,
                    mismatch.index
                );
                let describe = |signature: &Option<pagemark::model::BlockSignature>| {
                    signature
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "(none)".to_string())
                };
                println!("    {} {}", "expected".dimmed(), describe(&mismatch.expected));
                println!("    {} {}", "actual  ".dimmed(), describe(&mismatch.actual));
                if verbose {
                    println!("{}", report.markdown);
                }
            }
        }
    }

    if unstable > 0 {
        return Err(format!("{} of {} pages unstable", unstable, reports.len()).into());
    }
    println!("\n{} {} pages stable", "Done!".green().bold(), reports.len());
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let format: InputFormat = pagemark::detect_format(&text)?;
    let document = pagemark::load_document(&text)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), document.page_count());

    let metadata = &document.metadata;
    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    let objects = document.pages.iter().flat_map(|p| &p.objects);
    let (mut runs, mut images, mut links) = (0, 0, 0);
    for object in objects {
        match object {
            RawObject::Text(_) => runs += 1,
            RawObject::Image(_) => images += 1,
            RawObject::Link(_) => links += 1,
        }
    }

    println!();
    println!("{}", "Page Objects".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Text runs".bold(), runs);
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Links".bold(), links);

    let result = Converter::default().convert(&document)?;
    let stats = &result.stats;
    let fonts = &result.document.font_stats;

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1}pt", "Body size".bold(), fonts.body_size);
    println!("{}: {:?}", "Heading sizes".bold(), fonts.heading_sizes);
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
    println!("{}: {}", "Skipped pages".bold(), stats.skipped_pages);
    println!(
        "{}: {}",
        "Ambiguities".bold(),
        result.report().ambiguities
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagemark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown reconstruction from positioned page content");
    println!();
    println!("License: MIT");
}
