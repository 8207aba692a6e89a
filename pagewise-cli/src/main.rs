//! Pagewise CLI - Navigation-ordered text extraction from EPUB files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{FormatStyle, ListFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate the page size (must be at least 1)
fn parse_page_size(s: &str) -> Result<usize, String> {
    parse_positive(s, "page size")
}

/// Parse and validate the maximum line length (must be at least 1)
fn parse_max_length(s: &str) -> Result<usize, String> {
    parse_positive(s, "max length")
}

fn parse_positive(s: &str, what: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err(format!("{} must be at least 1", what))
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the chapters of an EPUB
    List {
        /// Input file path
        input: String,

        /// Listing layout
        #[arg(short, long, value_enum, default_value = "table")]
        format: ListFormat,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display information about an EPUB
    Info {
        /// Input file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract chapter text
    Extract {
        /// Input file path
        input: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Chapters to extract, 1-based (e.g. "1-5,7")
        #[arg(short, long)]
        chapters: Option<String>,

        /// Paragraph layout of the output
        #[arg(long, value_enum, default_value = "compact")]
        format_style: FormatStyle,

        /// Break output lines longer than this many characters
        #[arg(long, value_parser = parse_max_length)]
        max_length: Option<usize>,

        /// Skip text cleaning
        #[arg(long)]
        no_clean: bool,

        /// Keep bracketed footnote markers
        #[arg(long)]
        keep_footnotes: bool,

        /// Keep lines that contain only a number
        #[arg(long)]
        keep_page_numbers: bool,

        /// Leave out table of contents and front matter
        #[arg(long)]
        skip_toc: bool,

        /// Emit a chapter marker before each chapter
        #[arg(long)]
        titles: bool,

        /// Keep a first line that repeats the chapter title
        #[arg(long)]
        no_dedupe: bool,
    },

    /// Extract page text, or list pages
    Pages {
        /// Input file path
        input: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Page labels to extract (e.g. "1,ii,3")
        #[arg(short, long)]
        pages: Option<String>,

        /// Synthetic page size when the book has no page-list
        #[arg(long, default_value = "2000", value_parser = parse_page_size)]
        page_size: usize,

        /// Count the page size in words instead of characters
        #[arg(long)]
        words: bool,

        /// Skip front matter pages and strip title listings
        #[arg(long)]
        skip_toc: bool,

        /// Keep a first line that repeats the chapter title
        #[arg(long)]
        no_dedupe: bool,

        /// List pages instead of extracting text
        #[arg(long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so extracted text on stdout stays clean
    let filter = if cli.verbose {
        "pagewise_cli=debug,pagewise_core=debug"
    } else {
        "pagewise_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List {
            input,
            format,
            json,
        } => commands::list(&input, format, json),

        Commands::Info { input, json } => commands::info(&input, json),

        Commands::Extract {
            input,
            output,
            chapters,
            format_style,
            max_length,
            no_clean,
            keep_footnotes,
            keep_page_numbers,
            skip_toc,
            titles,
            no_dedupe,
        } => commands::extract(
            &input,
            &commands::ExtractArgs {
                output,
                chapters,
                format_style,
                max_length,
                clean: !no_clean,
                keep_footnotes,
                keep_page_numbers,
                skip_toc,
                titles,
                dedupe: !no_dedupe,
            },
        ),

        Commands::Pages {
            input,
            output,
            pages,
            page_size,
            words,
            skip_toc,
            no_dedupe,
            list,
        } => commands::pages(
            &input,
            &commands::PagesArgs {
                output,
                pages,
                page_size,
                words,
                skip_toc,
                dedupe: !no_dedupe,
                list,
            },
        ),
    }
}
