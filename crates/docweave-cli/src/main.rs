#![forbid(unsafe_code)]

//! docweave CLI
//!
//! Diagnostic command-line interface for the docweave parsing pipeline:
//! detect the format of a content file, or parse it and print the
//! normalized result as JSON. All filesystem I/O lives here — the parsing
//! crates themselves never touch a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docweave_content::detect::FormatDetector;
use docweave_core::{ContentParser, CsvOptions, Error, ParseOptions};

/// docweave - help-content parsing and format detection
#[derive(Parser, Debug)]
#[command(name = "docweave")]
#[command(about = "Parse help content and detect its format", long_about = None)]
struct Args {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank registered parsers against a content file
    Detect {
        /// Content file to inspect
        file: PathBuf,

        /// Print every parser's score instead of only the best match
        #[arg(long)]
        all: bool,
    },
    /// Parse a content file and print the normalized result as JSON
    Parse {
        /// Content file to parse
        file: PathBuf,

        /// Parser to use (markdown, mdx, json, csv); detected when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Base path joined onto relative asset URLs
        #[arg(long)]
        base_path: Option<String>,

        /// CSV field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Treat the first CSV row as data, not column names
        #[arg(long)]
        no_header: bool,

        /// Render CSV as a labeled list instead of a table
        #[arg(long)]
        as_list: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if args.verbose {
                    "debug".into()
                } else {
                    "warn".into()
                }
            }),
        )
        .init();

    let detector = FormatDetector::with_default_parsers();

    match args.command {
        Command::Detect { file, all } => {
            let content = read_content(&file)?;
            let filename = file_name(&file);

            if all {
                let results = detector.detect_all(&content, filename.as_deref());
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let top = detector.detect(&content, filename.as_deref());
                println!("{}", serde_json::to_string_pretty(&top)?);
            }
        }
        Command::Parse {
            file,
            format,
            base_path,
            delimiter,
            no_header,
            as_list,
        } => {
            let content = read_content(&file)?;
            let filename = file_name(&file);

            let parser = match format {
                Some(name) => detector
                    .parser_named(&name)
                    .ok_or(Error::UnknownParser(name))?,
                None => {
                    let top = detector.detect(&content, filename.as_deref());
                    let Some(name) = top.parser_name.as_deref() else {
                        anyhow::bail!("could not detect a format for {}", file.display());
                    };
                    tracing::info!(format = %top.format, confidence = top.confidence, "detected format");
                    detector
                        .parser_named(name)
                        .context("detected parser is registered")?
                }
            };

            let options = ParseOptions {
                filename,
                base_path,
                csv: CsvOptions {
                    delimiter,
                    has_header: !no_header,
                    render_as_table: !as_list,
                },
                ..Default::default()
            };

            let result = parser.parse(&content, &options).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn read_content(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
