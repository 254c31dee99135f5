//! Command-line interface for the extraction library.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use console::style;

use crate::document::Document;
use crate::error::Result;
use crate::parser::Parser;

/// lextract - Parse plain-text legislation into a structured document model.
#[derive(ClapParser)]
#[command(name = "lextract")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Serialization format for parsed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a document and write the structured result.
    Parse {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output serialization format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Print a parsing summary to stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Detect the structural format of a document without parsing it.
    Detect {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Parse a document and print its statistics.
    Stats {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            output,
            format,
            pretty,
            stats,
        } => parse_command(file.as_deref(), output.as_deref(), format, pretty, stats),
        Commands::Detect { file } => detect_command(file.as_deref()),
        Commands::Stats { file } => stats_command(file.as_deref()),
    }
}

/// Read the input source into a reader: a file when given, stdin otherwise.
fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn parse_command(
    file: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
    stats: bool,
) -> Result<()> {
    let parser = Parser::new();
    let doc = parser.parse(open_input(file)?)?;

    if stats {
        print_summary(&doc);
    }

    let serialized = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(&doc)?,
        OutputFormat::Json => serde_json::to_string(&doc)?,
        OutputFormat::Yaml => serde_yaml_ng::to_string(&doc)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, serialized)?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(serialized.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn detect_command(file: Option<&Path>) -> Result<()> {
    let mut content = String::new();
    open_input(file)?.read_to_string(&mut content)?;

    let format = Parser::new().detect(&content);
    println!("{}", format.as_str());
    Ok(())
}

fn stats_command(file: Option<&Path>) -> Result<()> {
    let parser = Parser::new();
    let doc = parser.parse(open_input(file)?)?;
    print_summary(&doc);
    Ok(())
}

/// Print a styled parse summary to stderr.
fn print_summary(doc: &Document) {
    let stats = doc.statistics();

    eprintln!("  Title: {}", style(&doc.title).green());
    eprintln!("  Type: {}", doc.doc_type.as_str());
    if !doc.identifier.is_empty() {
        eprintln!("  Identifier: {}", style(&doc.identifier).cyan());
    }
    eprintln!("  Chapters: {}", stats.chapters);
    eprintln!("  Sections: {}", stats.sections);
    eprintln!("  Articles: {}", stats.articles);
    if stats.recitals > 0 {
        eprintln!("  Recitals: {}", stats.recitals);
    }
    if stats.definitions > 0 {
        eprintln!("  Definitions: {}", stats.definitions);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["lextract", "parse", "input.txt"]);

        let Commands::Parse {
            file,
            output,
            format,
            pretty,
            stats,
        } = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(file, Some(PathBuf::from("input.txt")));
        assert!(output.is_none());
        assert_eq!(format, OutputFormat::Json);
        assert!(!pretty);
        assert!(!stats);
    }

    #[test]
    fn test_cli_parse_yaml_with_output() {
        let cli = Cli::parse_from([
            "lextract", "parse", "input.txt", "--format", "yaml", "--output", "out.yaml",
        ]);

        let Commands::Parse { format, output, .. } = cli.command else {
            panic!("expected parse command");
        };
        assert_eq!(format, OutputFormat::Yaml);
        assert_eq!(output, Some(PathBuf::from("out.yaml")));
    }

    #[test]
    fn test_cli_detect_without_file_reads_stdin() {
        let cli = Cli::parse_from(["lextract", "detect"]);
        let Commands::Detect { file } = cli.command else {
            panic!("expected detect command");
        };
        assert!(file.is_none());
    }
}
