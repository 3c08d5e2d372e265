use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Reorder CSV rows by one or more columns", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sort the rows of a CSV file and write the reordered copy
    Reorder(ReorderArgs),
    /// Report the detected delimiter, encoding and header of a CSV file
    Probe(ProbeArgs),
}

#[derive(Debug, Default, Args)]
pub struct ReorderArgs {
    /// Input CSV file to reorder (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (`-` writes stdout); defaults to <output-dir>/<prefix><input name>
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Directory for the generated output file (defaults to the input's directory)
    #[arg(short = 'd', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// File name prefix for the generated output file
    #[arg(long = "prefix")]
    pub prefix: Option<String>,
    /// Sort columns in priority order, `name[:auto|date|text]`, comma-separated or repeated
    #[arg(short = 's', long = "sort", action = clap::ArgAction::Append)]
    pub sort: Vec<String>,
    /// Break ties by language priority (English before Chinese by default)
    #[arg(long = "language-sort", conflicts_with = "no_language_sort")]
    pub language_sort: bool,
    /// Disable language tie-breaking enabled by a --config file
    #[arg(long = "no-language-sort")]
    pub no_language_sort: bool,
    /// Column holding the language tag (defaults to `language`)
    #[arg(long = "language-column")]
    pub language_column: Option<String>,
    /// Language priority, comma-separated (defaults to `EN,CN`)
    #[arg(long = "language-order", value_delimiter = ',')]
    pub language_order: Vec<String>,
    /// Invert the whole ordering
    #[arg(short = 'r', long = "reverse", conflicts_with = "no_reverse")]
    pub reverse: bool,
    /// Keep ascending order even when a --config file sets `reverse`
    #[arg(long = "no-reverse")]
    pub no_reverse: bool,
    /// CSV delimiter for reading input (sniffed when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file when it has no byte order mark
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output (defaults to the input encoding)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// YAML job file providing defaults for any of the options above; use
    /// --no-reverse / --no-language-sort to clear flags it sets
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Print the first rows of the sorted table instead of writing a file
    #[arg(long = "preview")]
    pub preview: bool,
    /// Number of rows shown by --preview
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Input CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (sniffed when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file when it has no byte order mark
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
