//! I/O utilities for reading and writing delimited tables.
//!
//! All file I/O in csv-reorder flows through this module. It provides:
//!
//! - **Encoding detection**: BOM sniffing (UTF-8, UTF-16LE/BE), an explicit
//!   label override via `encoding_rs`, UTF-8 otherwise. Malformed input is an
//!   [`ReorderError::Encoding`].
//! - **Delimiter detection**: dialect sniffing via `csv_nose`, restricted to
//!   comma, semicolon, tab and pipe, with manual override support.
//! - **Table reading**: the whole file is decoded and parsed in memory; the
//!   first record is the header.
//! - **Atomic output**: rows are rendered in memory, transcoded, and persisted
//!   through a temporary file so a failed run leaves nothing behind.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use csv_nose::{SampleSize, Sniffer};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use tempfile::NamedTempFile;

use crate::error::ReorderError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_SAMPLE_RECORDS: usize = 20;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Conventions detected on the input and reused for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub bom: bool,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub format: InputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub bom: bool,
}

impl OutputFormat {
    /// Mirrors the input. Decoders such as UTF-16 map to their `encoding_rs`
    /// output encoding (UTF-8).
    pub fn matching(input: &InputFormat) -> Self {
        let encoding = input.encoding.output_encoding();
        Self {
            delimiter: input.delimiter,
            encoding,
            bom: input.bom && encoding == UTF_8,
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading input from stdin")?;
    } else {
        bytes = fs::read(path).with_context(|| format!("Opening input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Decodes raw input. A byte order mark wins over `fallback`.
pub fn decode_input(
    bytes: &[u8],
    fallback: &'static Encoding,
) -> Result<(String, &'static Encoding, bool), ReorderError> {
    let (encoding, body, bom) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..], true),
        None => (fallback, bytes, false),
    };
    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => Ok((text.into_owned(), encoding, bom)),
        None => Err(ReorderError::Encoding {
            encoding: encoding.name(),
            detail: describe_decode_failure(body, encoding),
        }),
    }
}

fn describe_decode_failure(body: &[u8], encoding: &'static Encoding) -> String {
    match std::str::from_utf8(body) {
        Err(err) if encoding == UTF_8 => {
            format!("malformed byte sequence at offset {}", err.valid_up_to())
        }
        _ => "malformed byte sequence".to_string(),
    }
}

/// Sniffs the dialect of the decoded input with `csv_nose`. Anything other
/// than comma, semicolon, tab or pipe falls back to comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    if text.trim().is_empty() {
        return DEFAULT_CSV_DELIMITER;
    }
    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::Records(SNIFF_SAMPLE_RECORDS));
    match sniffer.sniff_bytes(text.as_bytes()) {
        Ok(metadata) if DELIMITER_CANDIDATES.contains(&metadata.dialect.delimiter) => {
            metadata.dialect.delimiter
        }
        Ok(metadata) => {
            debug!(
                "Sniffed delimiter '{}' is not supported; using ','",
                printable_delimiter(metadata.dialect.delimiter)
            );
            DEFAULT_CSV_DELIMITER
        }
        Err(err) => {
            debug!("Delimiter sniffing failed ({err}); using ','");
            DEFAULT_CSV_DELIMITER
        }
    }
}

pub fn parse_table(text: &str, format: InputFormat) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(format.delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("Reading header row")?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReorderError::MissingHeader.into());
    }

    let rows = reader
        .records()
        .enumerate()
        .map(|(ordinal, record)| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .with_context(|| format!("Reading row {}", ordinal + 2))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Table {
        headers,
        rows,
        format,
    })
}

/// Reads `path` fully, detecting encoding and delimiter unless provided.
pub fn read_table(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Table> {
    let bytes = read_input_bytes(path)?;
    let (text, encoding, bom) = decode_input(&bytes, encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&text));
    debug!(
        "Input {:?}: encoding {}, bom {}, delimiter '{}'",
        path,
        encoding.name(),
        bom,
        printable_delimiter(delimiter)
    );
    parse_table(
        &text,
        InputFormat {
            delimiter,
            encoding,
            bom,
        },
    )
}

pub fn render_csv(headers: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(Vec::new());
    writer.write_record(headers).context("Writing output headers")?;
    for row in rows {
        writer.write_record(row).context("Writing output row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing output: {}", err.error()))?;
    String::from_utf8(bytes).context("Rendering output as UTF-8")
}

pub fn encode_output(text: &str, format: &OutputFormat) -> Result<Vec<u8>, ReorderError> {
    let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if format.bom && format.encoding == UTF_8 {
        bytes.extend_from_slice(UTF8_BOM);
    }
    if format.encoding == UTF_8 {
        bytes.extend_from_slice(text.as_bytes());
        return Ok(bytes);
    }
    let (encoded, _output_encoding, had_errors) = format.encoding.encode(text);
    if had_errors {
        return Err(ReorderError::Encoding {
            encoding: format.encoding.name(),
            detail: "output contains characters the encoding cannot represent".to_string(),
        });
    }
    bytes.extend_from_slice(encoded.as_ref());
    Ok(bytes)
}

/// Writes `bytes` to `path` (stdout for `None` or `-`). Files are written to a
/// temporary sibling and renamed into place.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    let path = match path {
        Some(p) if !is_dash(p) => p,
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Writing output to stdout")?;
            return stdout.flush().context("Flushing stdout");
        }
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory {parent:?}"))?;
            parent
        }
        None => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("Creating temporary file in {parent:?}"))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.flush())
        .with_context(|| format!("Writing output file {path:?}"))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Creating output file {path:?}"))?;
    Ok(())
}

pub fn write_table(
    path: Option<&Path>,
    headers: &[String],
    rows: &[Vec<String>],
    format: &OutputFormat,
) -> Result<()> {
    let rendered = render_csv(headers, rows, format.delimiter)?;
    let bytes = encode_output(&rendered, format)?;
    write_output(path, &bytes)
}
