//! The `reorder` and `probe` workflows: read the table, order it, write it.

use std::path::Path;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    cli::{ProbeArgs, ReorderArgs},
    config::{DEFAULT_PREVIEW_ROWS, ReorderConfig},
    io_utils::{self, OutputFormat, printable_delimiter},
    order::order_rows,
    table::print_table,
};

pub fn execute(args: &ReorderArgs) -> Result<()> {
    if args.preview && args.output.is_some() {
        bail!("--preview cannot be combined with --output");
    }
    let config = ReorderConfig::from_args(args)?;
    // Everything that can be validated without the file is checked first.
    let spec = config.sort_spec()?;
    let input_encoding = config.input_encoding()?;
    let input_delimiter = config.input_delimiter()?;
    let output_delimiter = config.output_delimiter()?;
    let output_encoding = config.output_encoding()?;
    let output_path = if args.preview {
        None
    } else {
        Some(config.output_path(&args.input, args.output.as_deref())?)
    };

    info!(
        "Reordering '{}' by [{}]{}{}",
        args.input.display(),
        spec.columns.iter().join(", "),
        if spec.use_language_sorting {
            format!(" with language tie-break on '{}'", spec.language.column)
        } else {
            String::new()
        },
        if spec.reverse { " (reversed)" } else { "" }
    );

    let table = io_utils::read_table(&args.input, input_delimiter, input_encoding)
        .with_context(|| format!("Reading {:?}", args.input))?;
    info!(
        "Read {} row(s) with {} column(s) from {:?}",
        table.rows.len(),
        table.headers.len(),
        args.input
    );

    let row_count = table.rows.len();
    let sorted = order_rows(&table.headers, table.rows, &spec)?;
    debug_assert_eq!(sorted.len(), row_count);

    let Some(output_path) = output_path else {
        let limit = args.limit.unwrap_or(DEFAULT_PREVIEW_ROWS);
        let shown = sorted.iter().take(limit).cloned().collect::<Vec<_>>();
        print_table(&table.headers, &shown);
        info!("Displayed {} of {} sorted row(s)", shown.len(), row_count);
        return Ok(());
    };

    let mut format = OutputFormat::matching(&table.format);
    if let Some(delimiter) = output_delimiter {
        format.delimiter = delimiter;
    }
    if let Some(encoding) = output_encoding {
        let resolved = encoding.output_encoding();
        if resolved != encoding {
            debug!(
                "Output encoding {} is written as {}",
                encoding.name(),
                resolved.name()
            );
        }
        format.encoding = resolved;
        format.bom &= resolved == encoding_rs::UTF_8;
    }
    debug!(
        "Output format: delimiter '{}', encoding {}, bom {}",
        printable_delimiter(format.delimiter),
        format.encoding.name(),
        format.bom
    );

    io_utils::write_table(Some(&output_path), &table.headers, &sorted, &format)
        .with_context(|| format!("Writing {output_path:?}"))?;
    info!(
        "Wrote {} sorted row(s) to {}",
        row_count,
        describe_target(&output_path)
    );
    Ok(())
}

pub fn probe(args: &ProbeArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table = io_utils::read_table(&args.input, args.delimiter, encoding)
        .with_context(|| format!("Reading {:?}", args.input))?;
    let format = table.format;
    let details = vec![
        vec!["delimiter".to_string(), printable_delimiter(format.delimiter)],
        vec!["encoding".to_string(), format.encoding.name().to_string()],
        vec!["bom".to_string(), format.bom.to_string()],
        vec!["columns".to_string(), table.headers.join(", ")],
        vec!["rows".to_string(), table.rows.len().to_string()],
    ];
    print_table(&["property".to_string(), "value".to_string()], &details);
    info!(
        "Probed {:?}: {} column(s), {} row(s)",
        args.input,
        table.headers.len(),
        table.rows.len()
    );
    Ok(())
}

fn describe_target(path: &Path) -> String {
    if io_utils::is_dash(path) {
        "stdout".to_string()
    } else {
        format!("{path:?}")
    }
}
