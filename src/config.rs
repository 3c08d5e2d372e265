//! Run configuration.
//!
//! A [`ReorderConfig`] starts from built-in defaults, is optionally replaced by
//! a YAML job file (`--config`), and finally takes any value given on the
//! command line. [`ReorderConfig::sort_spec`] validates it into the
//! [`SortSpec`] consumed by the ordering engine.
//!
//! ```yaml
//! sort_columns: ["year:date", "title"]
//! use_language_sorting: true
//! language_column: language
//! language_order: [EN, CN]
//! reverse: false
//! output_prefix: sorted_
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use serde::Deserialize;

use crate::{
    cli::{ReorderArgs, parse_delimiter},
    error::ReorderError,
    io_utils,
    sort_spec::{
        DEFAULT_LANGUAGE_COLUMN, DEFAULT_LANGUAGE_ORDER, LanguageOptions, SortColumn, SortSpec,
    },
};

pub const DEFAULT_OUTPUT_PREFIX: &str = "sorted_";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReorderConfig {
    pub sort_columns: Vec<String>,
    pub reverse: bool,
    pub use_language_sorting: bool,
    pub language_column: String,
    pub language_order: Vec<String>,
    pub output_prefix: String,
    pub output_dir: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub output_delimiter: Option<String>,
    pub input_encoding: Option<String>,
    pub output_encoding: Option<String>,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            sort_columns: Vec::new(),
            reverse: false,
            use_language_sorting: false,
            language_column: DEFAULT_LANGUAGE_COLUMN.to_string(),
            language_order: DEFAULT_LANGUAGE_ORDER.iter().map(|s| s.to_string()).collect(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_dir: None,
            delimiter: None,
            output_delimiter: None,
            input_encoding: None,
            output_encoding: None,
        }
    }
}

impl ReorderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Builds the effective configuration for a `reorder` invocation.
    pub fn from_args(args: &ReorderArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        Ok(config)
    }

    /// Command-line values override file values. `--sort` values are split
    /// on commas; `--no-reverse` and `--no-language-sort` clear file flags.
    pub fn apply_args(&mut self, args: &ReorderArgs) {
        if !args.sort.is_empty() {
            self.sort_columns = args
                .sort
                .iter()
                .flat_map(|value| value.split(','))
                .map(str::to_string)
                .collect();
        }
        if args.reverse {
            self.reverse = true;
        } else if args.no_reverse {
            self.reverse = false;
        }
        if args.language_sort {
            self.use_language_sorting = true;
        } else if args.no_language_sort {
            self.use_language_sorting = false;
        }
        if let Some(column) = &args.language_column {
            self.language_column = column.clone();
        }
        if !args.language_order.is_empty() {
            self.language_order = args.language_order.clone();
        }
        if let Some(prefix) = &args.prefix {
            self.output_prefix = prefix.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = Some(dir.clone());
        }
        if let Some(delimiter) = args.delimiter {
            self.delimiter = Some((delimiter as char).to_string());
        }
        if let Some(delimiter) = args.output_delimiter {
            self.output_delimiter = Some((delimiter as char).to_string());
        }
        if let Some(encoding) = &args.input_encoding {
            self.input_encoding = Some(encoding.clone());
        }
        if let Some(encoding) = &args.output_encoding {
            self.output_encoding = Some(encoding.clone());
        }
    }

    pub fn sort_spec(&self) -> Result<SortSpec, ReorderError> {
        let columns = self
            .sort_columns
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(SortColumn::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let spec = SortSpec::new(columns)?.reversed(self.reverse);
        if !self.use_language_sorting {
            return Ok(spec);
        }
        let order = self
            .language_order
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();
        spec.with_language(LanguageOptions {
            column: self.language_column.trim().to_string(),
            order,
        })
    }

    pub fn input_delimiter(&self) -> Result<Option<u8>> {
        parse_optional_delimiter(self.delimiter.as_deref())
    }

    pub fn output_delimiter(&self) -> Result<Option<u8>> {
        parse_optional_delimiter(self.output_delimiter.as_deref())
    }

    pub fn input_encoding(&self) -> Result<&'static Encoding> {
        io_utils::resolve_encoding(self.input_encoding.as_deref())
    }

    pub fn output_encoding(&self) -> Result<Option<&'static Encoding>> {
        self.output_encoding
            .as_deref()
            .map(|label| io_utils::resolve_encoding(Some(label)))
            .transpose()
    }

    /// Destination for the reordered file: the explicit `output` when given,
    /// otherwise `<output_dir>/<prefix><input file name>`.
    pub fn output_path(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = output {
            return Ok(path.to_path_buf());
        }
        if io_utils::is_dash(input) {
            return Ok(PathBuf::from("-"));
        }
        let file_name = input
            .file_name()
            .ok_or_else(|| anyhow!("Input path {input:?} has no file name"))?;
        let mut name = self.output_prefix.clone();
        name.push_str(&file_name.to_string_lossy());
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        Ok(dir.join(name))
    }
}

fn parse_optional_delimiter(value: Option<&str>) -> Result<Option<u8>> {
    value
        .map(|raw| parse_delimiter(raw).map_err(|err| anyhow!("Invalid delimiter '{raw}': {err}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort_spec::ColumnHint;

    fn args(input: &str) -> ReorderArgs {
        ReorderArgs {
            input: PathBuf::from(input),
            ..ReorderArgs::default()
        }
    }

    #[test]
    fn defaults_follow_original_conventions() {
        let config = ReorderConfig::default();
        assert_eq!(config.language_column, "language");
        assert_eq!(config.language_order, vec!["EN", "CN"]);
        assert_eq!(config.output_prefix, "sorted_");
    }

    #[test]
    fn yaml_job_file_populates_fields() {
        let config = ReorderConfig::from_yaml(
            "sort_columns: [\"year:date\", title]\nuse_language_sorting: true\nreverse: true\ndelimiter: tab\n",
        )
        .unwrap();
        let spec = config.sort_spec().unwrap();
        assert_eq!(spec.columns[0], SortColumn::with_hint("year", ColumnHint::Date));
        assert_eq!(spec.columns[1], SortColumn::new("title"));
        assert!(spec.use_language_sorting);
        assert!(spec.reverse);
        assert_eq!(config.input_delimiter().unwrap(), Some(b'\t'));
    }

    #[test]
    fn yaml_job_file_rejects_unknown_keys() {
        assert!(ReorderConfig::from_yaml("sort_by: [a]\n").is_err());
    }

    #[test]
    fn command_line_overrides_file_values() {
        let mut config =
            ReorderConfig::from_yaml("sort_columns: [title]\nlanguage_column: lang\n").unwrap();
        let mut cli = args("art.csv");
        cli.sort = vec!["name, age".into()];
        cli.reverse = true;
        cli.delimiter = Some(b';');
        config.apply_args(&cli);
        let spec = config.sort_spec().unwrap();
        assert_eq!(
            spec.columns,
            vec![SortColumn::new("name"), SortColumn::new("age")]
        );
        assert!(spec.reverse);
        assert_eq!(config.language_column, "lang");
        assert_eq!(config.input_delimiter().unwrap(), Some(b';'));
    }

    #[test]
    fn yaml_sort_columns_keep_embedded_commas() {
        let config =
            ReorderConfig::from_yaml("sort_columns: [\"Last, First\", \"year:date\"]\n").unwrap();
        let spec = config.sort_spec().unwrap();
        assert_eq!(
            spec.columns,
            vec![
                SortColumn::new("Last, First"),
                SortColumn::with_hint("year", ColumnHint::Date)
            ]
        );
    }

    #[test]
    fn negated_flags_clear_file_values() {
        let yaml = "sort_columns: [title]\nreverse: true\nuse_language_sorting: true\n";
        let mut config = ReorderConfig::from_yaml(yaml).unwrap();
        let mut cli = args("art.csv");
        cli.no_reverse = true;
        cli.no_language_sort = true;
        config.apply_args(&cli);
        let spec = config.sort_spec().unwrap();
        assert!(!spec.reverse);
        assert!(!spec.use_language_sorting);

        let mut kept = ReorderConfig::from_yaml("sort_columns: [title]\nreverse: true\n").unwrap();
        kept.apply_args(&args("art.csv"));
        assert!(kept.reverse);
    }

    #[test]
    fn empty_sort_list_is_rejected() {
        let mut config = ReorderConfig::default();
        config.sort_columns = vec![" ".into(), String::new()];
        assert_eq!(config.sort_spec().unwrap_err(), ReorderError::NoSortColumns);
    }

    #[test]
    fn output_path_uses_prefix_and_directory() {
        let mut config = ReorderConfig::default();
        let input = Path::new("data/art.csv");
        assert_eq!(
            config.output_path(input, None).unwrap(),
            PathBuf::from("data/sorted_art.csv")
        );
        config.output_dir = Some(PathBuf::from("out"));
        config.output_prefix = "reordered_".into();
        assert_eq!(
            config.output_path(input, None).unwrap(),
            PathBuf::from("out/reordered_art.csv")
        );
        assert_eq!(
            config
                .output_path(input, Some(Path::new("x.csv")))
                .unwrap(),
            PathBuf::from("x.csv")
        );
        assert_eq!(
            config.output_path(Path::new("-"), None).unwrap(),
            PathBuf::from("-")
        );
    }

    #[test]
    fn unknown_encodings_are_reported() {
        let mut config = ReorderConfig::default();
        config.input_encoding = Some("klingon".into());
        assert!(config.input_encoding().is_err());
        config.output_encoding = Some("windows-1252".into());
        assert_eq!(
            config.output_encoding().unwrap().map(|e| e.name()),
            Some("windows-1252")
        );
    }
}
