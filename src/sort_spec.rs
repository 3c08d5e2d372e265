//! The user's sort request: ordered columns plus the language and reverse
//! flags. Built by [`crate::config::ReorderConfig::sort_spec`] and
//! passed by value into the ordering engine.

use std::fmt;

use crate::error::ReorderError;

pub const DEFAULT_LANGUAGE_COLUMN: &str = "language";
pub const DEFAULT_LANGUAGE_ORDER: [&str; 2] = ["EN", "CN"];

/// How cells of a sort column are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnHint {
    /// Try the known date formats, fall back to text.
    #[default]
    Auto,
    /// Same as `Auto`, but unparseable values are reported.
    Date,
    /// Never treat the value as a date.
    Text,
}

impl fmt::Display for ColumnHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnHint::Auto => "auto",
            ColumnHint::Date => "date",
            ColumnHint::Text => "text",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub name: String,
    pub hint: ColumnHint,
}

impl SortColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: ColumnHint::Auto,
        }
    }

    pub fn with_hint(name: impl Into<String>, hint: ColumnHint) -> Self {
        Self {
            name: name.into(),
            hint,
        }
    }

    /// Parses `name[:auto|date|text]`. Only the last `:` separates a hint, so
    /// column names containing colons still work when the suffix is not a
    /// known hint.
    pub fn parse(spec: &str) -> Result<Self, ReorderError> {
        let trimmed = spec.trim();
        let invalid = || ReorderError::InvalidSortColumn {
            spec: spec.to_string(),
        };
        let (name, hint) = match trimmed.rsplit_once(':') {
            Some((name, suffix)) => match suffix.trim().to_ascii_lowercase().as_str() {
                "auto" => (name, ColumnHint::Auto),
                "date" => (name, ColumnHint::Date),
                "text" => (name, ColumnHint::Text),
                _ => (trimmed, ColumnHint::Auto),
            },
            None => (trimmed, ColumnHint::Auto),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(SortColumn::with_hint(name, hint))
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hint {
            ColumnHint::Auto => write!(f, "{}", self.name),
            hint => write!(f, "{}:{hint}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOptions {
    pub column: String,
    /// Language labels in priority order; unknown labels sort after all of them.
    pub order: Vec<String>,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_LANGUAGE_COLUMN.to_string(),
            order: DEFAULT_LANGUAGE_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub columns: Vec<SortColumn>,
    pub use_language_sorting: bool,
    pub reverse: bool,
    pub language: LanguageOptions,
}

impl SortSpec {
    pub fn new(columns: Vec<SortColumn>) -> Result<Self, ReorderError> {
        if columns.is_empty() {
            return Err(ReorderError::NoSortColumns);
        }
        Ok(Self {
            columns,
            use_language_sorting: false,
            reverse: false,
            language: LanguageOptions::default(),
        })
    }

    /// Convenience constructor from plain column specs such as `["year:date", "title"]`.
    pub fn from_names<I, S>(names: I) -> Result<Self, ReorderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .map(|name| SortColumn::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        SortSpec::new(columns)
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_language(mut self, options: LanguageOptions) -> Result<Self, ReorderError> {
        if options.order.is_empty() {
            return Err(ReorderError::EmptyLanguageOrder);
        }
        if options.column.trim().is_empty() {
            return Err(ReorderError::LanguageColumnMissing {
                column: options.column,
            });
        }
        self.use_language_sorting = true;
        self.language = options;
        Ok(self)
    }
}
