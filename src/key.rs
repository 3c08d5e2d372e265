//! Composite key extraction.
//!
//! [`SortPlan::resolve`] checks a [`SortSpec`] against the header once per run
//! and records column positions; [`SortPlan::key_for`] then classifies each
//! row's sort cells into a [`CompositeKey`].

use std::{collections::HashMap, fmt};

use itertools::Itertools;

use crate::{
    classify::{ClassifiedValue, classify, classify_language},
    error::ReorderError,
    sort_spec::{ColumnHint, LanguageOptions, SortSpec},
};

/// Per-row tuple of classified values, compared lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKey(pub Vec<ClassifiedValue>);

impl CompositeKey {
    pub fn components(&self) -> &[ClassifiedValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct PlannedColumn {
    pub name: String,
    pub index: usize,
    pub hint: ColumnHint,
}

#[derive(Debug, Clone)]
struct PlannedLanguage {
    index: usize,
    options: LanguageOptions,
}

#[derive(Debug, Clone)]
pub struct SortPlan {
    columns: Vec<PlannedColumn>,
    language: Option<PlannedLanguage>,
    reverse: bool,
}

impl SortPlan {
    /// Validates `spec` against `headers` and resolves column positions.
    ///
    /// Fails with `MissingHeader` for an empty header, `DuplicateColumn` for
    /// repeated names, `MissingColumns` listing every absent sort column, and
    /// `LanguageColumnMissing` when language sorting has no column to read.
    pub fn resolve(headers: &[String], spec: &SortSpec) -> Result<Self, ReorderError> {
        let column_map = build_column_map(headers)?;
        if spec.columns.is_empty() {
            return Err(ReorderError::NoSortColumns);
        }

        let missing = spec
            .columns
            .iter()
            .filter(|column| !column_map.contains_key(column.name.as_str()))
            .map(|column| column.name.clone())
            .unique()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ReorderError::MissingColumns { columns: missing });
        }

        let columns = spec
            .columns
            .iter()
            .map(|column| PlannedColumn {
                name: column.name.clone(),
                index: column_map[column.name.as_str()],
                hint: column.hint,
            })
            .collect();

        let language = if spec.use_language_sorting {
            if spec.language.order.is_empty() {
                return Err(ReorderError::EmptyLanguageOrder);
            }
            let index = column_map
                .get(spec.language.column.as_str())
                .copied()
                .ok_or_else(|| ReorderError::LanguageColumnMissing {
                    column: spec.language.column.clone(),
                })?;
            Some(PlannedLanguage {
                index,
                options: spec.language.clone(),
            })
        } else {
            None
        };

        Ok(SortPlan {
            columns,
            language,
            reverse: spec.reverse,
        })
    }

    pub fn columns(&self) -> &[PlannedColumn] {
        &self.columns
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn uses_language(&self) -> bool {
        self.language.is_some()
    }

    /// Number of components in every key this plan produces.
    pub fn arity(&self) -> usize {
        self.columns.len() + usize::from(self.language.is_some())
    }

    /// Builds the composite key for one row. Cells past the end of a short
    /// row classify as empty text.
    pub fn key_for(&self, row: &[String]) -> CompositeKey {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let mut components = Vec::with_capacity(self.arity());
        components.extend(
            self.columns
                .iter()
                .map(|column| classify(cell(column.index), column.hint)),
        );
        if let Some(language) = &self.language {
            components.push(classify_language(cell(language.index), &language.options));
        }
        CompositeKey(components)
    }
}

fn build_column_map(headers: &[String]) -> Result<HashMap<&str, usize>, ReorderError> {
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReorderError::MissingHeader);
    }
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        if map.insert(header.as_str(), idx).is_some() {
            return Err(ReorderError::DuplicateColumn {
                column: header.clone(),
            });
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort_spec::SortColumn;
    use chrono::NaiveDate;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_reports_every_missing_column() {
        let spec = SortSpec::from_names(["year", "title", "artist"]).unwrap();
        let err = SortPlan::resolve(&headers(&["title", "language"]), &spec).unwrap_err();
        assert_eq!(
            err,
            ReorderError::MissingColumns {
                columns: vec!["year".into(), "artist".into()]
            }
        );
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let spec = SortSpec::from_names(["Name"]).unwrap();
        let err = SortPlan::resolve(&headers(&["name"]), &spec).unwrap_err();
        assert!(matches!(err, ReorderError::MissingColumns { .. }));
    }

    #[test]
    fn resolve_rejects_empty_and_duplicate_headers() {
        let spec = SortSpec::from_names(["a"]).unwrap();
        assert_eq!(
            SortPlan::resolve(&[], &spec).unwrap_err(),
            ReorderError::MissingHeader
        );
        assert_eq!(
            SortPlan::resolve(&headers(&[""]), &spec).unwrap_err(),
            ReorderError::MissingHeader
        );
        assert_eq!(
            SortPlan::resolve(&headers(&["a", "b", "a"]), &spec).unwrap_err(),
            ReorderError::DuplicateColumn { column: "a".into() }
        );
    }

    #[test]
    fn resolve_requires_language_column_when_enabled() {
        let spec = SortSpec::from_names(["title"])
            .unwrap()
            .with_language(LanguageOptions::default())
            .unwrap();
        let err = SortPlan::resolve(&headers(&["title"]), &spec).unwrap_err();
        assert_eq!(
            err,
            ReorderError::LanguageColumnMissing {
                column: "language".into()
            }
        );
    }

    #[test]
    fn key_follows_sort_order_and_appends_language() {
        let spec = SortSpec::new(vec![
            SortColumn::new("year"),
            SortColumn::with_hint("title", ColumnHint::Text),
        ])
        .unwrap()
        .with_language(LanguageOptions::default())
        .unwrap();
        let plan = SortPlan::resolve(&headers(&["title", "language", "year"]), &spec).unwrap();
        assert_eq!(plan.arity(), 3);

        let key = plan.key_for(&row(&["2020", "CN", "1889"]));
        assert_eq!(
            key.components(),
            &[
                ClassifiedValue::Date(NaiveDate::from_ymd_opt(1889, 1, 1).unwrap()),
                ClassifiedValue::PlainText("2020".into()),
                ClassifiedValue::LanguageTagged {
                    rank: 1,
                    text: "CN".into()
                },
            ]
        );
    }

    #[test]
    fn key_treats_short_rows_as_empty_cells() {
        let spec = SortSpec::from_names(["b"]).unwrap();
        let plan = SortPlan::resolve(&headers(&["a", "b"]), &spec).unwrap();
        let key = plan.key_for(&row(&["only"]));
        assert_eq!(key.components(), &[ClassifiedValue::PlainText(String::new())]);
    }

    #[test]
    fn composite_key_displays_components() {
        let key = CompositeKey(vec![
            ClassifiedValue::PlainText("Ann".into()),
            ClassifiedValue::PlainText("25".into()),
        ]);
        assert_eq!(key.to_string(), "(Ann, 25)");
    }
}
