//! Row ordering: resolves the sort plan, decorates each row with its
//! composite key and runs a stable sort.

use log::{debug, warn};

use crate::{
    compare::compare_directed,
    error::ReorderError,
    key::{CompositeKey, SortPlan},
    sort_spec::{ColumnHint, SortSpec},
};

/// Returns `rows` reordered by `spec`. Validation happens before any row is
/// touched; on error nothing is returned. Rows with equal keys keep their
/// input order, including when `spec.reverse` is set.
pub fn order_rows(
    headers: &[String],
    rows: Vec<Vec<String>>,
    spec: &SortSpec,
) -> Result<Vec<Vec<String>>, ReorderError> {
    let plan = SortPlan::resolve(headers, spec)?;
    debug!(
        "Sort plan: {} column(s), language tie-break {}, reverse {}",
        plan.columns().len(),
        if plan.uses_language() { "on" } else { "off" },
        plan.reverse()
    );
    Ok(order_with_plan(&plan, rows))
}

pub fn order_with_plan(plan: &SortPlan, rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut decorated: Vec<(CompositeKey, Vec<String>)> = rows
        .into_iter()
        .map(|row| (plan.key_for(&row), row))
        .collect();

    report_date_fallbacks(plan, &decorated);
    if let (Some((first, _)), Some((last, _))) = (decorated.first(), decorated.last()) {
        debug!("First and last composite keys in input order: {first}, {last}");
    }

    let reverse = plan.reverse();
    decorated.sort_by(|(a, _), (b, _)| compare_directed(a, b, reverse));
    decorated.into_iter().map(|(_, row)| row).collect()
}

fn report_date_fallbacks(plan: &SortPlan, decorated: &[(CompositeKey, Vec<String>)]) {
    for (position, column) in plan.columns().iter().enumerate() {
        if column.hint != ColumnHint::Date {
            continue;
        }
        let unparsed = decorated
            .iter()
            .filter(|(key, row)| {
                !key.components()[position].is_date()
                    && row
                        .get(column.index)
                        .is_some_and(|value| !value.trim().is_empty())
            })
            .count();
        if unparsed > 0 {
            warn!(
                "{unparsed} value(s) in date column '{}' could not be parsed and will sort as text after all dates",
                column.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort_spec::LanguageOptions;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| strings(r)).collect()
    }

    #[test]
    fn sorts_by_name_then_age() {
        let headers = strings(&["name", "age"]);
        let rows = table(&[&["Bob", "30"], &["Ann", "30"], &["Ann", "25"]]);
        let spec = SortSpec::from_names(["name", "age"]).unwrap();
        let sorted = order_rows(&headers, rows, &spec).unwrap();
        assert_eq!(sorted, table(&[&["Ann", "25"], &["Ann", "30"], &["Bob", "30"]]));
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let headers = strings(&["label", "n"]);
        let rows = table(&[&["A", "1"], &["B", "1"], &["A", "2"]]);
        let spec = SortSpec::from_names(["n"]).unwrap();
        let sorted = order_rows(&headers, rows.clone(), &spec).unwrap();
        assert_eq!(sorted, table(&[&["A", "1"], &["B", "1"], &["A", "2"]]));

        let reversed = order_rows(&headers, rows, &spec.reversed(true)).unwrap();
        assert_eq!(reversed, table(&[&["A", "2"], &["A", "1"], &["B", "1"]]));
    }

    #[test]
    fn equivalent_date_layouts_tie_and_keep_input_order() {
        let headers = strings(&["id", "year"]);
        let rows = table(&[
            &["0", "1995"],
            &["1", "1995-01-01"],
            &["2", "01/01/1995"],
            &["3", "1994"],
        ]);
        let spec = SortSpec::from_names(["year"]).unwrap();
        let ids = |sorted: Vec<Vec<String>>| {
            sorted.into_iter().map(|r| r[0].clone()).collect::<Vec<_>>()
        };

        let ascending = order_rows(&headers, rows.clone(), &spec).unwrap();
        assert_eq!(ids(ascending), strings(&["3", "0", "1", "2"]));
        let descending = order_rows(&headers, rows, &spec.reversed(true)).unwrap();
        assert_eq!(ids(descending), strings(&["0", "1", "2", "3"]));
    }

    #[test]
    fn reverse_flips_year_and_category_together() {
        let headers = strings(&["year", "category"]);
        let rows = table(&[
            &["2021", "b"],
            &["2020", "a"],
            &["2021", "a"],
            &["2020", "b"],
        ]);
        let spec = SortSpec::from_names(["year", "category"]).unwrap();
        let mut ascending = order_rows(&headers, rows.clone(), &spec).unwrap();
        ascending.reverse();
        let descending = order_rows(&headers, rows, &spec.reversed(true)).unwrap();
        assert_eq!(descending, ascending);
        assert_eq!(descending[0], strings(&["2021", "b"]));
    }

    #[test]
    fn dates_sort_chronologically_across_layouts() {
        let headers = strings(&["when"]);
        let rows = table(&[&["2023-01-15"], &["2023"], &["14/01/2023"], &["undated"]]);
        let spec = SortSpec::from_names(["when:date"]).unwrap();
        let sorted = order_rows(&headers, rows, &spec).unwrap();
        assert_eq!(
            sorted,
            table(&[&["2023"], &["14/01/2023"], &["2023-01-15"], &["undated"]])
        );
    }

    #[test]
    fn english_rows_precede_chinese_rows_on_ties() {
        let headers = strings(&["title", "language"]);
        let rows = table(&[
            &["Sunflowers", "CN"],
            &["Irises", "CN"],
            &["Sunflowers", "EN"],
        ]);
        let spec = SortSpec::from_names(["title"])
            .unwrap()
            .with_language(LanguageOptions::default())
            .unwrap();
        let sorted = order_rows(&headers, rows, &spec).unwrap();
        assert_eq!(
            sorted,
            table(&[
                &["Irises", "CN"],
                &["Sunflowers", "EN"],
                &["Sunflowers", "CN"],
            ])
        );
    }

    #[test]
    fn validation_failure_returns_no_rows() {
        let headers = strings(&["name"]);
        let rows = table(&[&["Ann"]]);
        let spec = SortSpec::from_names(["missing"]).unwrap();
        let err = order_rows(&headers, rows, &spec).unwrap_err();
        assert!(err.to_string().starts_with("Missing columns"));
    }

    #[test]
    fn header_only_table_is_valid() {
        let headers = strings(&["name"]);
        let spec = SortSpec::from_names(["name"]).unwrap();
        assert!(order_rows(&headers, Vec::new(), &spec).unwrap().is_empty());
    }
}
