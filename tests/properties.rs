use ndarray::Array1;
use proptest::prelude::*;

use tabstat::{Column, IqrBounds, SequenceStatistics, Table, TableCleaner};

fn padded_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[ \t]{0,3}[a-z]{0,6}[ \t\n]{0,3}")
}

fn numeric_values(table: &Table, column: &str) -> Vec<Option<f64>> {
    let data = &table.column(column).unwrap().data;
    (0..table.n_rows()).map(|row| data.numeric_value(row)).collect()
}

proptest! {
    #[test]
    fn prop_trim_strings_trims_only_selected(
        rows in proptest::collection::vec((padded_text(), padded_text()), 0..20)
    ) {
        let (left, right): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let table = Table::new(vec![
            Column::text("left", left.clone()),
            Column::text("right", right.clone()),
        ]).unwrap();
        let before = table.clone();

        let result = TableCleaner::trim_strings(&table, &["left"]).unwrap();

        prop_assert_eq!(&table, &before);
        prop_assert_eq!(result.index(), table.index());
        prop_assert_eq!(result.column("right").unwrap(), table.column("right").unwrap());

        let trimmed = &result.column("left").unwrap().data;
        for (row, original) in left.iter().enumerate() {
            prop_assert_eq!(trimmed.text_value(row), original.as_deref().map(str::trim));
        }
    }

    #[test]
    fn prop_drop_invalid_rows_leaves_no_missing(
        rows in proptest::collection::vec(
            (proptest::option::of(any::<i64>()), proptest::option::of(-1e6..1e6f64)),
            0..30,
        )
    ) {
        let (a, b): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let table = Table::new(vec![Column::integer("a", a), Column::float("b", b)]).unwrap();

        let result = TableCleaner::drop_invalid_rows(&table, &["a", "b"]).unwrap();

        prop_assert!(result.n_rows() <= table.n_rows());
        prop_assert!(numeric_values(&result, "a").iter().all(Option::is_some));
        prop_assert!(numeric_values(&result, "b").iter().all(Option::is_some));
        prop_assert!(result.index().windows(2).all(|w| w[0] < w[1]));
        for label in result.index() {
            prop_assert!(table.index().contains(label));
        }
    }

    #[test]
    fn prop_outliers_stay_in_bounds_and_tighten(
        values in proptest::collection::vec(-1e4..1e4f64, 1..40),
        loose in 0.0..3.0f64,
        shrink in 0.0..1.0f64,
    ) {
        let strict = loose * shrink;
        let table = Table::new(vec![
            Column::float("x", values.iter().copied().map(Some).collect()),
        ]).unwrap();

        let kept_loose = TableCleaner::remove_outliers_iqr(&table, "x", loose).unwrap();
        let kept_strict = TableCleaner::remove_outliers_iqr(&table, "x", strict).unwrap();

        let bounds = IqrBounds::compute(&values, strict).unwrap();
        for value in numeric_values(&kept_strict, "x").into_iter().flatten() {
            prop_assert!(bounds.contains(value));
        }
        for label in kept_strict.index() {
            prop_assert!(kept_loose.index().contains(label));
        }
    }

    #[test]
    fn prop_moving_average_matches_window_means(
        values in proptest::collection::vec(-1e3..1e3f64, 1..30),
        window_seed in any::<usize>(),
    ) {
        let window = window_seed % values.len() + 1;
        let result = SequenceStatistics::moving_average(&Array1::from(values.clone()), window).unwrap();

        prop_assert_eq!(result.len(), values.len() - window + 1);
        for (i, avg) in result.iter().enumerate() {
            let expected = values[i..i + window].iter().sum::<f64>() / window as f64;
            prop_assert!((avg - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_zscore_standardizes(values in proptest::collection::vec(-1e3..1e3f64, 2..50)) {
        let spread = values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1e-3);

        let result = SequenceStatistics::zscore(&Array1::from(values)).unwrap();
        prop_assert!(result.mean().unwrap().abs() < 1e-7);
        prop_assert!((result.std(0.0) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn prop_min_max_scale_spans_unit_interval(values in proptest::collection::vec(-1e3..1e3f64, 2..50)) {
        let distinct = values.iter().any(|v| *v != values[0]);
        prop_assume!(distinct);

        let result = SequenceStatistics::min_max_scale(&Array1::from(values)).unwrap();
        let min = result.iter().copied().fold(f64::INFINITY, f64::min);
        let max = result.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(min, 0.0);
        prop_assert!((max - 1.0).abs() < 1e-12);
        prop_assert!(result.iter().all(|v| (0.0..=1.0 + 1e-12).contains(v)));
    }
}
