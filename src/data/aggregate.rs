use std::borrow::Cow;
use std::collections::BTreeMap;

use super::error::SchemaError;
use super::filter::FilteredView;
use super::model::{Dimension, Listing, Measure};

/// How a per-country measure is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
    Count,
}

#[derive(Default)]
struct Acc {
    rows: usize,
    present: usize,
    sum: f64,
}

/// One pass over the view, folding rows into their group. Groups come only
/// from keys present in the view and are ordered by ascending key.
fn fold_groups<'v>(
    view: &FilteredView<'v>,
    by: &Dimension,
    measure: Option<Measure>,
) -> BTreeMap<Cow<'v, str>, Acc> {
    let mut groups: BTreeMap<Cow<'v, str>, Acc> = BTreeMap::new();
    for listing in view.rows() {
        let Some(key) = by.key(listing) else {
            continue;
        };
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(v) = measure.and_then(|m| m.value(listing)) {
            acc.present += 1;
            acc.sum += v;
        }
    }
    groups
}

/// Reduce every group. A mean over no non-blank value is `None`.
fn reduce(groups: BTreeMap<Cow<'_, str>, Acc>, reducer: Reducer) -> Vec<(String, Option<f64>)> {
    groups
        .into_iter()
        .map(|(key, acc)| {
            let value = match reducer {
                Reducer::Count => Some(acc.rows as f64),
                Reducer::Sum => Some(acc.sum),
                Reducer::Mean if acc.present == 0 => None,
                Reducer::Mean => Some(acc.sum / acc.present as f64),
            };
            (key.into_owned(), value)
        })
        .collect()
}

/// Rows per group, ordered by ascending key.
pub fn group_count(view: &FilteredView<'_>, by: &Dimension) -> Result<Vec<(String, usize)>, SchemaError> {
    view.dataset().check_dimension(by)?;
    Ok(fold_groups(view, by, None)
        .into_iter()
        .map(|(key, acc)| (key.into_owned(), acc.rows))
        .collect())
}

/// Mean of `measure` per group, skipping blank values. Groups with no
/// non-blank value are left out.
pub fn group_mean(
    view: &FilteredView<'_>,
    by: &Dimension,
    measure: Measure,
) -> Result<Vec<(String, f64)>, SchemaError> {
    view.dataset().check_dimension(by)?;
    Ok(reduce(fold_groups(view, by, Some(measure)), Reducer::Mean)
        .into_iter()
        .filter_map(|(key, mean)| mean.map(|m| (key, m)))
        .collect())
}

/// Sum of `measure` per group, skipping blank values.
pub fn group_sum(
    view: &FilteredView<'_>,
    by: &Dimension,
    measure: Measure,
) -> Result<Vec<(String, f64)>, SchemaError> {
    view.dataset().check_dimension(by)?;
    Ok(reduce(fold_groups(view, by, Some(measure)), Reducer::Sum)
        .into_iter()
        .map(|(key, sum)| (key, sum.unwrap_or_default()))
        .collect())
}

/// The `n` largest groups by row count. Equal counts are ordered by
/// ascending key.
pub fn top_n(view: &FilteredView<'_>, by: &Dimension, n: usize) -> Result<Vec<(String, usize)>, SchemaError> {
    let mut counts = group_count(view, by)?;
    // Input is key-ascending and the sort is stable, so ties stay key-ascending.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    Ok(counts)
}

/// Exactly one entry per country present in the view. The value is `None`
/// for a mean over a country whose values are all blank.
pub fn country_aggregate(
    view: &FilteredView<'_>,
    measure: Measure,
    reducer: Reducer,
) -> Vec<(String, Option<f64>)> {
    reduce(fold_groups(view, &Dimension::Country, Some(measure)), reducer)
}

/// The `n` rows with the largest `measure`; equal values keep dataset order.
/// Rows where the measure is blank are never selected.
pub fn nlargest<'a>(view: &FilteredView<'a>, measure: Measure, n: usize) -> Vec<&'a Listing> {
    let mut ranked: Vec<(f64, &'a Listing)> = view
        .rows()
        .filter_map(|l| measure.value(l).map(|v| (v, l)))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().take(n).map(|(_, l)| l).collect()
}
