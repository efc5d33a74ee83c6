use std::collections::BTreeMap;

use crate::data::{Dataset, Metric};

/// Per-country values for one (metric, year): country code to value.
/// Countries missing the metric in that year are absent, never zero-filled.
pub type MetricSlice = BTreeMap<String, f64>;

/// Projects the dataset down to one metric in one year. An empty result is
/// not an error; downstream scaling and styling degrade gracefully.
pub fn build_slice(dataset: &Dataset, year: i32, metric: Metric) -> MetricSlice {
    dataset
        .records()
        .iter()
        .filter(|r| r.year == year)
        .filter_map(|r| Some((r.country_code.clone(), r.metric(metric)?)))
        .collect()
}
