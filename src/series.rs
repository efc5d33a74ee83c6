//! Assembles the row subsets handed to the chart widgets: per-country
//! time series for the detail view and top-N tables for the ranking view.

use crate::data::{Dataset, Metric};
use crate::nav::DetailState;

/// Closed set of chart renderings; resolved to a ratatui graph type once
/// per draw instead of re-branching on a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Scatter];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Scatter => "Scatter",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartKind::Line => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Scatter,
            ChartKind::Scatter => ChartKind::Line,
        }
    }
}

/// X axis of a detail chart: the year timeline or another metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesAxis {
    Year,
    Metric(Metric),
}

impl SeriesAxis {
    pub fn label(self) -> &'static str {
        match self {
            SeriesAxis::Year => "year",
            SeriesAxis::Metric(m) => m.label(),
        }
    }
}

/// One plotted sequence, labeled with the country's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// One or two series for the detail view: the selected country's full
/// history, plus the comparison country's when set. Rows missing either
/// coordinate are skipped; points are sorted ascending by x.
pub fn compose_series(dataset: &Dataset, detail: &DetailState) -> Vec<Series> {
    let mut out = vec![series_for(dataset, &detail.country, detail.x_axis, detail.y_axis)];
    if let Some(code) = &detail.compare {
        out.push(series_for(dataset, code, detail.x_axis, detail.y_axis));
    }
    out
}

fn series_for(dataset: &Dataset, code: &str, x_axis: SeriesAxis, y_axis: Metric) -> Series {
    let mut points = Vec::new();
    for record in dataset.history(code) {
        let x = match x_axis {
            SeriesAxis::Year => Some(f64::from(record.year)),
            SeriesAxis::Metric(m) => record.metric(m),
        };
        let (Some(x), Some(y)) = (x, record.metric(y_axis)) else {
            continue;
        };
        points.push((x, y));
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    Series {
        label: dataset.name_for(code).to_string(),
        points,
    }
}

/// One row of the ranking view.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub name: String,
    pub value: f64,
}

/// Top `top` countries by a metric in one year, descending. Countries
/// missing the metric are excluded rather than ranked at zero.
pub fn rank_by_metric(dataset: &Dataset, year: i32, metric: Metric, top: usize) -> Vec<RankingRow> {
    let mut rows: Vec<RankingRow> = dataset
        .records()
        .iter()
        .filter(|r| r.year == year)
        .filter_map(|r| {
            Some(RankingRow {
                name: r.name.clone(),
                value: r.metric(metric)?,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));
    rows.truncate(top);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;

    const CSV: &str = "\
country_code,Name,year,Total Population,Life Expectancy at Birth,Property Rights
USA,United States,2001,285000000,76.8,84.0
USA,United States,2000,282000000,76.6,85.0
CAN,Canada,2000,30700000,79.2,88.0
CAN,Canada,2001,31000000,,87.0
MEX,Mexico,2000,97900000,74.3,
";

    fn dataset() -> Dataset {
        Dataset::from_reader(CSV.as_bytes(), 50).unwrap()
    }

    fn detail(country: &str) -> DetailState {
        DetailState::new(country.to_string())
    }

    #[test]
    fn single_country_yields_one_labeled_series() {
        let series = compose_series(&dataset(), &detail("USA"));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "United States");
        assert_eq!(
            series[0].points,
            vec![(2000.0, 282_000_000.0), (2001.0, 285_000_000.0)]
        );
    }

    #[test]
    fn compare_adds_a_second_labeled_series() {
        let mut d = detail("USA");
        d.compare = Some("CAN".to_string());
        let series = compose_series(&dataset(), &d);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].label, "Canada");
    }

    #[test]
    fn rows_missing_a_coordinate_are_skipped() {
        let mut d = detail("CAN");
        d.y_axis = crate::data::Metric::LifeExpectancy;
        let series = compose_series(&dataset(), &d);
        assert_eq!(series[0].points, vec![(2000.0, 79.2)]);
    }

    #[test]
    fn metric_x_axis_sorts_by_that_metric() {
        let mut d = detail("USA");
        d.x_axis = SeriesAxis::Metric(crate::data::Metric::PropertyRights);
        let series = compose_series(&dataset(), &d);
        // 2001 has the lower Property Rights value, so it comes first.
        assert_eq!(series[0].points, vec![(84.0, 285_000_000.0), (85.0, 282_000_000.0)]);
    }

    #[test]
    fn ranking_is_descending_and_skips_missing() {
        let rows = rank_by_metric(&dataset(), 2000, crate::data::Metric::PropertyRights, 10);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Canada", "United States"]);
    }

    #[test]
    fn ranking_truncates_to_top_n() {
        let rows = rank_by_metric(&dataset(), 2000, crate::data::Metric::TotalPopulation, 2);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["United States", "Mexico"]);
    }

    #[test]
    fn chart_kind_cycles_through_all_variants() {
        let mut kind = ChartKind::Line;
        for _ in 0..ChartKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, ChartKind::Line);
    }
}
