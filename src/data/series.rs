//! Chart-ready data series. Everything here is display-only: values may be
//! substituted or rows dropped for plotting, but nothing flows back into the
//! dataset or the aggregates.

use serde::Serialize;

use super::aggregate::{grade_counts, top_by_revenue, type_breakdown};
use super::model::{Dataset, Record};

/// Size used for points whose size metric is unknown.
pub const SIZE_SENTINEL: f64 = 1.0;

/// Bars in the top-revenue chart.
pub const TOP_BARS: usize = 10;

/// Characters of a company name kept on a bar label.
pub const LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Colour group (entity type or grade label).
    pub group: String,
}

/// Metric selectable for scatter axes and point sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    RegisteredCapital,
    TotalRevenue,
    NetProfit,
    ScoreTotal,
}

impl Metric {
    pub fn of(self, r: &Record) -> Option<f64> {
        match self {
            Metric::RegisteredCapital => r.registered_capital,
            Metric::TotalRevenue => r.total_revenue,
            Metric::NetProfit => r.net_profit,
            Metric::ScoreTotal => r.score_total,
        }
    }
}

/// Company counts per entity type; zero-count types are left off the pie.
pub fn type_slices(dataset: &Dataset) -> Vec<Slice> {
    type_breakdown(dataset)
        .into_iter()
        .filter(|t| t.count > 0)
        .map(|t| Slice {
            label: t.entity_type.label().to_string(),
            value: t.count as f64,
        })
        .collect()
}

/// Grade counts, most common first. Empty when there is no grade column.
pub fn grade_bars(dataset: &Dataset) -> Vec<Slice> {
    let mut bars: Vec<Slice> = grade_counts(dataset)
        .unwrap_or_default()
        .into_iter()
        .map(|(label, count)| Slice {
            label,
            value: count as f64,
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars
}

/// Top revenue bars with names cut to [`LABEL_CHARS`] characters.
pub fn top_revenue_bars(dataset: &Dataset) -> Vec<Slice> {
    top_by_revenue(dataset, TOP_BARS)
        .into_iter()
        .map(|r| Slice {
            label: truncate_chars(&r.company_name, LABEL_CHARS),
            value: r.total_revenue.unwrap_or_default(),
        })
        .collect()
}

/// Capital vs revenue on log axes: points need both values strictly positive.
pub fn capital_revenue_points(dataset: &Dataset) -> Vec<ScatterPoint> {
    dataset
        .records
        .iter()
        .filter_map(|r| {
            let x = r.registered_capital.filter(|v| *v > 0.0)?;
            let y = r.total_revenue.filter(|v| *v > 0.0)?;
            Some(ScatterPoint {
                name: r.company_name.clone(),
                x,
                y,
                size: SIZE_SENTINEL,
                group: r.entity_type.label().to_string(),
            })
        })
        .collect()
}

/// Points sized by `size`. An unknown size is drawn with [`SIZE_SENTINEL`];
/// a zero or negative size drops the point from this chart only.
pub fn sized_points(dataset: &Dataset, x: Metric, y: Metric, size: Metric) -> Vec<ScatterPoint> {
    dataset
        .records
        .iter()
        .filter_map(|r| {
            let size = match size.of(r) {
                None => SIZE_SENTINEL,
                Some(v) if v > 0.0 => v,
                Some(_) => return None,
            };
            Some(ScatterPoint {
                name: r.company_name.clone(),
                x: x.of(r)?,
                y: y.of(r)?,
                size,
                group: r.grade.clone().unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect()
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
