use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{Dataset, EntityType, Field, Record};

/// Grade shown on the headline metric tile.
pub const TOP_GRADE: &str = "A++";

// ---------------------------------------------------------------------------
// Null-aware statistics
// ---------------------------------------------------------------------------

/// Sum of the known values; zero when none are known.
pub fn sum_known<I: IntoIterator<Item = Option<f64>>>(values: I) -> f64 {
    values.into_iter().flatten().sum()
}

/// Mean of the known values; `None` ("not applicable") when none are known.
pub fn mean_known<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Overview tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub companies: usize,
    pub revenue_sum: f64,
    pub revenue_mean: Option<f64>,
    /// `None` when the source has no grade column.
    pub top_grade_count: Option<usize>,
}

pub fn overview(dataset: &Dataset) -> Overview {
    let revenue = || dataset.records.iter().map(|r| r.total_revenue);
    let top_grade_count = dataset.has(Field::Grade).then(|| {
        dataset
            .records
            .iter()
            .filter(|r| r.grade.as_deref() == Some(TOP_GRADE))
            .count()
    });
    Overview {
        companies: dataset.len(),
        revenue_sum: sum_known(revenue()),
        revenue_mean: mean_known(revenue()),
        top_grade_count,
    }
}

// ---------------------------------------------------------------------------
// By entity type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub entity_type: EntityType,
    pub count: usize,
    pub revenue_sum: f64,
    pub revenue_mean: Option<f64>,
    pub capital_mean: Option<f64>,
}

/// One row per entity type, all five always present, in [`EntityType::ALL`] order.
pub fn type_breakdown(dataset: &Dataset) -> Vec<TypeSummary> {
    EntityType::ALL
        .into_iter()
        .map(|t| {
            let rows: Vec<&Record> = dataset.records.iter().filter(|r| r.entity_type == t).collect();
            TypeSummary {
                entity_type: t,
                count: rows.len(),
                revenue_sum: sum_known(rows.iter().map(|r| r.total_revenue)),
                revenue_mean: mean_known(rows.iter().map(|r| r.total_revenue)),
                capital_mean: mean_known(rows.iter().map(|r| r.registered_capital)),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// By grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub grade: String,
    pub count: usize,
    pub revenue_mean: Option<f64>,
    pub capital_mean: Option<f64>,
}

/// Per-grade summary, ordered by grade. `None` when the source has no grade
/// column; records with an empty grade are left out.
pub fn grade_breakdown(dataset: &Dataset) -> Option<Vec<GradeSummary>> {
    if !dataset.has(Field::Grade) {
        return None;
    }
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for r in &dataset.records {
        if let Some(grade) = r.grade.as_deref() {
            groups.entry(grade).or_default().push(r);
        }
    }
    Some(
        groups
            .into_iter()
            .map(|(grade, rows)| GradeSummary {
                grade: grade.to_string(),
                count: rows.len(),
                revenue_mean: mean_known(rows.iter().map(|r| r.total_revenue)),
                capital_mean: mean_known(rows.iter().map(|r| r.registered_capital)),
            })
            .collect(),
    )
}

/// Count per grade value (records without a grade skipped).
pub fn grade_counts(dataset: &Dataset) -> Option<BTreeMap<String, usize>> {
    grade_breakdown(dataset).map(|rows| rows.into_iter().map(|g| (g.grade, g.count)).collect())
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// The `n` highest-revenue records. Unknown revenue is excluded; equal
/// revenues keep dataset order.
pub fn top_by_revenue(dataset: &Dataset, n: usize) -> Vec<&Record> {
    let mut ranked: Vec<(&Record, f64)> = dataset
        .records
        .iter()
        .filter_map(|r| r.total_revenue.map(|v| (r, v)))
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(r, _)| r).collect()
}

// ---------------------------------------------------------------------------
// By era
// ---------------------------------------------------------------------------

/// Founding-period bands over Buddhist-calendar years, each `(low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EraBucket {
    Before2520,
    From2520To2539,
    From2540To2559,
    From2560,
}

impl EraBucket {
    pub const ALL: [EraBucket; 4] = [
        EraBucket::Before2520,
        EraBucket::From2520To2539,
        EraBucket::From2540To2559,
        EraBucket::From2560,
    ];

    /// Exclusive lower and inclusive upper year.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            EraBucket::Before2520 => (2499.0, 2519.0),
            EraBucket::From2520To2539 => (2519.0, 2539.0),
            EraBucket::From2540To2559 => (2539.0, 2559.0),
            EraBucket::From2560 => (2559.0, 2570.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EraBucket::Before2520 => "ก่อน2520",
            EraBucket::From2520To2539 => "2520-2539",
            EraBucket::From2540To2559 => "2540-2559",
            EraBucket::From2560 => "2560+",
        }
    }

    /// Bucket for a year, or `None` outside (2499, 2570]. Fractional years
    /// are bounded as they are, so 2519.5 lands in 2520-2539.
    pub fn for_year(year: f64) -> Option<EraBucket> {
        EraBucket::ALL.into_iter().find(|b| {
            let (low, high) = b.bounds();
            year > low && year <= high
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EraSummary {
    pub era: EraBucket,
    pub count: usize,
    pub revenue_mean: Option<f64>,
    pub capital_mean: Option<f64>,
}

/// All four eras in order. Records without a year, or with a year outside
/// every band, appear in none of them.
pub fn era_breakdown(dataset: &Dataset) -> Vec<EraSummary> {
    let assigned: Vec<(EraBucket, &Record)> = dataset
        .records
        .iter()
        .filter_map(|r| {
            r.registration_year
                .and_then(EraBucket::for_year)
                .map(|b| (b, r))
        })
        .collect();
    EraBucket::ALL
        .into_iter()
        .map(|era| {
            let rows: Vec<&Record> = assigned
                .iter()
                .filter(|(b, _)| *b == era)
                .map(|(_, r)| *r)
                .collect();
            EraSummary {
                era,
                count: rows.len(),
                revenue_mean: mean_known(rows.iter().map(|r| r.total_revenue)),
                capital_mean: mean_known(rows.iter().map(|r| r.registered_capital)),
            }
        })
        .collect()
}

/// Which era each record falls in, parallel to `dataset.records`.
pub fn era_assignments(dataset: &Dataset) -> Vec<Option<EraBucket>> {
    dataset
        .records
        .iter()
        .map(|r| r.registration_year.and_then(EraBucket::for_year))
        .collect()
}

// ---------------------------------------------------------------------------
// Chronology
// ---------------------------------------------------------------------------

/// Registrations per distinct year value, ascending; records without a
/// year skipped.
pub fn registrations_per_year(dataset: &Dataset) -> Vec<(f64, usize)> {
    let mut years: Vec<f64> = dataset.records.iter().filter_map(|r| r.registration_year).collect();
    years.sort_by(f64::total_cmp);
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for year in years {
        match counts.last_mut() {
            Some((last, n)) if *last == year => *n += 1,
            _ => counts.push((year, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, t: EntityType, year: Option<f64>, revenue: Option<f64>, capital: Option<f64>) -> Record {
        Record {
            registration_year: year,
            total_revenue: revenue,
            registered_capital: capital,
            ..Record::new(name, t)
        }
    }

    #[test]
    fn means_skip_unknowns_and_empty_is_none() {
        assert_eq!(mean_known([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean_known([None, None]), None);
        assert_eq!(mean_known(std::iter::empty()), None);
        assert_eq!(sum_known([None, Some(1.5)]), 1.5);
    }

    #[test]
    fn type_breakdown_lists_all_five() {
        let ds = Dataset::from_records(vec![
            rec("Aaa", EntityType::LimitedCompany, None, Some(10.0), Some(2.0)),
            rec("Bbb", EntityType::LimitedCompany, None, None, Some(4.0)),
        ]);
        let rows = type_breakdown(&ds);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].entity_type, EntityType::LimitedCompany);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].revenue_sum, 10.0);
        assert_eq!(rows[0].revenue_mean, Some(10.0));
        assert_eq!(rows[0].capital_mean, Some(3.0));
        assert!(rows[1..].iter().all(|r| r.count == 0 && r.revenue_mean.is_none()));
    }

    #[test]
    fn grade_breakdown_not_applicable_without_column() {
        let mut ds = Dataset::from_records(vec![rec("Aaa", EntityType::Other, None, None, None)]);
        ds.columns.remove(&Field::Grade);
        assert!(grade_breakdown(&ds).is_none());
        assert_eq!(overview(&ds).top_grade_count, None);
    }

    #[test]
    fn grade_breakdown_groups_and_skips_missing() {
        let mut a = rec("Aaa", EntityType::Other, None, Some(10.0), None);
        a.grade = Some("A++".into());
        let mut b = rec("Bbb", EntityType::Other, None, Some(20.0), Some(1.0));
        b.grade = Some("A++".into());
        let mut c = rec("Ccc", EntityType::Other, None, None, None);
        c.grade = Some("B".into());
        let d = rec("Ddd", EntityType::Other, None, Some(1.0), None);
        let ds = Dataset::from_records(vec![a, b, c, d]);

        let rows = grade_breakdown(&ds).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].grade, "A++");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].revenue_mean, Some(15.0));
        assert_eq!(rows[0].capital_mean, Some(1.0));
        assert_eq!(rows[1].grade, "B");
        assert_eq!(rows[1].revenue_mean, None);
        assert_eq!(overview(&ds).top_grade_count, Some(2));
    }

    #[test]
    fn top_n_excludes_null_and_is_stable() {
        let ds = Dataset::from_records(vec![
            rec("First Tie", EntityType::Other, None, Some(50.0), None),
            rec("No Revenue", EntityType::Other, None, None, None),
            rec("Biggest", EntityType::Other, None, Some(90.0), None),
            rec("Second Tie", EntityType::Other, None, Some(50.0), None),
            rec("Small", EntityType::Other, None, Some(-5.0), None),
        ]);
        let names: Vec<_> = top_by_revenue(&ds, 10).iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["Biggest", "First Tie", "Second Tie", "Small"]);
        assert_eq!(top_by_revenue(&ds, 2).len(), 2);
        assert!(top_by_revenue(&ds, 0).is_empty());
    }

    #[test]
    fn era_bounds_are_left_open_right_closed() {
        assert_eq!(EraBucket::for_year(2499.0), None);
        assert_eq!(EraBucket::for_year(2500.0), Some(EraBucket::Before2520));
        assert_eq!(EraBucket::for_year(2519.0), Some(EraBucket::Before2520));
        assert_eq!(EraBucket::for_year(2520.0), Some(EraBucket::From2520To2539));
        assert_eq!(EraBucket::for_year(2539.0), Some(EraBucket::From2520To2539));
        assert_eq!(EraBucket::for_year(2559.0), Some(EraBucket::From2540To2559));
        assert_eq!(EraBucket::for_year(2560.0), Some(EraBucket::From2560));
        assert_eq!(EraBucket::for_year(2570.0), Some(EraBucket::From2560));
        assert_eq!(EraBucket::for_year(2571.0), None);
    }

    #[test]
    fn fractional_years_fall_inside_their_band() {
        assert_eq!(EraBucket::for_year(2519.5), Some(EraBucket::From2520To2539));
        assert_eq!(EraBucket::for_year(2530.5), Some(EraBucket::From2520To2539));
        assert_eq!(EraBucket::for_year(2499.5), Some(EraBucket::Before2520));
        assert_eq!(EraBucket::for_year(2570.5), None);
    }

    #[test]
    fn era_breakdown_excludes_null_years() {
        let ds = Dataset::from_records(vec![
            rec("Aaa", EntityType::Other, Some(2519.0), Some(10.0), None),
            rec("Bbb", EntityType::Other, None, Some(99.0), None),
            rec("Ccc", EntityType::Other, Some(2520.0), Some(30.0), Some(3.0)),
        ]);
        let eras = era_breakdown(&ds);
        assert_eq!(eras.len(), 4);
        assert_eq!(eras[0].count, 1);
        assert_eq!(eras[0].revenue_mean, Some(10.0));
        assert_eq!(eras[1].count, 1);
        assert_eq!(eras[1].capital_mean, Some(3.0));
        assert_eq!(eras.iter().map(|e| e.count).sum::<usize>(), 2);
        assert_eq!(era_assignments(&ds)[1], None);
    }

    #[test]
    fn registrations_counted_per_year() {
        let ds = Dataset::from_records(vec![
            rec("Aaa", EntityType::Other, Some(2540.0), None, None),
            rec("Bbb", EntityType::Other, Some(2530.0), None, None),
            rec("Ccc", EntityType::Other, Some(2540.0), None, None),
            rec("Ddd", EntityType::Other, None, None, None),
            rec("Eee", EntityType::Other, Some(2530.5), None, None),
        ]);
        assert_eq!(
            registrations_per_year(&ds),
            vec![(2530.0, 1), (2530.5, 1), (2540.0, 2)]
        );
    }

    #[test]
    fn empty_dataset_is_total() {
        let ds = Dataset::from_records(Vec::new());
        let o = overview(&ds);
        assert_eq!(o.companies, 0);
        assert_eq!(o.revenue_sum, 0.0);
        assert_eq!(o.revenue_mean, None);
        assert_eq!(o.top_grade_count, Some(0));
        assert!(top_by_revenue(&ds, 5).is_empty());
        assert_eq!(grade_breakdown(&ds), Some(Vec::new()));
        assert!(era_breakdown(&ds).iter().all(|e| e.count == 0));
    }
}
