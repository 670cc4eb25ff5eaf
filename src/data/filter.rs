use std::collections::BTreeSet;

use super::model::{Dataset, EntityType, Record};

// ---------------------------------------------------------------------------
// Search filter: free text plus facets
// ---------------------------------------------------------------------------

/// Search and facet selection for the company table.
///
/// Every part is optional. Empty text and empty facet sets impose no
/// constraint, so `SearchFilter::default()` matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// Case-insensitive substring of the company name.
    pub text: Option<String>,
    pub entity_types: BTreeSet<EntityType>,
    pub grades: BTreeSet<String>,
    pub min_revenue: Option<f64>,
    pub min_capital: Option<f64>,
}

impl SearchFilter {
    /// Whether a single record passes every active constraint.
    ///
    /// * text → name contains it, ignoring case
    /// * entity types → record type is selected
    /// * grades → record has a grade and it is selected
    /// * minimums → value is known and `>=` the minimum
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(needle) = self.needle() {
            if !record.company_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if !self.entity_types.is_empty() && !self.entity_types.contains(&record.entity_type) {
            return false;
        }
        if !self.grades.is_empty() {
            match &record.grade {
                Some(grade) if self.grades.contains(grade) => {}
                _ => return false,
            }
        }
        at_least(record.total_revenue, self.min_revenue)
            && at_least(record.registered_capital, self.min_capital)
    }

    /// Lowercased search text. Whitespace-only text is no constraint; any
    /// other text is matched as typed, surrounding spaces included.
    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_lowercase)
    }

    /// True when nothing is constrained.
    pub fn is_empty(&self) -> bool {
        self.needle().is_none()
            && self.entity_types.is_empty()
            && self.grades.is_empty()
            && self.min_revenue.is_none()
            && self.min_capital.is_none()
    }
}

/// A missing value never satisfies a minimum.
fn at_least(value: Option<f64>, minimum: Option<f64>) -> bool {
    match minimum {
        None => true,
        Some(min) => value.is_some_and(|v| v >= min),
    }
}

/// Return indices of records passing the filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filter: &SearchFilter) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Like [`filtered_indices`] but returns the records themselves.
pub fn filter_records<'a>(dataset: &'a Dataset, filter: &SearchFilter) -> Vec<&'a Record> {
    dataset.records.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct grade values present, for building the grade facet.
pub fn grade_options(dataset: &Dataset) -> BTreeSet<String> {
    dataset
        .records
        .iter()
        .filter_map(|r| r.grade.clone())
        .collect()
}

/// Entity types present, in first-seen order.
pub fn entity_type_options(dataset: &Dataset) -> Vec<EntityType> {
    let mut seen = Vec::new();
    for r in &dataset.records {
        if !seen.contains(&r.entity_type) {
            seen.push(r.entity_type);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, t: EntityType, revenue: Option<f64>, capital: Option<f64>, grade: Option<&str>) -> Record {
        Record {
            total_revenue: revenue,
            registered_capital: capital,
            grade: grade.map(str::to_string),
            ..Record::new(name, t)
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record("Siam Builders", EntityType::LimitedCompany, Some(100.0), Some(5.0), Some("A++")),
            record("Chiang Mai Works", EntityType::Partnership, None, Some(1.0), Some("B")),
            record("siam steel", EntityType::PublicCompany, Some(10.0), None, None),
            record("Delta JV", EntityType::JointVenture, Some(50.0), Some(20.0), Some("A++")),
        ])
    }

    #[test]
    fn default_filter_matches_everything() {
        let ds = sample();
        assert!(SearchFilter::default().is_empty());
        assert_eq!(filtered_indices(&ds, &SearchFilter::default()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn text_is_case_insensitive_substring() {
        let ds = sample();
        let f = SearchFilter {
            text: Some("SIAM".into()),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0, 2]);
    }

    #[test]
    fn blank_text_is_ignored() {
        let ds = sample();
        let f = SearchFilter {
            text: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f).len(), 4);
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_text() {
        let ds = Dataset::from_records(vec![
            record("Acme Co", EntityType::Other, None, None, None),
            record("AcmeCo Ltd", EntityType::Other, None, None, None),
        ]);
        let f = SearchFilter {
            text: Some(" Co".into()),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0]);
    }

    #[test]
    fn facets_combine() {
        let ds = sample();
        let f = SearchFilter {
            entity_types: [EntityType::LimitedCompany, EntityType::JointVenture].into(),
            grades: ["A++".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0, 3]);
    }

    #[test]
    fn missing_grade_fails_active_grade_facet() {
        let ds = sample();
        let f = SearchFilter {
            grades: ["A++".to_string(), "B".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0, 1, 3]);
    }

    #[test]
    fn null_never_meets_minimum() {
        let ds = sample();
        let f = SearchFilter {
            min_revenue: Some(0.0),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0, 2, 3]);

        let f = SearchFilter {
            min_capital: Some(5.0),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &f), vec![0, 3]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let ds = sample();
        let f = SearchFilter {
            text: Some("nothing like this".into()),
            ..Default::default()
        };
        assert!(filter_records(&ds, &f).is_empty());
    }

    #[test]
    fn options_reflect_data() {
        let ds = sample();
        assert_eq!(
            grade_options(&ds).into_iter().collect::<Vec<_>>(),
            vec!["A++".to_string(), "B".to_string()]
        );
        assert_eq!(entity_type_options(&ds).len(), 4);
    }
}
