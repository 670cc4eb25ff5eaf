use std::sync::Arc;

use crate::data::filter::{filtered_indices, SearchFilter};
use crate::data::model::{Dataset, EntityType, Record};
use crate::data::table::{table_view, TableView};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Per-session view state, independent of rendering.
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Snapshot being viewed (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Current search text and facets.
    pub filter: SearchFilter,

    /// Indices of records passing `filter` (cached).
    pub visible_indices: Vec<usize>,

    /// Load error shown instead of any data view.
    pub status_message: Option<String>,
}

impl DashboardState {
    /// Adopt a snapshot and re-apply the current filter to it.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.visible_indices = filtered_indices(&dataset, &self.filter);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Record a load failure. Data views are withheld until the next
    /// successful load.
    pub fn set_load_error(&mut self, message: impl Into<String>) {
        self.dataset = None;
        self.visible_indices.clear();
        self.status_message = Some(message.into());
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filter);
        }
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.filter.text = Some(text.into());
        self.refilter();
    }

    /// Toggle one entity type in the type facet.
    pub fn toggle_entity_type(&mut self, entity_type: EntityType) {
        if !self.filter.entity_types.remove(&entity_type) {
            self.filter.entity_types.insert(entity_type);
        }
        self.refilter();
    }

    /// Toggle one grade in the grade facet.
    pub fn toggle_grade(&mut self, grade: &str) {
        if !self.filter.grades.remove(grade) {
            self.filter.grades.insert(grade.to_string());
        }
        self.refilter();
    }

    pub fn set_min_revenue(&mut self, minimum: Option<f64>) {
        self.filter.min_revenue = minimum;
        self.refilter();
    }

    pub fn set_min_capital(&mut self, minimum: Option<f64>) {
        self.filter.min_capital = minimum;
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.filter = SearchFilter::default();
        self.refilter();
    }

    /// Records currently visible, in dataset order.
    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .filter_map(|&i| ds.records.get(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Table of the visible records; `None` before a successful load.
    pub fn visible_table(&self) -> Option<TableView> {
        self.dataset
            .as_ref()
            .map(|ds| table_view(ds, &self.visible_indices))
    }
}
