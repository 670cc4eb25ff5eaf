use super::model::{Dataset, Field, Record};

/// A column of the company table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Sequence,
    EntityType,
    CompanyName,
    RegistrationYear,
    RegisteredCapital,
    TotalRevenue,
    NetProfit,
    ScoreTotal,
    Grade,
}

/// Preferred display order; columns the source lacks are dropped from it.
pub const PREFERRED_ORDER: [Column; 9] = [
    Column::Sequence,
    Column::EntityType,
    Column::CompanyName,
    Column::RegistrationYear,
    Column::RegisteredCapital,
    Column::TotalRevenue,
    Column::NetProfit,
    Column::ScoreTotal,
    Column::Grade,
];

impl Column {
    /// Source field backing the column; `None` for the derived entity type.
    pub fn field(self) -> Option<Field> {
        match self {
            Column::Sequence => Some(Field::Sequence),
            Column::EntityType => None,
            Column::CompanyName => Some(Field::CompanyName),
            Column::RegistrationYear => Some(Field::RegistrationYear),
            Column::RegisteredCapital => Some(Field::RegisteredCapital),
            Column::TotalRevenue => Some(Field::TotalRevenue),
            Column::NetProfit => Some(Field::NetProfit),
            Column::ScoreTotal => Some(Field::ScoreTotal),
            Column::Grade => Some(Field::Grade),
        }
    }

    pub fn label(self) -> &'static str {
        match self.field() {
            Some(field) => field.label(),
            None => "ประเภท",
        }
    }

    /// Cell text; unknown values render as an empty string.
    pub fn cell(self, r: &Record) -> String {
        match self {
            Column::Sequence => r.sequence_no.clone().unwrap_or_default(),
            Column::EntityType => r.entity_type.label().to_string(),
            Column::CompanyName => r.company_name.clone(),
            Column::RegistrationYear => r.registration_year.map(|y| y.to_string()).unwrap_or_default(),
            Column::RegisteredCapital => number(r.registered_capital),
            Column::TotalRevenue => number(r.total_revenue),
            Column::NetProfit => number(r.net_profit),
            Column::ScoreTotal => number(r.score_total),
            Column::Grade => r.grade.clone().unwrap_or_default(),
        }
    }
}

fn number(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Table projection of a set of rows, ready for display or export.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.label()).collect()
    }
}

/// Columns of [`PREFERRED_ORDER`] the dataset can fill.
pub fn table_columns(dataset: &Dataset) -> Vec<Column> {
    PREFERRED_ORDER
        .into_iter()
        .filter(|c| c.field().map_or(true, |f| dataset.has(f)))
        .collect()
}

/// Project the rows at `indices` (as returned by the filter) into a table.
pub fn table_view(dataset: &Dataset, indices: &[usize]) -> TableView {
    let columns = table_columns(dataset);
    let rows = indices
        .iter()
        .filter_map(|&i| dataset.records.get(i))
        .map(|r| columns.iter().map(|c| c.cell(r)).collect())
        .collect();
    TableView { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EntityType;

    #[test]
    fn missing_source_columns_are_omitted() {
        let mut ds = Dataset::from_records(vec![Record::new("Acme Co", EntityType::Partnership)]);
        ds.columns.remove(&Field::Grade);
        ds.columns.remove(&Field::ScoreTotal);
        let cols = table_columns(&ds);
        assert_eq!(cols.len(), 7);
        assert_eq!(cols[1], Column::EntityType);
        assert!(!cols.contains(&Column::Grade));
    }

    #[test]
    fn cells_follow_columns_and_indices() {
        let mut a = Record::new("Acme Co", EntityType::Partnership);
        a.total_revenue = Some(12.5);
        a.registration_year = Some(2545.0);
        let b = Record::new("Beta Co", EntityType::Other);
        let ds = Dataset::from_records(vec![a, b]);
        let view = table_view(&ds, &[1, 0, 99]);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.headers()[2], "บริษัท");
        assert_eq!(view.rows[0][2], "Beta Co");
        assert_eq!(view.rows[1][1], "หจก.");
        assert_eq!(view.rows[1][3], "2545");
        assert_eq!(view.rows[1][5], "12.5");
        assert_eq!(view.rows[0][5], "");
    }
}
