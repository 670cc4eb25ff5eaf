use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Field – canonical column positions of the registry export
// ---------------------------------------------------------------------------

/// Canonical fields, in the order they appear in the export. Source headers
/// are unreliable, so the n-th source column is always the n-th `Field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    Sequence,
    MarkerLimited,
    MarkerPartnership,
    MarkerPublic,
    MarkerJointVenture,
    CompanyName,
    RegistrationYear,
    RegisteredCapital,
    TotalRevenue,
    NetProfit,
    Pct1,
    Pct2,
    Pct3,
    Pct4,
    ScoreTotal,
    Grade,
}

impl Field {
    /// Positional order used for column resolution.
    pub const ORDER: [Field; 16] = [
        Field::Sequence,
        Field::MarkerLimited,
        Field::MarkerPartnership,
        Field::MarkerPublic,
        Field::MarkerJointVenture,
        Field::CompanyName,
        Field::RegistrationYear,
        Field::RegisteredCapital,
        Field::TotalRevenue,
        Field::NetProfit,
        Field::Pct1,
        Field::Pct2,
        Field::Pct3,
        Field::Pct4,
        Field::ScoreTotal,
        Field::Grade,
    ];

    /// Zero-based source column this field is read from.
    pub fn position(self) -> usize {
        Field::ORDER
            .iter()
            .position(|f| *f == self)
            .unwrap_or(usize::MAX)
    }

    /// Column label as used in the export and the data table.
    pub fn label(self) -> &'static str {
        match self {
            Field::Sequence => "ลำดับ",
            Field::MarkerLimited => "บจก",
            Field::MarkerPartnership => "หจก",
            Field::MarkerPublic => "บมจ",
            Field::MarkerJointVenture => "JV",
            Field::CompanyName => "บริษัท",
            Field::RegistrationYear => "ปีจดทะเบียน",
            Field::RegisteredCapital => "ทุนจดทะเบียน",
            Field::TotalRevenue => "รายได้รวม",
            Field::NetProfit => "กำไรสุทธิ",
            Field::Pct1 => "pct1",
            Field::Pct2 => "pct2",
            Field::Pct3 => "pct3",
            Field::Pct4 => "pct4",
            Field::ScoreTotal => "รวมคะแนน",
            Field::Grade => "เกรด",
        }
    }
}

// ---------------------------------------------------------------------------
// EntityType – derived legal form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EntityType {
    LimitedCompany,
    Partnership,
    PublicCompany,
    JointVenture,
    Other,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::LimitedCompany,
        EntityType::Partnership,
        EntityType::PublicCompany,
        EntityType::JointVenture,
        EntityType::Other,
    ];

    /// Display label used on charts and in the table.
    pub fn label(self) -> &'static str {
        match self {
            EntityType::LimitedCompany => "บจก.",
            EntityType::Partnership => "หจก.",
            EntityType::PublicCompany => "บมจ.",
            EntityType::JointVenture => "JV",
            EntityType::Other => "อื่นๆ",
        }
    }

    /// Accepts either the display label or the variant name (any case).
    pub fn parse(s: &str) -> Option<EntityType> {
        let s = s.trim();
        EntityType::ALL.into_iter().find(|t| {
            t.label() == s || format!("{t:?}").eq_ignore_ascii_case(s)
        })
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one normalized company row
// ---------------------------------------------------------------------------

/// A single company. Numeric fields are `None` when the source cell was
/// empty or not a number; `None` means unknown, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub sequence_no: Option<String>,
    pub company_name: String,
    /// Buddhist-calendar year.
    pub registration_year: Option<f64>,
    /// Millions.
    pub registered_capital: Option<f64>,
    /// Millions.
    pub total_revenue: Option<f64>,
    /// Millions.
    pub net_profit: Option<f64>,
    pub score_total: Option<f64>,
    pub grade: Option<String>,
    pub entity_type: EntityType,
}

impl Record {
    /// Minimal record, mostly useful for building fixtures.
    pub fn new(company_name: impl Into<String>, entity_type: EntityType) -> Self {
        Record {
            sequence_no: None,
            company_name: company_name.into(),
            registration_year: None,
            registered_capital: None,
            total_revenue: None,
            net_profit: None,
            score_total: None,
            grade: None,
            entity_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – one immutable snapshot
// ---------------------------------------------------------------------------

/// The normalized dataset produced by one loader run, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Canonical fields the source actually carried.
    pub columns: BTreeSet<Field>,
    /// Label of the encoding the raw bytes were decoded with. Empty when the
    /// dataset was built from text or records that were never decoded.
    pub encoding: String,
}

impl Dataset {
    /// Build a dataset whose column set covers every canonical field.
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset {
            records,
            columns: Field::ORDER.into_iter().collect(),
            encoding: String::new(),
        }
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record with exactly this name. Names are not unique, so callers
    /// selecting "a company" by name may get several rows back.
    pub fn find_by_name(&self, name: &str) -> Vec<&Record> {
        let name = name.trim();
        self.records
            .iter()
            .filter(|r| r.company_name == name)
            .collect()
    }
}
