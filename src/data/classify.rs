use super::model::{EntityType, Field};

/// Raw legal-form marker cells of one source row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers<'a> {
    pub limited: Option<&'a str>,
    pub partnership: Option<&'a str>,
    pub public: Option<&'a str>,
    pub joint_venture: Option<&'a str>,
}

impl<'a> Markers<'a> {
    fn get(&self, field: Field) -> Option<&'a str> {
        match field {
            Field::MarkerLimited => self.limited,
            Field::MarkerPartnership => self.partnership,
            Field::MarkerPublic => self.public,
            Field::MarkerJointVenture => self.joint_venture,
            _ => None,
        }
    }
}

/// One classification rule: if the trimmed marker cell equals any alias,
/// the row gets `outcome`.
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub marker: Field,
    pub aliases: &'static [&'static str],
    pub outcome: EntityType,
}

/// Rules in priority order; the first match wins.
pub const RULES: [MarkerRule; 4] = [
    MarkerRule {
        marker: Field::MarkerLimited,
        aliases: &["บจก.", "บจก"],
        outcome: EntityType::LimitedCompany,
    },
    MarkerRule {
        marker: Field::MarkerPartnership,
        aliases: &["หจก.", "หจก"],
        outcome: EntityType::Partnership,
    },
    MarkerRule {
        marker: Field::MarkerPublic,
        aliases: &["บมจ.", "บมจ"],
        outcome: EntityType::PublicCompany,
    },
    MarkerRule {
        marker: Field::MarkerJointVenture,
        aliases: &["JV"],
        outcome: EntityType::JointVenture,
    },
];

/// Classify a row by its marker cells. Total: unmatched rows are `Other`.
pub fn classify(markers: &Markers<'_>) -> EntityType {
    classify_with(&RULES, markers)
}

pub fn classify_with(rules: &[MarkerRule], markers: &Markers<'_>) -> EntityType {
    rules
        .iter()
        .find(|rule| {
            markers
                .get(rule.marker)
                .map(str::trim)
                .is_some_and(|cell| rule.aliases.contains(&cell))
        })
        .map(|rule| rule.outcome)
        .unwrap_or(EntityType::Other)
}
