use std::collections::BTreeSet;

use csv::StringRecord;
use log::{debug, info};

use super::classify::{classify, Markers};
use super::model::{Dataset, Field, Record};
use super::source::{decode, fetch_bytes, Source};
use crate::config::SourceConfig;
use crate::error::LoadError;

/// Company-name values that are really missing data or a repeated header.
pub const PLACEHOLDER_NAMES: [&str; 3] = ["nan", "None", "บริษัท"];

/// Header columns needed before the company name can be located.
pub const REQUIRED_COLUMNS: usize = 6;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch, decode and normalize the configured source.
pub fn load(config: &SourceConfig) -> Result<Dataset, LoadError> {
    let source = Source::parse(&config.source);
    let (primary, fallback) = config
        .encodings()
        .map_err(|e| LoadError::unavailable(source.id(), e))?;
    let bytes = fetch_bytes(&source, config.fetch_timeout())?;
    let (text, encoding) = decode(&source.id(), &bytes, primary, fallback)?;
    let mut dataset = parse_registry(&text)?;
    dataset.encoding = encoding.name().to_string();
    info!(
        "loaded {} companies from {source} ({}, {} columns)",
        dataset.len(),
        dataset.encoding,
        dataset.columns.len()
    );
    Ok(dataset)
}

/// Normalize already-decoded export text. The returned dataset has no
/// encoding label; [`load`] fills it in after decoding.
///
/// Layout: row 1 is a banner and is skipped, row 2 is the header, data
/// follows. Columns are resolved by position against [`Field::ORDER`].
pub fn parse_registry(text: &str) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = reader.records();

    // Banner row. A source that cannot even produce it has no header either.
    let _banner = rows.next();
    let header = match rows.next() {
        Some(Ok(header)) => header,
        Some(Err(e)) => {
            debug!("unreadable header row: {e}");
            return Err(LoadError::SchemaUnrecoverable {
                columns: 0,
                required: REQUIRED_COLUMNS,
            });
        }
        None => {
            return Err(LoadError::SchemaUnrecoverable {
                columns: 0,
                required: REQUIRED_COLUMNS,
            })
        }
    };

    let columns = resolve_columns(header.len());
    if !columns.contains(&Field::CompanyName) {
        return Err(LoadError::SchemaUnrecoverable {
            columns: header.len(),
            required: REQUIRED_COLUMNS,
        });
    }
    let header_name = header
        .get(Field::CompanyName.position())
        .unwrap_or("")
        .trim()
        .to_string();

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (row_no, result) in rows.enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!("data row {row_no}: skipped unreadable row: {e}");
                dropped += 1;
                continue;
            }
        };
        match normalize_row(&row, &columns, &header_name) {
            Some(record) => records.push(record),
            None => {
                debug!("data row {row_no}: dropped, no usable company name");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        info!("dropped {dropped} row(s) without a usable company name");
    }

    Ok(Dataset {
        records,
        columns,
        encoding: String::new(),
    })
}

/// The canonical fields covered by a header of `width` columns.
pub fn resolve_columns(width: usize) -> BTreeSet<Field> {
    Field::ORDER.into_iter().take(width).collect()
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

fn normalize_row(row: &StringRecord, columns: &BTreeSet<Field>, header_name: &str) -> Option<Record> {
    let cell = |field: Field| cell_at(row, columns, field);

    let company_name = cell(Field::CompanyName)?.trim();
    if !is_valid_name(company_name, header_name) {
        return None;
    }

    let markers = Markers {
        limited: cell(Field::MarkerLimited),
        partnership: cell(Field::MarkerPartnership),
        public: cell(Field::MarkerPublic),
        joint_venture: cell(Field::MarkerJointVenture),
    };

    Some(Record {
        sequence_no: cell(Field::Sequence).and_then(non_empty),
        company_name: company_name.to_string(),
        registration_year: cell(Field::RegistrationYear).and_then(parse_number),
        registered_capital: cell(Field::RegisteredCapital).and_then(parse_number),
        total_revenue: cell(Field::TotalRevenue).and_then(parse_number),
        net_profit: cell(Field::NetProfit).and_then(parse_number),
        score_total: cell(Field::ScoreTotal).and_then(parse_number),
        grade: cell(Field::Grade).and_then(non_empty),
        entity_type: classify(&markers),
    })
}

fn cell_at<'r>(row: &'r StringRecord, columns: &BTreeSet<Field>, field: Field) -> Option<&'r str> {
    if !columns.contains(&field) {
        return None;
    }
    row.get(field.position())
}

/// Trimmed name is longer than two characters and not a placeholder.
pub fn is_valid_name(trimmed: &str, header_name: &str) -> bool {
    trimmed.chars().count() > 2
        && !PLACEHOLDER_NAMES.contains(&trimmed)
        && (header_name.is_empty() || trimmed != header_name)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Finite number or `None`. "nan"/"inf" spellings count as unparsable.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EntityType;

    const HEADER: &str = "ลำดับ,บจก,หจก,บมจ,JV,บริษัท,ปีจดทะเบียน,ทุนจดทะเบียน,รายได้รวม,กำไรสุทธิ,p1,p2,p3,p4,รวมคะแนน,เกรด";

    fn export(rows: &[&str]) -> String {
        let mut text = format!("รายชื่อลูกค้า ปี 68\n{HEADER}\n");
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        text
    }

    #[test]
    fn full_row_is_typed_and_classified() {
        let ds = parse_registry(&export(&[
            "1,บจก.,,,,ทดสอบ ก่อสร้าง,2530,5,120.5,10,1,2,3,4,88,A++",
        ]))
        .unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.sequence_no.as_deref(), Some("1"));
        assert_eq!(r.company_name, "ทดสอบ ก่อสร้าง");
        assert_eq!(r.registration_year, Some(2530.0));
        assert_eq!(r.registered_capital, Some(5.0));
        assert_eq!(r.total_revenue, Some(120.5));
        assert_eq!(r.net_profit, Some(10.0));
        assert_eq!(r.score_total, Some(88.0));
        assert_eq!(r.grade.as_deref(), Some("A++"));
        assert_eq!(r.entity_type, EntityType::LimitedCompany);
        assert!(ds.has(Field::Grade));
    }

    #[test]
    fn header_names_are_ignored() {
        let text = "banner\na,b,c,d,e,f,g,h,i\n7,,หจก,,,Some Name,2540,1,2\n";
        let ds = parse_registry(text).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.company_name, "Some Name");
        assert_eq!(r.entity_type, EntityType::Partnership);
        assert_eq!(r.total_revenue, Some(2.0));
        assert!(!ds.has(Field::NetProfit));
        assert!(!ds.has(Field::Grade));
        assert_eq!(r.net_profit, None);
    }

    #[test]
    fn invalid_names_are_dropped() {
        let ds = parse_registry(&export(&[
            "1,,,,,,2530,1,1,1,,,,,,",
            "2,,,,,  ab  ,2530,1,1,1,,,,,,",
            "3,,,,,nan,2530,1,1,1,,,,,,",
            "4,,,,,None,2530,1,1,1,,,,,,",
            "5,,,,,บริษัท,2530,1,1,1,,,,,,",
            "6,,,,,  abc  ,2530,1,1,1,,,,,,",
        ]))
        .unwrap();
        let names: Vec<_> = ds.records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["abc"]);
    }

    #[test]
    fn repeated_header_row_is_dropped() {
        let text = "banner\nno,m1,m2,m3,m4,Company Name,year\n1,,,,,Company Name,x\n2,,,,,Real Co,2550\n";
        let ds = parse_registry(text).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].company_name, "Real Co");
    }

    #[test]
    fn thai_name_length_counts_characters() {
        // Three characters, nine bytes.
        assert!(is_valid_name("กขค", ""));
        assert!(!is_valid_name("กข", ""));
    }

    #[test]
    fn bad_numbers_become_none() {
        let ds = parse_registry(&export(&[
            "1,,,,,Acme Co,abc,-,NaN,,,,,,inf,",
        ]))
        .unwrap();
        let r = &ds.records[0];
        assert_eq!(r.registration_year, None);
        assert_eq!(r.registered_capital, None);
        assert_eq!(r.total_revenue, None);
        assert_eq!(r.net_profit, None);
        assert_eq!(r.score_total, None);
        assert_eq!(r.grade, None);
    }

    #[test]
    fn fractional_year_is_kept_and_bucketed() {
        use crate::data::aggregate::{era_breakdown, EraBucket};

        let ds = parse_registry(&export(&["1,,,,,Frac Co,2530.5,1,10"])).unwrap();
        assert_eq!(ds.records[0].registration_year, Some(2530.5));
        let counts: Vec<_> = era_breakdown(&ds).iter().map(|e| (e.era, e.count)).collect();
        assert_eq!(
            counts,
            vec![
                (EraBucket::Before2520, 0),
                (EraBucket::From2520To2539, 1),
                (EraBucket::From2540To2559, 0),
                (EraBucket::From2560, 0),
            ]
        );
        assert_eq!(parse_number(" 2561 "), Some(2561.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
    }

    #[test]
    fn parsed_text_carries_no_encoding_label() {
        let ds = parse_registry(&export(&["1,,,,,Plain Co,2550,1,10"])).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.encoding.is_empty());
    }

    #[test]
    fn too_few_columns_is_unrecoverable() {
        let err = parse_registry("banner\na,b,c,d,e\n1,2,3,4,5\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::SchemaUnrecoverable { columns: 5, required: 6 }
        ));
    }

    #[test]
    fn missing_header_row_is_unrecoverable() {
        let err = parse_registry("only a banner\n").unwrap_err();
        assert!(matches!(err, LoadError::SchemaUnrecoverable { columns: 0, .. }));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let ds = parse_registry(&export(&["1,บจก,,,,Short Row Co"])).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.company_name, "Short Row Co");
        assert_eq!(r.total_revenue, None);
        assert_eq!(r.entity_type, EntityType::LimitedCompany);
    }

    #[test]
    fn source_order_is_kept() {
        let ds = parse_registry(&export(&[
            "1,,,,,Zeta Co,,,,,,,,,,",
            "2,,,,,Alpha Co,,,,,,,,,,",
            "3,,,,,Mid Co,,,,,,,,,,",
        ]))
        .unwrap();
        let names: Vec<_> = ds.records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["Zeta Co", "Alpha Co", "Mid Co"]);
    }
}
