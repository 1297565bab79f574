use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::corpus::QuarterFile;
use crate::error::RecordSchemaError;
use crate::model::{TransactionRecord, MAX_COUNT};

/// Result of extracting one quarter file
#[derive(Debug)]
pub enum FileOutcome {
    Extracted(Vec<TransactionRecord>),
    Skipped(RecordSchemaError),
}

impl From<Result<Vec<TransactionRecord>, RecordSchemaError>> for FileOutcome {
    fn from(result: Result<Vec<TransactionRecord>, RecordSchemaError>) -> Self {
        match result {
            Ok(records) => FileOutcome::Extracted(records),
            Err(reason) => FileOutcome::Skipped(reason),
        }
    }
}

/// Region, year and quarter of a report, derived from where it sits in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub region: String,
    pub year: i32,
    pub quarter: u8,
}

impl Coordinates {
    pub fn from_quarter_file(file: &QuarterFile) -> Result<Self, RecordSchemaError> {
        Ok(Self {
            region: region_display_name(&file.region_raw),
            year: parse_year(&file.year_raw)?,
            quarter: parse_quarter(&file.path)?,
        })
    }
}

/// Read and parse one quarter file. Never fails: problems become `Skipped`.
pub fn extract_file(file: &QuarterFile) -> FileOutcome {
    read_and_parse(file).into()
}

fn read_and_parse(file: &QuarterFile) -> Result<Vec<TransactionRecord>, RecordSchemaError> {
    let coords = Coordinates::from_quarter_file(file)?;
    let text = fs::read_to_string(&file.path)?;
    parse_report(&text, &coords)
}

/// Parse a report payload into one record per transaction category.
///
/// Any entry that does not match the expected shape rejects the whole report.
pub fn parse_report(
    text: &str,
    coords: &Coordinates,
) -> Result<Vec<TransactionRecord>, RecordSchemaError> {
    let json: Value = serde_json::from_str(text)?;

    let data = json.get("data").ok_or(RecordSchemaError::MissingKey("data"))?;
    let entries = data
        .get("transactionData")
        .ok_or(RecordSchemaError::MissingKey("transactionData"))?
        .as_array()
        .ok_or(RecordSchemaError::WrongType {
            field: "transactionData",
            expected: "array",
        })?;

    entries
        .iter()
        .map(|entry| parse_entry(entry, coords))
        .collect()
}

fn parse_entry(entry: &Value, coords: &Coordinates) -> Result<TransactionRecord, RecordSchemaError> {
    let category = entry
        .get("name")
        .ok_or(RecordSchemaError::MissingKey("name"))?
        .as_str()
        .ok_or(RecordSchemaError::WrongType {
            field: "name",
            expected: "string",
        })?;

    let instruments = entry
        .get("paymentInstruments")
        .ok_or(RecordSchemaError::MissingKey("paymentInstruments"))?
        .as_array()
        .ok_or(RecordSchemaError::WrongType {
            field: "paymentInstruments",
            expected: "array",
        })?;

    // Only the first instrument is reported
    let first = instruments
        .first()
        .ok_or_else(|| RecordSchemaError::EmptyInstruments(category.to_string()))?;

    let count = first
        .get("count")
        .ok_or(RecordSchemaError::MissingKey("count"))?
        .as_u64()
        .ok_or(RecordSchemaError::WrongType {
            field: "count",
            expected: "non-negative integer",
        })?;

    if count > MAX_COUNT {
        return Err(RecordSchemaError::InvalidCount {
            category: category.to_string(),
            count,
        });
    }

    let amount = first
        .get("amount")
        .ok_or(RecordSchemaError::MissingKey("amount"))?
        .as_f64()
        .ok_or(RecordSchemaError::WrongType {
            field: "amount",
            expected: "number",
        })?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(RecordSchemaError::InvalidAmount {
            category: category.to_string(),
            amount,
        });
    }

    Ok(TransactionRecord {
        region: coords.region.clone(),
        year: coords.year,
        quarter: coords.quarter,
        category: category.to_string(),
        count,
        amount,
    })
}

/// Turn a directory segment such as `andaman-&-nicobar-islands` into
/// `Andaman & Nicobar Islands`.
pub fn region_display_name(raw: &str) -> String {
    title_case(raw).replace('-', " ")
}

/// Upper-case the first letter of every run of letters and lower-case the rest
fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            result.push(c);
            prev_letter = false;
        }
    }

    result
}

fn parse_year(raw: &str) -> Result<i32, RecordSchemaError> {
    raw.parse::<i32>()
        .ok()
        .filter(|y| (1000..=9999).contains(y))
        .ok_or_else(|| RecordSchemaError::InvalidYear(raw.to_string()))
}

fn parse_quarter(path: &Path) -> Result<u8, RecordSchemaError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.parse::<u8>()
        .ok()
        .filter(|q| (1..=4).contains(q))
        .ok_or(RecordSchemaError::InvalidQuarter(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn coords() -> Coordinates {
        Coordinates {
            region: "Maharashtra".to_string(),
            year: 2022,
            quarter: 1,
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(region_display_name("maharashtra"), "Maharashtra");
        assert_eq!(
            region_display_name("andaman-&-nicobar-islands"),
            "Andaman & Nicobar Islands"
        );
        assert_eq!(
            region_display_name("dadra-&-nagar-haveli-&-daman-&-diu"),
            "Dadra & Nagar Haveli & Daman & Diu"
        );
        assert_eq!(region_display_name("NCT-OF-DELHI"), "Nct Of Delhi");
        assert_eq!(region_display_name("jammu-and-kashmir"), "Jammu And Kashmir");
    }

    #[test]
    fn test_parse_single_category() {
        let json = r#"{"success": true, "data": {"from": 1, "transactionData": [
            {"name": "RECHARGE", "paymentInstruments": [{"type": "TOTAL", "count": 100, "amount": 5000.0}]}
        ]}}"#;
        let records = parse_report(json, &coords()).unwrap();
        assert_eq!(
            records,
            vec![TransactionRecord {
                region: "Maharashtra".into(),
                year: 2022,
                quarter: 1,
                category: "RECHARGE".into(),
                count: 100,
                amount: 5000.0,
            }]
        );
    }

    #[test]
    fn test_only_first_instrument_is_used() {
        let json = r#"{"data": {"transactionData": [
            {"name": "P2P", "paymentInstruments": [{"count": 1, "amount": 2}, {"count": 9, "amount": 9}]}
        ]}}"#;
        let records = parse_report(json, &coords()).unwrap();
        assert_eq!(records[0].count, 1);
        assert_eq!(records[0].amount, 2.0);
    }

    #[test]
    fn test_empty_transaction_data_is_valid() {
        let records = parse_report(r#"{"data": {"transactionData": []}}"#, &coords()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_instruments_rejects_file() {
        let json = r#"{"data": {"transactionData": [
            {"name": "P2P", "paymentInstruments": [{"count": 1, "amount": 2}]},
            {"name": "Others", "paymentInstruments": []}
        ]}}"#;
        assert!(matches!(
            parse_report(json, &coords()),
            Err(RecordSchemaError::EmptyInstruments(name)) if name == "Others"
        ));
    }

    #[test]
    fn test_schema_errors() {
        assert!(matches!(
            parse_report("{not json", &coords()),
            Err(RecordSchemaError::Json(_))
        ));
        assert!(matches!(
            parse_report(r#"{"data": null}"#, &coords()),
            Err(RecordSchemaError::MissingKey("transactionData"))
        ));
        assert!(matches!(
            parse_report(r#"{"data": {"transactionData": {}}}"#, &coords()),
            Err(RecordSchemaError::WrongType { field: "transactionData", .. })
        ));
        assert!(matches!(
            parse_report(
                r#"{"data": {"transactionData": [{"name": "X", "paymentInstruments": [{"count": -1, "amount": 1}]}]}}"#,
                &coords()
            ),
            Err(RecordSchemaError::WrongType { field: "count", .. })
        ));
        assert!(matches!(
            parse_report(
                r#"{"data": {"transactionData": [{"name": "X", "paymentInstruments": [{"count": 1, "amount": -3.5}]}]}}"#,
                &coords()
            ),
            Err(RecordSchemaError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_count_must_fit_in_a_signed_column() {
        let report = |count: u64| {
            format!(
                r#"{{"data": {{"transactionData": [{{"name": "Others", "paymentInstruments": [{{"count": {}, "amount": 1}}]}}]}}}}"#,
                count
            )
        };

        assert!(matches!(
            parse_report(&report(10_000_000_000_000_000_000), &coords()),
            Err(RecordSchemaError::InvalidCount { count: 10_000_000_000_000_000_000, .. })
        ));

        let records = parse_report(&report(MAX_COUNT), &coords()).unwrap();
        assert_eq!(records[0].count, MAX_COUNT);
    }

    #[test]
    fn test_coordinates_from_path() {
        let file = QuarterFile {
            region_raw: "tamil-nadu".into(),
            year_raw: "2019".into(),
            path: PathBuf::from("/corpus/tamil-nadu/2019/3.json"),
        };
        let c = Coordinates::from_quarter_file(&file).unwrap();
        assert_eq!(c.region, "Tamil Nadu");
        assert_eq!(c.year, 2019);
        assert_eq!(c.quarter, 3);
    }

    #[test]
    fn test_bad_coordinates() {
        let bad_year = QuarterFile {
            region_raw: "goa".into(),
            year_raw: "19".into(),
            path: PathBuf::from("goa/19/1.json"),
        };
        assert!(matches!(
            Coordinates::from_quarter_file(&bad_year),
            Err(RecordSchemaError::InvalidYear(_))
        ));

        let bad_quarter = QuarterFile {
            region_raw: "goa".into(),
            year_raw: "2019".into(),
            path: PathBuf::from("goa/2019/5.json"),
        };
        assert!(matches!(
            Coordinates::from_quarter_file(&bad_quarter),
            Err(RecordSchemaError::InvalidQuarter(q)) if q == "5"
        ));
    }
}
