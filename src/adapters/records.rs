//! Parsing and validation of trial records

use crate::error::{DesignError, RecordError};
use crate::types::TrialRecord;

/// Parser for trial record documents
pub struct RecordParser;

impl RecordParser {
    /// Parse a JSON string containing an array of trial records
    pub fn parse_array(json: &str) -> Result<Vec<TrialRecord>, DesignError> {
        let records: Vec<TrialRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing trial records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<TrialRecord>, DesignError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<TrialRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(DesignError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[TrialRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index: idx,
                    animal_id: record.animal_id.clone(),
                    error,
                })
            })
            .collect()
    }

    /// Fail on the first invalid record
    pub fn validate_all(records: &[TrialRecord]) -> Result<(), DesignError> {
        for (index, record) in records.iter().enumerate() {
            record
                .validate()
                .map_err(|source| DesignError::InvalidRecord { index, source })?;
        }
        Ok(())
    }
}

/// Failed validation of one record
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub animal_id: String,
    pub error: RecordError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NDJSON: &str = r#"
{"animal_id": "W078", "session": 1, "trial": 1, "violation": 0, "n_prev_trial_not_started": 0, "s_a": 60.0, "s_b": 68.0, "correct_side": 1, "choice": 1}
{"animal_id": "W078", "session": 1, "trial": 2, "violation": 1, "n_prev_trial_not_started": 2, "s_a": 68.0, "s_b": 60.0, "correct_side": 0, "choice": null}

{"animal_id": "W078", "session": 2, "trial": 1, "violation": 0, "s_a": 76.0, "s_b": 84.0, "correct_side": 1, "choice": 0}
"#;

    #[test]
    fn test_parse_ndjson() {
        let records = RecordParser::parse_ndjson(NDJSON).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].n_prev_trial_not_started, 2);
        assert_eq!(records[1].choice, None);
        // missing count defaults to zero
        assert_eq!(records[2].n_prev_trial_not_started, 0);
        assert!(RecordParser::validate_records(&records).is_empty());
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[{"animal_id": "W082", "session": 4, "trial": 7, "violation": 0,
                        "s_a": 60.0, "s_b": 52.0, "correct_side": 0, "choice": 0}]"#;

        let records = RecordParser::parse_array(json).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].animal_id, "W082");
        assert_eq!(records[0].session, 4);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = RecordParser::parse_ndjson("{\"animal_id\": \"W078\"}\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_negative_not_started_count_rejected() {
        let line = r#"{"animal_id": "W078", "session": 1, "trial": 1, "violation": 0, "n_prev_trial_not_started": -1, "s_a": 60.0, "s_b": 68.0, "correct_side": 1, "choice": 1}"#;
        assert!(RecordParser::parse_ndjson(line).is_err());
    }

    #[test]
    fn test_validate_records_reports_failures() {
        let mut records = RecordParser::parse_ndjson(NDJSON).unwrap();
        records[0].choice = Some(2);
        records[2].correct_side = 4;

        let results = RecordParser::validate_records(&records);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 0);
        assert_eq!(
            results[0].error,
            RecordError::InconsistentChoice {
                choice: 2,
                violation: 0
            }
        );
        assert_eq!(results[1].error, RecordError::InvalidCorrectSide(4));
        assert!(RecordParser::validate_all(&records).is_err());
    }
}
