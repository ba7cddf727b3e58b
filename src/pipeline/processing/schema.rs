use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::constants::{required_fields, CATEGORY_FIELD, TIMESTAMP_FIELD};
use crate::error::{Result, TrackerError};
use crate::pipeline::ingestion::RawTable;

/// One input row with the two consumed fields pulled out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Raw timestamp text; `None` for an empty cell
    pub timestamp: Option<String>,
    /// Campaign/provider; `None` for an empty cell
    pub category: Option<String>,
    /// Remaining non-empty cells keyed by trimmed column name
    pub extra: BTreeMap<String, String>,
}

/// Records whose headers passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    /// Trimmed column names in source order
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Trim every header, require the timestamp and category columns, and lift
/// each row into a typed [`Record`].
///
/// Duplicate column names resolve to their first occurrence.
pub fn validate(table: RawTable) -> Result<ValidatedTable> {
    let columns: Vec<String> = table.headers.iter().map(|h| h.trim().to_string()).collect();

    let timestamp_idx = column_index(&columns, TIMESTAMP_FIELD);
    let category_idx = column_index(&columns, CATEGORY_FIELD);

    let (timestamp_idx, category_idx) = match (timestamp_idx, category_idx) {
        (Some(t), Some(c)) => (t, c),
        _ => {
            let missing: Vec<String> = required_fields()
                .into_iter()
                .filter(|field| column_index(&columns, field).is_none())
                .map(|field| field.to_string())
                .collect();
            warn!(?missing, found = ?columns, "Required columns not found");
            return Err(TrackerError::Schema {
                missing,
                found: columns,
            });
        }
    };

    let records = table
        .rows
        .into_iter()
        .map(|row| {
            let mut timestamp = None;
            let mut category = None;
            let mut extra = BTreeMap::new();
            for (idx, cell) in row.into_iter().enumerate() {
                if idx == timestamp_idx {
                    timestamp = cell;
                } else if idx == category_idx {
                    category = cell;
                } else if let (Some(value), Some(name)) = (cell, columns.get(idx)) {
                    extra.entry(name.clone()).or_insert(value);
                }
            }
            Record {
                timestamp,
                category,
                extra,
            }
        })
        .collect::<Vec<_>>();

    debug!(records = records.len(), "Schema validated");
    Ok(ValidatedTable { columns, records })
}

fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    #[test]
    fn trims_headers_before_matching() {
        let raw = table(
            &["  Timestamp", "Select Campaign/Provider  ", " Email "],
            &[&[Some("2024-01-01 10:00"), Some("X"), Some("a@b.c")]],
        );
        let validated = validate(raw).unwrap();
        assert_eq!(validated.columns, vec!["Timestamp", "Select Campaign/Provider", "Email"]);

        let record = &validated.records[0];
        assert_eq!(record.timestamp.as_deref(), Some("2024-01-01 10:00"));
        assert_eq!(record.category.as_deref(), Some("X"));
        assert_eq!(record.extra.get("Email").map(String::as_str), Some("a@b.c"));
    }

    #[test]
    fn missing_category_reports_missing_and_found() {
        let raw = table(&["Timestamp", "Campaign"], &[]);
        match validate(raw).unwrap_err() {
            TrackerError::Schema { missing, found } => {
                assert_eq!(missing, vec![CATEGORY_FIELD.to_string()]);
                assert_eq!(found, vec!["Timestamp".to_string(), "Campaign".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn both_missing_are_listed_in_order() {
        let raw = table(&["Date"], &[]);
        match validate(raw).unwrap_err() {
            TrackerError::Schema { missing, .. } => {
                assert_eq!(missing, vec![TIMESTAMP_FIELD.to_string(), CATEGORY_FIELD.to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let raw = table(&["timestamp", "Select Campaign/Provider"], &[]);
        assert!(matches!(validate(raw), Err(TrackerError::Schema { .. })));
    }

    #[test]
    fn zero_rows_validate() {
        let raw = table(&["Timestamp", "Select Campaign/Provider"], &[]);
        assert!(validate(raw).unwrap().records.is_empty());
    }

    #[test]
    fn empty_cells_stay_absent() {
        let raw = table(
            &["Select Campaign/Provider", "Timestamp"],
            &[&[None, Some("1/2/2024")]],
        );
        let record = &validate(raw).unwrap().records[0];
        assert_eq!(record.category, None);
        assert_eq!(record.timestamp.as_deref(), Some("1/2/2024"));
        assert!(record.extra.is_empty());
    }
}
