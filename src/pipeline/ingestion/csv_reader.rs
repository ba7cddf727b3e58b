use tracing::debug;

use crate::error::{Result, TrackerError};

/// Cell texts read as missing, matched exactly (spreadsheet and dataframe exports)
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a cell's text stands for a missing value
pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// A header row plus data rows exactly as read from the CSV payload.
///
/// Empty cells and [`MISSING_TOKENS`] are `None`. Rows shorter than the header are padded with
/// `None`; header names are kept untrimmed so schema validation can report
/// what the source actually sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a comma-separated payload into a [`RawTable`].
///
/// The whole payload is rejected (never partially read) when it has no
/// header row or when a row carries more cells than the header declares.
pub fn read_table(payload: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(payload.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TrackerError::Fetch("No columns to parse from payload".to_string()));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            // Line numbers are 1-based and the header occupies line 1
            return Err(TrackerError::Fetch(format!(
                "Error tokenizing data. Expected {} fields in line {}, saw {}",
                headers.len(),
                idx + 2,
                record.len()
            )));
        }
        let row = (0..headers.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|cell| !is_missing(cell))
                    .map(str::to_string)
            })
            .collect();
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "Read CSV payload");
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_tokens_become_none() {
        let payload = "Timestamp,Select Campaign/Provider\n\
                       2024-01-01,X\n\
                       2024-01-02,N/A\n\
                       NaN,NA\n\
                       2024-01-03,#N/A\n\
                       2024-01-04,null\n\
                       2024-01-05, NA\n";
        let table = read_table(payload).unwrap();
        let categories: Vec<Option<&str>> = table.rows.iter().map(|r| r[1].as_deref()).collect();
        assert_eq!(
            categories,
            vec![Some("X"), None, None, None, None, Some(" NA")]
        );
        assert_eq!(table.rows[2][0], None);
    }

    #[test]
    fn reads_quoted_google_export() {
        let payload = "\"Timestamp\",\"Select Campaign/Provider\",\"Notes\"\n\
                       \"1/15/2024 10:32:11\",\"Spring, Promo\",\"\"\n";
        let table = read_table(payload).unwrap();
        assert_eq!(table.headers, vec!["Timestamp", "Select Campaign/Provider", "Notes"]);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0],
            vec![
                Some("1/15/2024 10:32:11".to_string()),
                Some("Spring, Promo".to_string()),
                None
            ]
        );
    }

    #[test]
    fn short_rows_are_padded_and_blank_lines_skipped() {
        let payload = "a,b,c\n1\n\n4,5,6\n";
        let table = read_table(payload).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(table.rows[1][2].as_deref(), Some("6"));
    }

    #[test]
    fn header_whitespace_is_preserved() {
        let table = read_table(" Timestamp ,Other\n").unwrap();
        assert_eq!(table.headers[0], " Timestamp ");
        assert!(table.is_empty());
    }

    #[test]
    fn long_row_rejects_whole_payload() {
        let err = read_table("a,b\n1,2\n1,2,3\n").unwrap_err();
        match err {
            TrackerError::Fetch(msg) => assert!(msg.contains("line 3"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_payload_is_a_fetch_error() {
        assert!(matches!(read_table(""), Err(TrackerError::Fetch(_))));
    }
}
