//! Bounded dataset preview reads.
//!
//! The preview endpoint is best-effort: the source CSV is searched across
//! a configured path list, only the leading rows are read, and a missing
//! file degrades to a fixed schema with empty data rather than an error.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Rows scanned from the head of the file.
pub const PREVIEW_SCAN_ROWS: usize = 100;
/// Rows actually returned to the caller.
pub const PREVIEW_RETURN_ROWS: usize = 50;
/// Known row count of the full dataset.
pub const DATASET_TOTAL_ROWS: u64 = 100_000;

/// Column list reported when the source file cannot be read.
pub const FALLBACK_COLUMNS: [&str; 13] = [
    "user_id",
    "age",
    "gender",
    "location",
    "device_type",
    "ad_id",
    "ad_category",
    "impressions",
    "clicks",
    "conversions",
    "engagement_duration",
    "sentiment_score",
    "previous_interaction_score",
];

/// Preview payload for the dataset endpoint.
#[derive(Debug, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub data: Vec<Value>,
    pub total_rows: u64,
    pub preview_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searched_paths: Option<Vec<String>>,
}

impl DatasetPreview {
    /// Fixed schema returned when no dataset file exists.
    fn not_found(search_paths: &[PathBuf]) -> Self {
        Self {
            columns: FALLBACK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            data: Vec::new(),
            total_rows: DATASET_TOTAL_ROWS,
            preview_rows: 0,
            message: Some(
                "Dataset file not found. Please ensure ad_campaign_data.csv is in the project root."
                    .to_string(),
            ),
            searched_paths: Some(search_paths.iter().map(display_absolute).collect()),
        }
    }
}

/// Outcome of a preview attempt.
pub enum PreviewOutcome {
    /// Either real rows or the not-found fallback; both are 200s.
    Loaded(DatasetPreview),
    /// The file existed but could not be read.
    ReadError { path: PathBuf, error: anyhow::Error },
}

/// Load a preview from the first existing path in the search list.
pub fn load_preview(search_paths: &[PathBuf]) -> PreviewOutcome {
    let Some(path) = search_paths.iter().find(|p| p.exists()) else {
        return PreviewOutcome::Loaded(DatasetPreview::not_found(search_paths));
    };

    match read_preview_rows(path) {
        Ok((columns, data)) => PreviewOutcome::Loaded(DatasetPreview {
            preview_rows: data.len(),
            columns,
            data,
            total_rows: DATASET_TOTAL_ROWS,
            message: None,
            searched_paths: None,
        }),
        Err(error) => PreviewOutcome::ReadError {
            path: path.clone(),
            error,
        },
    }
}

fn read_preview_rows(path: &Path) -> Result<(Vec<String>, Vec<Value>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records().take(PREVIEW_SCAN_ROWS) {
        let record = record.context("failed to read CSV record")?;
        let mut row = serde_json::Map::new();
        for (column, raw) in columns.iter().zip(record.iter()) {
            row.insert(column.clone(), cell_value(raw));
        }
        rows.push(Value::Object(row));
    }
    rows.truncate(PREVIEW_RETURN_ROWS);

    Ok((columns, rows))
}

/// Coerce a CSV cell to the narrowest JSON value: null for empty cells,
/// then integer, then float, then string.
fn cell_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::from(trimmed)
}

fn display_absolute(path: &PathBuf) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.clone())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(cell_value(""), Value::Null);
        assert_eq!(cell_value("42"), Value::from(42));
        assert_eq!(cell_value("0.5"), Value::from(0.5));
        assert_eq!(cell_value("mobile"), Value::from("mobile"));
        assert_eq!(cell_value(" 7 "), Value::from(7));
    }

    #[test]
    fn test_preview_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");

        let PreviewOutcome::Loaded(preview) = load_preview(&[missing]) else {
            panic!("expected fallback preview");
        };

        assert_eq!(preview.columns.len(), FALLBACK_COLUMNS.len());
        assert!(preview.data.is_empty());
        assert_eq!(preview.preview_rows, 0);
        assert_eq!(preview.total_rows, DATASET_TOTAL_ROWS);
        assert!(preview.message.is_some());
        assert_eq!(preview.searched_paths.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_preview_reads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ad_campaign_data.csv");
        std::fs::write(
            &path,
            "user_id,age,sentiment_score,device\n1,35,0.5,mobile\n2,41,,desktop\n",
        )
        .unwrap();

        let PreviewOutcome::Loaded(preview) = load_preview(&[path]) else {
            panic!("expected loaded preview");
        };

        assert_eq!(preview.columns, vec!["user_id", "age", "sentiment_score", "device"]);
        assert_eq!(preview.preview_rows, 2);
        assert_eq!(preview.data[0]["age"], Value::from(35));
        assert_eq!(preview.data[0]["sentiment_score"], Value::from(0.5));
        assert_eq!(preview.data[1]["sentiment_score"], Value::Null);
        assert_eq!(preview.data[1]["device"], Value::from("desktop"));
        assert!(preview.message.is_none());
    }

    #[test]
    fn test_preview_row_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ad_campaign_data.csv");
        let mut contents = String::from("user_id,age\n");
        for i in 0..150 {
            contents.push_str(&format!("{i},30\n"));
        }
        std::fs::write(&path, contents).unwrap();

        let PreviewOutcome::Loaded(preview) = load_preview(&[path]) else {
            panic!("expected loaded preview");
        };

        assert_eq!(preview.preview_rows, PREVIEW_RETURN_ROWS);
        assert_eq!(preview.data.len(), PREVIEW_RETURN_ROWS);
    }

    #[test]
    fn test_first_existing_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let present = dir.path().join("present.csv");
        std::fs::write(&present, "user_id\n9\n").unwrap();

        let PreviewOutcome::Loaded(preview) = load_preview(&[missing, present]) else {
            panic!("expected loaded preview");
        };

        assert_eq!(preview.preview_rows, 1);
        assert_eq!(preview.data[0]["user_id"], Value::from(9));
    }
}
