//! Recipient source loaders: delimited text and spreadsheet, one output.
//!
//! Both forms reduce to the same `Recipient` rows, so the dedup filter and
//! the reconciler never know which physical format the operator keeps the
//! list in. Column names are run parameters, not constants; recipient
//! lists arrive with whatever headers the upstream export used.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use csv_async::AsyncReaderBuilder;
use futures_util::StreamExt;
use tokio::fs::File;

use crate::domain::{CourierError, Recipient};
use crate::ports::RecipientSource;

/// Header names of the three columns the pipeline needs.
#[derive(Debug, Clone)]
pub struct SourceColumns {
    pub key: String,
    pub email: String,
    pub name: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            key: "company_id".into(),
            email: "contact_email".into(),
            name: "company_name".into(),
        }
    }
}

/// Column positions after matching against an actual header row.
struct ColumnIndexes {
    key: usize,
    email: usize,
    name: usize,
}

impl ColumnIndexes {
    fn locate<'a>(
        headers: impl Iterator<Item = &'a str> + Clone,
        columns: &SourceColumns,
        path: &Path,
    ) -> Result<Self, CourierError> {
        let position = |wanted: &str| {
            headers
                .clone()
                .position(|header| header.trim() == wanted)
                .ok_or_else(|| {
                    CourierError::source(path, format!("missing column '{wanted}'"))
                })
        };
        Ok(Self {
            key: position(&columns.key)?,
            email: position(&columns.email)?,
            name: position(&columns.name)?,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Delimited-text recipient source.
#[derive(Debug, Clone)]
pub struct CsvRecipientSource {
    path: PathBuf,
    columns: SourceColumns,
}

impl CsvRecipientSource {
    pub fn new(path: impl Into<PathBuf>, columns: SourceColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

#[async_trait]
impl RecipientSource for CsvRecipientSource {
    async fn load(&self) -> Result<Vec<Recipient>, CourierError> {
        let file = File::open(&self.path)
            .await
            .map_err(|error| CourierError::source(&self.path, error))?;

        let mut reader = AsyncReaderBuilder::new().create_reader(file);
        let headers: Vec<String> = reader
            .headers()
            .await
            .map_err(|error| CourierError::source(&self.path, error))?
            .iter()
            .map(str::to_string)
            .collect();
        let indexes =
            ColumnIndexes::locate(headers.iter().map(String::as_str), &self.columns, &self.path)?;

        let mut rows = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record.map_err(|error| CourierError::source(&self.path, error))?;
            let field = |index: usize| record.get(index).unwrap_or_default();
            let Some(key) = non_empty(field(indexes.key)) else {
                // A row without a key cannot be tracked; skip it.
                continue;
            };
            rows.push(Recipient::new(
                key,
                field(indexes.name).trim(),
                non_empty(field(indexes.email)),
            ));
        }
        Ok(rows)
    }
}

/// Spreadsheet recipient source (named sheet).
///
/// calamine is synchronous, so the read runs under `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SpreadsheetRecipientSource {
    path: PathBuf,
    sheet: String,
    columns: SourceColumns,
}

impl SpreadsheetRecipientSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>, columns: SourceColumns) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            columns,
        }
    }
}

#[async_trait]
impl RecipientSource for SpreadsheetRecipientSource {
    async fn load(&self) -> Result<Vec<Recipient>, CourierError> {
        let path = self.path.clone();
        let sheet = self.sheet.clone();
        let columns = self.columns.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Recipient>, CourierError> {
            let mut workbook =
                open_workbook_auto(&path).map_err(|error| CourierError::source(&path, error))?;
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|error| CourierError::source(&path, error))?;

            let mut sheet_rows = range.rows();
            let header_row = sheet_rows
                .next()
                .ok_or_else(|| CourierError::source(&path, format!("sheet '{sheet}' is empty")))?;
            let headers: Vec<String> = header_row.iter().map(cell_text).collect();
            let indexes =
                ColumnIndexes::locate(headers.iter().map(String::as_str), &columns, &path)?;

            let mut rows = Vec::new();
            for sheet_row in sheet_rows {
                let field = |index: usize| sheet_row.get(index).map(cell_text).unwrap_or_default();
                let Some(key) = non_empty(&field(indexes.key)) else {
                    continue;
                };
                rows.push(Recipient::new(
                    key,
                    field(indexes.name).trim(),
                    non_empty(&field(indexes.email)),
                ));
            }
            Ok(rows)
        })
        .await
        .map_err(|error| CourierError::source(&self.path, error))?
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn is_spreadsheet_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|extension| extension.to_str()),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods")
    )
}

/// Pick the loader from the file extension; anything that is not a known
/// spreadsheet extension is treated as delimited text.
pub fn recipient_source_for(
    path: impl Into<PathBuf>,
    sheet: impl Into<String>,
    columns: SourceColumns,
) -> Box<dyn RecipientSource> {
    let path = path.into();
    if is_spreadsheet_path(&path) {
        Box::new(SpreadsheetRecipientSource::new(path, sheet, columns))
    } else {
        Box::new(CsvRecipientSource::new(path, columns))
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::{IdGenerator, RandomIdGenerator};

    use super::*;

    fn temp_csv(contents: &str) -> PathBuf {
        let unique = RandomIdGenerator.tracking_id();
        let path = std::env::temp_dir().join(format!("courier-source-{unique}.csv"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_rows_and_maps_empty_email_to_none() {
        let path = temp_csv(
            "company_id,company_name,contact_email\n\
             A,Alpha GmbH,a@x.com\n\
             B,Beta AG,\n\
             C,Gamma SE,c@x.com\n",
        );

        let source = CsvRecipientSource::new(&path, SourceColumns::default());
        let recipients = source.load().await.unwrap();

        assert_eq!(recipients.len(), 3);
        assert_eq!(recipients[0].key.as_str(), "A");
        assert_eq!(recipients[0].email.as_deref(), Some("a@x.com"));
        assert_eq!(recipients[1].key.as_str(), "B");
        assert_eq!(recipients[1].email, None);
        assert_eq!(recipients[2].name, "Gamma SE");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn column_order_in_the_file_does_not_matter() {
        let path = temp_csv(
            "contact_email,company_id,company_name\n\
             a@x.com,A,Alpha GmbH\n",
        );

        let source = CsvRecipientSource::new(&path, SourceColumns::default());
        let recipients = source.load().await.unwrap();

        assert_eq!(recipients[0].key.as_str(), "A");
        assert_eq!(recipients[0].email.as_deref(), Some("a@x.com"));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn a_missing_column_is_a_source_error() {
        let path = temp_csv("company_id,company_name\nA,Alpha\n");

        let source = CsvRecipientSource::new(&path, SourceColumns::default());
        let error = source.load().await.unwrap_err();
        assert!(matches!(error, CourierError::Source { .. }));
        assert!(error.to_string().contains("contact_email"));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn a_missing_source_file_is_fatal() {
        let source = CsvRecipientSource::new(
            std::env::temp_dir().join("courier-does-not-exist.csv"),
            SourceColumns::default(),
        );
        assert!(matches!(
            source.load().await,
            Err(CourierError::Source { .. })
        ));
    }

    #[test]
    fn loader_dispatch_follows_the_extension() {
        assert!(is_spreadsheet_path(Path::new("master.xlsx")));
        assert!(is_spreadsheet_path(Path::new("master.ods")));
        assert!(!is_spreadsheet_path(Path::new("master.csv")));
        assert!(!is_spreadsheet_path(Path::new("master")));
    }
}
