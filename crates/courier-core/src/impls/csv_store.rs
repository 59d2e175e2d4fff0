//! Append-only delimited-text stores for the send ledger and the open log,
//! plus the report writer.
//!
//! Files are created with a header row on first use. Appends are serialized
//! through a mutex and `sync_data`'d before returning: a record is durable
//! by the time the caller moves on. Reads tolerate a missing file by
//! returning the empty set: for the reconciler, a log that was never
//! written just means "nothing happened yet".

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::{CourierError, OpenEvent, SendRecord, StatusRow};
use crate::ports::{OpenLog, SendLedger};

const SEND_LEDGER_HEADER: &[&str] = &[
    "tracking_id",
    "recipient_key",
    "destination_address",
    "sent_time",
];

const OPEN_LOG_HEADER: &[&str] = &["opened_time", "tracking_id", "client_signature"];

const REPORT_HEADER: &[&str] = &[
    "recipient_key",
    "send_status",
    "open_status",
    "last_sent_time",
    "first_open_time",
    "name",
    "email",
];

/// Shared machinery for both logs: create-with-header, locked appends,
/// full scans.
#[derive(Debug)]
struct CsvAppendLog {
    path: PathBuf,
    header: &'static [&'static str],
    append_lock: Mutex<()>,
}

impl CsvAppendLog {
    fn new(path: PathBuf, header: &'static [&'static str]) -> Self {
        Self {
            path,
            header,
            append_lock: Mutex::new(()),
        }
    }

    /// Create the file with its header row if it does not exist yet.
    async fn ensure_exists(&self) -> Result<(), CourierError> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => return Ok(()),
            Err(error) => return Err(CourierError::storage(&self.path, error)),
        };

        let mut line = self.header.join(",");
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|error| CourierError::storage(&self.path, error))?;
        file.sync_data()
            .await
            .map_err(|error| CourierError::storage(&self.path, error))?;
        Ok(())
    }

    async fn append<T: Serialize>(&self, row: &T) -> Result<(), CourierError> {
        let _guard = self.append_lock.lock().await;
        self.ensure_exists().await?;

        // Serialize into memory first so the file sees exactly one write.
        let mut buf = Vec::new();
        {
            let mut serializer = AsyncWriterBuilder::new()
                .has_headers(false)
                .create_serializer(Cursor::new(&mut buf));
            serializer
                .serialize(row)
                .await
                .map_err(|error| CourierError::storage(&self.path, error))?;
            serializer
                .flush()
                .await
                .map_err(|error| CourierError::storage(&self.path, error))?;
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|error| CourierError::storage(&self.path, error))?;
        file.write_all(&buf)
            .await
            .map_err(|error| CourierError::storage(&self.path, error))?;
        file.sync_data()
            .await
            .map_err(|error| CourierError::storage(&self.path, error))
    }

    async fn scan<T: DeserializeOwned>(&self) -> Result<Vec<T>, CourierError> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(CourierError::storage(&self.path, error)),
        };

        let mut deserializer = AsyncReaderBuilder::new().create_deserializer(file);
        let mut records = deserializer.deserialize::<T>();
        let mut rows = Vec::new();
        while let Some(row) = records.next().await {
            rows.push(row.map_err(|error| CourierError::storage(&self.path, error))?);
        }
        Ok(rows)
    }
}

/// File-backed send ledger:
/// `tracking_id,recipient_key,destination_address,sent_time`.
#[derive(Debug)]
pub struct CsvSendLedger {
    log: CsvAppendLog,
}

impl CsvSendLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: CsvAppendLog::new(path.into(), SEND_LEDGER_HEADER),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log.path
    }

    pub async fn ensure_exists(&self) -> Result<(), CourierError> {
        self.log.ensure_exists().await
    }
}

#[async_trait]
impl SendLedger for CsvSendLedger {
    async fn append(&self, record: SendRecord) -> Result<(), CourierError> {
        self.log.append(&record).await
    }

    async fn scan(&self) -> Result<Vec<SendRecord>, CourierError> {
        self.log.scan().await
    }
}

/// File-backed open-event log:
/// `opened_time,tracking_id,client_signature`.
#[derive(Debug)]
pub struct CsvOpenLog {
    log: CsvAppendLog,
}

impl CsvOpenLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: CsvAppendLog::new(path.into(), OPEN_LOG_HEADER),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log.path
    }

    pub async fn ensure_exists(&self) -> Result<(), CourierError> {
        self.log.ensure_exists().await
    }
}

#[async_trait]
impl OpenLog for CsvOpenLog {
    async fn append(&self, event: OpenEvent) -> Result<(), CourierError> {
        self.log.append(&event).await
    }

    async fn scan(&self) -> Result<Vec<OpenEvent>, CourierError> {
        self.log.scan().await
    }
}

/// Write the reconciliation report, status columns first, truncating any
/// previous report at that path.
pub async fn write_report(path: impl AsRef<Path>, rows: &[StatusRow]) -> Result<(), CourierError> {
    let path = path.as_ref();

    let mut row_bytes = Vec::new();
    {
        let mut serializer = AsyncWriterBuilder::new()
            .has_headers(false)
            .create_serializer(Cursor::new(&mut row_bytes));
        for row in rows {
            serializer
                .serialize(row)
                .await
                .map_err(|error| CourierError::storage(path, error))?;
        }
        serializer
            .flush()
            .await
            .map_err(|error| CourierError::storage(path, error))?;
    }

    let mut contents = REPORT_HEADER.join(",").into_bytes();
    contents.push(b'\n');
    contents.extend_from_slice(&row_bytes);

    let mut file = File::create(path)
        .await
        .map_err(|error| CourierError::storage(path, error))?;
    file.write_all(&contents)
        .await
        .map_err(|error| CourierError::storage(path, error))?;
    file.sync_data()
        .await
        .map_err(|error| CourierError::storage(path, error))
}
