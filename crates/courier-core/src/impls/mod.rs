//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **csv_store**: 追記専用の delimited-text ledger / open log + report writer
//! - **recipients**: recipient source ローダー（delimited text / spreadsheet）
//! - **smtp**: lettre ベースの Transport
//! - **memory**: テスト・開発用の in-memory 実装

pub mod csv_store;
pub mod memory;
pub mod recipients;
pub mod smtp;

pub use self::csv_store::{write_report, CsvOpenLog, CsvSendLedger};
pub use self::recipients::{recipient_source_for, CsvRecipientSource, SourceColumns, SpreadsheetRecipientSource};
pub use self::smtp::{SmtpConfig, SmtpTransport};
