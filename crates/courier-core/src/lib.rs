//! courier-core
//!
//! Core building blocks for the courier campaign pipeline.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, recipient, records, report, message, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, SendLedger, OpenLog, Transport, RecipientSource）
//! - **app**: アプリケーションロジック（dedup, rate_limit, send_loop, reconcile）
//! - **impls**: 実装（CSV append-only ストア、recipient ローダー、SMTP、テスト用 in-memory）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
