//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（recipient source, SMTP, 追記ログ）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod id_generator;
pub mod ledger;
pub mod open_log;
pub mod recipient_source;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, RandomIdGenerator};
pub use self::ledger::SendLedger;
pub use self::open_log::OpenLog;
pub use self::recipient_source::RecipientSource;
pub use self::transport::{Transport, TransportError};
