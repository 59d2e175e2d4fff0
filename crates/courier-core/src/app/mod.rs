//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **dedup**: ledger に記録済みの recipient を次の batch から除外
//! - **rate_limit**: 時間あたり上限 + send ごとの pacing（二段構え）
//! - **send_loop**: admit → render → send → append の逐次ループ
//! - **reconcile**: recipient source / ledger / open log の三者 merge

pub mod dedup;
pub mod rate_limit;
pub mod reconcile;
pub mod send_loop;

pub use self::dedup::pending_recipients;
pub use self::rate_limit::{RateLimiter, RateLimiterConfig};
pub use self::reconcile::reconcile;
pub use self::send_loop::{BatchSummary, CampaignSender};

#[cfg(test)]
mod tests {
    //! Full-pipeline scenario: dedup → send → open → reconcile.

    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::domain::{
        MessageTemplate, OpenEvent, OpenStatus, Recipient, SendStatus, TrackingId,
    };
    use crate::impls::memory::{InMemoryOpenLog, InMemorySendLedger, InMemoryTransport};
    use crate::ports::{Clock, FixedClock, OpenLog, RandomIdGenerator, SendLedger};

    use super::*;

    fn template() -> MessageTemplate {
        MessageTemplate {
            sender: "info@otax.example".into(),
            subject: "A proposition for {company_name}".into(),
            body: "Dear {company_name} team,\nBest regards".into(),
            tracker_base_url: "http://localhost:5000".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_send_open_reconcile() {
        let recipients = vec![
            Recipient::new("A", "Alpha", Some("a@x.com".into())),
            Recipient::new("B", "Beta", None),
            Recipient::new("C", "Gamma", Some("c@x.com".into())),
        ];

        let ledger = Arc::new(InMemorySendLedger::new());
        let open_log = Arc::new(InMemoryOpenLog::new());
        let transport = Arc::new(InMemoryTransport::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap());

        // Dedup against the empty ledger: B has no address and is excluded.
        let batch = pending_recipients(&recipients, &ledger.scan().await.unwrap());
        assert_eq!(batch.len(), 2);

        let mut sender = CampaignSender::new(
            transport.clone(),
            ledger.clone(),
            Arc::new(RandomIdGenerator),
            Arc::new(clock),
            RateLimiter::new(RateLimiterConfig::new(10)),
            template(),
        );
        let summary = sender.run(&batch).await.unwrap();
        assert_eq!(summary.sent, 2);

        let records = ledger.scan().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].tracking_id, records[1].tracking_id);

        // A opens the message once; C never does.
        let a_record = records
            .iter()
            .find(|r| r.recipient_key.as_str() == "A")
            .unwrap();
        open_log
            .append(OpenEvent {
                opened_time: clock.now(),
                tracking_id: a_record.tracking_id.clone(),
                client_signature: "Mozilla/5.0".into(),
            })
            .await
            .unwrap();

        // An orphan retrieval with an unknown id is logged but must not
        // surface in the report.
        open_log
            .append(OpenEvent {
                opened_time: clock.now(),
                tracking_id: TrackingId::new("not-a-real-id"),
                client_signature: "curl/8.0".into(),
            })
            .await
            .unwrap();

        let rows = reconcile(
            &recipients,
            &ledger.scan().await.unwrap(),
            &open_log.scan().await.unwrap(),
        );

        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].recipient_key.as_str(), "A");
        assert_eq!(rows[0].send_status, SendStatus::Sent);
        assert_eq!(rows[0].open_status, OpenStatus::Opened);

        assert_eq!(rows[1].recipient_key.as_str(), "B");
        assert_eq!(rows[1].send_status, SendStatus::NotSent);
        assert_eq!(rows[1].open_status, OpenStatus::NotOpened);

        assert_eq!(rows[2].recipient_key.as_str(), "C");
        assert_eq!(rows[2].send_status, SendStatus::Sent);
        assert_eq!(rows[2].open_status, OpenStatus::NotOpened);
    }
}
