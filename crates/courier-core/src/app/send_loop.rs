//! Send loop: the sequential, rate-limited delivery pass.

use std::sync::Arc;

use crate::app::rate_limit::RateLimiter;
use crate::domain::{CourierError, MessageTemplate, Recipient, SendRecord};
use crate::ports::{Clock, IdGenerator, SendLedger, Transport, TransportError};

/// What one batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Drives one batch: admit → render → send → append, strictly in order.
///
/// The ledger append happens immediately after each transport success and
/// before the next recipient is considered. A process killed at any point
/// has therefore recorded every send it completed and none it did not;
/// the dedup filter makes the next run resume cleanly.
pub struct CampaignSender {
    transport: Arc<dyn Transport>,
    ledger: Arc<dyn SendLedger>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    template: MessageTemplate,
}

impl CampaignSender {
    pub fn new(
        transport: Arc<dyn Transport>,
        ledger: Arc<dyn SendLedger>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        limiter: RateLimiter,
        template: MessageTemplate,
    ) -> Self {
        Self {
            transport,
            ledger,
            ids,
            clock,
            limiter,
            template,
        }
    }

    /// Run the batch to completion.
    ///
    /// Failure handling:
    /// - delivery failure: logged, recipient skipped, loop continues
    ///   (no record written, so the next run picks the recipient up again)
    /// - authentication failure: aborts the run
    /// - ledger append failure: aborts the run. With the append unverified
    ///   we could redeliver on resume, which is the one thing the ledger
    ///   exists to prevent.
    pub async fn run(&mut self, batch: &[Recipient]) -> Result<BatchSummary, CourierError> {
        let mut summary = BatchSummary::default();
        let total = batch.len();

        for (position, recipient) in batch.iter().enumerate() {
            self.limiter.admit().await;

            let tracking_id = self.ids.tracking_id();
            let Some(message) = self.template.render(recipient, &tracking_id) else {
                // The dedup filter never yields address-less recipients;
                // mirror its silent exclusion if one slips through.
                continue;
            };
            summary.attempted += 1;

            match self.transport.send(&message).await {
                Ok(()) => {
                    let record = SendRecord {
                        tracking_id,
                        recipient_key: recipient.key.clone(),
                        destination_address: message.to.clone(),
                        sent_time: self.clock.now(),
                    };
                    self.ledger.append(record).await?;
                    summary.sent += 1;

                    tracing::info!(
                        sent = position + 1,
                        total,
                        key = %recipient.key,
                        to = %message.to,
                        "email sent"
                    );

                    self.limiter.record_send();
                    self.limiter.pace().await;
                }
                Err(TransportError::Auth(reason)) => {
                    return Err(CourierError::Auth(reason));
                }
                Err(TransportError::Delivery(error)) => {
                    summary.failed += 1;
                    tracing::warn!(
                        attempted = position + 1,
                        total,
                        key = %recipient.key,
                        to = %message.to,
                        %error,
                        "send failed, recipient stays eligible for the next run"
                    );
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tokio::time::{Duration, Instant};

    use crate::app::dedup::pending_recipients;
    use crate::app::rate_limit::RateLimiterConfig;
    use crate::domain::MessageTemplate;
    use crate::impls::memory::{InMemorySendLedger, InMemoryTransport};
    use crate::ports::{FixedClock, RandomIdGenerator};

    use super::*;

    fn template() -> MessageTemplate {
        MessageTemplate {
            sender: "info@otax.example".into(),
            subject: "A proposition for {company_name}".into(),
            body: "Dear {company_name} team".into(),
            tracker_base_url: "http://localhost:5000".into(),
        }
    }

    fn sender_with(
        transport: Arc<InMemoryTransport>,
        ledger: Arc<InMemorySendLedger>,
        cap: u32,
    ) -> CampaignSender {
        CampaignSender::new(
            transport,
            ledger,
            Arc::new(RandomIdGenerator),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap(),
            )),
            RateLimiter::new(RateLimiterConfig::new(cap)),
            template(),
        )
    }

    fn recipients(keys: &[&str]) -> Vec<Recipient> {
        keys.iter()
            .map(|key| Recipient::new(*key, format!("{key} Inc"), Some(format!("{key}@x.com"))))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn a_second_run_sends_nothing() {
        let transport = Arc::new(InMemoryTransport::new());
        let ledger = Arc::new(InMemorySendLedger::new());
        let all = recipients(&["A", "B"]);

        let batch = pending_recipients(&all, &ledger.scan().await.unwrap());
        let mut sender = sender_with(transport.clone(), ledger.clone(), 10);
        assert_eq!(sender.run(&batch).await.unwrap().sent, 2);

        // Recompute against the now-populated ledger, as every run must.
        let batch = pending_recipients(&all, &ledger.scan().await.unwrap());
        assert!(batch.is_empty());
        assert_eq!(sender.run(&batch).await.unwrap().sent, 0);
        assert_eq!(transport.sent().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_source_rows_write_one_record() {
        let transport = Arc::new(InMemoryTransport::new());
        let ledger = Arc::new(InMemorySendLedger::new());
        let all = vec![
            Recipient::new("A", "Alpha", Some("a@x.com".into())),
            Recipient::new("A", "Alpha dupe", Some("a@x.com".into())),
        ];

        let batch = pending_recipients(&all, &[]);
        let mut sender = sender_with(transport, ledger.clone(), 10);
        sender.run(&batch).await.unwrap();

        assert_eq!(ledger.scan().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_send_is_skipped_and_unrecorded() {
        let transport = Arc::new(InMemoryTransport::rejecting(&["B@x.com"]));
        let ledger = Arc::new(InMemorySendLedger::new());
        let batch = recipients(&["A", "B", "C"]);

        let mut sender = sender_with(transport.clone(), ledger.clone(), 10);
        let summary = sender.run(&batch).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);

        let records = ledger.scan().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.recipient_key.as_str() != "B"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_aborts_the_run() {
        let transport = Arc::new(InMemoryTransport::with_auth_failure());
        let ledger = Arc::new(InMemorySendLedger::new());
        let batch = recipients(&["A", "B"]);

        let mut sender = sender_with(transport.clone(), ledger.clone(), 10);
        let error = sender.run(&batch).await.unwrap_err();

        assert!(matches!(error, CourierError::Auth(_)));
        assert!(ledger.scan().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn the_hourly_cap_splits_the_batch() {
        let transport = Arc::new(InMemoryTransport::new());
        let ledger = Arc::new(InMemorySendLedger::new());
        let batch = recipients(&["A", "B", "C"]);

        let start = Instant::now();
        let mut sender = sender_with(transport.clone(), ledger.clone(), 2);
        let summary = sender.run(&batch).await.unwrap();
        assert_eq!(summary.sent, 3);

        let sent = transport.sent().await;
        let window = Duration::from_secs(3600);

        // Exactly two sends inside the first hour, the third after it.
        let in_first_window = sent
            .iter()
            .filter(|message| message.sent_at - start < window)
            .count();
        assert_eq!(in_first_window, 2);
        assert!(sent[2].sent_at - start >= window);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_separates_consecutive_sends() {
        let transport = Arc::new(InMemoryTransport::new());
        let ledger = Arc::new(InMemorySendLedger::new());
        let batch = recipients(&["A", "B"]);

        let mut sender = sender_with(transport.clone(), ledger.clone(), 10);
        sender.run(&batch).await.unwrap();

        let sent = transport.sent().await;
        assert!(sent[1].sent_at - sent[0].sent_at >= Duration::from_secs(2));
    }
}
