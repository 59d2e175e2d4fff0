#![forbid(unsafe_code)]

//! courier: operator entry point.
//!
//! `courier send`   run a rate-limited campaign batch against the pending
//!                  recipients (interactive: batch size + SMTP password)
//! `courier report` reconcile the logs into the status report

mod config;

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use courier_core::app::{
    pending_recipients, reconcile, CampaignSender, RateLimiter, RateLimiterConfig,
};
use courier_core::domain::{CampaignCounts, CourierError, MessageTemplate};
use courier_core::impls::csv_store::{write_report, CsvOpenLog, CsvSendLedger};
use courier_core::impls::{recipient_source_for, SmtpTransport};
use courier_core::ports::{OpenLog, RandomIdGenerator, SendLedger, SystemClock};

use crate::config::{Paths, SendSettings};

const USAGE: &str = "usage: courier <send|report>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

async fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("send") => send().await.map_err(|err| err.to_string()),
        Some("report") => report().await.map_err(|err| err.to_string()),
        _ => Err(USAGE.to_string()),
    }
}

async fn send() -> Result<(), CourierError> {
    let paths = Paths::from_env();
    let settings = SendSettings::from_env()?;

    let source = recipient_source_for(&paths.source, &paths.sheet, paths.columns.clone());
    let recipients = source.load().await?;

    let ledger = Arc::new(CsvSendLedger::new(&paths.ledger));
    let pending = pending_recipients(&recipients, &ledger.scan().await?);
    if pending.is_empty() {
        println!("All contacts have been emailed. Nothing to do.");
        return Ok(());
    }
    println!(
        "{} of {} contacts have not been emailed yet.",
        pending.len(),
        recipients.len()
    );

    let batch_size = prompt_batch_size(pending.len())?;
    let password = rpassword::prompt_password(format!(
        "Password for {}: ",
        settings.smtp.sender
    ))
    .map_err(|error| CourierError::Config(format!("password prompt: {error}")))?;

    // Authentication failure must surface here, before the first recipient.
    let transport = SmtpTransport::connect(&settings.smtp, &password).await?;
    println!("Connected to {}. Starting batch...", settings.smtp.host);

    let mut limiter_config = RateLimiterConfig::new(settings.hourly_cap);
    limiter_config.per_send_delay = settings.per_send_delay;

    let template = MessageTemplate {
        sender: settings.smtp.sender.clone(),
        subject: settings.subject.clone(),
        body: settings.body.clone(),
        tracker_base_url: settings.tracker_base_url.clone(),
    };

    let mut sender = CampaignSender::new(
        Arc::new(transport),
        ledger,
        Arc::new(RandomIdGenerator),
        Arc::new(SystemClock),
        RateLimiter::new(limiter_config),
        template,
    );

    let summary = sender.run(&pending[..batch_size]).await?;
    println!(
        "Batch complete: {} sent, {} failed of {} attempted.",
        summary.sent, summary.failed, summary.attempted
    );
    Ok(())
}

async fn report() -> Result<(), CourierError> {
    let paths = Paths::from_env();

    let source = recipient_source_for(&paths.source, &paths.sheet, paths.columns.clone());
    let recipients = source.load().await?;

    // Missing logs read as empty: a report before the first send is all
    // "Not Sent", not an error.
    let sends = CsvSendLedger::new(&paths.ledger).scan().await?;
    let opens = CsvOpenLog::new(&paths.opens_log).scan().await?;

    let rows = reconcile(&recipients, &sends, &opens);
    write_report(&paths.report, &rows).await?;

    let counts = CampaignCounts::from_rows(&rows);
    println!("--- Campaign Report ---");
    println!("Recipients:       {}", counts.recipients);
    println!("Emailed:          {}", counts.sent);
    println!("Unique opens:     {}", counts.opened);
    println!("Open rate:        {:.2}%", counts.open_rate());
    println!("Report written to {}", paths.report);
    Ok(())
}

/// Ask until the operator gives a usable number. Invalid input re-prompts;
/// only a closed stdin aborts.
fn prompt_batch_size(max: usize) -> Result<usize, CourierError> {
    let stdin = io::stdin();
    loop {
        print!("How many emails to send in this batch? (max {max}): ");
        io::stdout()
            .flush()
            .map_err(|error| CourierError::Config(error.to_string()))?;

        let mut line = String::new();
        let bytes = stdin
            .read_line(&mut line)
            .map_err(|error| CourierError::Config(error.to_string()))?;
        if bytes == 0 {
            return Err(CourierError::Config("stdin closed during prompt".into()));
        }

        match parse_batch_size(&line, max) {
            Some(size) => return Ok(size),
            None => println!("Please enter a number between 1 and {max}."),
        }
    }
}

fn parse_batch_size(input: &str, max: usize) -> Option<usize> {
    let size: usize = input.trim().parse().ok()?;
    if (1..=max).contains(&size) {
        Some(size)
    } else {
        None
    }
}
