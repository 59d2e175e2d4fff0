//! Run parameters from `COURIER_*` environment variables.
//!
//! File paths and column names have workable defaults; anything pointing at
//! external infrastructure (SMTP host, sender, tracker URL) must be set
//! explicitly. Batch size and the SMTP password are interactive, never
//! environment or hardcoded.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use courier_core::domain::CourierError;
use courier_core::impls::{SmtpConfig, SourceColumns};

const DEFAULT_SUBJECT: &str = "A proposition for {company_name}";
const DEFAULT_BODY: &str = "Dear {company_name} team,\n\n\
We are writing to you today with a special proposition regarding your business operations.\n\n\
We believe our services can bring significant value, and we would appreciate the opportunity to discuss this further.\n\n\
Best regards";

/// Where the recipient source, the two logs and the report live.
#[derive(Debug, Clone)]
pub struct Paths {
    pub source: String,
    pub sheet: String,
    pub columns: SourceColumns,
    pub ledger: String,
    pub opens_log: String,
    pub report: String,
}

impl Paths {
    pub fn from_env() -> Self {
        let defaults = SourceColumns::default();
        Self {
            source: var_or("COURIER_SOURCE", "recipients.csv"),
            sheet: var_or("COURIER_SOURCE_SHEET", "Sheet1"),
            columns: SourceColumns {
                key: var_or("COURIER_SOURCE_KEY_COLUMN", &defaults.key),
                email: var_or("COURIER_SOURCE_EMAIL_COLUMN", &defaults.email),
                name: var_or("COURIER_SOURCE_NAME_COLUMN", &defaults.name),
            },
            ledger: var_or("COURIER_LEDGER", "send_ledger.csv"),
            opens_log: var_or("COURIER_OPENS_LOG", "opens_log.csv"),
            report: var_or("COURIER_REPORT", "campaign_report.csv"),
        }
    }
}

/// Everything the `send` subcommand needs beyond the paths.
#[derive(Debug, Clone)]
pub struct SendSettings {
    pub smtp: SmtpConfig,
    pub tracker_base_url: String,
    pub subject: String,
    pub body: String,
    pub hourly_cap: u32,
    pub per_send_delay: Duration,
}

impl SendSettings {
    pub fn from_env() -> Result<Self, CourierError> {
        Ok(Self {
            smtp: SmtpConfig {
                host: required_var("COURIER_SMTP_HOST")?,
                port: parsed_var("COURIER_SMTP_PORT", 465)?,
                sender: required_var("COURIER_SENDER")?,
            },
            tracker_base_url: required_var("COURIER_TRACKER_URL")?,
            subject: var_or("COURIER_SUBJECT", DEFAULT_SUBJECT),
            body: var_or("COURIER_BODY", DEFAULT_BODY),
            hourly_cap: parsed_var("COURIER_HOURLY_CAP", 140)?,
            per_send_delay: Duration::from_secs(parsed_var("COURIER_SEND_DELAY_SECS", 2)?),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_var(name: &str) -> Result<String, CourierError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CourierError::Config(format!("environment variable {name} must be set")))
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T, CourierError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|error| CourierError::Config(format!("{name}: {error}"))),
        Err(_) => Ok(default),
    }
}
