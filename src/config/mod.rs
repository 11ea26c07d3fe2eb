use crate::core::{AppError, BusinessClock, Result};
use crate::modules::scheduler::parse_schedule;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// `None` runs the ledger in memory
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Business timezone as minutes east of UTC; host offset when unset
    pub business_utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub settlement_cron: String,
    pub reminder_cron: String,
    pub retry_offset_days: u32,
    pub reminder_lead_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from_address: String,
    pub from_name: String,
    /// Log-only delivery when unset
    pub smtp: Option<SmtpSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn var_or<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let business_utc_offset_minutes = match optional_var("BUSINESS_UTC_OFFSET_MINUTES") {
            Some(v) => Some(v.parse().map_err(|_| {
                AppError::Configuration("Invalid BUSINESS_UTC_OFFSET_MINUTES".to_string())
            })?),
            None => None,
        };

        let smtp = match optional_var("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: var_or("SMTP_PORT", "587")?,
                username: optional_var("SMTP_USERNAME"),
                password: optional_var("SMTP_PASSWORD"),
            }),
            None => None,
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                business_utc_offset_minutes,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            scheduler: SchedulerConfig {
                settlement_cron: env::var("SETTLEMENT_CRON")
                    .unwrap_or_else(|_| "0 2 * * *".to_string()),
                reminder_cron: env::var("REMINDER_CRON")
                    .unwrap_or_else(|_| "0 9 * * *".to_string()),
                retry_offset_days: var_or("SETTLEMENT_RETRY_OFFSET_DAYS", "3")?,
                reminder_lead_days: var_or("REMINDER_LEAD_DAYS", "3")?,
            },
            mail: MailConfig {
                from_address: env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "orders@localhost".to_string()),
                from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Storefront".to_string()),
                smtp,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.business_clock()?;

        if let Some(database) = &self.database {
            database.validate()?;
        }

        parse_schedule(&self.scheduler.settlement_cron)?;
        parse_schedule(&self.scheduler.reminder_cron)?;

        if self.scheduler.retry_offset_days == 0 {
            return Err(AppError::Configuration(
                "Settlement retry offset must be greater than 0".to_string(),
            ));
        }

        if self.scheduler.reminder_lead_days == 0 {
            return Err(AppError::Configuration(
                "Reminder lead time must be greater than 0".to_string(),
            ));
        }

        if !self.mail.from_address.contains('@') {
            return Err(AppError::Configuration(format!(
                "Invalid MAIL_FROM_ADDRESS: {}",
                self.mail.from_address
            )));
        }

        Ok(())
    }

    /// Clock for calendar-day logic
    pub fn business_clock(&self) -> Result<BusinessClock> {
        match self.app.business_utc_offset_minutes {
            Some(minutes) => BusinessClock::from_offset_minutes(minutes).ok_or_else(|| {
                AppError::Configuration(format!(
                    "BUSINESS_UTC_OFFSET_MINUTES out of range: {}",
                    minutes
                ))
            }),
            None => Ok(BusinessClock::host_local()),
        }
    }
}
