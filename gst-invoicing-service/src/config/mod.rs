use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::config::get_env;
use service_core::error::AppError;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub gst: GstConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GstConfig {
    /// Rate applied to line items that arrive without one.
    pub default_rate: Decimal,
    /// Days added to the invoice date when a due date precedes it.
    pub due_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl InvoicingConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        let default_rate = parse_var::<Decimal>(
            "GST_DEFAULT_RATE",
            &get_env("GST_DEFAULT_RATE", Some("0"), is_prod)?,
        )?;
        if !gst_core::rates::is_valid_rate(default_rate) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GST_DEFAULT_RATE must be between 0 and 100, got {}",
                default_rate
            )));
        }

        Ok(InvoicingConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("gst_invoicing"), is_prod)?,
            },
            gst: GstConfig {
                default_rate,
                due_days: parse_var(
                    "INVOICE_DUE_DAYS",
                    &get_env("INVOICE_DUE_DAYS", Some("30"), is_prod)?,
                )?,
            },
            rate_limit: RateLimitConfig {
                requests: parse_var(
                    "RATE_LIMIT_REQUESTS",
                    &get_env("RATE_LIMIT_REQUESTS", Some("300"), is_prod)?,
                )?,
                window_seconds: parse_var(
                    "RATE_LIMIT_WINDOW_SECONDS",
                    &get_env("RATE_LIMIT_WINDOW_SECONDS", Some("60"), is_prod)?,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e))
    })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| o.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_list() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://app.example.com,,"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert_eq!(parse_origins("*"), vec!["*"]);
    }

    #[test]
    fn parse_var_reports_key() {
        let err = parse_var::<u32>("RATE_LIMIT_REQUESTS", "lots").unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_REQUESTS"));

        let rate = parse_var::<Decimal>("GST_DEFAULT_RATE", " 18 ").unwrap();
        assert_eq!(rate, Decimal::from(18));
    }
}
