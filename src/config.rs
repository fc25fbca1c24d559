use std::{env, net::SocketAddr};

use chrono::Locale;
use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: Url,
    pub supabase_key: String,
    pub trips_table: String,
    /// Whether the trips table carries a `comment` column.
    pub with_comment: bool,
    pub listen_addr: SocketAddr,
    pub locale: Locale,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so it can be fed
    /// something other than the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };

        let supabase_url = Url::parse(&required("SUPABASE_URL")?)
            .map_err(|err| AppError::Config(format!("invalid SUPABASE_URL: {err}")))?;
        let supabase_key = required("SUPABASE_ANON_KEY")?;

        let trips_table = lookup("TRIPS_TABLE")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "trips".to_string());

        let with_comment = match lookup("TRIPS_WITH_COMMENT") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!("invalid TRIPS_WITH_COMMENT: {raw}"))
            })?,
        };

        let listen_addr: SocketAddr = lookup("APP_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let locale_name = lookup("APP_LOCALE").unwrap_or_else(|| "fr_FR".to_string());
        let locale = Locale::try_from(locale_name.trim())
            .map_err(|_| AppError::Config(format!("unknown APP_LOCALE: {locale_name}")))?;

        Ok(Self {
            supabase_url,
            supabase_key,
            trips_table,
            with_comment,
            listen_addr,
            locale,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
