// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `FUNDER_PRIVATE_KEY` | Custodial secret (hex or PEM) | Unset disables funding |
//! | `LEDGER_TIMEOUT_SECS` | Per-RPC timeout | `15` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Maximum wait for a receipt | `120` |
//! | `CONFIRMATION_POLL_MS` | Receipt poll interval | `1500` |
//! | `RPC_URL_<chainId>` | RPC endpoint override for one network | Built-in |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::LedgerSettings;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable holding the custodial secret.
///
/// Accepts a 32-byte hex key (with or without `0x`) or a SEC1/PKCS#8 PEM
/// block. The value is never logged.
pub const FUNDER_PRIVATE_KEY_ENV: &str = "FUNDER_PRIVATE_KEY";

pub const LEDGER_TIMEOUT_ENV: &str = "LEDGER_TIMEOUT_SECS";
pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const CONFIRMATION_POLL_ENV: &str = "CONFIRMATION_POLL_MS";

/// Prefix of per-network RPC overrides, e.g. `RPC_URL_97`.
pub const RPC_URL_ENV_PREFIX: &str = "RPC_URL_";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid bind address {0}")]
    BindAddress(String),
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "" => Ok(LogFormat::Pretty),
            other => Err(format!("expected `json` or `pretty`, got `{other}`")),
        }
    }
}

/// Process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub funder_secret: Option<String>,
    pub ledger: LedgerSettings,
    pub log_format: LogFormat,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "funder_secret",
                &self.funder_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("ledger", &self.ledger)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LedgerSettings::default();

        let request_timeout = parse_or(&lookup, LEDGER_TIMEOUT_ENV, defaults.request_timeout.as_secs())?;
        let confirmation_timeout = parse_or(
            &lookup,
            CONFIRMATION_TIMEOUT_ENV,
            defaults.confirmation_timeout.as_secs(),
        )?;
        let poll_interval = parse_or(
            &lookup,
            CONFIRMATION_POLL_ENV,
            defaults.poll_interval.as_millis() as u64,
        )?;

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value,
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?,
            funder_secret: lookup(FUNDER_PRIVATE_KEY_ENV).filter(|s| !s.trim().is_empty()),
            ledger: LedgerSettings {
                request_timeout: Duration::from_secs(request_timeout),
                confirmation_timeout: Duration::from_secs(confirmation_timeout),
                poll_interval: Duration::from_millis(poll_interval),
            },
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::BindAddress(addr))
    }
}

/// Name of the RPC override variable for `chain_id`.
pub fn rpc_url_env(chain_id: &str) -> String {
    format!("{RPC_URL_ENV_PREFIX}{chain_id}")
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
