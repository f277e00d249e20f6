//! Deployment configuration loaded from environment variables.
//!
//! Thresholds and the sampling period are fixed; only the email sink is
//! configurable. Credentials are never compiled in.
//!
//! | Variable        | Required | Default    | Description                          |
//! |-----------------|----------|------------|--------------------------------------|
//! | `SMTP_HOST`     | yes      | --         | SMTP submission server               |
//! | `SMTP_PORT`     | no       | `465`      | SMTP port                            |
//! | `SMTP_TLS`      | no       | `implicit` | `implicit` (SMTPS) or `starttls`     |
//! | `SMTP_USER`     | yes      | --         | SMTP username                        |
//! | `SMTP_PASSWORD` | yes      | --         | SMTP password                        |
//! | `ALERT_FROM`    | yes      | --         | Sender address                       |
//! | `ALERT_TO`      | yes      | --         | Recipient address                    |

use std::str::FromStr;

/// Default port for SMTP over implicit TLS.
const DEFAULT_SMTP_PORT: u16 = 465;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

/// How the SMTP connection is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// TLS from the first byte (SMTPS, usually port 465).
    #[default]
    Implicit,
    /// Plain connection upgraded with `STARTTLS` (usually port 587).
    StartTls,
}

impl FromStr for TlsMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "implicit" | "ssl" | "smtps" => Ok(TlsMode::Implicit),
            "starttls" => Ok(TlsMode::StartTls),
            _ => Err(()),
        }
    }
}

/// Connection, credential and envelope settings for the alert email.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub smtp: SmtpConfig,
}

impl AgentConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = match lookup("SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "SMTP_PORT",
                value: raw,
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let tls = match lookup("SMTP_TLS") {
            Some(raw) => raw.trim().parse::<TlsMode>().map_err(|_| ConfigError::Invalid {
                name: "SMTP_TLS",
                value: raw,
            })?,
            None => TlsMode::default(),
        };

        Ok(Self {
            smtp: SmtpConfig {
                host: required("SMTP_HOST")?,
                port,
                tls,
                username: required("SMTP_USER")?,
                password: required("SMTP_PASSWORD")?,
                from_address: required("ALERT_FROM")?,
                to_address: required("ALERT_TO")?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
