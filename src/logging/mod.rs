// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Logging infrastructure using the `tracing` ecosystem.
//!
//! ```text
//! init_logging(&LogConfig)
//!        |
//!        v
//!    registry
//!        |
//!        v
//!    Console
//!    EnvFilter
//!    ANSI
//!
//! LogLevel:  0=SILENT  1=ERROR  2=WARN
//!            3=INFO    4=DEBUG  5=TRACE
//! ```
//!
//! The crate itself only emits through `tracing` macros; hosts that already
//! install a subscriber can skip [`init_logging`] entirely.

use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{PlumbError, Result};

/// Log level (0-5) for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(u8);

impl Default for LogLevel {
    fn default() -> Self {
        Self::INFO
    }
}

impl LogLevel {
    pub const SILENT: Self = Self(0);
    pub const ERROR: Self = Self(1);
    pub const WARN: Self = Self(2);
    pub const INFO: Self = Self(3);
    pub const DEBUG: Self = Self(4);
    pub const TRACE: Self = Self(5);

    /// Get the raw u8 value.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Convert from integer value (saturating at TRACE level).
    #[must_use]
    pub const fn from_int(level: i32) -> Self {
        match level {
            0 => Self::SILENT,
            1 => Self::ERROR,
            2 => Self::WARN,
            3 => Self::INFO,
            4 => Self::DEBUG,
            _ => Self::TRACE,
        }
    }

    /// Convert from u8 value, returning None if out of range.
    #[must_use]
    pub const fn from_u8(level: u8) -> Option<Self> {
        if level <= 5 { Some(Self(level)) } else { None }
    }

    /// Convert to `EnvFilter` directive string.
    #[must_use]
    pub const fn to_filter_string(self) -> &'static str {
        match self.0 {
            0 => "off",
            1 => "error",
            2 => "warn",
            3 => "info",
            4 => "debug",
            _ => "trace",
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = PlumbError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value)
            .ok_or_else(|| PlumbError::other(format!("log level must be 0-5, got {value}")))
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("log level must be 0-5, got {value}")))
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Builder)]
pub struct LogConfig {
    #[builder(setters(name = with_console_level), default = LogLevel::INFO)]
    console_level: LogLevel,
    #[builder(setters(name = with_show_target), default = false)]
    show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LogConfig {
    /// Get the console log level.
    #[must_use]
    pub const fn console_level(&self) -> LogLevel {
        self.console_level
    }

    /// Check if target (module path) should be shown in output.
    #[must_use]
    pub const fn show_target(&self) -> bool {
        self.show_target
    }
}

/// Initialize a console logging subscriber with the given configuration.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use gitplumb::logging::{LogConfig, LogLevel, init_logging};
///
/// let config = LogConfig::builder()
///     .with_console_level(LogLevel::DEBUG)
///     .build();
///
/// init_logging(&config).expect("failed to initialize logging");
/// tracing::info!("logging initialized");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let console_filter = EnvFilter::new(config.console_level().to_filter_string());

    let console_layer = fmt::layer()
        .with_target(config.show_target())
        .with_level(true)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| PlumbError::other(format!("failed to initialize logging: {e}")))
}
