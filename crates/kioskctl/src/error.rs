//! Error types for kioskctl CLI

use kiosk_idle_runtime::RuntimeError;
use kiosk_idle_watchdog::WatchdogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid script: {0}")]
    InvalidScript(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Watchdog error: {0}")]
    Watchdog(#[from] WatchdogError),

    #[error("Service error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfiguration(_) | Self::Watchdog(_) => 2,
            Self::InvalidScript(_) => 3,
            Self::IoError(_) | Self::JsonError(_) | Self::Runtime(_) => 1,
        }
    }

    /// Variant name reported in JSON errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "InvalidConfiguration",
            Self::InvalidScript(_) => "InvalidScript",
            Self::IoError(_) => "IoError",
            Self::JsonError(_) => "JsonError",
            Self::Watchdog(_) => "Watchdog",
            Self::Runtime(_) => "Runtime",
        }
    }
}
