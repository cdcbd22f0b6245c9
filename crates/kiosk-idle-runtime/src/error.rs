//! Error types for the tokio watchdog host.

use kiosk_idle_watchdog::WatchdogError;
use thiserror::Error;

/// Errors that can occur while running or controlling the watchdog service.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The service event loop has exited; the command was not delivered.
    #[error("Watchdog service has stopped")]
    ServiceStopped,

    /// The event loop task panicked or was cancelled.
    #[error("Watchdog service task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Invalid watchdog configuration.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),
}

/// A specialized `Result` type for watchdog service operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
