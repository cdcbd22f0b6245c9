//! Interactive real-time session

use anyhow::Result;
use kiosk_idle_runtime::{WatchdogHandle, WatchdogService};
use kiosk_idle_watchdog::{
    ActivityKind, DisarmReason, SharedSettings, WatchdogSnapshot, WatchdogStatus,
};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::KioskConfig;
use crate::error::CliError;
use crate::output;

const HELP: &str =
    "Commands: <activity kind>, stay, home, dismiss, enable, disable, status, quit";

/// One line of stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    Activity(ActivityKind),
    Stay,
    Home,
    Dismiss,
    Enable,
    Disable,
    Status,
    Quit,
}

impl FromStr for SessionInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(Self::Stay),
            "home" | "go_home" => Ok(Self::Home),
            "dismiss" => Ok(Self::Dismiss),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "status" => Ok(Self::Status),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => other
                .parse::<ActivityKind>()
                .map(Self::Activity)
                .map_err(|e| format!("{e}; {HELP}")),
        }
    }
}

/// What a user sees: status, warning and disarm reason, without counters.
type Visible = (WatchdogStatus, bool, Option<DisarmReason>);

fn visible(snapshot: &WatchdogSnapshot) -> Visible {
    (
        snapshot.status,
        snapshot.warning_visible,
        snapshot.disarm_reason,
    )
}

/// Run the watchdog on real time, driven by stdin until `quit` or EOF.
///
/// Every escalation is treated as "navigated home": the watchdog is
/// re-attached so the next visitor gets a fresh cycle.
pub async fn execute(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = KioskConfig::load_or_default(config_path)?;
    let settings = Arc::new(SharedSettings::new(config.enabled));

    let (home_tx, mut home_rx) = mpsc::unbounded_channel();
    let service = WatchdogService::spawn(config.watchdog, settings, move |cause| {
        if home_tx.send(cause).is_err() {
            warn!(%cause, "Session closed before escalation was handled");
        }
    })
    .map_err(CliError::from)?;

    let handle = service.handle();
    let mut state = handle.subscribe_state();
    // The loop attaches as its first step; report the result of that.
    let mounted = *state
        .wait_for(|s| s.disarm_reason != Some(DisarmReason::Detached))
        .await?;
    let mut shown = visible(&mounted);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !json {
        println!("{HELP}");
    }
    output::print_snapshot(&mounted, json);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(CliError::from)? else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionInput>() {
                    Ok(SessionInput::Quit) => break,
                    Ok(input) => apply(&handle, input, json)?,
                    Err(msg) => warn!(input = %line.trim(), "Unrecognized input: {msg}"),
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *state.borrow_and_update();
                if visible(&snapshot) != shown {
                    shown = visible(&snapshot);
                    output::print_snapshot(&snapshot, json);
                }
            }
            Some(cause) = home_rx.recv() => {
                info!(%cause, "Navigated home; remounting watchdog");
                handle.attach().map_err(CliError::from)?;
            }
        }
    }

    let last = service.shutdown().await.map_err(CliError::from)?;
    output::print_metrics(&last.metrics, json);
    Ok(())
}

fn apply(handle: &WatchdogHandle, input: SessionInput, json: bool) -> Result<(), CliError> {
    match input {
        SessionInput::Activity(kind) => {
            if !handle.record_activity(kind)? {
                debug!(%kind, "Activity not tracked right now");
            }
        }
        SessionInput::Stay => handle.stay()?,
        SessionInput::Home => handle.go_home()?,
        SessionInput::Dismiss => handle.dismiss()?,
        SessionInput::Enable => handle.set_enabled(true)?,
        SessionInput::Disable => handle.set_enabled(false)?,
        SessionInput::Status => output::print_snapshot(&handle.snapshot(), json),
        SessionInput::Quit => {}
    }
    Ok(())
}
