//! Output formatting for CLI responses

use anyhow::Error;
use colored::Colorize;
use kiosk_idle_watchdog::{ActivityKind, WatchdogMetrics, WatchdogSnapshot, WatchdogStatus};
use serde::Serialize;
use serde_json::json;

use crate::config::KioskConfig;
use crate::error::CliError;
use crate::script::{SimulationReport, TimelineEntry};

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    print_json(&error_json);
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

pub fn print_config(config: &KioskConfig, json: bool) {
    if json {
        print_json(&json!({ "success": true, "config": config }));
        return;
    }

    println!("{}", "Configuration is valid".green().bold());
    let enabled = if config.enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!("  Idle timeout:     {enabled}");
    println!("  Primary timeout:  {} ms", config.watchdog.primary_timeout_ms);
    println!("  Grace timeout:    {} ms", config.watchdog.grace_timeout_ms);
    let kinds: Vec<&str> = config
        .watchdog
        .activity_kinds
        .iter()
        .copied()
        .map(ActivityKind::as_str)
        .collect();
    println!("  Activity kinds:   {}", kinds.join(", "));
}

pub fn print_simulation(report: &SimulationReport, json: bool) {
    if json {
        print_json(&json!({ "success": true, "simulation": report }));
        return;
    }

    println!("{}", "Timeline:".bold());
    for entry in &report.timeline {
        print_timeline_entry(entry);
    }
    println!();
    println!(
        "Ran to {} ms: {} warning(s), {} escalation(s), final status {}",
        report.end_ms,
        report.metrics.warnings_shown,
        report.metrics.escalations(),
        status_label(report.final_status)
    );
}

fn print_timeline_entry(entry: &TimelineEntry) {
    let trigger = entry.trigger.to_string();
    let mut line = format!(
        "  {:>8} ms  {trigger:<20} {}",
        entry.at_ms,
        status_label(entry.status)
    );
    if entry.warning_visible {
        line.push_str(&format!("  {}", "warning visible".yellow()));
    }
    if let Some(cause) = entry.escalation {
        line.push_str(&format!("  {} ({cause})", "navigate home".red().bold()));
    }
    println!("{line}");
}

pub fn print_snapshot(snapshot: &WatchdogSnapshot, json: bool) {
    if json {
        print_json(snapshot);
        return;
    }
    let mut line = format!("[{}]", status_label(snapshot.status));
    if snapshot.warning_visible {
        line.push_str(&format!(
            " {} still there? (stay / home)",
            "Are you".yellow().bold()
        ));
    }
    if let Some(reason) = snapshot.disarm_reason {
        line.push_str(&format!(" ({reason})"));
    }
    println!("{line}");
}

pub fn print_metrics(metrics: &WatchdogMetrics, json: bool) {
    if json {
        print_json(&json!({ "success": true, "metrics": metrics }));
        return;
    }
    println!("{}", "Session summary:".bold());
    println!("  Warnings shown:   {}", metrics.warnings_shown);
    println!("  Acknowledged:     {}", metrics.acknowledgments);
    println!("  Dismissed:        {}", metrics.dismissals);
    println!(
        "  Escalations:      {} (grace {}, user {})",
        metrics.escalations(),
        metrics.grace_escalations,
        metrics.user_escalations
    );
}

fn status_label(status: WatchdogStatus) -> colored::ColoredString {
    match status {
        WatchdogStatus::Idle => status.as_str().green(),
        WatchdogStatus::Warning => status.as_str().yellow().bold(),
        WatchdogStatus::Disarmed => status.as_str().dimmed(),
    }
}

fn error_type_name(error: &Error) -> &'static str {
    error
        .downcast_ref::<CliError>()
        .map_or("Error", CliError::kind)
}
