//! Scripted scenarios replayed against the watchdog in virtual time.

use std::sync::Arc;
use std::time::Duration;

use kiosk_idle_watchdog::{
    ActivityKind, ActivityWatchdog, EscalationCause, ManualScheduler, RecordingActivitySource,
    SharedSettings, WatchdogMetrics, WatchdogStatus,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KioskConfig;
use crate::error::CliError;

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Activity(ActivityKind),
    Stay,
    GoHome,
    Dismiss,
    Enable,
    Disable,
    Attach,
    Detach,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activity(kind) => write!(f, "activity:{kind}"),
            Self::Stay => f.write_str("stay"),
            Self::GoHome => f.write_str("go_home"),
            Self::Dismiss => f.write_str("dismiss"),
            Self::Enable => f.write_str("enable"),
            Self::Disable => f.write_str("disable"),
            Self::Attach => f.write_str("attach"),
            Self::Detach => f.write_str("detach"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub at_ms: u64,
    pub action: Action,
}

/// Scenario file.
///
/// The watchdog is attached at `t = 0`. Without `run_until_ms` the clock
/// runs one full primary + grace period past the last step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub config: KioskConfig,
    pub steps: Vec<Step>,
    pub run_until_ms: Option<u64>,
}

impl Script {
    pub fn from_yaml(text: &str) -> Result<Self, CliError> {
        let script: Self =
            serde_yaml::from_str(text).map_err(|e| CliError::InvalidScript(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<(), CliError> {
        self.config.watchdog.validate()?;
        if self.steps.windows(2).any(|w| matches!(w, [a, b] if b.at_ms < a.at_ms)) {
            return Err(CliError::InvalidScript(
                "steps must be ordered by at_ms".to_string(),
            ));
        }
        if let (Some(until), Some(last)) = (self.run_until_ms, self.steps.last())
            && until < last.at_ms
        {
            return Err(CliError::InvalidScript(format!(
                "run_until_ms {until} is before the last step at {}",
                last.at_ms
            )));
        }
        Ok(())
    }

    fn end_ms(&self) -> u64 {
        self.run_until_ms.unwrap_or_else(|| {
            let last = self.steps.last().map_or(0, |s| s.at_ms);
            last.saturating_add(self.config.watchdog.primary_timeout_ms)
                .saturating_add(self.config.watchdog.grace_timeout_ms)
        })
    }
}

/// What moved the watchdog at a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Trigger {
    Attach,
    Action(Action),
    Timer,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attach => f.write_str("mount"),
            Self::Action(action) => action.fmt(f),
            Self::Timer => f.write_str("timer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub at_ms: u64,
    pub trigger: Trigger,
    pub status: WatchdogStatus,
    pub warning_visible: bool,
    pub escalation: Option<EscalationCause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub end_ms: u64,
    pub timeline: Vec<TimelineEntry>,
    pub escalations: Vec<(u64, EscalationCause)>,
    pub metrics: WatchdogMetrics,
    pub final_status: WatchdogStatus,
}

type SimWatchdog = ActivityWatchdog<ManualScheduler, RecordingActivitySource>;

struct Simulation {
    watchdog: SimWatchdog,
    settings: Arc<SharedSettings>,
    fired: Arc<Mutex<Vec<EscalationCause>>>,
    report: SimulationReport,
}

impl Simulation {
    fn new(config: &KioskConfig) -> Result<Self, CliError> {
        let settings = Arc::new(SharedSettings::new(config.enabled));
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let watchdog = ActivityWatchdog::new(
            config.watchdog.clone(),
            settings.clone(),
            ManualScheduler::new(),
            RecordingActivitySource::new(),
            move |cause| sink.lock().push(cause),
        )?;
        let report = SimulationReport {
            end_ms: 0,
            timeline: Vec::new(),
            escalations: Vec::new(),
            metrics: watchdog.metrics(),
            final_status: watchdog.status(),
        };
        Ok(Self {
            watchdog,
            settings,
            fired,
            report,
        })
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.watchdog.now().as_millis()).unwrap_or(u64::MAX)
    }

    fn record(&mut self, trigger: Trigger) {
        let at_ms = self.now_ms();
        let escalation = self.fired.lock().pop();
        if let Some(cause) = escalation {
            self.report.escalations.push((at_ms, cause));
        }
        self.report.timeline.push(TimelineEntry {
            at_ms,
            trigger,
            status: self.watchdog.status(),
            warning_visible: self.watchdog.warning_visible(),
            escalation,
        });
    }

    /// Fire timers one deadline at a time so each gets its own entry.
    fn run_to(&mut self, target_ms: u64) {
        let target = Duration::from_millis(target_ms);
        while let Some(deadline) = self
            .watchdog
            .scheduler()
            .next_deadline()
            .filter(|d| *d <= target)
        {
            self.watchdog.advance_to(deadline);
            self.record(Trigger::Timer);
        }
        self.watchdog.advance_to(target);
    }

    fn apply(&mut self, action: Action) {
        debug!(at_ms = self.now_ms(), %action, "Applying scripted action");
        let wd = &mut self.watchdog;
        match action {
            Action::Activity(kind) => wd.on_activity(kind),
            Action::Stay => wd.stay(),
            Action::GoHome => wd.go_home(),
            Action::Dismiss => wd.dismiss(),
            Action::Enable | Action::Disable => {
                self.settings.set_enabled(action == Action::Enable);
                wd.sync_settings();
            }
            Action::Attach => wd.attach(),
            Action::Detach => wd.detach(),
        }
        self.record(Trigger::Action(action));
    }
}

/// Replay `script` and collect the resulting timeline.
///
/// # Errors
///
/// Returns [`CliError::Watchdog`] if the embedded watchdog configuration is
/// invalid.
pub fn simulate(script: &Script) -> Result<SimulationReport, CliError> {
    let mut sim = Simulation::new(&script.config)?;
    sim.watchdog.attach();
    sim.record(Trigger::Attach);

    for step in &script.steps {
        sim.run_to(step.at_ms);
        sim.apply(step.action);
    }

    let end_ms = script.end_ms();
    sim.run_to(end_ms);

    sim.report.end_ms = end_ms;
    sim.report.metrics = sim.watchdog.metrics();
    sim.report.final_status = sim.watchdog.status();
    Ok(sim.report)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parses_actions() -> TestResult {
        let script = Script::from_yaml(
            "steps:\n  - { at_ms: 100, action: { activity: touchstart } }\n  - { at_ms: 9000, action: stay }\n  - { at_ms: 9500, action: go_home }\n",
        )?;
        assert_eq!(
            script.steps.iter().map(|s| s.action).collect::<Vec<_>>(),
            vec![
                Action::Activity(ActivityKind::TouchStart),
                Action::Stay,
                Action::GoHome
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_unordered_steps() {
        let result = Script::from_yaml(
            "steps:\n  - { at_ms: 500, action: stay }\n  - { at_ms: 100, action: stay }\n",
        );
        assert!(matches!(result, Err(CliError::InvalidScript(_))));
    }

    #[test]
    fn rejects_unknown_action() {
        let result = Script::from_yaml("steps:\n  - { at_ms: 1, action: reboot }\n");
        assert!(matches!(result, Err(CliError::InvalidScript(_))));
    }

    #[test]
    fn empty_script_plays_one_full_cycle() -> TestResult {
        let report = simulate(&Script::default())?;

        assert_eq!(report.end_ms, 18_000);
        assert_eq!(report.escalations, vec![(18_000, EscalationCause::GraceExpired)]);
        assert_eq!(report.final_status, WatchdogStatus::Disarmed);

        let warning = report
            .timeline
            .iter()
            .find(|e| e.warning_visible)
            .map(|e| e.at_ms);
        assert_eq!(warning, Some(8_000));
        Ok(())
    }

    #[test]
    fn stay_then_go_home() -> TestResult {
        let script = Script::from_yaml(
            "steps:\n  - { at_ms: 9000, action: stay }\n  - { at_ms: 17000, action: go_home }\nrun_until_ms: 60000\n",
        )?;
        let report = simulate(&script)?;

        assert_eq!(report.escalations, vec![(17_000, EscalationCause::UserRequested)]);
        assert_eq!(report.metrics.acknowledgments, 1);
        assert_eq!(report.metrics.warnings_shown, 2);
        Ok(())
    }

    #[test]
    fn disabled_config_never_escalates() -> TestResult {
        let script = Script::from_yaml("config: { enabled: false }\nrun_until_ms: 100000\n")?;
        let report = simulate(&script)?;

        assert!(report.escalations.is_empty());
        assert_eq!(report.metrics.arm_count, 0);
        Ok(())
    }

    #[test]
    fn toggling_after_escalation_starts_new_cycle() -> TestResult {
        let script = Script::from_yaml(
            "steps:\n  - { at_ms: 20000, action: disable }\n  - { at_ms: 21000, action: enable }\nrun_until_ms: 40000\n",
        )?;
        let report = simulate(&script)?;

        assert_eq!(
            report.escalations,
            vec![
                (18_000, EscalationCause::GraceExpired),
                (39_000, EscalationCause::GraceExpired)
            ]
        );
        assert_eq!(report.metrics.arm_count, 2);
        Ok(())
    }

    #[test]
    fn unvalidated_config_is_rejected_before_replay() {
        let mut script = Script::default();
        script.config.watchdog.primary_timeout_ms = 0;

        assert!(matches!(simulate(&script), Err(CliError::Watchdog(_))));
    }
}
