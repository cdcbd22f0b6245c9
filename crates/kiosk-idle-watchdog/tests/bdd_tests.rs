//! BDD tests for kiosk inactivity scenarios.
//!
//! Feature: kiosk_idle_timeout.feature

#![cfg(test)]

use kiosk_idle_watchdog::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

struct Kiosk {
    watchdog: ActivityWatchdog<ManualScheduler, RecordingActivitySource>,
    settings: Arc<SharedSettings>,
    navigations_home: Arc<AtomicU32>,
}

impl Kiosk {
    fn mounted(config: WatchdogConfig) -> WatchdogResult<Self> {
        let settings = Arc::new(SharedSettings::default());
        let navigations_home = Arc::new(AtomicU32::new(0));
        let router = Arc::clone(&navigations_home);
        let mut watchdog = ActivityWatchdog::new(
            config,
            settings.clone(),
            ManualScheduler::new(),
            RecordingActivitySource::new(),
            move |_| {
                router.fetch_add(1, Ordering::SeqCst);
            },
        )?;
        watchdog.attach();
        Ok(Self {
            watchdog,
            settings,
            navigations_home,
        })
    }

    fn went_home(&self) -> u32 {
        self.navigations_home.load(Ordering::SeqCst)
    }
}

mod kiosk_idle_scenarios {
    use super::*;

    /// Scenario: A visitor walks away mid-campaign
    #[test]
    fn scenario_visitor_walks_away() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;

        kiosk.watchdog.on_activity(ActivityKind::TouchStart);
        kiosk.watchdog.advance(secs(8));
        assert!(kiosk.watchdog.warning_visible(), "warning after 8s");

        kiosk.watchdog.advance(secs(10));
        assert_eq!(kiosk.went_home(), 1, "navigated home after grace");
        assert!(!kiosk.watchdog.warning_visible());
        Ok(())
    }

    /// Scenario: A visitor keeps browsing the catalog
    #[test]
    fn scenario_visitor_keeps_browsing() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;

        for _ in 0..60 {
            kiosk.watchdog.advance(secs(5));
            kiosk.watchdog.on_activity(ActivityKind::Scroll);
        }

        assert_eq!(kiosk.watchdog.metrics().warnings_shown, 0);
        assert_eq!(kiosk.went_home(), 0);
        Ok(())
    }

    /// Scenario: A visitor taps "stay" on the warning
    #[test]
    fn scenario_visitor_taps_stay() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(12));

        kiosk.watchdog.stay();
        kiosk.watchdog.advance(secs(7));

        assert!(!kiosk.watchdog.warning_visible());
        assert_eq!(kiosk.went_home(), 0);
        Ok(())
    }

    /// Scenario: A visitor taps "go home" on the warning
    #[test]
    fn scenario_visitor_taps_go_home() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(9));

        kiosk.watchdog.go_home();

        assert_eq!(kiosk.went_home(), 1);
        assert_eq!(kiosk.watchdog.scheduler().pending_count(), 0);
        assert_eq!(kiosk.watchdog.metrics().user_escalations, 1);
        Ok(())
    }

    /// Scenario: A visitor taps outside the warning dialog
    #[test]
    fn scenario_visitor_taps_outside_dialog() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(8));

        kiosk.watchdog.dismiss();

        assert_eq!(kiosk.watchdog.status(), WatchdogStatus::Idle);
        kiosk.watchdog.advance(secs(8));
        assert!(kiosk.watchdog.warning_visible());
        Ok(())
    }

    /// Scenario: Staff disable the timeout from the settings page
    #[test]
    fn scenario_staff_disable_timeout() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(9));

        kiosk.settings.set_enabled(false);
        kiosk.watchdog.sync_settings();
        kiosk.watchdog.advance(secs(3_600));

        assert_eq!(kiosk.went_home(), 0);
        assert_eq!(kiosk.watchdog.disarm_reason(), Some(DisarmReason::Disabled));
        Ok(())
    }

    /// Scenario: The home page remounts after an escalation
    #[test]
    fn scenario_home_page_remounts() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(18));
        assert_eq!(kiosk.went_home(), 1);

        kiosk.watchdog.detach();
        kiosk.watchdog.attach();
        kiosk.watchdog.advance(secs(18));

        assert_eq!(kiosk.went_home(), 2);
        assert_eq!(kiosk.watchdog.metrics().arm_count, 2);
        Ok(())
    }

    /// Scenario: Staff switch the timeout off and on after a visitor was sent home
    #[test]
    fn scenario_staff_toggle_after_escalation() -> TestResult {
        let mut kiosk = Kiosk::mounted(WatchdogConfig::default())?;
        kiosk.watchdog.advance(secs(18));
        assert_eq!(kiosk.went_home(), 1);

        kiosk.settings.set_enabled(false);
        kiosk.watchdog.sync_settings();
        kiosk.settings.set_enabled(true);
        kiosk.watchdog.sync_settings();

        assert_eq!(kiosk.watchdog.status(), WatchdogStatus::Idle, "monitoring resumed");
        kiosk.watchdog.advance(secs(18));
        assert_eq!(kiosk.went_home(), 2);
        Ok(())
    }

    /// Scenario: A short-timeout configuration for attract-loop screens
    #[test]
    fn scenario_short_timeout_configuration() -> TestResult {
        let config = WatchdogConfig::builder()
            .primary_timeout_ms(2_000)
            .grace_timeout_ms(1_000)
            .activity_kinds([ActivityKind::TouchStart, ActivityKind::Click])
            .build()?;
        let mut kiosk = Kiosk::mounted(config)?;

        kiosk.watchdog.advance(Duration::from_millis(1_500));
        kiosk.watchdog.on_activity(ActivityKind::KeyDown);
        kiosk.watchdog.advance(Duration::from_millis(500));
        assert!(kiosk.watchdog.warning_visible(), "keydown is not tracked");

        kiosk.watchdog.advance(Duration::from_millis(1_000));
        assert_eq!(kiosk.went_home(), 1);
        Ok(())
    }
}
