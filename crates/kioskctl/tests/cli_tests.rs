//! Integration tests for kioskctl CLI
//!
//! Each test runs the real binary and checks output and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn kioskctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("kioskctl")?;
    cmd.env_remove("RUST_LOG").env_remove("KIOSKCTL_CONFIG");
    Ok(cmd)
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> Result<PathBuf, std::io::Error> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn stdout_json(output: &std::process::Output) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

mod check_config {
    use super::*;

    #[test]
    fn valid_config_is_printed() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "kiosk.yaml",
            "enabled: true\nwatchdog:\n  primary_timeout_ms: 30000\n",
        )?;

        kioskctl()?
            .args(["check-config"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"))
            .stdout(predicate::str::contains("30000 ms"))
            .stdout(predicate::str::contains("10000 ms"));
        Ok(())
    }

    #[test]
    fn json_output_contains_effective_config() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "kiosk.yaml", "watchdog:\n  activity_kinds: [click]\n")?;

        let output = kioskctl()?
            .args(["--json", "check-config"])
            .arg(&path)
            .output()?;
        assert!(output.status.success());

        let json = stdout_json(&output)?;
        assert_eq!(json["success"], true);
        assert_eq!(json["config"]["watchdog"]["primary_timeout_ms"], 8000);
        assert_eq!(json["config"]["watchdog"]["activity_kinds"][0], "click");
        Ok(())
    }

    #[test]
    fn invalid_config_exits_with_code_2() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "kiosk.yaml", "watchdog:\n  grace_timeout_ms: 0\n")?;

        kioskctl()?
            .args(["check-config"])
            .arg(&path)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid configuration"));
        Ok(())
    }

    #[test]
    fn invalid_config_json_error() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "kiosk.yaml", "watchdog: [not, a, map]\n")?;

        let output = kioskctl()?
            .args(["check-config", "--json"])
            .arg(&path)
            .output()?;
        assert_eq!(output.status.code(), Some(2));

        let json = stdout_json(&output)?;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["type"], "InvalidConfiguration");
        Ok(())
    }

    #[test]
    fn missing_file_exits_with_code_1() -> TestResult {
        kioskctl()?
            .args(["check-config", "/nonexistent/kiosk.yaml"])
            .assert()
            .code(1);
        Ok(())
    }
}

mod simulate {
    use super::*;

    #[test]
    fn walkaway_scenario_navigates_home() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "walkaway.yaml",
            "steps:\n  - { at_ms: 2000, action: { activity: touchstart } }\n",
        )?;

        kioskctl()?
            .args(["simulate"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("activity:touchstart"))
            .stdout(predicate::str::contains("warning visible"))
            .stdout(predicate::str::contains("navigate home"));
        Ok(())
    }

    #[test]
    fn json_timeline_reports_escalation_time() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "stay.yaml",
            "steps:\n  - { at_ms: 8500, action: stay }\nrun_until_ms: 40000\n",
        )?;

        let output = kioskctl()?
            .args(["simulate", "--json"])
            .arg(&path)
            .output()?;
        assert!(output.status.success());

        let json = stdout_json(&output)?;
        let report = &json["simulation"];
        assert_eq!(report["metrics"]["acknowledgments"], 1);
        assert_eq!(report["escalations"][0][0], 8500 + 8000 + 10000);
        assert_eq!(report["escalations"][0][1], "grace_expired");
        assert_eq!(report["final_status"], "disarmed");
        Ok(())
    }

    #[test]
    fn unordered_steps_exit_with_code_3() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "bad.yaml",
            "steps:\n  - { at_ms: 900, action: stay }\n  - { at_ms: 100, action: dismiss }\n",
        )?;

        kioskctl()?
            .args(["simulate"])
            .arg(&path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Invalid script"));
        Ok(())
    }

    #[test]
    fn invalid_embedded_config_exits_with_code_2() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "bad.yaml",
            "config:\n  watchdog:\n    primary_timeout_ms: 0\n",
        )?;

        kioskctl()?.args(["simulate"]).arg(&path).assert().code(2);
        Ok(())
    }
}

mod run {
    use super::*;

    #[test]
    fn quit_prints_summary() -> TestResult {
        kioskctl()?
            .args(["run"])
            .write_stdin("click\nstatus\nquit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Idle"))
            .stdout(predicate::str::contains("Session summary"));
        Ok(())
    }

    #[test]
    fn unknown_input_is_not_fatal() -> TestResult {
        kioskctl()?
            .args(["-v", "run"])
            .write_stdin("hover\nstay\n")
            .assert()
            .success()
            .stderr(predicate::str::contains("Unrecognized input"));
        Ok(())
    }

    #[test]
    fn disabled_config_starts_passive() -> TestResult {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "kiosk.yaml", "enabled: false\n")?;

        kioskctl()?
            .args(["run", "--config"])
            .arg(&path)
            .write_stdin("quit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("disabled"));
        Ok(())
    }
}
