//! Kiosk configuration file.

use kiosk_idle_watchdog::WatchdogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CliError;

/// Top-level YAML document.
///
/// ```yaml
/// enabled: true
/// watchdog:
///   primary_timeout_ms: 8000
///   grace_timeout_ms: 10000
///   activity_kinds: [mousedown, keydown, scroll, touchstart, click]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KioskConfig {
    /// Initial value of the idle-timeout setting.
    pub enabled: bool,
    pub watchdog: WatchdogConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watchdog: WatchdogConfig::default(),
        }
    }
}

impl KioskConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, CliError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
        config
            .watchdog
            .validate()
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| match e {
            CliError::InvalidConfiguration(msg) => {
                CliError::InvalidConfiguration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CliError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_idle_watchdog::ActivityKind;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn empty_document_uses_defaults() -> TestResult {
        let config = KioskConfig::from_yaml("{}")?;
        assert_eq!(config, KioskConfig::default());
        assert!(config.enabled);
        assert_eq!(config.watchdog.primary_timeout_ms, 8_000);
        Ok(())
    }

    #[test]
    fn partial_watchdog_section() -> TestResult {
        let config = KioskConfig::from_yaml(
            "enabled: false\nwatchdog:\n  grace_timeout_ms: 3000\n  activity_kinds: [touchstart]\n",
        )?;
        assert!(!config.enabled);
        assert_eq!(config.watchdog.primary_timeout_ms, 8_000);
        assert_eq!(config.watchdog.grace_timeout_ms, 3_000);
        assert_eq!(config.watchdog.activity_kinds, vec![ActivityKind::TouchStart]);
        Ok(())
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        for doc in [
            "watchdog:\n  primary_timeout_ms: 0\n",
            "watchdog:\n  activity_kinds: []\n",
            "watchdog:\n  activity_kinds: [hover]\n",
            "enabeld: true\n",
        ] {
            assert!(
                matches!(
                    KioskConfig::from_yaml(doc),
                    Err(CliError::InvalidConfiguration(_))
                ),
                "accepted: {doc}"
            );
        }
    }

    #[test]
    fn load_prefixes_path() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("kiosk.yaml");
        std::fs::write(&path, "watchdog:\n  grace_timeout_ms: 0\n")?;

        match KioskConfig::load(&path) {
            Err(CliError::InvalidConfiguration(msg)) => assert!(msg.contains("kiosk.yaml")),
            other => return Err(format!("unexpected: {other:?}").into()),
        }
        Ok(())
    }
}
