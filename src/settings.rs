//! Effective runtime settings
//!
//! Layering, lowest to highest priority: built-in defaults, the user config
//! file, environment variables, command-line flags.

use crate::config::{
    DEFAULT_TARGET, LOCK_DELAY, LOG_ENV, MAX_PAUSE_DURATION, MAX_PAUSE_SECS, MIN_PAUSE_SECS,
    REFRESH_INTERVAL, TARGET_ENV,
};
use crate::error::{errors, FreezeResult};
use crate::utils::config_paths::UserConfig;
use std::time::Duration;

/// Range the pause length is drawn from, in whole seconds (upper bound exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for PauseWindow {
    fn default() -> Self {
        Self {
            min_secs: MIN_PAUSE_SECS,
            max_secs: MAX_PAUSE_SECS,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<String>,
    pub log_level: Option<String>,
    pub pause_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target: String,
    pub window: PauseWindow,
    /// Fixed pause length, bypassing the random window
    pub fixed_pause: Option<Duration>,
    pub refresh: Duration,
    pub lock_delay: Duration,
    pub log_level: Option<String>,
    pub log_to_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            window: PauseWindow::default(),
            fixed_pause: None,
            refresh: REFRESH_INTERVAL,
            lock_delay: LOCK_DELAY,
            log_level: None,
            log_to_file: false,
        }
    }
}

impl Settings {
    /// Resolve from the process environment
    pub fn resolve(user: UserConfig, overrides: Overrides) -> FreezeResult<Self> {
        Self::resolve_with_env(user, overrides, |key| std::env::var(key).ok())
    }

    pub fn resolve_with_env(
        user: UserConfig,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> FreezeResult<Self> {
        let mut settings = Self::default();

        if let Some(target) = user.target {
            settings.target = target;
        }
        if let Some(min) = user.min_pause_secs {
            settings.window.min_secs = min;
        }
        if let Some(max) = user.max_pause_secs {
            settings.window.max_secs = max;
        }
        if let Some(ms) = user.refresh_ms {
            settings.refresh = Duration::from_millis(ms);
        }
        if let Some(ms) = user.lock_delay_ms {
            settings.lock_delay = Duration::from_millis(ms);
        }
        settings.log_level = user.log_level;
        settings.log_to_file = user.log_to_file.unwrap_or(false);

        if let Some(target) = env(TARGET_ENV).filter(|v| !v.trim().is_empty()) {
            settings.target = target;
        }
        if let Some(level) = env(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            settings.log_level = Some(level);
        }

        if let Some(target) = overrides.target {
            settings.target = target;
        }
        if let Some(level) = overrides.log_level {
            settings.log_level = Some(level);
        }
        if let Some(secs) = overrides.pause_secs {
            if !secs.is_finite() || secs < 0.0 {
                return Err(errors::config_error(format!(
                    "pause length must be a non-negative number of seconds, got {secs}"
                )));
            }
            // Checked before conversion: from_secs_f64 panics on overflow
            if secs > MAX_PAUSE_DURATION.as_secs_f64() {
                return Err(errors::config_error(format!(
                    "pause of {secs}s exceeds the {}s limit",
                    MAX_PAUSE_DURATION.as_secs()
                )));
            }
            settings.fixed_pause = Some(Duration::from_secs_f64(secs));
        }

        settings.validate()?;
        Ok(settings)
    }

    /// 校验数据完整性
    pub fn validate(&self) -> FreezeResult<()> {
        if self.target.trim().is_empty() {
            return Err(errors::config_error("target name cannot be empty"));
        }
        if self.window.min_secs > self.window.max_secs {
            return Err(errors::config_error(format!(
                "min_pause_secs ({}) must not exceed max_pause_secs ({})",
                self.window.min_secs, self.window.max_secs
            )));
        }
        let longest = self
            .fixed_pause
            .unwrap_or(Duration::from_secs(self.window.max_secs));
        if longest > MAX_PAUSE_DURATION {
            return Err(errors::config_error(format!(
                "pause of {}s exceeds the {}s limit",
                longest.as_secs(),
                MAX_PAUSE_DURATION.as_secs()
            )));
        }
        if self.refresh.is_zero() {
            return Err(errors::config_error("refresh_ms must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FreezeError;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve_with_env(UserConfig::default(), Overrides::default(), no_env)
                .unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.target, "GTA");
        assert_eq!(settings.window, PauseWindow { min_secs: 9, max_secs: 11 });
    }

    #[test]
    fn test_layering_order() {
        let user = UserConfig {
            target: Some("FromFile".to_string()),
            refresh_ms: Some(50),
            log_level: Some("debug".to_string()),
            ..UserConfig::default()
        };
        let env = |key: &str| match key {
            TARGET_ENV => Some("FromEnv".to_string()),
            _ => None,
        };

        let settings = Settings::resolve_with_env(user.clone(), Overrides::default(), env).unwrap();
        assert_eq!(settings.target, "FromEnv");
        assert_eq!(settings.refresh, Duration::from_millis(50));
        assert_eq!(settings.log_level.as_deref(), Some("debug"));

        let overrides = Overrides {
            target: Some("FromFlag".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve_with_env(user, overrides, env).unwrap();
        assert_eq!(settings.target, "FromFlag");
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let user = UserConfig {
            min_pause_secs: Some(12),
            max_pause_secs: Some(4),
            ..UserConfig::default()
        };
        let err = Settings::resolve_with_env(user, Overrides::default(), no_env).unwrap_err();
        assert!(matches!(err, FreezeError::Config { .. }));
    }

    #[test]
    fn test_zero_refresh_is_rejected() {
        let user = UserConfig {
            refresh_ms: Some(0),
            ..UserConfig::default()
        };
        assert!(Settings::resolve_with_env(user, Overrides::default(), no_env).is_err());
    }

    #[test]
    fn test_fixed_pause_override() {
        let overrides = Overrides {
            pause_secs: Some(2.5),
            ..Overrides::default()
        };
        let settings =
            Settings::resolve_with_env(UserConfig::default(), overrides, no_env).unwrap();
        assert_eq!(settings.fixed_pause, Some(Duration::from_millis(2500)));

        let overrides = Overrides {
            pause_secs: Some(-1.0),
            ..Overrides::default()
        };
        assert!(Settings::resolve_with_env(UserConfig::default(), overrides, no_env).is_err());

        let overrides = Overrides {
            pause_secs: Some(3600.0),
            ..Overrides::default()
        };
        assert!(Settings::resolve_with_env(UserConfig::default(), overrides, no_env).is_err());
    }

    #[test]
    fn test_huge_pause_is_a_config_error() {
        for secs in [1e30, f64::MAX] {
            let overrides = Overrides {
                pause_secs: Some(secs),
                ..Overrides::default()
            };
            let err = Settings::resolve_with_env(UserConfig::default(), overrides, no_env)
                .unwrap_err();
            assert!(matches!(err, FreezeError::Config { .. }));
        }

        // The limit itself is still accepted
        let overrides = Overrides {
            pause_secs: Some(MAX_PAUSE_DURATION.as_secs_f64()),
            ..Overrides::default()
        };
        let settings =
            Settings::resolve_with_env(UserConfig::default(), overrides, no_env).unwrap();
        assert_eq!(settings.fixed_pause, Some(MAX_PAUSE_DURATION));
    }

    #[test]
    fn test_blank_target_is_rejected() {
        let overrides = Overrides {
            target: Some("  ".to_string()),
            ..Overrides::default()
        };
        assert!(Settings::resolve_with_env(UserConfig::default(), overrides, no_env).is_err());
    }
}
