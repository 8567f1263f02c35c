use std::time::Duration;

pub const DEFAULT_TARGET: &str = "GTA";
pub const APP_DIRECTORY: &str = ".gtappl";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "gtappl.log";

pub const TARGET_ENV: &str = "GTAPPL_TARGET";
pub const LOG_ENV: &str = "GTAPPL_LOG";

// Pause window in whole seconds, upper bound exclusive; a random 0-998 ms is added
pub const MIN_PAUSE_SECS: u64 = 9;
pub const MAX_PAUSE_SECS: u64 = 11;
pub const MAX_EXTRA_MILLIS: u64 = 999;

pub const REFRESH_INTERVAL: Duration = Duration::from_millis(75);
pub const LOCK_DELAY: Duration = Duration::from_millis(1500);
// Pause between thread tokens while the first scan is listed
pub const TOKEN_REVEAL_DELAY: Duration = Duration::from_millis(15);
// Upper bound accepted from config/CLI so a typo cannot freeze a game for hours
pub const MAX_PAUSE_DURATION: Duration = Duration::from_secs(10 * 60);
