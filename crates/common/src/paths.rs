use std::env;
use std::path::PathBuf;

pub const CONFIG_DIR_NAME: &str = "waylay.d";
pub const SYSTEM_CONFIG_BASE: &str = "/etc";
pub const SYSTEM_LOG_BASE: &str = "/var/log";

/// Overrides the configuration root entirely (used by tests and
/// non-root installs).
pub const CONFIG_DIR_VAR: &str = "WAYLAY_CONFIG_DIR";
/// Overrides the invocation-log directory.
pub const LOG_DIR_VAR: &str = "WAYLAY_LOG_DIR";

/// Directory holding one configuration document per intercepted tool.
///
/// Resolution order: `WAYLAY_CONFIG_DIR`, then `$VIRTUAL_ENV/etc/waylay.d`
/// when running inside a virtual environment, then `/etc/waylay.d`.
pub fn config_root() -> PathBuf {
    if let Ok(override_dir) = env::var(CONFIG_DIR_VAR) {
        let trimmed = override_dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    if let Ok(virtual_env) = env::var("VIRTUAL_ENV") {
        let trimmed = virtual_env.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join("etc").join(CONFIG_DIR_NAME);
        }
    }
    PathBuf::from(SYSTEM_CONFIG_BASE).join(CONFIG_DIR_NAME)
}

/// Directory receiving one append-only log file per tool with `log` enabled.
pub fn invocation_log_dir() -> PathBuf {
    if let Ok(override_dir) = env::var(LOG_DIR_VAR) {
        let trimmed = override_dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(SYSTEM_LOG_BASE).join(CONFIG_DIR_NAME)
}
