//! Shim identity and the interception version gate
//!
//! Generated shim scripts communicate with the runtime through three
//! environment variables: the tool name, the diverted original binary,
//! and the waylay version that generated the script.

use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Tool name the shim stands in for (e.g. "git").
pub const TOOL_VAR: &str = "WAYLAY_TOOL";
/// Absolute path of the renamed-aside original binary.
pub const TARGET_VAR: &str = "WAYLAY_TARGET";
/// Waylay version that generated the shim script; empty for legacy shims.
pub const STAMP_VAR: &str = "WAYLAY_STAMP";

/// Identity of one shim invocation.
#[derive(Debug)]
pub struct ShimContext {
    pub tool_name: String,
    /// The real binary to hand control to in the direct (non-forward) case.
    pub target: PathBuf,
    /// Version recorded in the generated script at interception time.
    pub stamp: String,
    /// Raw arguments, process name excluded.
    pub args: Vec<String>,
}

impl ShimContext {
    /// Build the context from the variables exported by the generated
    /// script and the current argument vector.
    pub fn from_env() -> Result<Self> {
        let tool_name = env::var(TOOL_VAR)
            .context("WAYLAY_TOOL is not set; waylay-shim must be launched by a generated shim")?;
        let target = env::var(TARGET_VAR)
            .map(PathBuf::from)
            .context("WAYLAY_TARGET is not set; waylay-shim must be launched by a generated shim")?;
        let stamp = env::var(STAMP_VAR).unwrap_or_default();
        let args = env::args().skip(1).collect();

        Ok(Self {
            tool_name,
            target,
            stamp,
            args,
        })
    }
}

#[derive(Debug, Error)]
#[error(
    "this call was intercepted by waylay {stamp}, which is newer than the installed {installed}; \
     undo the interception and intercept again"
)]
pub struct VersionMismatch {
    pub stamp: String,
    pub installed: String,
}

/// Refuse to run a shim generated by a newer major release.
///
/// An empty stamp marks a legacy shim and skips the check; a stamp that
/// does not parse is treated the same way, with a warning.
pub fn check_version_gate(stamp: &str, installed: &str) -> Result<(), VersionMismatch> {
    let stamp = stamp.trim();
    if stamp.is_empty() {
        return Ok(());
    }

    let (Some(stamp_major), Some(installed_major)) = (major_of(stamp), major_of(installed)) else {
        warn!("unparseable version stamp `{stamp}` (installed {installed}), skipping gate");
        return Ok(());
    };

    if stamp_major > installed_major {
        return Err(VersionMismatch {
            stamp: stamp.to_string(),
            installed: installed.to_string(),
        });
    }
    Ok(())
}

fn major_of(version: &str) -> Option<u64> {
    version.split('.').next()?.parse().ok()
}
