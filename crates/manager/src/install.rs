//! Intercept/undo state machine
//!
//! A tool is either intercepted or it is not. `intercept` moves
//! `NotIntercepted -> Intercepted`: the real binary is renamed aside with
//! the [`DIVERTED_SUFFIX`] marker and a generated script takes its place.
//! `undo` reverses the transition and leaves the configuration record
//! behind. The rename-aside file doubles as the already-intercepted
//! marker.

use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::InterceptError;
use crate::lookup::first_executable;
use waylay_config::ConfigStore;

/// Suffix appended to a diverted original binary.
pub const DIVERTED_SUFFIX: &str = "-waylaid";

/// Name of the runtime binary the generated scripts exec into.
const RUNTIME_BIN: &str = "waylay-shim";

pub struct InterceptionManager {
    store: ConfigStore,
    runtime_override: Option<PathBuf>,
    version: String,
}

impl InterceptionManager {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            runtime_override: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Use a fixed runtime binary path instead of resolving one (tests,
    /// relocated installs).
    pub fn with_runtime(store: ConfigStore, runtime: PathBuf) -> Self {
        Self {
            store,
            runtime_override: Some(runtime),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Install a shim for `tool`. Creates a default configuration record
    /// on first interception. Returns the shim path.
    pub fn intercept(&self, tool: &str) -> Result<PathBuf, InterceptError> {
        if !self.store.exists(tool) {
            eprintln!("No configuration found for {tool}, creating a default one");
            self.store.save_default(tool)?;
        }

        let source = first_executable(tool)
            .ok_or_else(|| InterceptError::NotFound(tool.to_string()))?;
        let diverted = diverted_path(&source);
        if diverted.exists() {
            return Err(InterceptError::AlreadyIntercepted(tool.to_string()));
        }

        let runtime = self.runtime_binary()?;
        let original_perms = fs::metadata(&source)?.permissions();

        debug!("diverting {} to {}", source.display(), diverted.display());
        fs::rename(&source, &diverted)?;

        let script = render_shim_script(&runtime, tool, &diverted, &self.version);
        if let Err(e) = waylay_common::write_atomic(&source, script.as_bytes()) {
            // Put the original back rather than leave the tool missing.
            let _ = fs::rename(&diverted, &source);
            return Err(e.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = original_perms;
            perms.set_mode(perms.mode() | 0o111);
            fs::set_permissions(&source, perms)?;
        }
        #[cfg(not(unix))]
        let _ = original_perms;

        Ok(source)
    }

    /// Remove the shim for `tool` and restore the original binary. The
    /// configuration record is left in place.
    pub fn undo(&self, tool: &str) -> Result<PathBuf, InterceptError> {
        let shim = first_executable(tool)
            .ok_or_else(|| InterceptError::NotIntercepted(tool.to_string()))?;
        let diverted = diverted_path(&shim);
        if !diverted.exists() || !self.store.exists(tool) {
            return Err(InterceptError::NotIntercepted(tool.to_string()));
        }

        fs::remove_file(&shim)?;
        fs::rename(&diverted, &shim)?;
        Ok(shim)
    }

    /// A tool counts as intercepted when the shim is reachable, the
    /// diverted original sits next to it, and a configuration record
    /// exists.
    pub fn is_intercepted(&self, tool: &str) -> bool {
        match first_executable(tool) {
            Some(path) => diverted_path(&path).exists() && self.store.exists(tool),
            None => false,
        }
    }

    pub fn assert_intercepted(&self, tool: &str) -> Result<(), InterceptError> {
        if self.is_intercepted(tool) {
            Ok(())
        } else {
            Err(InterceptError::NotIntercepted(tool.to_string()))
        }
    }

    fn runtime_binary(&self) -> Result<PathBuf, InterceptError> {
        if let Some(runtime) = &self.runtime_override {
            return Ok(runtime.clone());
        }

        // Prefer the runtime installed next to the current executable,
        // fall back to PATH.
        let current = env::current_exe()?;
        if let Some(dir) = current.parent() {
            let candidate = dir.join(RUNTIME_BIN);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        which::which(RUNTIME_BIN).map_err(|_| InterceptError::NotFound(RUNTIME_BIN.to_string()))
    }
}

fn diverted_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(DIVERTED_SUFFIX);
    PathBuf::from(name)
}

/// The generated shim: a small script exporting the shim identity and
/// exec'ing the runtime with the original arguments.
pub fn render_shim_script(runtime: &Path, tool: &str, target: &Path, version: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Generated by waylay. Run `waylay undo {tool}` to restore the original binary.\n\
         WAYLAY_TOOL='{tool}'\n\
         WAYLAY_TARGET='{target}'\n\
         WAYLAY_STAMP='{version}'\n\
         export WAYLAY_TOOL WAYLAY_TARGET WAYLAY_STAMP\n\
         exec '{runtime}' \"$@\"\n",
        target = target.display(),
        runtime = runtime.display(),
    )
}
