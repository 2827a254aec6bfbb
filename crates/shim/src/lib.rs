//! Waylay shim runtime
//!
//! The `waylay` CLI replaces an intercepted tool with a small generated
//! script; that script exports the tool's identity and `exec`s the
//! `waylay-shim` binary, which lands here. One invocation:
//!
//! 1. Reads the shim identity from the environment and checks the
//!    version stamp recorded at interception time.
//! 2. Loads the tool's configuration record (an atomic snapshot).
//! 3. Augments the environment, rewrites the argument vector, and emits
//!    any configured notices and log lines.
//! 4. Replaces the current process with the real target, or with the
//!    composed host-forward invocation when one is configured.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use waylay_shim::run_shim;
//!
//! fn main() -> anyhow::Result<()> {
//!     let exit_code = run_shim()?;
//!     std::process::exit(exit_code);
//! }
//! ```

pub use context::{check_version_gate, ShimContext, VersionMismatch};
pub use exec::{run_shim, INSTALLED_VERSION};

mod context;
mod exec;
mod logger;
