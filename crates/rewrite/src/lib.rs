//! Deterministic invocation rewriting
//!
//! Pure functions from an argument vector (or environment snapshot) plus a
//! [`waylay_config::ConfigurationRecord`] to the rewritten result. Nothing
//! in this crate touches the filesystem or the process environment; side
//! effects (notices, log lines, `setenv`) are the caller's job, driven by
//! the returned action trail.
//!
//! The rewrite pipeline runs in a fixed order: disable, replace, append,
//! prepend, deduplicate. Each stage sees the output of the previous one.

pub use args::{rewrite_args, RewriteAction, RewriteOutcome};
pub use env::plan_env_additions;
pub use expr::{evaluate, EvalError, Value};
pub use forward::{compose_forward, ForwardInvocation};

mod args;
mod env;
mod expr;
mod forward;
