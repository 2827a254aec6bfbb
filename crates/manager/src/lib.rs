//! Interception management
//!
//! Installs and removes shims for named tools. `intercept` renames the
//! real binary aside (marked with a fixed suffix) and writes a generated
//! script in its place; `undo` reverses the swap. The per-tool rule set
//! lives in the configuration store and survives un-interception.

pub use error::InterceptError;
pub use install::{render_shim_script, InterceptionManager, DIVERTED_SUFFIX};
pub use lookup::{first_executable, is_executable, locate};

mod error;
mod install;
mod lookup;
