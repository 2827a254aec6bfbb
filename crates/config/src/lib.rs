//! Per-tool configuration records and their file-backed store
//!
//! A [`ConfigurationRecord`] holds the full rewrite rule set for one
//! intercepted tool: arguments to drop, replace, append and prepend,
//! environment additions, and the optional forwarding rule that routes the
//! rewritten invocation through a host command. Records are persisted as
//! one JSON document per tool under the store root, written atomically and
//! read as immutable snapshots.

pub use error::ConfigError;
pub use record::{ConfigurationRecord, ForwardRule};
pub use store::ConfigStore;

mod error;
mod record;
mod store;
