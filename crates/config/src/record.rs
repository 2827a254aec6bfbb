//! The rule set governing one intercepted tool
//!
//! Field names are stable across releases; two legacy spellings
//! (`args_to_take_away`, `args_to_append_before`) are still accepted on
//! read and rewritten to their current names on the next save.

use log::warn;
use serde::{Deserialize, Serialize};

/// Routing rule applied after argument rewriting: the rewritten invocation
/// is packed into a single string and handed to `target_command`, which is
/// itself launched through `host_command` (e.g. an ssh or container-exec
/// wrapper).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardRule {
    pub host_command: String,
    /// Argument templates for `host_command`; `${name}` tokens are filled
    /// from `replacement_pairs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_command_args: Option<Vec<String>>,
    pub target_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_command_args: Option<Vec<String>>,
    /// Prepended verbatim to the packed inner command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_command_prefix: Option<String>,
    /// `(name, expression)` pairs; each expression is evaluated by the
    /// restricted evaluator and substituted for `${name}`.
    pub replacement_pairs: Vec<(String, String)>,
}

/// Rewrite rules for a single tool.
///
/// A record is an immutable snapshot during a rewrite pass: the shim
/// runtime loads it once, derives a new argument vector from it, and never
/// writes it back. Only the `waylay` CLI mutates records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OnDiskRecord")]
pub struct ConfigurationRecord {
    /// Arguments removed wherever they appear.
    pub disable: Vec<String>,
    /// Arguments added at the end unless already present.
    pub append: Vec<String>,
    /// Arguments added at the front unless already present; list order is
    /// preserved in the final vector.
    pub prepend: Vec<String>,
    /// `(from, to)` pairs applied in order against the current vector.
    pub replace: Vec<(String, String)>,
    pub display_before_start: bool,
    pub notify_about_actions: bool,
    /// Environment keys set only when currently absent.
    pub env_additions: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<ForwardRule>,
    pub deduplicate: bool,
    /// Append the final invocation to the per-tool log file.
    pub log: bool,
    /// The identifying key; supplied by the store, never persisted.
    #[serde(skip_serializing)]
    pub tool_name: String,
}

impl ConfigurationRecord {
    /// Forwarding only engages when both ends of the route are configured.
    pub fn has_target_forward(&self) -> bool {
        self.forward
            .as_ref()
            .is_some_and(|f| !f.host_command.is_empty() && !f.target_command.is_empty())
    }
}

/// Wire shape, including the deprecated field spellings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OnDiskRecord {
    disable: Option<Vec<String>>,
    args_to_take_away: Option<Vec<String>>,
    append: Vec<String>,
    prepend: Option<Vec<String>>,
    args_to_append_before: Option<Vec<String>>,
    replace: Vec<(String, String)>,
    display_before_start: bool,
    notify_about_actions: bool,
    env_additions: Vec<(String, String)>,
    forward: Option<ForwardRule>,
    deduplicate: bool,
    log: bool,
}

impl From<OnDiskRecord> for ConfigurationRecord {
    fn from(disk: OnDiskRecord) -> Self {
        let disable = match (disk.disable, disk.args_to_take_away) {
            (Some(current), _) => current,
            (None, Some(legacy)) => {
                warn!("args_to_take_away is deprecated, use disable");
                legacy
            }
            (None, None) => Vec::new(),
        };
        let prepend = match (disk.prepend, disk.args_to_append_before) {
            (Some(current), _) => current,
            (None, Some(legacy)) => {
                warn!("args_to_append_before is deprecated, use prepend");
                legacy
            }
            (None, None) => Vec::new(),
        };

        Self {
            disable,
            append: disk.append,
            prepend,
            replace: disk.replace,
            display_before_start: disk.display_before_start,
            notify_about_actions: disk.notify_about_actions,
            env_additions: disk.env_additions,
            forward: disk.forward,
            deduplicate: disk.deduplicate,
            log: disk.log,
            tool_name: String::new(),
        }
    }
}
