use std::collections::HashSet;
use std::fmt;
use waylay_config::ConfigurationRecord;

/// One individual rewrite applied to the argument vector.
///
/// `Display` renders the notice wording; the caller prefixes the actor
/// (`waylay(<tool>): ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteAction {
    Remove(String),
    Replace { from: String, to: String },
    Append(String),
    Prepend(String),
}

impl fmt::Display for RewriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove(arg) => write!(f, "removing {arg}"),
            Self::Replace { from, to } => write!(f, "replacing {from} with {to}"),
            Self::Append(arg) => write!(f, "appending {arg}"),
            Self::Prepend(arg) => write!(f, "prepending {arg}"),
        }
    }
}

/// Rewritten argument vector plus the trail of individual actions taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub args: Vec<String>,
    pub actions: Vec<RewriteAction>,
}

/// Apply the record's rewrite stages to `arguments`.
///
/// `arguments` excludes the process name; the caller keeps argv[0] out of
/// reach of the rules and prepends it back when building the final
/// invocation. Empty rule lists are no-ops, so the function is total.
pub fn rewrite_args(rules: &ConfigurationRecord, arguments: &[String]) -> RewriteOutcome {
    let mut args: Vec<String> = arguments.to_vec();
    let mut actions = Vec::new();

    for disabled in &rules.disable {
        while let Some(pos) = args.iter().position(|a| a == disabled) {
            args.remove(pos);
            actions.push(RewriteAction::Remove(disabled.clone()));
        }
    }

    // One left-to-right pass per rule: every current occurrence is
    // replaced, and a rule mapping a value onto itself terminates.
    for (from, to) in &rules.replace {
        for arg in args.iter_mut() {
            if arg == from {
                *arg = to.clone();
                actions.push(RewriteAction::Replace {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
    }

    for appended in &rules.append {
        if !args.iter().any(|a| a == appended) {
            args.push(appended.clone());
            actions.push(RewriteAction::Append(appended.clone()));
        }
    }

    // Reverse insertion order keeps the configured list order at the
    // front of the final vector.
    for prepended in rules.prepend.iter().rev() {
        if !args.iter().any(|a| a == prepended) {
            args.insert(0, prepended.clone());
            actions.push(RewriteAction::Prepend(prepended.clone()));
        }
    }

    if rules.deduplicate {
        let mut seen = HashSet::new();
        args.retain(|a| seen.insert(a.clone()));
    }

    RewriteOutcome { args, actions }
}
