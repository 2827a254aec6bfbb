use crate::expr::{evaluate, EvalError};
use waylay_config::ForwardRule;

/// Final process invocation produced by forward composition, ready for
/// process replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ForwardInvocation {
    /// The invocation as a display string (program first).
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Compose the outer invocation that routes the already-rewritten call
/// through the configured host command.
///
/// The inner command line (prefix, tool name, rewritten arguments) is
/// packed into one opaque string token so the target command can hand it
/// to a shell or equivalent. A malformed replacement expression aborts the
/// whole composition; nothing half-substituted ever reaches `exec`.
pub fn compose_forward(
    rule: &ForwardRule,
    tool_name: &str,
    rewritten: &[String],
) -> Result<ForwardInvocation, EvalError> {
    let mut replacements: Vec<(String, String)> = Vec::new();
    for (name, expr) in &rule.replacement_pairs {
        let value = evaluate(expr)?;
        replacements.push((name.clone(), value.to_string()));
    }

    let mut args: Vec<String> = Vec::new();
    if let Some(templates) = &rule.host_command_args {
        for template in templates {
            let mut arg = template.clone();
            for (name, value) in &replacements {
                arg = arg.replace(&format!("${{{name}}}"), value);
            }
            args.push(arg);
        }
    }

    let mut inner: Vec<&str> = Vec::new();
    if let Some(prefix) = rule.target_command_prefix.as_deref() {
        if !prefix.is_empty() {
            inner.push(prefix);
        }
    }
    inner.push(tool_name);
    inner.extend(rewritten.iter().map(String::as_str));
    let inner = inner.join(" ");

    args.push(rule.target_command.clone());
    if let Some(target_args) = &rule.target_command_args {
        args.extend(target_args.iter().cloned());
    }
    args.push(inner);

    Ok(ForwardInvocation {
        program: rule.host_command.clone(),
        args,
    })
}
