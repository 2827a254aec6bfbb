//! Shim execution: load, rewrite, forward, replace
//!
//! `run_shim` is the whole life of one intercepted invocation. It never
//! returns on Unix when the exec succeeds; any `Ok` exit code comes from
//! the spawn-and-wait fallback on platforms without process replacement.

use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(not(unix))]
use anyhow::Context;

use crate::context::{check_version_gate, ShimContext};
use crate::logger::append_invocation;
use waylay_config::ConfigStore;
use waylay_rewrite::{compose_forward, plan_env_additions, rewrite_args};

/// Version of the installed runtime, compared against the stamp each
/// generated shim carries.
pub const INSTALLED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one shim invocation end to end.
pub fn run_shim() -> Result<i32> {
    let ctx = ShimContext::from_env()?;
    check_version_gate(&ctx.stamp, INSTALLED_VERSION)?;

    let store = ConfigStore::open_default();
    let record = store.load(&ctx.tool_name)?;

    let additions = plan_env_additions(&record.env_additions, |key| env::var_os(key).is_some());
    for (key, value) in &additions {
        if record.notify_about_actions {
            eprintln!("waylay({}): adding env var {key}={value}", ctx.tool_name);
        }
        env::set_var(key, value);
    }

    let outcome = rewrite_args(&record, &ctx.args);
    if record.notify_about_actions {
        for action in &outcome.actions {
            eprintln!("waylay({}): {action}", ctx.tool_name);
        }
    }
    if record.display_before_start {
        eprintln!("{} {}", ctx.tool_name, outcome.args.join(" "));
    }
    if record.log {
        let argv: Vec<String> = std::iter::once(ctx.tool_name.clone())
            .chain(outcome.args.iter().cloned())
            .collect();
        // Must land on disk before exec; nothing runs after process
        // replacement.
        append_invocation(
            &waylay_common::invocation_log_dir(),
            &ctx.tool_name,
            &argv,
        )?;
    }

    let forwarding = record.has_target_forward();
    let (program, args) = final_invocation(&record, &ctx.tool_name, &ctx.target, &outcome.args)?;
    // argv[0] stays the tool name only when the target is the real binary;
    // a forward host gets its own name.
    let arg0 = (!forwarding).then_some(ctx.tool_name.as_str());
    replace_process(&program, arg0, &args)
}

/// Hand the process over to `program`.
///
/// On Unix this is a true exec: argv[0] is preserved as the tool name for
/// the direct case so the target sees the invocation name it expects.
/// Returning at all means the exec failed.
#[cfg(unix)]
fn replace_process(program: &Path, arg0: Option<&str>, args: &[String]) -> Result<i32> {
    let mut cmd = build_command(program, arg0, args);
    let err = cmd.exec();
    Err(anyhow::Error::new(err).context(format!("failed to exec {}", program.display())))
}

/// Without process replacement, spawn synchronously and propagate the
/// child's exit code as our own.
#[cfg(not(unix))]
fn replace_process(program: &Path, arg0: Option<&str>, args: &[String]) -> Result<i32> {
    let mut cmd = build_command(program, arg0, args);
    let status = cmd
        .status()
        .with_context(|| format!("failed to launch {}", program.display()))?;
    Ok(status.code().unwrap_or(1))
}

fn build_command(program: &Path, arg0: Option<&str>, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);

    #[cfg(unix)]
    if let Some(arg0) = arg0 {
        cmd.arg0(arg0);
    }
    #[cfg(not(unix))]
    let _ = arg0;

    cmd
}

/// Resolve the final `(program, argv)` the process will be replaced with,
/// without executing anything.
pub fn final_invocation(
    record: &waylay_config::ConfigurationRecord,
    tool_name: &str,
    target: &Path,
    rewritten: &[String],
) -> Result<(PathBuf, Vec<String>)> {
    match record.forward.as_ref() {
        Some(rule) if record.has_target_forward() => {
            let forwarded = compose_forward(rule, tool_name, rewritten)?;
            Ok((PathBuf::from(forwarded.program), forwarded.args))
        }
        _ => Ok((target.to_path_buf(), rewritten.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waylay_config::{ConfigurationRecord, ForwardRule};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_final_invocation_direct() {
        let record = ConfigurationRecord::default();
        let (program, args) = final_invocation(
            &record,
            "git",
            Path::new("/usr/bin/git-waylaid"),
            &strings(&["status"]),
        )
        .unwrap();
        assert_eq!(program, PathBuf::from("/usr/bin/git-waylaid"));
        assert_eq!(args, strings(&["status"]));
    }

    #[test]
    fn test_final_invocation_forwarded() {
        let record = ConfigurationRecord {
            forward: Some(ForwardRule {
                host_command: "ssh".to_string(),
                host_command_args: Some(strings(&["builder"])),
                target_command: "sh".to_string(),
                target_command_args: Some(strings(&["-c"])),
                ..ForwardRule::default()
            }),
            ..Default::default()
        };
        let (program, args) = final_invocation(
            &record,
            "make",
            Path::new("/usr/bin/make-waylaid"),
            &strings(&["all"]),
        )
        .unwrap();
        assert_eq!(program, PathBuf::from("ssh"));
        assert_eq!(args, strings(&["builder", "sh", "-c", "make all"]));
    }

    #[test]
    fn test_final_invocation_fails_closed_on_bad_expression() {
        let record = ConfigurationRecord {
            forward: Some(ForwardRule {
                host_command: "ssh".to_string(),
                host_command_args: Some(strings(&["-p", "${port}"])),
                target_command: "sh".to_string(),
                replacement_pairs: vec![("port".to_string(), "open('x')".to_string())],
                ..ForwardRule::default()
            }),
            ..Default::default()
        };
        assert!(final_invocation(
            &record,
            "make",
            Path::new("/usr/bin/make-waylaid"),
            &[]
        )
        .is_err());
    }

    #[test]
    fn test_build_command_sets_program_and_args() {
        use std::ffi::OsStr;

        let cmd = build_command(Path::new("/bin/echo"), Some("echo"), &strings(&["a", "b"]));
        assert_eq!(cmd.get_program(), OsStr::new("/bin/echo"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("a"), OsStr::new("b")]);
    }
}
