//! Per-tool invocation log
//!
//! One append-only text file per tool under the invocation-log directory,
//! one line per run: an RFC3339 timestamp and the final joined argument
//! vector. The write is flushed before the caller execs away.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub fn append_invocation(log_dir: &Path, tool_name: &str, argv: &[String]) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let path = log_dir.join(tool_name);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    writeln!(file, "{ts} {}", argv.join(" "))
        .with_context(|| format!("Failed to append to {}", path.display()))?;
    file.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().join("logs");

        append_invocation(&log_dir, "git", &strings(&["git", "status"])).unwrap();

        let content = std::fs::read_to_string(log_dir.join("git")).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.trim_end().ends_with("git status"));
    }

    #[test]
    fn test_append_accumulates_lines() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().to_path_buf();

        append_invocation(&log_dir, "make", &strings(&["make", "-j4"])).unwrap();
        append_invocation(&log_dir, "make", &strings(&["make", "clean"])).unwrap();

        let content = std::fs::read_to_string(log_dir.join("make")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("make -j4"));
        assert!(lines[1].ends_with("make clean"));
    }
}
