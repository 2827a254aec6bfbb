//! File-backed configuration store
//!
//! One JSON document per tool name under the store root. Saves go through
//! a temp-file-then-rename so concurrent shim invocations always read a
//! complete snapshot. Aliases are stored as `{"alias_of": "<name>"}`
//! marker documents and resolved transparently on load and save.

use crate::{ConfigError, ConfigurationRecord};
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};
use waylay_common::write_atomic;

pub const ALIAS_KEY: &str = "alias_of";
const MAX_ALIAS_DEPTH: usize = 8;

/// Handle on a configuration directory.
///
/// Constructed explicitly and passed to collaborators; there is no
/// process-wide store singleton.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the ambient configuration directory
    /// (`WAYLAY_CONFIG_DIR` / virtualenv redirect / `/etc/waylay.d`).
    pub fn open_default() -> Self {
        Self::new(waylay_common::config_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Follow alias markers to the canonical tool name.
    ///
    /// Names without a stored document resolve to themselves, so a save
    /// under a brand-new name works without any pre-registration.
    pub fn resolve(&self, name: &str) -> Result<String, ConfigError> {
        let mut current = name.to_string();
        for _ in 0..MAX_ALIAS_DEPTH {
            if !self.exists(&current) {
                return Ok(current);
            }
            let doc = self.read_document(&current)?;
            match doc.get(ALIAS_KEY).and_then(Value::as_str) {
                Some(next) => {
                    debug!("{current} is an alias of {next}");
                    current = next.to_string();
                }
                None => return Ok(current),
            }
        }
        Err(ConfigError::AliasLoop(name.to_string()))
    }

    /// Load the record for `name`, following alias markers.
    ///
    /// The returned record carries the canonical tool name.
    pub fn load(&self, name: &str) -> Result<ConfigurationRecord, ConfigError> {
        let canonical = self.resolve(name)?;
        let doc = self.read_document(&canonical)?;
        let mut record: ConfigurationRecord =
            serde_json::from_value(doc).map_err(|e| ConfigError::invalid(&canonical, e))?;
        record.tool_name = canonical;
        Ok(record)
    }

    /// Persist `record` under `name` (or its canonical target when `name`
    /// is an alias), atomically and with canonical field names.
    pub fn save(&self, name: &str, record: &ConfigurationRecord) -> Result<(), ConfigError> {
        let canonical = self.resolve(name)?;
        let mut text = serde_json::to_string_pretty(record)
            .map_err(|e| ConfigError::invalid(&canonical, e))?;
        text.push('\n');
        write_atomic(&self.path_for(&canonical), text.as_bytes())?;
        Ok(())
    }

    pub fn save_default(&self, name: &str) -> Result<(), ConfigError> {
        self.save(name, &ConfigurationRecord::default())
    }

    /// Validate a full JSON document from untrusted input and persist it.
    pub fn configure_from_json(
        &self,
        name: &str,
        text: &str,
    ) -> Result<ConfigurationRecord, ConfigError> {
        let mut record: ConfigurationRecord =
            serde_json::from_str(text).map_err(|e| ConfigError::invalid(name, e))?;
        record.tool_name = self.resolve(name)?;
        self.save(name, &record)?;
        Ok(record)
    }

    /// Make `alias` resolve to `name`'s record from now on.
    ///
    /// The alias is an indirection marker, not a copy: later edits to
    /// `name` are visible through `alias`.
    pub fn link(&self, name: &str, alias: &str) -> Result<(), ConfigError> {
        let marker = serde_json::json!({ ALIAS_KEY: name });
        let mut text = serde_json::to_string_pretty(&marker)
            .map_err(|e| ConfigError::invalid(alias, e))?;
        text.push('\n');
        write_atomic(&self.path_for(alias), text.as_bytes())?;
        Ok(())
    }

    /// Delete the stored document for `name` itself (an alias marker stays
    /// a marker; the canonical record is untouched).
    pub fn remove(&self, name: &str) -> Result<(), ConfigError> {
        if !self.exists(name) {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        std::fs::remove_file(self.path_for(name))?;
        Ok(())
    }

    fn read_document(&self, name: &str) -> Result<Value, ConfigError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| ConfigError::invalid(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForwardRule;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path());
        (temp, store)
    }

    fn sample_record() -> ConfigurationRecord {
        ConfigurationRecord {
            disable: vec!["-v".to_string()],
            append: vec!["--color=never".to_string()],
            prepend: vec!["-q".to_string()],
            replace: vec![("-f".to_string(), "--force".to_string())],
            display_before_start: true,
            notify_about_actions: true,
            env_additions: vec![("LC_ALL".to_string(), "C".to_string())],
            forward: Some(ForwardRule {
                host_command: "ssh".to_string(),
                host_command_args: Some(vec!["-p".to_string(), "${port}".to_string()]),
                target_command: "sh".to_string(),
                target_command_args: Some(vec!["-c".to_string()]),
                target_command_prefix: None,
                replacement_pairs: vec![("port".to_string(), "22".to_string())],
            }),
            deduplicate: true,
            log: false,
            tool_name: String::new(),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_temp, store) = store();
        let record = sample_record();
        store.save("rsync", &record).unwrap();

        let loaded = store.load("rsync").unwrap();
        assert_eq!(loaded.tool_name, "rsync");

        let mut expected = record;
        expected.tool_name = "rsync".to_string();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_temp, store) = store();
        assert!(matches!(
            store.load("absent"),
            Err(ConfigError::NotFound(name)) if name == "absent"
        ));
    }

    #[test]
    fn test_load_invalid_json_is_invalid_config() {
        let (temp, store) = store();
        std::fs::write(temp.path().join("broken"), "{not json").unwrap();
        assert!(matches!(
            store.load("broken"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_load_wrong_field_type_is_invalid_config() {
        let (temp, store) = store();
        std::fs::write(temp.path().join("typed"), r#"{"disable": "-v"}"#).unwrap();
        assert!(matches!(
            store.load("typed"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_deprecated_alias_accepted_and_normalized_on_save() {
        let (temp, store) = store();
        std::fs::write(
            temp.path().join("old"),
            r#"{"args_to_take_away": ["-v"]}"#,
        )
        .unwrap();

        let record = store.load("old").unwrap();
        assert_eq!(record.disable, vec!["-v".to_string()]);

        store.save("old", &record).unwrap();
        let text = std::fs::read_to_string(temp.path().join("old")).unwrap();
        assert!(text.contains("\"disable\""));
        assert!(!text.contains("args_to_take_away"));
    }

    #[test]
    fn test_link_resolves_to_canonical_record() {
        let (_temp, store) = store();
        let record = sample_record();
        store.save("git", &record).unwrap();
        store.link("git", "g").unwrap();

        let via_alias = store.load("g").unwrap();
        assert_eq!(via_alias.tool_name, "git");
        assert_eq!(via_alias.disable, record.disable);
    }

    #[test]
    fn test_edits_through_alias_hit_canonical_record() {
        let (_temp, store) = store();
        store.save_default("git").unwrap();
        store.link("git", "g").unwrap();

        let mut record = store.load("g").unwrap();
        record.append.push("--no-pager".to_string());
        store.save("g", &record).unwrap();

        let canonical = store.load("git").unwrap();
        assert_eq!(canonical.append, vec!["--no-pager".to_string()]);
    }

    #[test]
    fn test_alias_cycle_is_rejected() {
        let (_temp, store) = store();
        store.link("a", "b").unwrap();
        store.link("b", "a").unwrap();
        assert!(matches!(store.load("a"), Err(ConfigError::AliasLoop(_))));
    }

    #[test]
    fn test_configure_from_json_validates() {
        let (_temp, store) = store();
        assert!(matches!(
            store.configure_from_json("tool", "definitely not json"),
            Err(ConfigError::Invalid { .. })
        ));

        let record = store
            .configure_from_json("tool", r#"{"append": ["-x"], "log": true}"#)
            .unwrap();
        assert_eq!(record.append, vec!["-x".to_string()]);
        assert!(record.log);
        assert!(store.exists("tool"));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let (_temp, store) = store();
        assert!(matches!(
            store.remove("absent"),
            Err(ConfigError::NotFound(_))
        ));
    }
}
