/// Plan which environment additions actually apply.
///
/// A key is added only when `is_present` says the environment does not
/// already carry it; when the same key appears twice in `additions`, the
/// first occurrence wins. The caller applies the returned pairs to the
/// real environment (and prints notices) itself.
pub fn plan_env_additions<F>(additions: &[(String, String)], is_present: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> bool,
{
    let mut planned: Vec<(String, String)> = Vec::new();
    for (key, value) in additions {
        if is_present(key) || planned.iter().any(|(k, _)| k == key) {
            continue;
        }
        planned.push((key.clone(), value.clone()));
    }
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_absent_keys_are_planned() {
        let env: HashMap<String, String> = HashMap::new();
        let planned = plan_env_additions(&pairs(&[("RSYNC_RSH", "ssh")]), |k| {
            env.contains_key(k)
        });
        assert_eq!(planned, pairs(&[("RSYNC_RSH", "ssh")]));
    }

    #[test]
    fn test_existing_key_is_never_overwritten() {
        let mut env = HashMap::new();
        env.insert("PATH".to_string(), "/usr/bin".to_string());
        let planned = plan_env_additions(&pairs(&[("PATH", "/evil")]), |k| env.contains_key(k));
        assert!(planned.is_empty());
    }

    #[test]
    fn test_first_occurrence_of_duplicate_key_wins() {
        let env: HashMap<String, String> = HashMap::new();
        let planned = plan_env_additions(
            &pairs(&[("LC_ALL", "C"), ("LC_ALL", "en_US.UTF-8")]),
            |k| env.contains_key(k),
        );
        assert_eq!(planned, pairs(&[("LC_ALL", "C")]));
    }
}
