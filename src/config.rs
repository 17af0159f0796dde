//! Runtime settings resolved from the environment.

use std::path::PathBuf;

use crate::loader::MalformedPolicy;

pub const DATA_DIR_VAR: &str = "BIKESHARE_DATA_DIR";
pub const LOG_FILE_VAR: &str = "LOG_FILE_PATH";
pub const SKIP_MALFORMED_VAR: &str = "BIKESHARE_SKIP_MALFORMED";

pub const DEFAULT_LOG_FILE: &str = "logs/bikeshare_stats.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the city CSV sources.
    pub data_dir: PathBuf,
    pub log_file_path: PathBuf,
    pub malformed_policy: MalformedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE),
            malformed_policy: MalformedPolicy::Abort,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let malformed_policy = match non_empty(SKIP_MALFORMED_VAR) {
            Some(v) if is_truthy(&v) => MalformedPolicy::Skip,
            _ => defaults.malformed_policy,
        };

        Self {
            data_dir: non_empty(DATA_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_file_path: non_empty(LOG_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file_path),
            malformed_policy,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            (DATA_DIR_VAR, "/srv/bikeshare"),
            (LOG_FILE_VAR, "/tmp/bike.log"),
            (SKIP_MALFORMED_VAR, "TRUE"),
        ]);
        assert_eq!(s.data_dir, PathBuf::from("/srv/bikeshare"));
        assert_eq!(s.log_file_path, PathBuf::from("/tmp/bike.log"));
        assert_eq!(s.malformed_policy, MalformedPolicy::Skip);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let s = settings(&[(DATA_DIR_VAR, "  "), (SKIP_MALFORMED_VAR, "0")]);
        assert_eq!(s.data_dir, PathBuf::from("."));
        assert_eq!(s.malformed_policy, MalformedPolicy::Abort);
    }
}
