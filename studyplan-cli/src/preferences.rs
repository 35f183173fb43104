use anyhow::{Context, Result};
use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;
use studyplan_core::{StudyError, StudyHours, default_study_hours, validate_preferences};
use tracing::{error, info, warn};

/// YAML file mapping weekday names to `"HH:MM-HH:MM"` slot lists.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Defaults overlaid with whatever the file validly provides.
    ///
    /// A missing, unreadable or unparsable file yields the defaults.
    pub fn load(&self) -> StudyHours {
        let mut hours = default_study_hours();
        if !self.path.exists() {
            info!(path = %self.path.display(), "no preferences file, using default study hours");
            return hours;
        }

        match self.read_raw() {
            Ok(raw) => {
                hours.overlay(&validate_preferences(raw));
                info!(path = %self.path.display(), "preferences loaded");
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "cannot load preferences, using defaults");
            }
        }
        hours
    }

    /// Validate and write. Nothing is written when no usable day remains.
    pub fn save<I, S>(&self, raw: I) -> Result<StudyHours>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let hours = validate_preferences(raw);
        if hours.is_empty() {
            error!("no valid preferences to save");
            return Err(StudyError::configuration("no valid study days to save").into());
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let yaml = serde_yaml::to_string(&hours).context("serialize preferences")?;
        fs::write(&self.path, yaml).with_context(|| format!("write {}", self.path.display()))?;
        info!(path = %self.path.display(), days = hours.usable_days(), "preferences saved");
        Ok(hours)
    }

    fn read_raw(&self) -> Result<Vec<(String, Vec<String>)>> {
        let s = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        let doc: Value = serde_yaml::from_str(&s).with_context(|| format!("parse {}", self.path.display()))?;

        let map = match doc {
            Value::Mapping(map) => map,
            Value::Null => return Ok(Vec::new()),
            _ => {
                warn!(path = %self.path.display(), "preferences file is not a mapping");
                return Ok(Vec::new());
            }
        };

        let mut out = Vec::with_capacity(map.len());
        for (key, value) in map {
            let Some(day) = key.as_str() else {
                warn!(key = ?key, "ignoring non-text study day");
                continue;
            };
            let slots = match value {
                Value::Sequence(items) => items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        other => {
                            warn!(day, slot = ?other, "ignoring invalid time slot");
                            None
                        }
                    })
                    .collect(),
                other => {
                    warn!(day, value = ?other, "ignoring study day without a slot list");
                    continue;
                }
            };
            out.push((day.to_string(), slots));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::TempDir;

    fn slots(hours: &StudyHours, day: Weekday) -> Vec<String> {
        hours.windows(day).iter().map(|w| w.to_string()).collect()
    }

    fn raw(day: &str, items: &[&str]) -> Vec<(String, Vec<String>)> {
        vec![(day.to_string(), items.iter().map(|s| s.to_string()).collect())]
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("preferences.yaml"));
        assert_eq!(store.load(), default_study_hours());
    }

    #[test]
    fn test_load_overlays_valid_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.yaml");
        fs::write(
            &path,
            "Monday:\n  - 07:00-09:00\n  - 99:00-10:00\nSunday:\n  - 10:00-11:00\nTuesday: busy\n",
        )
        .unwrap();

        let hours = PreferencesStore::new(&path).load();
        assert_eq!(slots(&hours, Weekday::Mon), vec!["07:00-09:00"]);
        assert_eq!(slots(&hours, Weekday::Tue), vec!["09:00-12:00", "14:00-17:00"]);
        assert!(hours.windows(Weekday::Sun).is_empty());
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.yaml");
        fs::write(&path, "Monday: [09:00-10:00\n  oops: :").unwrap();
        assert_eq!(PreferencesStore::new(&path).load(), default_study_hours());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("preferences.yaml"));

        let saved = store.save(raw("Wednesday", &["08:00-10:00", "bad"])).unwrap();
        assert_eq!(saved.usable_days(), 1);

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.contains("Wednesday"));
        assert!(!written.contains("bad"));

        let loaded = store.load();
        assert_eq!(slots(&loaded, Weekday::Wed), vec!["08:00-10:00"]);
        assert_eq!(slots(&loaded, Weekday::Fri), vec!["09:00-12:00", "14:00-16:00"]);
    }

    #[test]
    fn test_save_with_only_invalid_slots_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("preferences.yaml"));
        store.save(raw("Monday", &["10:00-11:00"])).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.save(raw("Monday", &["25:00-26:00", "nope"])).unwrap_err();
        assert!(matches!(err.downcast_ref::<StudyError>(), Some(StudyError::Configuration(_))));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }
}
