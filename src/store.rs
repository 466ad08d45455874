use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const TARGET_KEY: &str = "newYearTargetDate";

pub trait TargetStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&contents)?)
    }
}

impl TargetStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Corrupt(e)) => {
                log::warn!("Overwriting corrupt store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), value.to_string());

        let write_err = |source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, json).map_err(write_err)
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl TargetStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn next_new_year(now: DateTime<Local>) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0)
        .earliest()
        .unwrap_or_else(|| now + chrono::Duration::days(365))
}

/// Reads the persisted target. Anything missing, unreadable, unparsable or
/// not in the future falls back to `fallback`.
pub fn load_target(
    store: &dyn TargetStore,
    fallback: DateTime<Local>,
    now: DateTime<Local>,
) -> DateTime<Local> {
    let saved = match store.get(TARGET_KEY) {
        Ok(saved) => saved,
        Err(e) => {
            log::warn!("Could not read saved target: {}", e);
            None
        }
    };

    let Some(saved) = saved else {
        return fallback;
    };
    match DateTime::parse_from_rfc3339(saved.trim()).map(|t| t.with_timezone(&Local)) {
        Ok(target) if target > now => target,
        Ok(_) => {
            log::info!("Saved target {} already passed, using default", saved);
            fallback
        }
        Err(e) => {
            log::warn!("Ignoring unparsable saved target {:?}: {}", saved, e);
            fallback
        }
    }
}

pub fn save_target(store: &mut dyn TargetStore, target: DateTime<Local>) -> Result<(), StoreError> {
    let value = target
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    store.set(TARGET_KEY, &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2030, 3, 14, 15, 9, 26).earliest().unwrap()
    }

    #[test]
    fn missing_value_falls_back() {
        let store = MemoryStore::default();
        let fallback = next_new_year(now());
        assert_eq!(load_target(&store, fallback, now()), fallback);
    }

    #[test]
    fn future_value_is_used() {
        let mut store = MemoryStore::default();
        let target = now() + Duration::days(10);
        save_target(&mut store, target).unwrap();

        let loaded = load_target(&store, next_new_year(now()), now());
        assert_eq!(loaded, target);
    }

    #[test]
    fn past_or_garbage_values_fall_back() {
        let fallback = next_new_year(now());

        let mut store = MemoryStore::default();
        save_target(&mut store, now() - Duration::seconds(1)).unwrap();
        assert_eq!(load_target(&store, fallback, now()), fallback);

        store.set(TARGET_KEY, "not a date").unwrap();
        assert_eq!(load_target(&store, fallback, now()), fallback);
    }

    #[test]
    fn saves_utc_iso_string() {
        let mut store = MemoryStore::default();
        let target = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap().with_timezone(&Local);
        save_target(&mut store, target).unwrap();
        assert_eq!(
            store.get(TARGET_KEY).unwrap().as_deref(),
            Some("2031-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn next_new_year_is_january_first() {
        let ny = next_new_year(now());
        assert_eq!((ny.year(), ny.month(), ny.day()), (2031, 1, 1));
        assert!(ny > now());
    }

    #[test]
    fn file_store_persists_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");
        let mut store = FileStore::new(&path);

        assert_eq!(store.get(TARGET_KEY).unwrap(), None);
        store.set("theme", "dark").unwrap();
        store.set(TARGET_KEY, "2031-01-01T00:00:00.000Z").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(TARGET_KEY).unwrap().as_deref(),
            Some("2031-01-01T00:00:00.000Z")
        );
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_reads_as_error_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ nope").unwrap();
        let mut store = FileStore::new(&path);

        assert!(matches!(store.get(TARGET_KEY), Err(StoreError::Corrupt(_))));
        // A corrupt store degrades to the fallback target
        let fallback = next_new_year(now());
        assert_eq!(load_target(&store, fallback, now()), fallback);

        store.set(TARGET_KEY, "2031-01-01T00:00:00.000Z").unwrap();
        assert!(store.get(TARGET_KEY).unwrap().is_some());
    }
}
