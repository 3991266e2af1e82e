//! User settings
//!
//! Persisted next to the list itself, under their own key.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistentStore, StorageError, is_valid_key};

/// List settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Store key holding the item snapshot
    pub storage_key: String,
    /// Question shown before clearing every item
    pub clear_prompt: String,
    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`, `off`)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: Self::DEFAULT_LIST_KEY.to_string(),
            clear_prompt: "Clear all items?".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Store key for the settings themselves
    pub const STORAGE_KEY: &'static str = "tick_list_settings";

    /// Default store key for the item snapshot
    pub const DEFAULT_LIST_KEY: &'static str = "todos";

    /// Parsed log level, `Info` when unrecognised
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &impl PersistentStore) -> Self {
        match store.load(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    if !Self::is_usable_list_key(&settings.storage_key) {
                        log::warn!(
                            "Unusable list key {:?}, using '{}'",
                            settings.storage_key,
                            Self::DEFAULT_LIST_KEY
                        );
                        settings.storage_key = Self::DEFAULT_LIST_KEY.to_string();
                    }
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// A list key must be storable everywhere and must not shadow the
    /// settings entry
    pub fn is_usable_list_key(key: &str) -> bool {
        is_valid_key(key) && key != Self::STORAGE_KEY
    }

    fn write(&self, store: &mut impl PersistentStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.save(Self::STORAGE_KEY, &json)
    }

    /// Save settings; failures are logged only
    pub fn save(&self, store: &mut impl PersistentStore) {
        match self.write(store) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_absent() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.storage_key, "todos");
        assert_eq!(settings.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, r#"{"log_level":"debug"}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.log_level(), log::LevelFilter::Debug);
        assert_eq!(settings.storage_key, "todos");
        assert_eq!(settings.clear_prompt, "Clear all items?");
    }

    #[test]
    fn test_corrupt_or_blank_key_falls_back() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, "{oops");
        assert_eq!(Settings::load(&store), Settings::default());

        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, r#"{"storage_key":"  "}"#);
        assert_eq!(Settings::load(&store).storage_key, "todos");
    }

    #[test]
    fn test_list_key_must_not_clash_or_break_storage() {
        for bad in [r#"{"storage_key":"tick_list_settings"}"#, r#"{"storage_key":"my list"}"#] {
            let store = MemoryStore::with_entry(Settings::STORAGE_KEY, bad);
            assert_eq!(Settings::load(&store).storage_key, "todos", "input {}", bad);
        }

        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, r#"{"storage_key":"groceries"}"#);
        assert_eq!(Settings::load(&store).storage_key, "groceries");
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);
        Settings::default().save(&mut store);
        assert_eq!(store.get(Settings::STORAGE_KEY), None);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            storage_key: "groceries".to_string(),
            log_level: "nonsense".to_string(),
            ..Default::default()
        };
        settings.save(&mut store);

        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.log_level(), log::LevelFilter::Info);
    }
}
