use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use dirs_next;

pub const SEARCH_TERM_KEY: &str = "search";
pub const DEFAULT_SEARCH_TERM: &str = "rust";

/// SQLite-backed key-value store for the handful of values that survive a
/// restart (currently just the search term). Constructed once in main and
/// passed into the app explicitly.
pub struct SettingsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsStore {
    pub fn new() -> Result<Self> {
        let app_data_dir = Self::get_app_data_dir()?;
        if !app_data_dir.exists() {
            std::fs::create_dir_all(&app_data_dir)?;
        }

        let conn = Connection::open(app_data_dir.join("settings.db"))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_app_data_dir() -> Result<PathBuf> {
        let home_dir =
            dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".hacker_stories"))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock settings connection"))?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock settings connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    /// Read the persisted search term, falling back to the default when the
    /// key has never been written.
    pub fn load_search_term(&self) -> Result<String> {
        Ok(self
            .get(SEARCH_TERM_KEY)?
            .unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string()))
    }

    pub fn save_search_term(&self, term: &str) -> Result<()> {
        self.set(SEARCH_TERM_KEY, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let store = SettingsStore::open_in_memory().unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = SettingsStore::open_in_memory().unwrap();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = SettingsStore::open_in_memory().unwrap();
        store.set(SEARCH_TERM_KEY, "react").unwrap();
        store.set(SEARCH_TERM_KEY, "redux").unwrap();
        assert_eq!(
            store.get(SEARCH_TERM_KEY).unwrap(),
            Some("redux".to_string())
        );
    }

    #[test]
    fn search_term_falls_back_to_default() {
        let store = SettingsStore::open_in_memory().unwrap();
        assert_eq!(store.load_search_term().unwrap(), DEFAULT_SEARCH_TERM);

        store.save_search_term("zig").unwrap();
        assert_eq!(store.load_search_term().unwrap(), "zig");
    }
}
