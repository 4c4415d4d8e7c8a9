use crate::tui::state::UserPreferences;
use rusqlite::{Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};

fn get_db_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .map(|p| p.join("revdash"))
        .unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join("preferences.db")
}

pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    pub fn open_default() -> Result<Self> {
        Self::open(&get_db_path())
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn save_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    pub fn load_preference(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| row.get(0))
            .optional()
    }

    pub fn load_user_preferences(&self) -> UserPreferences {
        let mut prefs = UserPreferences::default_prefs();

        if let Ok(Some(tab)) = self.load_preference("last_active_tab") {
            prefs.last_active_tab = tab;
        }

        if let Ok(Some(id)) = self.load_preference("restaurant_id") {
            prefs.restaurant_id = id.parse().ok();
        }

        prefs
    }

    pub fn save_user_preferences(&self, prefs: &UserPreferences) -> Result<()> {
        self.save_preference("last_active_tab", &prefs.last_active_tab)?;
        if let Some(id) = prefs.restaurant_id {
            self.save_preference("restaurant_id", &id.to_string())?;
        }
        Ok(())
    }
}
