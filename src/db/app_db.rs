// App DB module: ~/.kiddieflix/app.db
// Single-device store for the whole app. One KV table holds every storage slot
// (videos, profiles, current profile, favorites, PIN hash) as a JSON or plain string.

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use anyhow::Result;

use crate::constants::{APP_DB_DIR, APP_DB_FILENAME, HOME_ENV_VAR};

/// All App DB migrations in order. Each migration is a SQL string.
/// Uses PRAGMA user_version for version tracking.
const APP_MIGRATIONS: &[&str] = &[
    // Migration A1: storage slots
    r#"
    CREATE TABLE IF NOT EXISTS app_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
    "#,

    // Migration A2: last-write timestamps for diagnostics
    r#"
    ALTER TABLE app_settings ADD COLUMN updated_at TEXT;
    "#,
];

/// Get the path to the App DB.
/// `KIDDIEFLIX_HOME` overrides the directory; otherwise ~/.kiddieflix/app.db.
pub fn get_app_db_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_DB_FILENAME));
    }

    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.home_dir().join(APP_DB_DIR).join(APP_DB_FILENAME))
}

/// Open the App DB at `db_path`: create the directory, set pragmas, run migrations.
pub fn open_app_db(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Cannot create App DB directory {}: {}. Check directory permissions.",
                parent.display(),
                e
            )
        })?;
    }

    let conn = Connection::open(db_path)?;
    apply_pragmas(&conn)?;
    run_app_migrations(&conn)?;

    Ok(conn)
}

/// Open an in-memory App DB with all migrations applied.
pub fn open_app_db_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    run_app_migrations(&conn)?;
    Ok(conn)
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA busy_timeout=5000;")?;
    Ok(())
}

/// Get current App DB schema version
fn get_app_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row(
        "PRAGMA user_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Run all pending App DB migrations
fn run_app_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_app_schema_version(conn)?;
    let target_version = APP_MIGRATIONS.len() as u32;

    if current_version > target_version {
        anyhow::bail!(
            "App DB schema version {} is newer than this build supports (max {}). Please upgrade KiddieFlix.",
            current_version,
            target_version
        );
    }

    if current_version == target_version {
        return Ok(());
    }

    for (i, migration) in APP_MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        conn.execute_batch(migration)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", migration_version))?;

        log::info!("Applied App DB migration {}", migration_version);
    }

    Ok(())
}
