//! Schema migrations for the libSQL backend.
//!
//! Applied versions are recorded in `_migrations`; only newer ones run.

use libsql::Connection;

use crate::error::DatabaseError;

/// A single migration step.
#[derive(Clone, Copy)]
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "user_profiles",
        sql: r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                profile TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
        "#,
    },
    Migration {
        version: 2,
        name: "dialog_states",
        sql: r#"
            CREATE TABLE IF NOT EXISTS dialog_states (
                conversation_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_dialog_states_user ON dialog_states(user_id);
        "#,
    },
];

/// Run every migration newer than the recorded schema version.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("create _migrations: {e}")))?;

    let from = schema_version(conn).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > from);
    let mut applied = 0usize;
    for migration in pending {
        apply(conn, migration).await?;
        applied += 1;
    }

    let version = schema_version(conn).await?;
    tracing::debug!(from, version, applied, "Schema up to date");
    Ok(())
}

/// Apply one migration and record it.
async fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    let Migration { version, name, sql } = *migration;
    tracing::info!(version, name, "Applying migration");

    let failed = |e: libsql::Error| DatabaseError::Migration(format!("V{version} {name}: {e}"));
    conn.execute_batch(sql).await.map_err(failed)?;
    conn.execute(
        "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
        libsql::params![version, name],
    )
    .await
    .map_err(failed)?;
    Ok(())
}

/// Highest recorded migration version; 0 on a fresh database.
async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let failed = |e: libsql::Error| DatabaseError::Migration(format!("schema version: {e}"));
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(failed)?;
    match rows.next().await.map_err(failed)? {
        Some(row) => row.get::<i64>(0).map_err(failed),
        None => Ok(0),
    }
}
