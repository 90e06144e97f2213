//! libSQL backend: async `BotStore` implementation.
//!
//! Supports local file and in-memory databases. Profiles and dialog stacks
//! are stored as JSON text keyed by user and conversation id.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::dialog::DialogStack;
use crate::error::DatabaseError;
use crate::profile::UserProfile;
use crate::store::migrations;
use crate::store::traits::BotStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and throwaway sessions).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fetch the single JSON text column of a keyed row.
    async fn query_json(
        &self,
        op: &str,
        sql: &str,
        key: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let json: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;
                Ok(Some(json))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("{op}: {e}"))),
        }
    }
}

#[async_trait]
impl BotStore for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let Some(json) = self
            .query_json(
                "load_profile",
                "SELECT profile FROM user_profiles WHERE user_id = ?1",
                user_id,
            )
            .await?
        else {
            return Ok(None);
        };

        let profile = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::Serialization(format!("load_profile: {e}")))?;
        Ok(Some(profile))
    }

    async fn save_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let json = serde_json::to_string(profile)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO user_profiles (user_id, profile, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id) DO UPDATE SET profile = ?2, updated_at = ?3",
                params![user_id, json, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("save_profile: {e}")))?;
        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM user_profiles WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_profile: {e}")))?;
        Ok(count > 0)
    }

    // ── Dialog stacks ───────────────────────────────────────────────

    async fn load_dialog_stack(
        &self,
        conversation_id: &str,
    ) -> Result<Option<DialogStack>, DatabaseError> {
        let Some(json) = self
            .query_json(
                "load_dialog_stack",
                "SELECT state FROM dialog_states WHERE conversation_id = ?1",
                conversation_id,
            )
            .await?
        else {
            return Ok(None);
        };

        let stack = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::Serialization(format!("load_dialog_stack: {e}")))?;
        Ok(Some(stack))
    }

    async fn save_dialog_stack(
        &self,
        conversation_id: &str,
        user_id: &str,
        stack: &DialogStack,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let json =
            serde_json::to_string(stack).map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO dialog_states (conversation_id, user_id, state, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (conversation_id) DO UPDATE
                 SET user_id = ?2, state = ?3, updated_at = ?4",
                params![conversation_id, user_id, json, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("save_dialog_stack: {e}")))?;
        Ok(())
    }

    async fn delete_dialog_stack(&self, conversation_id: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM dialog_states WHERE conversation_id = ?1",
                params![conversation_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_dialog_stack: {e}")))?;
        Ok(count > 0)
    }
}
