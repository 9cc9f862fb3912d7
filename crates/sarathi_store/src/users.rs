//! User records: created on first verified identity, touched on every
//! authenticated request, cascade-deleting everything the user owns.

use crate::sqlite::{db_err, SqliteStore};
use chrono::{DateTime, Utc};
use sarathi_core::{Error, Result, User};
use sqlx::Row;
use uuid::Uuid;

impl SqliteStore {
    /// Find-or-create by the verifier's stable uid, updating `last_active`
    /// either way.
    pub async fn upsert_user(
        &self,
        external_uid: &str,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<User> {
        let now = Utc::now().timestamp();

        let existing = sqlx::query("SELECT id FROM users WHERE external_uid = ?")
            .bind(external_uid)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;

        let id = match existing {
            Some(row) => {
                let id: String = row.get("id");
                sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
                    .bind(now)
                    .bind(&id)
                    .execute(self.pool())
                    .await
                    .map_err(db_err)?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO users (id, external_uid, email, display_name, preferences, created_at, last_active) \
                     VALUES (?, ?, ?, ?, '{}', ?, ?)",
                )
                .bind(&id)
                .bind(external_uid)
                .bind(email)
                .bind(display_name)
                .bind(now)
                .bind(now)
                .execute(self.pool())
                .await
                .map_err(db_err)?;
                tracing::info!("Created user {} for external uid {}", id, external_uid);
                id
            }
        };

        let user_id =
            Uuid::parse_str(&id).map_err(|e| Error::Database(format!("bad user id: {}", e)))?;
        self.get_user(user_id).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, external_uid, email, display_name, preferences, created_at, last_active \
             FROM users WHERE id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .ok_or_else(|| Error::NotFound("user", user_id.to_string()))?;

        let preferences: String = row.get("preferences");
        let last_active: Option<i64> = row.get("last_active");
        Ok(User {
            id: user_id,
            external_uid: row.get("external_uid"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            preferences: serde_json::from_str(&preferences).unwrap_or_default(),
            created_at: ts_to_datetime(row.get("created_at")),
            last_active: last_active.map(ts_to_datetime),
        })
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: &serde_json::Value,
    ) -> Result<User> {
        let json =
            serde_json::to_string(preferences).map_err(|e| Error::Validation(e.to_string()))?;
        let result = sqlx::query("UPDATE users SET preferences = ? WHERE id = ?")
            .bind(json)
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user", user_id.to_string()));
        }
        self.get_user(user_id).await
    }

    /// Deletes the user and, via foreign keys, all owned sessions,
    /// messages and mood logs.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user", user_id.to_string()));
        }
        tracing::info!("Deleted user {} (cascade)", user_id);
        Ok(())
    }
}

pub(crate) fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}
