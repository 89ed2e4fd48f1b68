//! User accounts. Credentials arrive already hashed; this module only
//! stores them.

use super::helpers::{next_id, now_millis, require_name};
use super::stories::delete_story_graph;
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{StoryId, User, UserId};
use tracing::info;

impl PlotStore {
    /// Create a user without any stories.
    pub fn create_user(&self, username: &str, credential_hash: &str) -> StoreResult<User> {
        self.with_transaction(|conn| insert_user(conn, username, credential_hash))
    }

    pub fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.lock_conn();
        user_by_name(&conn, username)
    }

    /// Stored credential hash, for the caller's own verification.
    pub fn credential_hash(&self, username: &str) -> StoreResult<String> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            "SELECT credential_hash FROM users WHERE username = ?",
            params![username],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(hash) => Ok(hash),
            Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::not_found("user", username)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_credential_hash(&self, username: &str, credential_hash: &str) -> StoreResult<()> {
        let conn = self.lock_conn();
        let updated = conn.execute(
            "UPDATE users SET credential_hash = ? WHERE username = ?",
            params![credential_hash, username],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("user", username));
        }
        Ok(())
    }

    /// Delete a user and every story they own.
    pub fn delete_user(&self, username: &str) -> StoreResult<()> {
        self.with_transaction(|conn| {
            let user = user_by_name(conn, username)?
                .ok_or_else(|| StoreError::not_found("user", username))?;

            let mut stmt = conn.prepare("SELECT id FROM stories WHERE user_id = ? ORDER BY id")?;
            let stories = stmt
                .query_map(params![user.id.get()], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            drop(stmt);

            for story in &stories {
                delete_story_graph(conn, StoryId(*story))?;
            }
            conn.execute("DELETE FROM users WHERE id = ?", params![user.id.get()])?;

            info!(username, stories = stories.len(), "User deleted");
            Ok(())
        })
    }
}

pub(crate) fn insert_user(
    conn: &Connection,
    username: &str,
    credential_hash: &str,
) -> StoreResult<User> {
    let username = require_name(username, "username")?;
    if user_by_name(conn, username)?.is_some() {
        return Err(StoreError::UsernameTaken(username.to_string()));
    }

    let id = UserId(next_id(conn, "users_id_seq")?);
    let now = now_millis();
    conn.execute(
        "INSERT INTO users (id, username, credential_hash, created_at) VALUES (?, ?, ?, ?)",
        params![id.get(), username, credential_hash, now],
    )?;

    info!(user_id = %id, username, "User created");
    Ok(User {
        id,
        username: username.to_string(),
        created_at: now,
    })
}

pub(crate) fn user_by_name(conn: &Connection, username: &str) -> StoreResult<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, created_at FROM users WHERE username = ?",
        params![username],
        |row| {
            Ok(User {
                id: UserId(row.get(0)?),
                username: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn user_by_id(conn: &Connection, id: UserId) -> StoreResult<User> {
    let result = conn.query_row(
        "SELECT id, username, created_at FROM users WHERE id = ?",
        params![id.get()],
        |row| {
            Ok(User {
                id: UserId(row.get(0)?),
                username: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    );
    match result {
        Ok(user) => Ok(user),
        Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::not_found("user", id)),
        Err(e) => Err(e.into()),
    }
}
