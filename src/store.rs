//! Credential Store
//! Mission: Persist user accounts with SQLite

use crate::errors::ApiError;
use crate::models::{Role, UserAccount};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::info;
use uuid::Uuid;

/// Account storage over a single SQLite database path.
///
/// Opened once in `main` and shared via `AppState`; each call opens a
/// short-lived connection. Every method is a single bounded statement,
/// so each write is atomic on its own but sequences of writes are not.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Open the store and initialize the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                refresh_token TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
            [],
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<Connection, ApiError> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Insert a new account. The password must already be hashed.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserAccount, ApiError> {
        let now = Utc::now().to_rfc3339();
        let account = UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            role,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, refresh_token, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                account.id.to_string(),
                account.username,
                account.email,
                account.password_hash,
                account.role.as_str(),
                account.refresh_token,
                account.created_at,
                account.updated_at,
            ],
        )
        .map_err(unique_violation_to_conflict)?;

        info!("Created account {} ({})", account.username, account.id);

        Ok(account)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, refresh_token, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;

        optional_row(stmt.query_row(params![id.to_string()], row_to_account))
    }

    /// Look an account up by username (stored lowercased) or email.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, refresh_token, created_at, updated_at
             FROM users WHERE username = ?1 OR email = ?1",
        )?;

        optional_row(stmt.query_row(params![identifier], row_to_account))
    }

    /// Overwrite (or clear) the stored refresh token.
    ///
    /// Clearing a token that is already absent succeeds, which makes
    /// logout idempotent.
    pub fn set_refresh_token(&self, id: &Uuid, token: Option<&str>) -> Result<(), ApiError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET refresh_token = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), token, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn update_role(&self, id: &Uuid, role: Role) -> Result<UserAccount, ApiError> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), role.as_str(), Utc::now().to_rfc3339()],
        )?;

        if rows == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub fn delete_user(&self, id: &Uuid) -> Result<(), ApiError> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;

        if rows == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!("Deleted account {}", id);
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, refresh_token, created_at, updated_at
             FROM users ORDER BY created_at",
        )?;

        let accounts = stmt
            .query_map([], row_to_account)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }
}

fn row_to_account(row: &Row) -> rusqlite::Result<UserAccount> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let role_str: String = row.get(4)?;

    Ok(UserAccount {
        id,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&role_str).unwrap_or(Role::User),
        refresh_token: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn optional_row(
    result: rusqlite::Result<UserAccount>,
) -> Result<Option<UserAccount>, ApiError> {
    match result {
        Ok(account) => Ok(Some(account)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn unique_violation_to_conflict(err: rusqlite::Error) -> ApiError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ApiError::Conflict("User already exists with this email or username".to_string())
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::open(db_path).unwrap();
        (store, temp_file)
    }

    fn add_user(store: &UserStore, username: &str, email: &str) -> UserAccount {
        store
            .create_user(username, email, "$2b$10$fakehash", Role::User)
            .unwrap()
    }

    #[test]
    fn test_create_and_find_by_identifier() {
        let (store, _temp) = create_test_store();
        let created = add_user(&store, "alice", "alice@example.com");

        let by_name = store.find_by_identifier("alice").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        let by_email = store.find_by_identifier("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(store.find_by_identifier("bob").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_conflict() {
        let (store, _temp) = create_test_store();
        add_user(&store, "alice", "alice@example.com");

        let err = store
            .create_user("alice", "other@example.com", "h", Role::User)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let (store, _temp) = create_test_store();
        add_user(&store, "alice", "alice@example.com");

        let err = store
            .create_user("alice2", "alice@example.com", "h", Role::User)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_refresh_token_set_and_clear() {
        let (store, _temp) = create_test_store();
        let user = add_user(&store, "alice", "alice@example.com");
        assert!(user.refresh_token.is_none());

        store.set_refresh_token(&user.id, Some("token-1")).unwrap();
        let loaded = store.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(loaded.refresh_token.as_deref(), Some("token-1"));

        // Rotation overwrites
        store.set_refresh_token(&user.id, Some("token-2")).unwrap();
        let loaded = store.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(loaded.refresh_token.as_deref(), Some("token-2"));

        // Clearing twice is fine
        store.set_refresh_token(&user.id, None).unwrap();
        store.set_refresh_token(&user.id, None).unwrap();
        let loaded = store.find_by_id(&user.id).unwrap().unwrap();
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn test_update_role() {
        let (store, _temp) = create_test_store();
        let user = add_user(&store, "alice", "alice@example.com");

        let updated = store.update_role(&user.id, Role::Manager).unwrap();
        assert_eq!(updated.role, Role::Manager);

        let err = store.update_role(&Uuid::new_v4(), Role::User).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_delete_user() {
        let (store, _temp) = create_test_store();
        let user = add_user(&store, "alice", "alice@example.com");

        store.delete_user(&user.id).unwrap();
        assert!(store.find_by_id(&user.id).unwrap().is_none());

        let err = store.delete_user(&user.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_list_users() {
        let (store, _temp) = create_test_store();
        add_user(&store, "alice", "alice@example.com");
        add_user(&store, "bob", "bob@example.com");

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
    }
}
