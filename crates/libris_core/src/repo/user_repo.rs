//! User and capability-grant persistence.
//!
//! Users are managed by the authentication provider; this table mirrors the
//! ids the core references and the capability flags granted to them.

use crate::auth::capability::{parse_capability, Capability};
use crate::model::user::{Principal, User, UserId};
use crate::repo::{new_id, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait UserRepository {
    fn create_user(&self, username: &str) -> RepoResult<User>;
    /// Records an externally authenticated user on first sight; known ids
    /// are left untouched.
    fn ensure_user(&self, principal: &Principal) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Granting an already granted capability is a no-op.
    fn grant_capability(&self, id: UserId, capability: Capability) -> RepoResult<()>;
    fn revoke_capability(&self, id: UserId, capability: Capability) -> RepoResult<()>;
    /// Loads the user with its capability flags as an authenticated principal.
    fn load_principal(&self, id: UserId) -> RepoResult<Option<Principal>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_exists(&self, id: UserId) -> RepoResult<()> {
        if self.get_user(id)?.is_none() {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str) -> RepoResult<User> {
        let user = User {
            id: new_id(),
            username: username.to_string(),
        };
        self.conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2);",
            params![user.id.to_string(), user.username.as_str()],
        )?;
        Ok(user)
    }

    fn ensure_user(&self, principal: &Principal) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2) ON CONFLICT (id) DO NOTHING;",
            params![principal.id.to_string(), principal.username.as_str()],
        )?;
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let username = self
            .conn
            .query_row(
                "SELECT username FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(username.map(|username| User { id, username }))
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username FROM users WHERE username = ?1;")?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(User {
                id: uuid_column(row, "id")?,
                username: row.get("username")?,
            }));
        }
        Ok(None)
    }

    fn grant_capability(&self, id: UserId, capability: Capability) -> RepoResult<()> {
        self.ensure_exists(id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO user_capabilities (user_id, capability) VALUES (?1, ?2);",
            params![id.to_string(), capability.as_str()],
        )?;
        Ok(())
    }

    fn revoke_capability(&self, id: UserId, capability: Capability) -> RepoResult<()> {
        self.ensure_exists(id)?;
        self.conn.execute(
            "DELETE FROM user_capabilities WHERE user_id = ?1 AND capability = ?2;",
            params![id.to_string(), capability.as_str()],
        )?;
        Ok(())
    }

    fn load_principal(&self, id: UserId) -> RepoResult<Option<Principal>> {
        let Some(user) = self.get_user(id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT capability FROM user_capabilities WHERE user_id = ?1 ORDER BY capability;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut capabilities = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            let capability = parse_capability(&value).map_err(|err| {
                RepoError::InvalidData(format!("{err} in user_capabilities.capability"))
            })?;
            capabilities.push(capability);
        }

        Ok(Some(
            Principal::new(user.id, user.username).with_capabilities(capabilities),
        ))
    }
}
