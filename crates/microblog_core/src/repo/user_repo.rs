//! User and follow-graph repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `user` table.
//! - Own the `followers` association rows (follow/unfollow/queries).
//!
//! # Invariants
//! - A `(follower_id, followed_id)` pair is stored at most once; `follow`
//!   relies on the unique index instead of check-then-insert.
//! - Self-follow edges are allowed.
//! - `create_user_following_self` commits the user row and its self-follow
//!   together or not at all.
//! - Nickname lookups are case-sensitive.

use crate::model::user::{NewUser, User, UserId};
use crate::repo::{count_to_u64, ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    user.id,
    user.nickname,
    user.email,
    user.about_me,
    user.last_seen
FROM user";

/// Repository interface for users and their follow edges.
pub trait UserRepository {
    /// Inserts one user and returns the storage-assigned id.
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId>;
    /// Inserts one user and its self-follow edge in a single transaction.
    /// Neither row is kept when either insert fails.
    fn create_user_following_self(&self, user: &NewUser) -> RepoResult<UserId>;
    /// Replaces nickname, email, bio and last-seen of an existing user.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_nickname(&self, nickname: &str) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn nickname_exists(&self, nickname: &str) -> RepoResult<bool>;
    /// Sets `last_seen` (epoch milliseconds) for one user.
    fn touch_last_seen(&self, id: UserId, seen_at: i64) -> RepoResult<()>;
    fn count_users(&self) -> RepoResult<u64>;

    /// Adds the edge `follower -> followed`. Returns `false` when it already
    /// existed.
    fn follow(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    /// Removes the edge `follower -> followed`. Returns `false` when there was
    /// nothing to remove.
    fn unfollow(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    fn is_following(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    /// Users that `user` follows, sorted by nickname.
    fn list_followed(&self, user: UserId) -> RepoResult<Vec<User>>;
    /// Users following `user`, sorted by nickname.
    fn list_followers(&self, user: UserId) -> RepoResult<Vec<User>>;
    fn count_followed(&self, user: UserId) -> RepoResult<u64>;
    fn count_followers(&self, user: UserId) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["user", "followers"])?;
        Ok(Self { conn })
    }

    fn query_one(&self, filter: &str, value: &dyn rusqlite::ToSql) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter};"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn query_edge_side(&self, sql: &str, user: UserId) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([user])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn ensure_user_exists(&self, id: UserId) -> RepoResult<()> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM user WHERE id = ?1;", [id], |_| Ok(()))
            .optional()?;
        found.ok_or(RepoError::UserNotFound(id))
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO user (nickname, email, about_me, last_seen)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.nickname.as_str(),
                user.email.as_str(),
                user.about_me.as_deref(),
                user.last_seen,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn create_user_following_self(&self, user: &NewUser) -> RepoResult<UserId> {
        let tx = self.conn.unchecked_transaction()?;
        let id = self.create_user(user)?;
        tx.execute(
            "INSERT OR IGNORE INTO followers (follower_id, followed_id)
             VALUES (?1, ?1);",
            [id],
        )?;
        tx.commit()?;
        Ok(id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE user
             SET
                nickname = ?1,
                email = ?2,
                about_me = ?3,
                last_seen = ?4
             WHERE id = ?5;",
            params![
                user.nickname.as_str(),
                user.email.as_str(),
                user.about_me.as_deref(),
                user.last_seen,
                user.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(user.id));
        }
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.query_one("user.id = ?1", &id)
    }

    fn find_by_nickname(&self, nickname: &str) -> RepoResult<Option<User>> {
        self.query_one("user.nickname = ?1", &nickname)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.query_one("user.email = ?1", &email)
    }

    fn nickname_exists(&self, nickname: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE nickname = ?1);",
            [nickname],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn touch_last_seen(&self, id: UserId, seen_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE user SET last_seen = ?1 WHERE id = ?2;",
            params![seen_at, id],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }
        Ok(())
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM user;", [], |row| row.get(0))?;
        count_to_u64(count, "user")
    }

    fn follow(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        self.ensure_user_exists(follower)?;
        self.ensure_user_exists(followed)?;

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO followers (follower_id, followed_id)
             VALUES (?1, ?2);",
            params![follower, followed],
        )?;
        Ok(inserted > 0)
    }

    fn unfollow(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM followers
             WHERE follower_id = ?1
               AND followed_id = ?2;",
            params![follower, followed],
        )?;
        Ok(removed > 0)
    }

    fn is_following(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM followers
                WHERE follower_id = ?1
                  AND followed_id = ?2
            );",
            params![follower, followed],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_followed(&self, user: UserId) -> RepoResult<Vec<User>> {
        self.query_edge_side(
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN followers f ON f.followed_id = user.id
                 WHERE f.follower_id = ?1
                 ORDER BY user.nickname ASC, user.id ASC;"
            ),
            user,
        )
    }

    fn list_followers(&self, user: UserId) -> RepoResult<Vec<User>> {
        self.query_edge_side(
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN followers f ON f.follower_id = user.id
                 WHERE f.followed_id = ?1
                 ORDER BY user.nickname ASC, user.id ASC;"
            ),
            user,
        )
    }

    fn count_followed(&self, user: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM followers WHERE follower_id = ?1;",
            [user],
            |row| row.get(0),
        )?;
        count_to_u64(count, "followed")
    }

    fn count_followers(&self, user: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM followers WHERE followed_id = ?1;",
            [user],
            |row| row.get(0),
        )?;
        count_to_u64(count, "follower")
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get(0)?,
        nickname: row.get(1)?,
        email: row.get(2)?,
        about_me: row.get(3)?,
        last_seen: row.get(4)?,
    };
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("user {} failed validation: {err}", user.id))
    })?;
    Ok(user)
}
