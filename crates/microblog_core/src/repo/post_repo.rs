//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert and read rows of the `post` table.
//! - Serve author timelines and the followed-posts feed.
//!
//! # Invariants
//! - Listings are ordered `timestamp DESC, id DESC`.
//! - The followed-posts feed only contains posts whose author has an edge
//!   from the requesting user in `followers`.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::user::UserId;
use crate::repo::{count_to_u64, ensure_connection_ready, PostListQuery, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const POST_SELECT_SQL: &str = "SELECT
    post.id,
    post.body,
    post.timestamp,
    post.user_id
FROM post";

const POST_ORDER_SQL: &str = " ORDER BY post.timestamp DESC, post.id DESC";

pub trait PostRepository {
    /// Inserts one post and returns the storage-assigned id.
    fn create_post(&self, post: &NewPost) -> RepoResult<PostId>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Posts written by `author`, newest first.
    fn list_posts_by_author(&self, author: UserId, query: &PostListQuery)
        -> RepoResult<Vec<Post>>;
    /// Posts written by every user that `user` follows, newest first.
    fn followed_posts(&self, user: UserId, query: &PostListQuery) -> RepoResult<Vec<Post>>;
    fn count_posts(&self) -> RepoResult<u64>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["user", "post", "followers"])?;
        Ok(Self { conn })
    }

    fn list_with(
        &self,
        mut sql: String,
        user: UserId,
        query: &PostListQuery,
    ) -> RepoResult<Vec<Post>> {
        let mut bind_values: Vec<Value> = vec![Value::Integer(user)];
        sql.push_str(POST_ORDER_SQL);
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<PostId> {
        post.validate()?;

        let author = self
            .conn
            .query_row(
                "SELECT 1 FROM user WHERE id = ?1;",
                [post.user_id],
                |_| Ok(()),
            )
            .optional()?;
        if author.is_none() {
            return Err(RepoError::UserNotFound(post.user_id));
        }

        self.conn.execute(
            "INSERT INTO post (body, timestamp, user_id) VALUES (?1, ?2, ?3);",
            params![post.body.as_str(), post.timestamp, post.user_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE post.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn list_posts_by_author(
        &self,
        author: UserId,
        query: &PostListQuery,
    ) -> RepoResult<Vec<Post>> {
        self.list_with(
            format!("{POST_SELECT_SQL} WHERE post.user_id = ?"),
            author,
            query,
        )
    }

    fn followed_posts(&self, user: UserId, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        self.list_with(
            format!(
                "{POST_SELECT_SQL}
                 INNER JOIN followers f ON f.followed_id = post.user_id
                 WHERE f.follower_id = ?"
            ),
            user,
            query,
        )
    }

    fn count_posts(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM post;", [], |row| row.get(0))?;
        count_to_u64(count, "post")
    }
}

fn push_page(sql: &mut String, bind_values: &mut Vec<Value>, query: &PostListQuery) {
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }
    } else if query.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.offset)));
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let post = Post {
        id: row.get(0)?,
        body: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
    };
    if post.body.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "post {} has a blank body",
            post.id
        )));
    }
    Ok(post)
}
