use crate::projection::{project, Record};
use crate::schema::posts;
use crate::settings::{Database, LikeStrategy};
use crate::utils::logs;
use chrono::{NaiveDateTime, SecondsFormat};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, HandleError, Pool, PoolError};
use diesel::sqlite::SqliteConnection;
use serde_json::Value;
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Columns returned to clients. `removed` is deliberately absent.
pub const POST_COLUMNS: [&str; 4] = ["id", "content", "likes", "created"];

const CREATE_POSTS: &str = "
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        likes INTEGER NOT NULL DEFAULT 0,
        created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        removed BOOLEAN NOT NULL DEFAULT 0
    );
";

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u64,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        configure_connection(conn, self.busy_timeout_ms).map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Debug)]
struct LogPoolErrors;

impl HandleError<diesel::r2d2::Error> for LogPoolErrors {
    fn handle_error(&self, error: diesel::r2d2::Error) {
        logs::log_db_error(&error.to_string());
    }
}

pub fn establish_pool(config: &Database) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .error_handler(Box::new(LogPoolErrors))
        .build(manager)
}

pub fn configure_connection(conn: &mut SqliteConnection, busy_timeout_ms: u64) -> QueryResult<()> {
    conn.batch_execute(&format!("PRAGMA busy_timeout = {busy_timeout_ms};"))?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")?;
    conn.batch_execute("PRAGMA synchronous = NORMAL;")?;
    Ok(())
}

pub fn ensure_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(CREATE_POSTS)
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub likes: i64,
    pub created: NaiveDateTime,
}

impl Post {
    /// Values in [`POST_COLUMNS`] order.
    pub fn into_values(self) -> Vec<Value> {
        vec![
            Value::from(self.id),
            Value::from(self.content),
            Value::from(self.likes),
            Value::from(
                self.created
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]
    }
}

pub fn project_posts(rows: Vec<Post>) -> Vec<Record> {
    project(&POST_COLUMNS, rows.into_iter().map(Post::into_values))
}

pub fn list_active(conn: &mut SqliteConnection) -> QueryResult<Vec<Post>> {
    use crate::schema::posts::dsl::*;

    posts
        .filter(removed.eq(false))
        .order(id.desc())
        .select(Post::as_select())
        .load(conn)
}

pub fn get_active(conn: &mut SqliteConnection, post_id: i64) -> QueryResult<Option<Post>> {
    use crate::schema::posts::dsl::*;

    posts
        .filter(removed.eq(false))
        .filter(id.eq(post_id))
        .select(Post::as_select())
        .first(conn)
        .optional()
}

/// Looks a post up by id whether or not it has been removed.
pub fn find_post(conn: &mut SqliteConnection, post_id: i64) -> QueryResult<Option<Post>> {
    use crate::schema::posts::dsl::*;

    posts
        .filter(id.eq(post_id))
        .select(Post::as_select())
        .first(conn)
        .optional()
}

pub fn insert_post(conn: &mut SqliteConnection, new_content: &str) -> QueryResult<i64> {
    use crate::schema::posts::dsl::*;

    diesel::insert_into(posts)
        .values(content.eq(new_content))
        .returning(id)
        .get_result(conn)
}

pub fn update_content(
    conn: &mut SqliteConnection,
    post_id: i64,
    new_content: &str,
) -> QueryResult<usize> {
    use crate::schema::posts::dsl::*;

    diesel::update(posts.filter(removed.eq(false)).filter(id.eq(post_id)))
        .set(content.eq(new_content))
        .execute(conn)
}

/// Moves the like counter by `delta` on an active post. Returns the number of
/// rows changed; zero means the post is missing or removed. The counter is
/// allowed to go negative.
pub fn update_likes(
    conn: &mut SqliteConnection,
    post_id: i64,
    delta: i64,
    strategy: LikeStrategy,
) -> QueryResult<usize> {
    use crate::schema::posts::dsl::*;

    let target = posts.filter(removed.eq(false)).filter(id.eq(post_id));

    match strategy {
        LikeStrategy::ReadThenWrite => {
            let current: Option<i64> = posts
                .filter(id.eq(post_id))
                .select(likes)
                .first(conn)
                .optional()?;
            let Some(current) = current else {
                return Ok(0);
            };
            diesel::update(target)
                .set(likes.eq(current + delta))
                .execute(conn)
        }
        LikeStrategy::Atomic => diesel::update(target)
            .set(likes.eq(likes + delta))
            .execute(conn),
    }
}

/// Flips `removed` to `flag` only when it currently holds the opposite value.
pub fn set_removed(conn: &mut SqliteConnection, post_id: i64, flag: bool) -> QueryResult<usize> {
    use crate::schema::posts::dsl::*;

    diesel::update(posts.filter(removed.eq(!flag)).filter(id.eq(post_id)))
        .set(removed.eq(flag))
        .execute(conn)
}
