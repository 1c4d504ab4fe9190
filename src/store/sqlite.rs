use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Database;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str = "id, name, email, address, password_hash, role, created_at";
const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Mostly useful for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Maps constraint failures to domain errors; everything else stays a
/// database error.
fn map_write_error(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::AlreadyExists
        }
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::InvalidReference
        }
        _ => Error::from(err),
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        password_hash: row.get(4)?,
        role: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn store_from_row(row: &Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn store_with_rating_from_row(row: &Row<'_>) -> rusqlite::Result<StoreWithRating> {
    Ok(StoreWithRating {
        store: store_from_row(row)?,
        average_rating: row.get(6)?,
        rating_count: row.get(7)?,
    })
}

const STORES_WITH_RATING: &str = "SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
        COALESCE(AVG(r.rating), 0.0), COUNT(r.id)
 FROM stores s
 LEFT JOIN ratings r ON r.store_id = s.id";

impl Database for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (name, email, address, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.name,
                user.email,
                user.address,
                user.password_hash,
                user.role,
                format_datetime(&Utc::now()),
            ],
        )
        .map_err(map_write_error)?;
        Ok(conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, id: i64, address: Option<&str>, role: Role) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx
            .execute(
                "UPDATE users SET address = ?1, role = ?2 WHERE id = ?3",
                params![address, role, id],
            )
            .map_err(map_write_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        // Stores may only point at owners.
        if role != Role::Owner {
            tx.execute(
                "UPDATE stores SET owner_id = NULL WHERE owner_id = ?1",
                params![id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_owners(&self) -> Result<Vec<OwnerSummary>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, email FROM users WHERE role = ?1 ORDER BY id")?;

        let rows = stmt.query_map(params![Role::Owner], |row| {
            Ok(OwnerSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn has_admin(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![Role::Admin],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Store operations

    fn create_store(&self, store: &NewStore) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO stores (name, email, address, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                store.name,
                store.email,
                store.address,
                store.owner_id,
                format_datetime(&Utc::now()),
            ],
        )
        .map_err(map_write_error)?;
        Ok(conn.last_insert_rowid())
    }

    fn get_store(&self, id: i64) -> Result<Option<Store>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1"),
            params![id],
            store_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_stores(&self) -> Result<Vec<Store>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY id"))?;
        let rows = stmt.query_map([], store_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_store(&self, id: i64, store: &NewStore) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE stores SET name = ?1, email = ?2, address = ?3, owner_id = ?4 WHERE id = ?5",
                params![store.name, store.email, store.address, store.owner_id, id],
            )
            .map_err(map_write_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_store(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM stores WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Rating aggregates

    fn list_stores_with_rating(&self) -> Result<Vec<StoreWithRating>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{STORES_WITH_RATING} GROUP BY s.id ORDER BY s.id"))?;
        let rows = stmt.query_map([], store_with_rating_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_store_with_rating(&self, id: i64) -> Result<Option<StoreWithRating>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{STORES_WITH_RATING} WHERE s.id = ?1 GROUP BY s.id"),
            params![id],
            store_with_rating_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_store_ratings(&self, store_id: i64) -> Result<Vec<StoreRating>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.rating, r.comment, u.name
             FROM ratings r
             JOIN users u ON u.id = r.user_id
             WHERE r.store_id = ?1
             ORDER BY r.id",
        )?;

        let rows = stmt.query_map(params![store_id], |row| {
            Ok(StoreRating {
                id: row.get(0)?,
                rating: row.get(1)?,
                comment: row.get(2)?,
                user_name: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_owner_ratings(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OwnerRating>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, r.id, r.rating, r.comment, u.name, u.email
             FROM stores s
             JOIN ratings r ON r.store_id = s.id
             JOIN users u ON u.id = r.user_id
             WHERE s.owner_id = ?1
             ORDER BY r.id
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt.query_map(params![owner_id, limit, offset], |row| {
            Ok(OwnerRating {
                store_id: row.get(0)?,
                store_name: row.get(1)?,
                rating_id: row.get(2)?,
                rating: row.get(3)?,
                comment: row.get(4)?,
                rated_by: row.get(5)?,
                rated_by_email: row.get(6)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_owner_ratings(&self, owner_id: i64) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*)
             FROM stores s
             JOIN ratings r ON r.store_id = s.id
             WHERE s.owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn stats(&self) -> Result<PlatformStats> {
        let conn = self.conn();
        conn.query_row(
            "SELECT (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM stores),
                    (SELECT COUNT(*) FROM ratings)",
            [],
            |row| {
                Ok(PlatformStats {
                    total_users: row.get(0)?,
                    total_stores: row.get(1)?,
                    total_ratings: row.get(2)?,
                })
            },
        )
        .map_err(Error::from)
    }

    // Rating operations

    fn upsert_rating(
        &self,
        user_id: i64,
        store_id: i64,
        stars: Stars,
        comment: &CommentUpdate,
    ) -> Result<()> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();

        match comment {
            CommentUpdate::Keep => conn.execute(
                "INSERT INTO ratings (user_id, store_id, rating, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT (user_id, store_id) DO UPDATE SET
                    rating = excluded.rating,
                    updated_at = excluded.updated_at",
                params![user_id, store_id, stars, now],
            ),
            CommentUpdate::Replace(text) => conn.execute(
                "INSERT INTO ratings (user_id, store_id, rating, comment, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT (user_id, store_id) DO UPDATE SET
                    rating = excluded.rating,
                    comment = excluded.comment,
                    updated_at = excluded.updated_at",
                params![user_id, store_id, stars, text, now],
            ),
        }
        .map_err(map_write_error)?;

        Ok(())
    }

    fn get_rating(&self, user_id: i64, store_id: i64) -> Result<Option<Rating>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, store_id, rating, comment, created_at, updated_at
             FROM ratings WHERE user_id = ?1 AND store_id = ?2",
            params![user_id, store_id],
            |row| {
                Ok(Rating {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    store_id: row.get(2)?,
                    rating: row.get(3)?,
                    comment: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }
}
