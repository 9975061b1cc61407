use crate::error::{Error, Result};
use crate::models::{NewPhotoRecord, PhotoRecord, ProfileChanges, UserProfile, PLACEHOLDER_IMAGE_URL};
use crate::schema;
use crate::store::{PhotoQuery, PhotoRecordStore, ProfileStore};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use uuid::Uuid;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const PHOTO_COLUMNS: &str =
    "id, owner_id, image_url, caption, description, tags, latitude, longitude, created_at";

/// SQLite-backed photo and profile store.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and runs
    /// migrations.
    pub fn open(db_path: &Path) -> Result<Self> {
        log::info!("Database path: {}", db_path.display());

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = r2d2::Pool::new(manager)?;

        run_migrations(&pool.get()?)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Next value for the store-assigned timestamp. Clamped strictly above
    /// the current maximum so insertion order and timestamp order agree,
    /// which cursor pagination relies on.
    fn next_created_at(conn: &Connection) -> Result<i64> {
        let latest: Option<i64> =
            conn.query_row("SELECT MAX(created_at) FROM photos", [], |row| row.get(0))?;
        let now = chrono::Utc::now().timestamp_millis();
        Ok(match latest {
            Some(latest) if latest >= now => latest + 1,
            _ => now,
        })
    }
}

/// Applies all pending database migrations.
fn run_migrations(connection: &DbConnection) -> Result<()> {
    // `DbConnection` dereferences to the underlying rusqlite `Connection`,
    // allowing us to call the rusqlite APIs directly.
    let connection: &Connection = &*connection;

    log::info!("Running database migrations...");

    connection.execute_batch(schema::MIGRATION_0001)?;

    log::info!("Migrations applied successfully.");
    Ok(())
}

fn photo_from_row(row: &Row) -> rusqlite::Result<PhotoRecord> {
    let tags_json: String = row.get("tags")?;
    let image_url: String = row.get("image_url")?;
    Ok(PhotoRecord {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        image_url: fallback_url(image_url),
        caption: row.get("caption")?,
        description: row.get("description")?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        created_at: row.get("created_at")?,
    })
}

fn fallback_url(image_url: String) -> String {
    if image_url.is_empty() {
        PLACEHOLDER_IMAGE_URL.to_string()
    } else {
        image_url
    }
}

impl PhotoRecordStore for SqliteStore {
    fn insert(&self, photo: NewPhotoRecord) -> Result<PhotoRecord> {
        let conn = self.conn()?;
        let id = Uuid::new_v4().to_string();
        let created_at = Self::next_created_at(&conn)?;
        let tags_json = serde_json::to_string(&photo.tags)?;

        conn.execute(
            "INSERT INTO photos (id, owner_id, image_url, caption, description, tags, latitude, longitude, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                photo.owner_id,
                photo.image_url,
                photo.caption,
                photo.description,
                tags_json,
                photo.latitude,
                photo.longitude,
                created_at
            ],
        )?;

        Ok(PhotoRecord {
            id,
            owner_id: photo.owner_id,
            image_url: fallback_url(photo.image_url),
            caption: photo.caption,
            description: photo.description,
            tags: photo.tags,
            latitude: photo.latitude,
            longitude: photo.longitude,
            created_at,
        })
    }

    fn query(&self, query: &PhotoQuery) -> Result<Vec<PhotoRecord>> {
        let conn = self.conn()?;
        let limit = query.limit.map(|limit| limit as i64);

        let mut sql = format!("SELECT {PHOTO_COLUMNS} FROM photos");
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<&dyn ToSql> = Vec::new();

        if let Some(owner_id) = query.owner_id.as_ref() {
            clauses.push("owner_id = ?");
            args.push(owner_id);
        }
        if let Some(cursor) = query.start_after.as_ref() {
            clauses.push("(created_at < ? OR (created_at = ? AND id < ?))");
            args.push(&cursor.created_at);
            args.push(&cursor.created_at);
            args.push(&cursor.id);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = limit.as_ref() {
            sql.push_str(" LIMIT ?");
            args.push(limit);
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), photo_from_row)?;
        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<PhotoRecord>> {
        let conn = self.conn()?;
        let photo = conn
            .query_row(
                &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1"),
                params![id],
                photo_from_row,
            )
            .optional()?;
        Ok(photo)
    }
}

impl ProfileStore for SqliteStore {
    fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profiles (user_id, username, bio, profile_picture_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.user_id,
                profile.username,
                profile.bio,
                profile.profile_picture_url,
                profile.created_at
            ],
        )?;
        Ok(())
    }

    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                "SELECT user_id, username, bio, profile_picture_url, created_at
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        user_id: row.get("user_id")?,
                        username: row.get("username")?,
                        bio: row.get("bio")?,
                        profile_picture_url: row.get("profile_picture_url")?,
                        created_at: row.get("created_at")?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn update_profile(&self, user_id: &str, changes: &ProfileChanges) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET
                 username = COALESCE(?2, username),
                 bio = COALESCE(?3, bio),
                 profile_picture_url = COALESCE(?4, profile_picture_url)
             WHERE user_id = ?1",
            params![
                user_id,
                changes.username,
                changes.bio,
                changes.profile_picture_url
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("No profile for user {user_id}")));
        }
        Ok(())
    }
}
