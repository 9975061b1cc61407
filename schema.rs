/// MIGRATION 0001: Initial database schema.
pub const MIGRATION_0001: &str = r#"
-- Photos Table: one row per uploaded photo. Rows are written once at upload
-- completion and never edited.
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    image_url TEXT NOT NULL,
    caption TEXT,
    description TEXT,
    tags TEXT NOT NULL DEFAULT '[]', -- JSON array, order preserved
    latitude REAL,
    longitude REAL,
    created_at INTEGER NOT NULL -- Unix epoch milliseconds, store-assigned
);

-- Profiles Table: one row per identity, created at signup.
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    username TEXT NOT NULL DEFAULT '',
    bio TEXT NOT NULL DEFAULT '',
    profile_picture_url TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL
);

-- Indexes for owner-scoped feed pages
CREATE INDEX IF NOT EXISTS idx_photos_owner_id ON photos (owner_id);
CREATE INDEX IF NOT EXISTS idx_photos_feed_order ON photos (created_at DESC, id DESC);
"#;
