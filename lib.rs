pub mod auth;
pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod gallery;
pub mod geo;
pub mod geoloc;
pub mod identity;
pub mod models;
pub mod profile;
pub mod schema;
pub mod store;
pub mod upload;

use std::sync::Arc;

pub use crate::config::{AppConfig, AppPaths};
pub use crate::error::{Error, Result};

use crate::blob::BlobStore;
use crate::identity::IdentityProvider;
use crate::store::{PhotoRecordStore, ProfileStore};

/// The injected client handles plus configuration, handed to every
/// operation. Constructed once at application startup and passed around
/// explicitly; nothing in here is a global.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub records: Arc<dyn PhotoRecordStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        records: Arc<dyn PhotoRecordStore>,
        profiles: Arc<dyn ProfileStore>,
        blobs: Arc<dyn BlobStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            identity,
            records,
            profiles,
            blobs,
            config,
        }
    }

    /// Wires up the bundled local adapters under one storage root: a SQLite
    /// record/profile store, a filesystem blob store, and the in-memory
    /// identity stand-in.
    pub fn local(paths: &AppPaths, config: AppConfig) -> Result<Self> {
        let store = Arc::new(db::SqliteStore::open(&paths.db_path)?);
        Ok(Self {
            identity: Arc::new(identity::MemoryIdentityProvider::new()),
            records: store.clone(),
            profiles: store,
            blobs: Arc::new(blob::FsBlobStore::at(&paths.blobs_dir)?),
            config,
        })
    }

    /// A feed over one owner's photos at the configured page size.
    pub fn personal_feed(&self) -> feed::PagedFeed {
        feed::PagedFeed::new(self.records.clone(), self.config.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::ImagePayload;
    use crate::upload::UploadRequest;
    use image::{GrayImage, ImageOutputFormat};
    use std::io::Cursor;
    use uuid::Uuid;

    #[test]
    fn sign_up_upload_and_feed_work_end_to_end() {
        let root = std::env::temp_dir().join(format!("snapmap_app_{}", Uuid::new_v4()));
        let paths = AppPaths::at(&root).unwrap();
        let state = AppState::local(&paths, AppConfig::default()).unwrap();

        let identity = auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let img = GrayImage::new(2, 2);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        let payload = ImagePayload::from_bytes(bytes, "shot.png").unwrap();
        for _ in 0..2 {
            upload::upload_photo(&state, &payload, &UploadRequest::default()).unwrap();
        }

        let mut feed = state.personal_feed();
        let page = feed.load_first_page(&identity.uid).unwrap();
        assert_eq!(page.len(), 2);
        assert!(feed.is_exhausted());
    }
}
