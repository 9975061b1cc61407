use crate::geo::DEFAULT_PROXIMITY_RADIUS_KM;
use crate::models::PLACEHOLDER_IMAGE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tuning knobs for the client, owned by application startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Records fetched per feed page.
    pub page_size: usize,
    /// Radius within which a photo counts as nearby, in kilometers.
    pub proximity_radius_km: f64,
    pub placeholder_image_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            proximity_radius_km: DEFAULT_PROXIMITY_RADIUS_KM,
            placeholder_image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

/// On-disk layout for the bundled local adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPaths {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub blobs_dir: PathBuf,
}

impl AppPaths {
    /// Builds the layout under an explicit root, creating directories as
    /// needed. The root is injected by the host rather than discovered, so
    /// tests and multiple instances stay isolated.
    pub fn at(root: &Path) -> Result<Self, crate::error::Error> {
        let root = root.to_path_buf();
        let db_path = root.join("library.db");
        let blobs_dir = root.join("blobs");

        std::fs::create_dir_all(&blobs_dir)?;

        Ok(Self {
            root,
            db_path,
            blobs_dir,
        })
    }
}
