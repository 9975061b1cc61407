use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Owner information recorded alongside a stored blob.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlobMetadata {
    pub owner_id: String,
}

/// The remote object store, consumed through put-object/get-url.
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8], metadata: Option<&BlobMetadata>) -> Result<()>;

    /// Retrieval URL for a stored object.
    fn get_url(&self, key: &str) -> Result<String>;
}

/// Blob store rooted at a local directory; keys map to relative paths.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn at(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Maps a key to its on-disk path. Keys are slash-separated names and may
    /// not escape the store root.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let traversal = key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
        if key.is_empty() || traversal || key.contains('\\') {
            return Err(Error::InvalidInput(format!("Invalid blob key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8], metadata: Option<&BlobMetadata>) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        if let Some(metadata) = metadata {
            let meta_path = PathBuf::from(format!("{}.meta.json", path.display()));
            fs::write(&meta_path, serde_json::to_vec(metadata)?)?;
        }
        log::debug!("Stored blob {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn get_url(&self, key: &str) -> Result<String> {
        let path = self.resolve(key)?;
        if !path.exists() {
            return Err(Error::NotFound(format!("No blob stored under {key}")));
        }
        Ok(format!("file://{}", path.display()))
    }
}

/// An image ready for upload: raw bytes plus the sniffed format.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub file_name: String,
}

impl ImagePayload {
    /// Decodes a `data:image/...;base64,` URL, the form the camera capture
    /// path produces.
    pub fn from_data_url(data_url: &str, file_name: &str) -> Result<Self> {
        if !data_url.starts_with("data:image/") {
            return Err(Error::InvalidInput(
                "Image data must start with 'data:image/'".to_string(),
            ));
        }
        let (header, encoded) = data_url.split_once(',').ok_or_else(|| {
            Error::InvalidInput("Image data is missing its base64 payload".to_string())
        })?;
        if !header.ends_with(";base64") {
            return Err(Error::InvalidInput(
                "Image data must be base64 encoded".to_string(),
            ));
        }
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|err| Error::InvalidInput(format!("Image data is not valid base64: {err}")))?;
        Self::from_bytes(bytes, file_name)
    }

    /// Wraps raw bytes from a file picker, verifying they look like an image.
    pub fn from_bytes(bytes: Vec<u8>, file_name: &str) -> Result<Self> {
        let format = image::guess_format(&bytes).map_err(|_| {
            Error::InvalidInput("Payload is not a recognized image format".to_string())
        })?;
        Ok(Self {
            bytes,
            mime: format.to_mime_type().to_string(),
            file_name: file_name.to_string(),
        })
    }
}
