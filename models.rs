use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// Shown in place of a photo whose stored URL never resolved.
pub const PLACEHOLDER_IMAGE_URL: &str = "placeholder.jpg";

/// One uploaded photo. Records are written once at upload completion and
/// never edited; ownership is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhotoRecord {
    pub id: String,
    pub owner_id: String,
    pub image_url: String,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Store-assigned Unix epoch milliseconds, increasing with insertion
    /// order for a given store.
    pub created_at: i64,
}

impl PhotoRecord {
    /// Where the photo was taken, if it is fully geo-tagged.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// Insert payload for a photo; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewPhotoRecord {
    pub owner_id: String,
    pub image_url: String,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Display profile for one identity. Created exactly once, at signup, and
/// mutated only by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub bio: String,
    pub profile_picture_url: String,
    pub created_at: i64,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}
