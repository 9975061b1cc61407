use crate::error::Result;
use crate::models::{NewPhotoRecord, PhotoRecord, ProfileChanges, UserProfile};
use serde::{Deserialize, Serialize};

/// Reference to the last record of a fetched page; the next page starts
/// strictly after it. The id breaks ties between equal timestamps so the
/// pagination order is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub(crate) created_at: i64,
    pub(crate) id: String,
}

impl PageCursor {
    pub fn of(record: &PhotoRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id.clone(),
        }
    }
}

/// The query shape the photo store is consumed through: an optional owner
/// equality filter, fixed `created_at`-descending order, an optional page
/// limit, and an optional start-after cursor.
#[derive(Debug, Clone, Default)]
pub struct PhotoQuery {
    pub owner_id: Option<String>,
    pub limit: Option<usize>,
    pub start_after: Option<PageCursor>,
}

impl PhotoQuery {
    /// Every photo, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// One owner's photos, newest first.
    pub fn owned_by(owner_id: &str) -> Self {
        Self {
            owner_id: Some(owner_id.to_string()),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: Option<PageCursor>) -> Self {
        self.start_after = cursor;
        self
    }
}

/// The photo collection of the remote document store.
pub trait PhotoRecordStore: Send + Sync {
    /// Persists a new record. The store assigns `id` and `created_at`.
    fn insert(&self, photo: NewPhotoRecord) -> Result<PhotoRecord>;

    /// Records matching `query`, in `created_at`-descending order.
    fn query(&self, query: &PhotoQuery) -> Result<Vec<PhotoRecord>>;

    fn get_by_id(&self, id: &str) -> Result<Option<PhotoRecord>>;
}

/// The profile collection of the remote document store.
pub trait ProfileStore: Send + Sync {
    fn create_profile(&self, profile: &UserProfile) -> Result<()>;

    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Applies the non-`None` fields of `changes` to an existing profile.
    fn update_profile(&self, user_id: &str, changes: &ProfileChanges) -> Result<()>;
}
