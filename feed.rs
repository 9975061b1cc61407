use crate::error::Result;
use crate::models::PhotoRecord;
use crate::store::{PageCursor, PhotoQuery, PhotoRecordStore};
use std::sync::Arc;

/// Lifecycle of a paginated feed. The loading states double as the in-flight
/// guard: a load entered while another is pending is ignored, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Nothing fetched yet.
    Idle,
    LoadingFirst,
    /// At least one page fetched, more may remain.
    Ready,
    LoadingMore,
    /// The store returned a short page; later loads are no-ops.
    Exhausted,
}

/// Incrementally fetched, owner-scoped photo feed, newest first.
///
/// Pages are keyed off a cursor to the last fetched record, so records
/// inserted between loads may be skipped or missed entirely; the feed never
/// re-reads what it already holds.
pub struct PagedFeed {
    store: Arc<dyn PhotoRecordStore>,
    page_size: usize,
    state: FeedState,
    photos: Vec<PhotoRecord>,
    cursor: Option<PageCursor>,
}

impl PagedFeed {
    pub fn new(store: Arc<dyn PhotoRecordStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size,
            state: FeedState::Idle,
            photos: Vec::new(),
            cursor: None,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Everything fetched so far, in feed order.
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == FeedState::Exhausted
    }

    /// Fetches the newest page for `owner_id`, replacing anything fetched so
    /// far. Callable from any settled state, including `Exhausted` (a
    /// refresh restarts the feed); ignored while a load is in flight.
    ///
    /// On failure the feed keeps its prior state, photos, and cursor, and the
    /// caller may retry.
    pub fn load_first_page(&mut self, owner_id: &str) -> Result<&[PhotoRecord]> {
        if self.is_loading() {
            return Ok(&[]);
        }
        let prior = self.state;
        self.state = FeedState::LoadingFirst;

        let query = PhotoQuery::owned_by(owner_id).limit(self.page_size);
        match self.store.query(&query) {
            Ok(page) => {
                self.cursor = page.last().map(PageCursor::of);
                self.state = self.settled_state(page.len());
                self.photos = page;
                Ok(&self.photos)
            }
            Err(err) => {
                self.state = prior;
                Err(err)
            }
        }
    }

    /// Fetches the page after the current cursor and appends it, returning
    /// the appended records. A no-op returning an empty slice when the feed
    /// is exhausted, not yet loaded, or already loading.
    ///
    /// On failure the feed stays `Ready` with photos and cursor untouched,
    /// and the caller may retry.
    pub fn load_next_page(&mut self, owner_id: &str) -> Result<&[PhotoRecord]> {
        if self.state != FeedState::Ready {
            return Ok(&[]);
        }
        self.state = FeedState::LoadingMore;

        let query = PhotoQuery::owned_by(owner_id)
            .limit(self.page_size)
            .after(self.cursor.clone());
        match self.store.query(&query) {
            Ok(page) => {
                if let Some(last) = page.last() {
                    self.cursor = Some(PageCursor::of(last));
                }
                self.state = self.settled_state(page.len());
                let appended_from = self.photos.len();
                self.photos.extend(page);
                Ok(&self.photos[appended_from..])
            }
            Err(err) => {
                self.state = FeedState::Ready;
                Err(err)
            }
        }
    }

    fn is_loading(&self) -> bool {
        matches!(self.state, FeedState::LoadingFirst | FeedState::LoadingMore)
    }

    /// A short page means the store has nothing further to give.
    fn settled_state(&self, page_len: usize) -> FeedState {
        if page_len < self.page_size {
            FeedState::Exhausted
        } else {
            FeedState::Ready
        }
    }
}
