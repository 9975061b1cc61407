use crate::error::Result;
use crate::models::PhotoRecord;
use crate::store::{PhotoQuery, PhotoRecordStore};

/// Client-side filters for the global gallery: free-text search over
/// description and tags, plus an inclusive upload-date range in epoch
/// milliseconds.
#[derive(Debug, Clone, Default)]
pub struct GalleryFilters {
    pub search_term: Option<String>,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
}

/// Every photo in the store, newest first.
pub fn fetch_gallery(store: &dyn PhotoRecordStore) -> Result<Vec<PhotoRecord>> {
    store.query(&PhotoQuery::all())
}

/// The photos matching `filters`, in input order. An empty filter set keeps
/// everything.
pub fn apply_filters(photos: &[PhotoRecord], filters: &GalleryFilters) -> Vec<PhotoRecord> {
    photos
        .iter()
        .filter(|photo| matches_filters(photo, filters))
        .cloned()
        .collect()
}

fn matches_filters(photo: &PhotoRecord, filters: &GalleryFilters) -> bool {
    if let Some(term) = filters.search_term.as_deref() {
        let term = term.to_lowercase();
        let in_description = photo
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(&term);
        let in_tags = photo
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&term));
        if !in_description && !in_tags {
            return false;
        }
    }
    if let Some(from) = filters.date_from {
        if photo.created_at < from {
            return false;
        }
    }
    if let Some(to) = filters.date_to {
        if photo.created_at > to {
            return false;
        }
    }
    true
}

/// The records a map view can pin: fully geo-tagged photos, in input order.
pub fn geotagged(photos: &[PhotoRecord]) -> Vec<PhotoRecord> {
    photos
        .iter()
        .filter(|photo| photo.location().is_some())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, description: &str, tags: &[&str], created_at: i64) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            image_url: format!("{id}.jpg"),
            description: Some(description.to_string()),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_at,
            ..Default::default()
        }
    }

    fn sample() -> Vec<PhotoRecord> {
        vec![
            photo("1", "Golden Gate at sunset", &["bridge", "sunset"], 300),
            photo("2", "Beach day", &["ocean"], 200),
            photo("3", "", &["Sunset", "hike"], 100),
        ]
    }

    #[test]
    fn no_filters_keep_everything() {
        let photos = sample();
        let filtered = apply_filters(&photos, &GalleryFilters::default());
        assert_eq!(filtered.len(), photos.len());
    }

    #[test]
    fn search_matches_description_or_tags_case_insensitively() {
        let photos = sample();
        let filtered = apply_filters(
            &photos,
            &GalleryFilters {
                search_term: Some("SUNSET".to_string()),
                ..Default::default()
            },
        );
        let ids: Vec<&str> = filtered.iter().map(|photo| photo.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let photos = sample();
        let filtered = apply_filters(
            &photos,
            &GalleryFilters {
                date_from: Some(100),
                date_to: Some(200),
                ..Default::default()
            },
        );
        let ids: Vec<&str> = filtered.iter().map(|photo| photo.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn filters_compose() {
        let photos = sample();
        let filtered = apply_filters(
            &photos,
            &GalleryFilters {
                search_term: Some("sunset".to_string()),
                date_from: Some(250),
                date_to: None,
            },
        );
        let ids: Vec<&str> = filtered.iter().map(|photo| photo.id.as_str()).collect();
        assert_eq!(ids, ["1"]);
    }

    #[test]
    fn gallery_is_newest_first() {
        let dir = std::env::temp_dir().join(format!("snapmap_gallery_{}", uuid::Uuid::new_v4()));
        let store = crate::db::SqliteStore::open(&dir.join("library.db")).unwrap();
        for n in 0..3 {
            store
                .insert(crate::models::NewPhotoRecord {
                    owner_id: format!("u{n}"),
                    image_url: format!("p{n}.jpg"),
                    ..Default::default()
                })
                .unwrap();
        }

        let photos = fetch_gallery(&store).unwrap();
        let urls: Vec<&str> = photos.iter().map(|photo| photo.image_url.as_str()).collect();
        assert_eq!(urls, ["p2.jpg", "p1.jpg", "p0.jpg"]);
    }

    #[test]
    fn geotagged_drops_invalid_markers() {
        let mut tagged = photo("tagged", "", &[], 1);
        tagged.latitude = Some(37.77);
        tagged.longitude = Some(-122.42);
        let mut partial = photo("partial", "", &[], 2);
        partial.latitude = Some(37.77);
        let untagged = photo("untagged", "", &[], 3);

        let markers = geotagged(&[tagged, partial, untagged]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "tagged");
    }
}
