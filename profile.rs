use crate::blob::{BlobMetadata, BlobStore, ImagePayload};
use crate::error::{Error, Result};
use crate::geo::ProximityFilter;
use crate::geoloc::Geolocator;
use crate::identity::IdentityProvider;
use crate::models::{PhotoRecord, ProfileChanges, UserProfile};
use crate::store::{PhotoQuery, PhotoRecordStore, ProfileStore};
use crate::AppState;

/// The signed-in user's profile.
pub fn fetch_profile(state: &AppState) -> Result<UserProfile> {
    let user = state.identity.current_user().ok_or(Error::NotAuthenticated)?;
    state
        .profiles
        .get_profile(&user.uid)?
        .ok_or_else(|| Error::NotFound(format!("No profile for user {}", user.uid)))
}

/// Applies the user's edits to their own profile and returns the result.
pub fn save_profile(state: &AppState, changes: &ProfileChanges) -> Result<UserProfile> {
    let user = state.identity.current_user().ok_or(Error::NotAuthenticated)?;
    state.profiles.update_profile(&user.uid, changes)?;
    fetch_profile(state)
}

/// Stores a new avatar and points the profile at it, returning the URL.
pub fn upload_profile_picture(state: &AppState, payload: &ImagePayload) -> Result<String> {
    let user = state.identity.current_user().ok_or(Error::NotAuthenticated)?;

    let key = format!(
        "profilePictures/{}_{}_{}",
        user.uid,
        chrono::Utc::now().timestamp_millis(),
        payload.file_name
    );
    let metadata = BlobMetadata {
        owner_id: user.uid.clone(),
    };
    state.blobs.put(&key, &payload.bytes, Some(&metadata))?;
    let url = state.blobs.get_url(&key)?;

    state.profiles.update_profile(
        &user.uid,
        &ProfileChanges {
            profile_picture_url: Some(url.clone()),
            ..Default::default()
        },
    )?;
    Ok(url)
}

/// Photos taken near the device's current position, at the configured
/// radius. Geolocation failures propagate; the view reports them inline.
///
/// Fetches the whole collection and filters on the client, which is the
/// behavior `filter` exists to eventually replace with a store-side query.
pub fn nearby_photos(
    state: &AppState,
    geolocator: &dyn Geolocator,
    filter: &dyn ProximityFilter,
) -> Result<Vec<PhotoRecord>> {
    let center = geolocator.current_position()?;
    let all = state.records.query(&PhotoQuery::all())?;
    let nearby = filter.photos_within(center, state.config.proximity_radius_km, &all);
    log::debug!(
        "{} of {} photos within {} km",
        nearby.len(),
        all.len(),
        state.config.proximity_radius_km
    );
    Ok(nearby)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::config::{AppConfig, AppPaths};
    use crate::geo::{FullScanFilter, GeoPoint};
    use crate::geoloc::StaticGeolocator;
    use crate::models::NewPhotoRecord;
    use image::{GrayImage, ImageOutputFormat};
    use std::io::Cursor;
    use uuid::Uuid;

    fn local_state() -> AppState {
        let root = std::env::temp_dir().join(format!("snapmap_profile_{}", Uuid::new_v4()));
        let paths = AppPaths::at(&root).unwrap();
        AppState::local(&paths, AppConfig::default()).unwrap()
    }

    fn payload() -> ImagePayload {
        let img = GrayImage::new(2, 2);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        ImagePayload::from_bytes(bytes, "avatar.png").unwrap()
    }

    fn insert_photo_at(state: &AppState, url: &str, lat: Option<f64>, lng: Option<f64>) {
        state
            .records
            .insert(NewPhotoRecord {
                owner_id: "someone".to_string(),
                image_url: url.to_string(),
                latitude: lat,
                longitude: lng,
                ..Default::default()
            })
            .unwrap();
    }

    #[test]
    fn profile_requires_a_signed_in_user() {
        let state = local_state();
        assert!(matches!(fetch_profile(&state), Err(Error::NotAuthenticated)));
    }

    #[test]
    fn save_profile_updates_display_fields() {
        let state = local_state();
        auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let updated = save_profile(
            &state,
            &ProfileChanges {
                username: Some("ansel".to_string()),
                bio: Some("landscapes mostly".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.username, "ansel");
        assert_eq!(updated.bio, "landscapes mostly");
    }

    #[test]
    fn profile_picture_upload_points_the_profile_at_the_blob() {
        let state = local_state();
        auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let url = upload_profile_picture(&state, &payload()).unwrap();
        assert!(url.starts_with("file://"));

        let profile = fetch_profile(&state).unwrap();
        assert_eq!(profile.profile_picture_url, url);
    }

    #[test]
    fn nearby_photos_filters_at_the_configured_radius() {
        let state = local_state();
        insert_photo_at(&state, "near.jpg", Some(37.78), Some(-122.43));
        insert_photo_at(&state, "far.jpg", Some(38.00), Some(-122.42));
        insert_photo_at(&state, "untagged.jpg", None, None);

        let geolocator = StaticGeolocator::new(GeoPoint::new(37.77, -122.42));
        let nearby = nearby_photos(&state, &geolocator, &FullScanFilter).unwrap();

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].image_url, "near.jpg");
    }

    #[test]
    fn nearby_photos_propagates_geolocation_failure() {
        struct Unavailable;

        impl Geolocator for Unavailable {
            fn current_position(&self) -> Result<GeoPoint> {
                Err(Error::RemoteUnavailable("no position source".to_string()))
            }
        }

        let state = local_state();
        let err = nearby_photos(&state, &Unavailable, &FullScanFilter).unwrap_err();
        assert!(err.is_retryable());
    }
}
