use crate::blob::{BlobMetadata, BlobStore, ImagePayload};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::geoloc::Geolocator;
use crate::identity::IdentityProvider;
use crate::models::{NewPhotoRecord, PhotoRecord};
use crate::store::PhotoRecordStore;
use crate::AppState;

/// What the user attached to a photo being published.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<GeoPoint>,
}

/// Result of a publish: the stored record plus any non-fatal warning the
/// view should surface next to it.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub photo: PhotoRecord,
    pub warning: Option<String>,
}

/// Publishes a photo: blob first, metadata record second. There is no retry
/// and no rollback on partial failure.
// TODO: delete the stored blob when the record insert fails; today it is
// left behind.
pub fn upload_photo(
    state: &AppState,
    payload: &ImagePayload,
    request: &UploadRequest,
) -> Result<PhotoRecord> {
    let user = state.identity.current_user().ok_or(Error::NotAuthenticated)?;

    let key = photo_key(&user.uid, &payload.file_name);
    let metadata = BlobMetadata {
        owner_id: user.uid.clone(),
    };
    state.blobs.put(&key, &payload.bytes, Some(&metadata))?;
    let image_url = state.blobs.get_url(&key)?;

    let record = NewPhotoRecord {
        owner_id: user.uid,
        image_url,
        caption: request.caption.clone(),
        description: request.description.clone(),
        tags: request.tags.clone(),
        latitude: request.location.map(|point| point.latitude),
        longitude: request.location.map(|point| point.longitude),
    };
    let photo = state.records.insert(record)?;
    log::info!("Uploaded photo {} as {}", photo.id, key);
    Ok(photo)
}

/// Publishes a photo with the device's current position attached. A
/// geolocation failure downgrades to an untagged upload with a warning,
/// never an error.
pub fn upload_photo_with_location(
    state: &AppState,
    geolocator: &dyn Geolocator,
    payload: &ImagePayload,
    request: &UploadRequest,
) -> Result<UploadOutcome> {
    let mut request = request.clone();
    let warning = match geolocator.current_position() {
        Ok(position) => {
            request.location = Some(position);
            None
        }
        Err(err) => {
            log::warn!("Location lookup failed, uploading without coordinates: {err}");
            request.location = None;
            Some(format!("Could not fetch location: {err}"))
        }
    };

    let photo = upload_photo(state, payload, &request)?;
    Ok(UploadOutcome { photo, warning })
}

/// Key for a photo blob: namespaced by owner, made unique by a millisecond
/// token so re-uploads of one file name never collide.
fn photo_key(uid: &str, file_name: &str) -> String {
    format!(
        "photos/{}/{}_{}",
        uid,
        chrono::Utc::now().timestamp_millis(),
        file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::config::{AppConfig, AppPaths};
    use crate::geoloc::StaticGeolocator;
    use image::{GrayImage, ImageOutputFormat};
    use std::io::Cursor;
    use uuid::Uuid;

    fn local_state() -> AppState {
        let root = std::env::temp_dir().join(format!("snapmap_upload_{}", Uuid::new_v4()));
        let paths = AppPaths::at(&root).unwrap();
        AppState::local(&paths, AppConfig::default()).unwrap()
    }

    fn payload() -> ImagePayload {
        let mut img = GrayImage::new(2, 2);
        img.enumerate_pixels_mut()
            .for_each(|(x, y, pixel)| *pixel = image::Luma([(x + 2 * y) as u8]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        ImagePayload::from_bytes(bytes, "captured_photo.png").unwrap()
    }

    struct DeniedGeolocator;

    impl Geolocator for DeniedGeolocator {
        fn current_position(&self) -> Result<GeoPoint> {
            Err(Error::PermissionDenied(
                "geolocation permission refused".to_string(),
            ))
        }
    }

    #[test]
    fn upload_requires_a_signed_in_user() {
        let state = local_state();
        let err = upload_photo(&state, &payload(), &UploadRequest::default()).unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
        assert!(state.records.query(&crate::store::PhotoQuery::all()).unwrap().is_empty());
    }

    #[test]
    fn upload_stores_blob_and_record() {
        let state = local_state();
        let identity = auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let request = UploadRequest {
            caption: Some("golden gate".to_string()),
            tags: vec!["bridge".to_string()],
            location: Some(GeoPoint::new(37.81, -122.48)),
            ..Default::default()
        };
        let photo = upload_photo(&state, &payload(), &request).unwrap();

        assert_eq!(photo.owner_id, identity.uid);
        assert!(photo.image_url.starts_with("file://"));
        assert!(photo.image_url.contains(&format!("photos/{}", identity.uid)));
        assert_eq!(photo.caption.as_deref(), Some("golden gate"));
        assert_eq!(photo.location().unwrap(), GeoPoint::new(37.81, -122.48));

        let fetched = state.records.get_by_id(&photo.id).unwrap().unwrap();
        assert_eq!(fetched.image_url, photo.image_url);
    }

    #[test]
    fn geolocation_failure_uploads_untagged_with_warning() {
        let state = local_state();
        auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let outcome = upload_photo_with_location(
            &state,
            &DeniedGeolocator,
            &payload(),
            &UploadRequest::default(),
        )
        .unwrap();

        assert!(outcome.warning.is_some());
        assert!(outcome.photo.latitude.is_none());
        assert!(outcome.photo.longitude.is_none());
        assert!(outcome.photo.location().is_none());
    }

    #[test]
    fn geolocation_success_tags_the_record() {
        let state = local_state();
        auth::sign_up(&state, "a@example.com", "secret1").unwrap();

        let geolocator = StaticGeolocator::new(GeoPoint::new(37.77, -122.42));
        let outcome = upload_photo_with_location(
            &state,
            &geolocator,
            &payload(),
            &UploadRequest::default(),
        )
        .unwrap();

        assert!(outcome.warning.is_none());
        assert_eq!(
            outcome.photo.location().unwrap(),
            GeoPoint::new(37.77, -122.42)
        );
    }
}
