use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use voicescribe::application::ports::{
    ContainerSetup, RetentionPolicy, StagingStore, StagingStoreError,
};
use voicescribe::application::services::TempAudioStore;
use voicescribe::domain::ObjectKey;
use voicescribe::infrastructure::storage::LocalStagingStore;

const BUCKET: &str = "local-voicescribe-temp";

fn create_test_store() -> (tempfile::TempDir, LocalStagingStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf(), BUCKET).unwrap();
    (dir, store)
}

fn audio_key(name: &str) -> ObjectKey {
    ObjectKey::for_audio(name, chrono::Utc::now())
}

#[tokio::test]
async fn given_audio_when_put_then_file_lands_under_bucket_directory() {
    let (dir, store) = create_test_store();
    let key = audio_key("clip.wav");

    let size = store
        .put(&key, Bytes::from_static(b"RIFF data"), "audio/wav")
        .await
        .unwrap();

    assert_eq!(size, 9);
    let on_disk = std::fs::read(dir.path().join(BUCKET).join(key.as_str())).unwrap();
    assert_eq!(on_disk, b"RIFF data");
}

#[tokio::test]
async fn given_key_when_building_uri_then_file_scheme_points_into_bucket() {
    let (_dir, store) = create_test_store();
    let key = audio_key("clip.wav");

    let uri = store.uri_for(&key);

    assert!(uri.starts_with("file://"));
    assert!(uri.ends_with(&format!("{}/{}", BUCKET, key)));
    assert_eq!(store.bucket(), BUCKET);
}

#[tokio::test]
async fn given_stored_object_when_deleted_twice_then_second_delete_is_not_found() {
    let (_dir, store) = create_test_store();
    let key = audio_key("clip.wav");
    store
        .put(&key, Bytes::from_static(b"data"), "audio/wav")
        .await
        .unwrap();

    store.delete(&key).await.unwrap();
    let second = store.delete(&key).await;

    assert!(matches!(second, Err(StagingStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_fresh_store_when_ensured_twice_then_created_then_existing() {
    let (_dir, store) = create_test_store();
    let retention = RetentionPolicy::default();

    let first = store.ensure_container(&retention).await.unwrap();
    let second = store.ensure_container(&retention).await.unwrap();

    assert_eq!(first, ContainerSetup::Created);
    assert_eq!(second, ContainerSetup::Existing);
}

#[tokio::test]
async fn given_zero_day_retention_when_swept_then_existing_objects_are_removed() {
    let (dir, store) = create_test_store();
    store
        .ensure_container(&RetentionPolicy { max_age_days: 0 })
        .await
        .unwrap();
    let key = audio_key("old.wav");
    store
        .put(&key, Bytes::from_static(b"old"), "audio/wav")
        .await
        .unwrap();

    let removed = store.sweep_expired().await.unwrap();

    assert_eq!(removed, 1);
    assert!(!dir.path().join(BUCKET).join(key.as_str()).exists());
}

#[tokio::test]
async fn given_unensured_store_when_swept_then_nothing_is_removed() {
    let (_dir, store) = create_test_store();
    store
        .put(&audio_key("a.wav"), Bytes::from_static(b"a"), "audio/wav")
        .await
        .unwrap();

    assert_eq!(store.sweep_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn given_default_retention_when_swept_then_recent_objects_survive() {
    let (_dir, store) = create_test_store();
    store
        .ensure_container(&RetentionPolicy::default())
        .await
        .unwrap();
    let key = audio_key("new.wav");
    store
        .put(&key, Bytes::from_static(b"new"), "audio/wav")
        .await
        .unwrap();

    assert_eq!(store.sweep_expired().await.unwrap(), 0);
    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn given_local_store_when_requesting_signed_url_then_unsupported() {
    let (_dir, store) = create_test_store();

    let result = store
        .signed_upload_url(
            &ObjectKey::for_upload("a.wav", chrono::Utc::now()),
            "audio/wav",
            Duration::from_secs(60),
        )
        .await;

    assert!(matches!(result, Err(StagingStoreError::Unsupported(_))));
}

#[tokio::test]
async fn given_name_with_reserved_characters_when_staged_then_uri_points_at_written_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf(), BUCKET).unwrap();
    let temp = TempAudioStore::new(Arc::new(store), RetentionPolicy::default());

    let staged = temp
        .stage(Bytes::from_static(b"RIFF"), "take[1]#final.wav", "audio/wav")
        .await
        .unwrap();

    assert!(staged.key.as_str().ends_with("_take_1__final.wav"));
    let path = staged.uri.strip_prefix("file://").unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"RIFF");
}
