use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use trailcam::{
    CameraId, CameraTier, FileOutbox, FileProfileStore, NewMessage, OutboxError, OutboxStore,
    ProfileError, ProfileStore,
};

fn message(camera: &str) -> NewMessage {
    NewMessage {
        camera_id: CameraId::from(camera),
        destination: "+491701234567".to_string(),
        body: "$03*1#1$".to_string(),
        max_attempts: 3,
    }
}

#[tokio::test]
async fn outbox_ids_keep_counting_after_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("outbox.json");

    let outbox = FileOutbox::open(&path).await?;
    let first = outbox.enqueue(message("cam-1")).await?;
    let second = outbox.enqueue(message("cam-2")).await?;
    assert!(outbox.remove(second).await?);
    outbox.update_attempts(first, 2).await?;
    drop(outbox);

    let reopened = FileOutbox::open(&path).await?;
    let pending = reopened.list_pending().await?;
    assert_eq!(1, pending.len());
    assert_eq!(first, pending[0].id());
    assert_eq!(2, pending[0].attempts());

    let third = reopened.enqueue(message("cam-3")).await?;
    assert!(third > second);
    Ok(())
}

#[tokio::test]
async fn corrupt_outbox_files_are_reported() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("outbox.json");
    std::fs::write(&path, "{ not json")?;

    let result = FileOutbox::open(&path).await;
    assert_matches!(result, Err(OutboxError::Corrupt { .. }));
    Ok(())
}

#[test]
fn profiles_and_settings_survive_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("state").join("profiles.json");

    let store = FileProfileStore::open(&path)?;
    let first = store.register("Hochsitz", "+491701234567", CameraTier::Pro)?;
    let removed = store.register("Kirrung", "+491707654321", CameraTier::Base)?;
    store.remove(removed.id())?;
    store.save_settings(
        first.id(),
        [("videoDuration".to_string(), "8".to_string())].into(),
    )?;
    drop(store);

    let reopened = FileProfileStore::open(&path)?;
    let cameras = reopened.cameras()?;
    assert_eq!(vec![first.clone()], cameras);
    assert_eq!(
        Some("8"),
        reopened
            .settings(first.id())?
            .get("videoDuration")
            .map(String::as_str)
    );

    let third = reopened.register("Suhle", "+491700000000", CameraTier::Max)?;
    assert_eq!("cam-3", third.id().as_str());
    Ok(())
}

#[test]
fn corrupt_profile_files_are_reported() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("profiles.json");
    std::fs::write(&path, "cameras: []")?;

    assert_matches!(
        FileProfileStore::open(&path),
        Err(ProfileError::Corrupt { .. })
    );
    Ok(())
}

#[tokio::test]
async fn failed_outbox_writes_leave_no_trace() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let blocked = dir.path().join("state");
    let outbox = FileOutbox::open(blocked.join("outbox.json")).await?;
    std::fs::write(&blocked, "not a directory")?;

    assert_matches!(
        outbox.enqueue(message("cam-1")).await,
        Err(OutboxError::Io { .. })
    );
    assert!(outbox.list_pending().await?.is_empty());

    std::fs::remove_file(&blocked)?;
    let id = outbox.enqueue(message("cam-1")).await?;
    assert_eq!("1", id.to_string());
    assert_eq!(1, outbox.list_pending().await?.len());
    Ok(())
}

#[tokio::test]
async fn failed_attempt_updates_keep_the_stored_count() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("outbox.json");
    let outbox = FileOutbox::open(&path).await?;
    let id = outbox.enqueue(message("cam-1")).await?;
    std::fs::create_dir(path.with_extension("json.tmp"))?;

    assert!(outbox.update_attempts(id, 2).await.is_err());
    assert!(outbox.remove(id).await.is_err());

    let pending = outbox.list_pending().await?;
    assert_eq!(1, pending.len());
    assert_eq!(0, pending[0].attempts());
    Ok(())
}

#[test]
fn failed_profile_writes_leave_no_trace() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let blocked = dir.path().join("state");
    let store = FileProfileStore::open(blocked.join("profiles.json"))?;
    std::fs::write(&blocked, "not a directory")?;

    assert_matches!(
        store.register("Hochsitz", "+491701234567", CameraTier::Pro),
        Err(ProfileError::Io { .. })
    );
    assert!(store.cameras()?.is_empty());

    std::fs::remove_file(&blocked)?;
    let camera = store.register("Hochsitz", "+491701234567", CameraTier::Pro)?;
    assert_eq!("cam-1", camera.id().as_str());
    Ok(())
}
