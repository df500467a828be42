use rmcs::builtin::{LoopbackEngine, PlaybackEngine};
use rmcs::{CameraCatalog, CameraId, Engine, EngineFactory, EngineKind, Error};
use std::fs;
use std::path::Path;
use tokio::test;

/// Build a catalog whose cameras point at temporary clip directories
fn clip_catalog(root: &Path, cameras: &[(i32, usize)]) -> CameraCatalog {
    let mut catalog = CameraCatalog::new(CameraId::new(cameras[0].0));
    for &(camera, clip_count) in cameras {
        let dir = root.join(format!("camera-{camera}"));
        fs::create_dir_all(&dir).unwrap();
        for n in 0..clip_count {
            fs::write(dir.join(format!("sample-{n}.h264")), b"\x00\x00\x00\x01\x65").unwrap();
        }
        catalog = catalog.with_source(CameraId::new(camera), dir);
    }
    catalog
}

/// Test the factory honours the requested engine
#[test]
async fn test_factory_creates_requested_engine() {
    let engine = EngineFactory::create(EngineKind::Loopback, CameraCatalog::default());
    assert_eq!(engine.name(), "loopback");
}

/// Test the loopback engine lifecycle
#[test]
async fn test_loopback_lifecycle() {
    let mut engine = LoopbackEngine::default();

    // Switching before start is rejected
    assert!(matches!(
        engine.switch_camera(CameraId::new(2)).await,
        Err(Error::NotRunning)
    ));

    engine.start().await.unwrap();
    assert_eq!(engine.active_camera(), Some(CameraId::new(1)));

    engine.switch_camera(CameraId::new(4)).await.unwrap();
    assert_eq!(engine.active_camera(), Some(CameraId::new(4)));

    assert!(matches!(
        engine.switch_camera(CameraId::new(42)).await,
        Err(Error::UnknownCamera(_))
    ));
    assert_eq!(engine.active_camera(), Some(CameraId::new(4)));

    engine.stop().await.unwrap();
    assert_eq!(engine.active_camera(), None);
}

/// Test the playback engine loads the default camera on start
#[test]
async fn test_playback_start_loads_default_camera() {
    let root = tempfile::tempdir().unwrap();
    let mut engine = PlaybackEngine::new(clip_catalog(root.path(), &[(1, 3), (2, 2)]));

    engine.start().await.unwrap();
    assert_eq!(engine.active_camera(), Some(CameraId::new(1)));
    assert_eq!(engine.clips().len(), 3);
}

/// Test the playback engine starts even when the default source is missing
#[test]
async fn test_playback_start_without_clips() {
    let root = tempfile::tempdir().unwrap();
    let catalog = CameraCatalog::new(CameraId::new(1))
        .with_source(CameraId::new(1), root.path().join("missing"));
    let mut engine = PlaybackEngine::new(catalog);

    engine.start().await.unwrap();
    assert_eq!(engine.active_camera(), None);
    assert!(engine.clips().is_empty());
}

/// Test switching cameras on the playback engine
#[test]
async fn test_playback_switch_camera() {
    let root = tempfile::tempdir().unwrap();
    let mut catalog = clip_catalog(root.path(), &[(1, 1), (2, 4)]);
    catalog = catalog.with_source(CameraId::new(3), root.path().join("empty"));
    fs::create_dir_all(root.path().join("empty")).unwrap();
    let mut engine = PlaybackEngine::new(catalog);
    engine.start().await.unwrap();

    engine.switch_camera(CameraId::new(2)).await.unwrap();
    assert_eq!(engine.active_camera(), Some(CameraId::new(2)));
    assert_eq!(engine.clips().len(), 4);

    // Failed switches keep the previous camera
    assert!(matches!(
        engine.switch_camera(CameraId::new(3)).await,
        Err(Error::NoClips(_))
    ));
    assert!(matches!(
        engine.switch_camera(CameraId::new(9)).await,
        Err(Error::UnknownCamera(_))
    ));
    assert_eq!(engine.active_camera(), Some(CameraId::new(2)));

    engine.stop().await.unwrap();
    assert!(matches!(
        engine.switch_camera(CameraId::new(1)).await,
        Err(Error::NotRunning)
    ));
}
