use super::*;

#[test]
fn paths_are_numbered_per_page() {
    let root = tempfile::tempdir().unwrap();
    let ws = TempWorkspace::create(root.path(), false).unwrap();
    assert_eq!(ws.image_path(3).file_name().unwrap(), "page_03.png");
    assert_eq!(ws.audio_path(12).file_name().unwrap(), "page_12.wav");
    assert!(ws.mix_path().starts_with(ws.path()));
}

#[test]
fn directory_is_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();
    let ws = TempWorkspace::create(root.path(), false).unwrap();
    let dir = ws.path().to_path_buf();
    std::fs::write(ws.image_path(1), b"x").unwrap();
    assert!(dir.is_dir());
    drop(ws);
    assert!(!dir.exists());
}

#[test]
fn keep_leaves_files_behind() {
    let root = tempfile::tempdir().unwrap();
    let ws = TempWorkspace::create(root.path(), true).unwrap();
    assert!(ws.is_kept());
    let dir = ws.path().to_path_buf();
    drop(ws);
    assert!(dir.is_dir());
}

#[test]
fn directories_are_unique_and_prefixed() {
    let root = tempfile::tempdir().unwrap();
    let a = TempWorkspace::create(root.path(), false).unwrap();
    let b = TempWorkspace::create(root.path(), false).unwrap();
    assert_ne!(a.path(), b.path());
    let name = a.path().file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("run_"), "{name}");
    assert!(!a.is_kept());
}

#[test]
fn missing_root_is_created() {
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("temp").join("nested");
    let ws = TempWorkspace::create(&nested, false).unwrap();
    assert!(ws.path().starts_with(&nested));
    assert!(ws.path().is_dir());
}
