use std::fs;

use jobwatch_engine::{ensure_output_dir, StagedFile};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn staged_file_replaces_existing_on_commit() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("clip.mp4"), "old").unwrap();

    let mut staged = StagedFile::create(temp.path(), "clip.mp4").unwrap();
    staged.write_chunk(b"hello ").unwrap();
    staged.write_chunk(b"world").unwrap();
    assert_eq!(staged.written(), 11);

    let path = staged.commit().unwrap();
    assert_eq!(path, temp.path().join("clip.mp4"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
}

#[test]
fn dropped_staged_file_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    {
        let mut staged = StagedFile::create(temp.path(), "clip.mp4").unwrap();
        staged.write_chunk(b"partial").unwrap();
    }
    assert!(!temp.path().join("clip.mp4").exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
