use std::fs;

use postport_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("vault").join("posts");
    assert!(!nested.exists());
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_output_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }));
    assert!(matches!(
        AtomicFileWriter::open(&file_path),
        Err(PersistError::OutputDir { .. })
    ));
}

#[test]
fn atomic_write_replaces_existing_document() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::open(temp.path()).unwrap();

    let first = writer.write("hello-world.md", "---\ntitle: \"A\"\n---\n\nold").unwrap();
    assert_eq!(first.file_name().unwrap(), "hello-world.md");

    let second = writer.write("hello-world.md", "---\ntitle: \"A\"\n---\n\nnew").unwrap();
    assert_eq!(first, second);
    assert!(fs::read_to_string(&second).unwrap().ends_with("new"));
}

#[test]
fn open_creates_the_directory_once_for_many_writes() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("images").join("hello");
    let writer = AtomicFileWriter::open(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(writer.dir(), dir.as_path());

    for n in 1..=3 {
        let path = writer
            .write_bytes(&format!("image-{n}.png"), &[0x89, b'P', b'N', b'G'])
            .unwrap();
        assert_eq!(fs::read(path).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }
    // Only the three images; no staging files left behind.
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 3);
}

#[test]
fn write_fails_cleanly_when_the_directory_disappears() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("posts");
    let writer = AtomicFileWriter::open(&dir).unwrap();
    fs::remove_dir(&dir).unwrap();

    assert!(matches!(writer.write("doc.md", "data"), Err(PersistError::Io(_))));
    assert!(!dir.join("doc.md").exists());
}
