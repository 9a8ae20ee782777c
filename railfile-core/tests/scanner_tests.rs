// tests/scanner_tests.rs
// Scanner reconciliation against a real directory tree.

use std::fs;
use std::path::Path;

use railfile_core::config::CatalogueConfig;
use railfile_core::services::catalogue::Catalogue;
use railfile_core::services::scanner::{hash_file, DuplicateFile, MovedFile, Scanner};

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn config_for(media: &Path) -> CatalogueConfig {
    CatalogueConfig {
        media_path: media.to_path_buf(),
        ..CatalogueConfig::default()
    }
}

#[test]
fn new_files_are_catalogued_with_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    fs::create_dir_all(media.join("2024")).unwrap();
    image::RgbImage::new(3, 2).save(media.join("2024/tiny.png")).unwrap();
    write(&media, "clips/arrival.mp4", b"not really a video");
    write(&media, "notes.txt", b"ignored");

    let cfg = config_for(&media);
    let mut cat = Catalogue::open_in_memory().unwrap();
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(report.new, vec!["2024/tiny.png", "clips/arrival.mp4"]);

    let all = cat.all_media().unwrap();
    assert_eq!(all.len(), 2);
    let png = all.iter().find(|m| m.path == "2024/tiny.png").unwrap();
    assert_eq!((png.width, png.height), (Some(3), Some(2)));
    assert!(!png.is_video);
    let clip = all.iter().find(|m| m.path == "clips/arrival.mp4").unwrap();
    assert!(clip.is_video);
    assert_eq!(clip.width, None);
    assert_eq!(clip.size, 18);

    // nothing changes on a second pass
    let again = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert!(again.is_empty());
}

#[test]
fn duplicates_within_one_scan_are_reported_not_inserted() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().to_path_buf();
    write(&media, "a.jpg", b"same bytes");
    write(&media, "b.jpg", b"same bytes");

    let cfg = config_for(&media);
    let mut cat = Catalogue::open_in_memory().unwrap();
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(report.new, vec!["a.jpg"]);
    assert_eq!(
        report.duplicates,
        vec![DuplicateFile {
            original: "a.jpg".into(),
            duplicate: "b.jpg".into()
        }]
    );
    assert_eq!(cat.all_media().unwrap().len(), 1);
}

#[test]
fn copy_of_a_catalogued_file_is_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().to_path_buf();
    write(&media, "a.jpg", b"original");
    let cfg = config_for(&media);
    let mut cat = Catalogue::open_in_memory().unwrap();
    Scanner::new(&cfg).scan(&mut cat).unwrap();

    write(&media, "copy/a.jpg", b"original");
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert!(report.moved.is_empty());
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(cat.all_media().unwrap()[0].path, "a.jpg");
}

#[test]
fn moved_files_keep_their_row_and_missing_files_are_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().to_path_buf();
    write(&media, "old/a.jpg", b"train at platform");
    write(&media, "b.jpg", b"gone soon");

    let cfg = config_for(&media);
    let mut cat = Catalogue::open_in_memory().unwrap();
    Scanner::new(&cfg).scan(&mut cat).unwrap();
    let before = cat.all_media().unwrap();

    fs::create_dir_all(media.join("new")).unwrap();
    fs::rename(media.join("old/a.jpg"), media.join("new/a.jpg")).unwrap();
    fs::remove_file(media.join("b.jpg")).unwrap();

    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(
        report.moved,
        vec![MovedFile {
            from: "old/a.jpg".into(),
            to: "new/a.jpg".into()
        }]
    );
    assert_eq!(report.missing, vec!["b.jpg"]);
    assert!(report.new.is_empty());

    let moved_id = before.iter().find(|m| m.path == "old/a.jpg").unwrap().id;
    let after = cat.all_media().unwrap();
    let moved = after.iter().find(|m| m.id == moved_id).unwrap();
    assert_eq!(moved.path, "new/a.jpg");
    assert!(moved.present);
    let gone = after.iter().find(|m| m.path == "b.jpg").unwrap();
    assert!(!gone.present);

    // putting the file back restores it
    write(&media, "b.jpg", b"gone soon");
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(report.restored, vec!["b.jpg"]);
    assert!(cat.all_media().unwrap().iter().all(|m| m.present));
}

#[test]
fn excluded_paths_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().to_path_buf();
    write(&media, "thumbs/a.jpg", b"a");
    write(&media, "keep/b.jpg", b"b");
    write(&media, "keep/skip.jpg", b"c");

    let cfg = CatalogueConfig {
        excluded_folders: vec!["thumbs/".into()],
        excluded_files: vec!["keep/skip.jpg".into()],
        ..config_for(&media)
    };
    let mut cat = Catalogue::open_in_memory().unwrap();
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(report.new, vec!["keep/b.jpg"]);
}

#[test]
fn hash_is_content_addressed() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "x", b"abc");
    write(dir.path(), "y", b"abc");
    write(dir.path(), "z", b"abd");
    let x = hash_file(&dir.path().join("x")).unwrap();
    assert_eq!(x, hash_file(&dir.path().join("y")).unwrap());
    assert_ne!(x, hash_file(&dir.path().join("z")).unwrap());
    assert_eq!(x, blake3::hash(b"abc").to_hex().to_string());
}

#[cfg(unix)]
#[test]
fn symlink_loop_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    write(&media, "2024/a.jpg", b"platform 1");
    std::os::unix::fs::symlink(&media, media.join("2024/loop")).unwrap();

    let cfg = config_for(&media);
    let mut cat = Catalogue::open_in_memory().unwrap();
    let report = Scanner::new(&cfg).scan(&mut cat).unwrap();
    assert_eq!(report.new, vec!["2024/a.jpg"]);
}

#[test]
fn missing_media_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir.path().join("nowhere"));
    let mut cat = Catalogue::open_in_memory().unwrap();
    assert!(Scanner::new(&cfg).scan(&mut cat).is_err());
}
