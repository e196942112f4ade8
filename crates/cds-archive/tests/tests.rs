use std::io::{Cursor, Write};

use cds_archive::{Error, ExtractOptions, extract_from_reader, extract_to_workspace, unzip};
use zip::write::SimpleFileOptions;

fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        match content {
            Some(text) => {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(text.as_bytes()).unwrap();
            }
            None => writer.add_directory(*name, SimpleFileOptions::default()).unwrap(),
        }
    }
    writer.finish().unwrap().into_inner()
}

fn replace_all(haystack: &mut [u8], from: &[u8], to: &[u8]) {
    assert_eq!(from.len(), to.len());
    let mut i = 0;
    while i + from.len() <= haystack.len() {
        if &haystack[i..i + from.len()] == from {
            haystack[i..i + from.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
}

#[test]
fn extract_zip_preserves_hierarchy() {
    let data = build_zip(&[
        ("index.html", Some("hi")),
        ("a/", None),
        ("a/b.txt", Some("nested")),
        ("deep/er/c.txt", Some("implicit parents")),
    ]);
    let temp_dir = tempfile::Builder::new()
        .prefix("cds-test-zip-")
        .tempdir()
        .expect("Failed to create temp dir");
    let target = temp_dir.path().join("out");

    let report = extract_from_reader(Cursor::new(data), &target, &ExtractOptions::default())
        .expect("Extraction of zip failed");

    assert_eq!(report.entry_count, 4);
    assert_eq!(report.files().count(), 3);
    assert_eq!(report.total_bytes, 2 + 6 + 16);
    assert_eq!(std::fs::read_to_string(target.join("index.html")).unwrap(), "hi");
    assert_eq!(std::fs::read_to_string(target.join("a/b.txt")).unwrap(), "nested");
    assert_eq!(
        std::fs::read_to_string(target.join("deep/er/c.txt")).unwrap(),
        "implicit parents"
    );
}

#[test]
fn unzip_creates_missing_target_parents() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("pkg.zip");
    std::fs::write(&source, build_zip(&[("content.json", Some("{}"))])).unwrap();

    let target = temp_dir.path().join("x/y/pkg");
    unzip(&source, &target, &ExtractOptions::default()).unwrap();

    assert_eq!(std::fs::read_to_string(target.join("content.json")).unwrap(), "{}");
}

#[test]
fn unzip_empty_archive_creates_target() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("empty.zip");
    std::fs::write(&source, build_zip(&[])).unwrap();

    let target = temp_dir.path().join("empty");
    let report = unzip(&source, &target, &ExtractOptions::default()).unwrap();

    assert_eq!(report.entry_count, 0);
    assert!(target.is_dir());
}

#[test]
fn corrupted_archive_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("broken.zip");
    std::fs::write(&source, b"this is not a zip file").unwrap();

    let result = unzip(&source, temp_dir.path().join("broken"), &ExtractOptions::default());
    assert!(matches!(result, Err(Error::Corrupted(_))));
}

#[test]
fn truncated_archive_is_rejected() {
    let mut data = build_zip(&[("a.txt", Some("aaaaaaaaaaaaaaaa"))]);
    data.truncate(data.len() / 2);
    let temp_dir = tempfile::tempdir().unwrap();

    let result = extract_from_reader(Cursor::new(data), temp_dir.path(), &ExtractOptions::default());
    assert!(result.is_err());
}

#[test]
fn traversal_entry_is_rejected() {
    let mut data = build_zip(&[("xx/evil.txt", Some("pwned"))]);
    replace_all(&mut data, b"xx/evil.txt", b"../evil.txt");

    let temp_dir = tempfile::tempdir().unwrap();
    let target = temp_dir.path().join("pkg");
    let result = extract_from_reader(Cursor::new(data), &target, &ExtractOptions::default());

    assert!(matches!(result, Err(Error::ZipSlip { .. })));
    assert!(!temp_dir.path().join("evil.txt").exists());
}

#[test]
fn size_limit_is_enforced() {
    let data = build_zip(&[("a.txt", Some("0123456789")), ("b.txt", Some("0123456789"))]);
    let temp_dir = tempfile::tempdir().unwrap();

    let limited = ExtractOptions::default().max_total_bytes(15);
    let result = extract_from_reader(Cursor::new(data.clone()), &temp_dir.path().join("limited"), &limited);
    assert!(matches!(result, Err(Error::TooLarge { limit: 15 })));

    let enough = ExtractOptions::default().max_total_bytes(20);
    let report = extract_from_reader(Cursor::new(data.clone()), &temp_dir.path().join("enough"), &enough).unwrap();
    assert_eq!(report.total_bytes, 20);

    let unbounded = ExtractOptions::default().max_total_bytes(u64::MAX);
    let target = temp_dir.path().join("unbounded");
    let report = extract_from_reader(Cursor::new(data), &target, &unbounded).unwrap();
    assert_eq!(report.total_bytes, 20);
    assert_eq!(std::fs::read_to_string(target.join("a.txt")).unwrap(), "0123456789");
}

#[test]
fn workspace_extraction_swaps_on_commit() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("pkg.zip");
    std::fs::write(&source, build_zip(&[("new.txt", Some("new"))])).unwrap();
    let dest = temp_dir.path().join("pkg");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("old.txt"), "old").unwrap();

    let extraction = extract_to_workspace(&source, &dest, &ExtractOptions::default()).unwrap();
    assert_eq!(extraction.report().entry_count, 1);
    // destination untouched until commit
    assert!(dest.join("old.txt").exists());

    let report = extraction.commit().unwrap();
    assert_eq!(report.entry_count, 1);
    assert!(dest.join("new.txt").exists());
    assert!(!dest.join("old.txt").exists());
}
