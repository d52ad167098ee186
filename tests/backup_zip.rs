#[path = "../src/backup.rs"]
mod backup;

mod common;

use common::temp_dir;
use std::fs::File;
use std::io::{Read, Write};

#[test]
fn zip_export_and_import_roundtrip() {
    let src = temp_dir("edugrade-backup-src");
    let dst = temp_dir("edugrade-backup-dst");

    let db_src = src.join("edugrade.sqlite3");
    let bytes = b"sqlite-test-payload";
    std::fs::write(&db_src, bytes).expect("write source db");

    let bundle_path = src.join("nested").join("edugrade-backup.zip");
    let export = backup::export_bundle(&db_src, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 2);
    assert_eq!(export.sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&export.sha256));
    archive
        .by_name("db/edugrade.sqlite3")
        .expect("database entry in bundle");

    let db_dst = dst.join("edugrade.sqlite3");
    std::fs::write(&db_dst, b"stale").expect("write stale db");
    let import = backup::import_bundle(&bundle_path, &db_dst).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);
    assert_eq!(std::fs::read(&db_dst).expect("read restored db"), bytes);

    let _ = std::fs::remove_dir_all(src);
    let _ = std::fs::remove_dir_all(dst);
}

#[test]
fn plain_sqlite_copy_is_accepted() {
    let dir = temp_dir("edugrade-backup-plain");
    let plain = dir.join("copy.sqlite3");
    std::fs::write(&plain, b"plain-sqlite-copy").expect("write plain copy");

    let db_dst = dir.join("restored").join("edugrade.sqlite3");
    let import = backup::import_bundle(&plain, &db_dst).expect("import plain sqlite");
    assert_eq!(import.bundle_format_detected, backup::PLAIN_SQLITE_FORMAT);
    assert_eq!(
        std::fs::read(&db_dst).expect("read restored"),
        b"plain-sqlite-copy"
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn tampered_bundle_fails_the_checksum() {
    let dir = temp_dir("edugrade-backup-tampered");
    let bundle_path = dir.join("tampered.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        let opts = zip::write::FileOptions::default();
        zip.start_file("manifest.json", opts).expect("manifest");
        zip.write_all(
            serde_json::json!({
                "format": backup::BUNDLE_FORMAT_V1,
                "dbSha256": "0000",
            })
            .to_string()
            .as_bytes(),
        )
        .expect("write manifest");
        zip.start_file("db/edugrade.sqlite3", opts).expect("db entry");
        zip.write_all(b"payload").expect("write db");
        zip.finish().expect("finish zip");
    }

    let db_dst = dir.join("edugrade.sqlite3");
    std::fs::write(&db_dst, b"current").expect("write current db");
    let e = backup::import_bundle(&bundle_path, &db_dst).expect_err("checksum mismatch");
    assert!(format!("{e:#}").contains("checksum mismatch"));
    assert_eq!(std::fs::read(&db_dst).expect("read current"), b"current");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_database_cannot_be_exported() {
    let dir = temp_dir("edugrade-backup-missing");
    let res = backup::export_bundle(&dir.join("absent.sqlite3"), &dir.join("out.zip"));
    assert!(res.is_err());
    let _ = std::fs::remove_dir_all(dir);
}
