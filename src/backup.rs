//! Zip bundles of the local store database.
//!
//! A bundle holds `manifest.json` and the raw database file. Import also
//! accepts a bare database copy.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const BUNDLE_FORMAT_V1: &str = "edugrade-local-v1";
pub const PLAIN_SQLITE_FORMAT: &str = "plain-sqlite3";

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/edugrade.sqlite3";
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: u64,
    #[serde(default)]
    db_sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display())),
        _ => Ok(()),
    }
}

pub fn export_bundle(db_path: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !db_path.is_file() {
        bail!("local store database not found: {}", db_path.display());
    }
    let db = std::fs::read(db_path)
        .with_context(|| format!("failed to read database {}", db_path.display()))?;
    let checksum = digest_hex(&db);
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        db_sha256: Some(checksum.clone()),
    };
    let manifest_text =
        serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;

    ensure_parent(out_path)?;
    let file = File::create(out_path)
        .with_context(|| format!("failed to create bundle {}", out_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let entries: [(&str, &[u8]); 2] = [
        (MANIFEST_ENTRY, manifest_text.as_slice()),
        (DB_ENTRY, db.as_slice()),
    ];
    for (name, bytes) in entries {
        zip.start_file(name, opts)
            .with_context(|| format!("failed to start bundle entry {name}"))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write bundle entry {name}"))?;
    }
    zip.finish().context("failed to finalize bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: entries.len(),
        sha256: checksum,
    })
}

/// Replaces `db_path` with the database in `in_path`. The current file is
/// only touched once the bundle has been read and its checksum matches.
pub fn import_bundle(in_path: &Path, db_path: &Path) -> anyhow::Result<ImportSummary> {
    ensure_parent(db_path)?;

    if !starts_with_zip_magic(in_path)? {
        std::fs::copy(in_path, db_path).with_context(|| {
            format!(
                "failed to copy {} to {}",
                in_path.display(),
                db_path.display()
            )
        })?;
        return Ok(ImportSummary {
            bundle_format_detected: PLAIN_SQLITE_FORMAT.to_string(),
        });
    }

    let file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(file).context("bundle is not a valid zip archive")?;

    let manifest: Manifest = serde_json::from_slice(&read_entry(&mut archive, MANIFEST_ENTRY)?)
        .context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT_V1 {
        bail!("unsupported bundle format: {}", manifest.format);
    }
    let db = read_entry(&mut archive, DB_ENTRY)?;
    if let Some(expected) = manifest.db_sha256.as_deref() {
        let actual = digest_hex(&db);
        if actual != expected {
            bail!("database checksum mismatch: expected {expected}, got {actual}");
        }
    }

    let staged = staging_path(db_path);
    std::fs::write(&staged, &db)
        .with_context(|| format!("failed to stage database {}", staged.display()))?;
    std::fs::rename(&staged, db_path)
        .with_context(|| format!("failed to replace database {}", db_path.display()))?;

    Ok(ImportSummary {
        bundle_format_detected: manifest.format,
    })
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> anyhow::Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("bundle missing {name}"))?;
    let mut out = Vec::new();
    entry
        .read_to_end(&mut out)
        .with_context(|| format!("failed to read {name}"))?;
    Ok(out)
}

fn staging_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".importing");
    PathBuf::from(name)
}

fn starts_with_zip_magic(path: &Path) -> anyhow::Result<bool> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut head = [0u8; 4];
    match file.read_exact(&mut head) {
        Ok(()) => Ok(head == ZIP_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}
