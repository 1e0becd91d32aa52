//! Database snapshot packaging
//!
//! A snapshot is the SQLite file gzip-compressed for transfer, plus a small
//! JSON descriptor that consumers check before downloading the blob:
//!
//! ```json
//! {
//!   "version": "20240101120000",
//!   "schema_version": 2,
//!   "total_codes": 2450,
//!   "pdf_codes": 1800,
//!   "ross_tech_codes": 640,
//!   "sha256": "…",
//!   "original_size": 5242880,
//!   "compressed_size": 1048576,
//!   "created_at": "2024-01-01T12:00:00Z"
//! }
//! ```

use crate::output::stats::{PDF_SOURCE_MARKER, WIKI_SOURCE_MARKER};
use crate::storage::{get_schema_version, FaultCodeStore, SqliteStore};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Descriptor written next to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Monotonic build stamp, compared by consumers to detect updates
    pub version: String,

    /// Layout of the `fault_codes` table inside the snapshot
    pub schema_version: u32,
    pub total_codes: u64,
    pub pdf_codes: u64,
    pub ross_tech_codes: u64,

    /// Hex SHA-256 of the uncompressed database file
    pub sha256: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub created_at: DateTime<Utc>,
}

/// Compresses the database at `database_path` into `snapshot_path`
///
/// The write-ahead log is checkpointed first so the file holds every
/// committed record. The snapshot is decompressed again and its length
/// compared with the source before the descriptor is written to
/// `metadata_path`.
pub fn export_snapshot(
    database_path: &Path,
    snapshot_path: &Path,
    metadata_path: &Path,
) -> Result<SnapshotMetadata, HarvestError> {
    if !database_path.exists() {
        return Err(HarvestError::Snapshot(format!(
            "database not found: {}",
            database_path.display()
        )));
    }

    let (total_codes, pdf_codes, ross_tech_codes) = {
        let store = SqliteStore::new(database_path)?;
        store.checkpoint()?;
        (
            store.count()?,
            store.count_content_containing(PDF_SOURCE_MARKER)?,
            store.count_content_containing(WIKI_SOURCE_MARKER)?,
        )
    };
    tracing::info!(
        "Source database: {} codes ({} PDF, {} Ross-Tech)",
        total_codes,
        pdf_codes,
        ross_tech_codes
    );

    let data = fs::read(database_path)?;
    let original_size = data.len() as u64;
    let sha256 = hex::encode(Sha256::digest(&data));

    tracing::info!("Creating compressed database: {}", snapshot_path.display());
    let mut encoder = GzEncoder::new(
        BufWriter::new(File::create(snapshot_path)?),
        Compression::best(),
    );
    encoder.write_all(&data)?;
    encoder.finish()?.flush()?;

    let compressed_size = fs::metadata(snapshot_path)?.len();
    tracing::info!(
        "Compression complete: {} -> {} bytes ({:.1}%)",
        original_size,
        compressed_size,
        ratio(compressed_size, original_size)
    );

    let restored_size = decompressed_len(snapshot_path)?;
    if restored_size != original_size {
        return Err(HarvestError::Snapshot(format!(
            "decompression test failed: expected {} bytes, got {}",
            original_size, restored_size
        )));
    }
    tracing::info!("Decompression test passed");

    let created_at = Utc::now();
    let metadata = SnapshotMetadata {
        version: created_at.format("%Y%m%d%H%M%S").to_string(),
        schema_version: get_schema_version(),
        total_codes,
        pdf_codes,
        ross_tech_codes,
        sha256,
        original_size,
        compressed_size,
        created_at,
    };
    fs::write(metadata_path, serde_json::to_string_pretty(&metadata)?)?;
    tracing::info!("Metadata written to {}", metadata_path.display());

    Ok(metadata)
}

/// Reads a descriptor written by `export_snapshot`
pub fn read_metadata(metadata_path: &Path) -> Result<SnapshotMetadata, HarvestError> {
    let content = fs::read_to_string(metadata_path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Decompresses `snapshot_path` over the database at `database_path`
///
/// The snapshot is unpacked beside the target and renamed into place once it
/// opens as a valid store, so a corrupt snapshot never replaces a working
/// database. Returns the number of codes in the restored database.
pub fn restore_snapshot(snapshot_path: &Path, database_path: &Path) -> Result<u64, HarvestError> {
    let staging = sibling_path(database_path, "restore");

    let result = unpack_and_check(snapshot_path, &staging);
    let total_codes = match result {
        Ok(total) => total,
        Err(e) => {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
    };

    // Stale WAL files belong to the database being replaced
    for suffix in ["wal", "shm"] {
        let side_file = sibling_path(database_path, suffix);
        if side_file.exists() {
            fs::remove_file(side_file)?;
        }
    }
    fs::rename(&staging, database_path)?;

    tracing::info!(
        "Restored {} codes from {} into {}",
        total_codes,
        snapshot_path.display(),
        database_path.display()
    );
    Ok(total_codes)
}

fn unpack_and_check(snapshot_path: &Path, staging: &Path) -> Result<u64, HarvestError> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(snapshot_path)?));
    let mut output = BufWriter::new(File::create(staging)?);
    io::copy(&mut decoder, &mut output)?;
    output.flush()?;
    drop(output);

    let store = SqliteStore::new(staging)?;
    let total = store.count()?;
    store.checkpoint()?;
    drop(store);

    for suffix in ["wal", "shm"] {
        let side_file = sibling_path(staging, suffix);
        if side_file.exists() {
            fs::remove_file(side_file)?;
        }
    }
    Ok(total)
}

fn decompressed_len(snapshot_path: &Path) -> Result<u64, HarvestError> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(snapshot_path)?));
    Ok(io::copy(&mut decoder, &mut io::sink())?)
}

/// `<path>-<suffix>`, the naming SQLite uses for its side files
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push("-");
    name.push(suffix);
    PathBuf::from(name)
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
