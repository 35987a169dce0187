//! Result persistence: JSON file or sqlite database.
//!
//! JSON is written atomically (temp file + rename) so an interrupted run
//! never leaves a half-written results file behind. The sqlite path drops
//! and recreates the `qr_scan_results` table on every run — each scan
//! replaces the previous one, it does not append.
//!
//! Format selection is the single hard-failure point of the system: an
//! explicit format other than `json`/`sqlite` raises
//! [`ScanError::UnsupportedFormat`], while an unrecognised file extension
//! silently falls back to JSON.

use crate::config::OutputFormat;
use crate::error::ScanError;
use crate::record::ScanRecord;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Persist scan records to `path` in the given format, inferring the format
/// from the extension when none is supplied.
///
/// Returns the format actually used.
pub async fn write_records(
    records: &[ScanRecord],
    path: &Path,
    format: Option<OutputFormat>,
) -> Result<OutputFormat, ScanError> {
    let format = format.unwrap_or_else(|| OutputFormat::infer(path));

    match format {
        OutputFormat::Json => write_json(records, path).await?,
        OutputFormat::Sqlite => write_sqlite(records, path).await?,
    }

    info!(
        "Wrote {} records to {} ({})",
        records.len(),
        path.display(),
        format
    );
    Ok(format)
}

/// Write records as a pretty-printed JSON array, atomically.
async fn write_json(records: &[ScanRecord], path: &Path) -> Result<(), ScanError> {
    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| ScanError::Internal(format!("JSON serialisation: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScanError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    // Atomic write: temp file in the same directory, then rename.
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ScanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ScanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write records into a sqlite database, replacing any previous results.
async fn write_sqlite(records: &[ScanRecord], path: &Path) -> Result<(), ScanError> {
    let db_err = |e: sqlx::Error| ScanError::DatabaseWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.map_err(db_err)?;

    sqlx::query("DROP TABLE IF EXISTS qr_scan_results")
        .execute(&pool)
        .await
        .map_err(db_err)?;

    sqlx::query(
        "CREATE TABLE qr_scan_results (
            page       INTEGER NOT NULL,
            x          INTEGER NOT NULL,
            y          INTEGER NOT NULL,
            width      INTEGER NOT NULL,
            height     INTEGER NOT NULL,
            qr_content TEXT    NOT NULL,
            malicious  INTEGER NOT NULL,
            source     TEXT    NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .map_err(db_err)?;

    for r in records {
        sqlx::query(
            "INSERT INTO qr_scan_results
                (page, x, y, width, height, qr_content, malicious, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(r.page as i64)
        .bind(r.bounding_box.x)
        .bind(r.bounding_box.y)
        .bind(r.bounding_box.width)
        .bind(r.bounding_box.height)
        .bind(&r.content)
        .bind(r.verdict.malicious)
        .bind(r.verdict.source.to_string())
        .execute(&pool)
        .await
        .map_err(db_err)?;
    }

    pool.close().await;
    Ok(())
}
