// ===============================
// src/writer.rs
// ===============================
//
// CSV writer per tabel:
// - Header dulu (tetap ditulis walau rows kosong), lalu satu baris per row.
// - Quoting standar (RFC 4180) dari crate csv: koma, kutip, newline aman.
// - Otomatis membuat output directory jika belum ada.
// - Create/overwrite; gagal di tengah = file terpotong, error dinaikkan ke caller.
//
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::Table;
use crate::error::{GenError, Result};
use crate::metrics::{FILES_WRITTEN, ROWS_WRITTEN};

pub fn table_path<T: Table>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", T::NAME))
}

fn open_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    // Pastikan parent directory ada (kalau ada)
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|source| GenError::Io { path: parent.to_path_buf(), source })?;
        }
    }
    let file = File::create(path).map_err(|source| GenError::Io { path: path.to_path_buf(), source })?;

    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(file)))
}

// Writer tidak flexible: row dengan arity beda dari header => UnequalLengths
fn row_error<T: Table>(path: &Path, source: csv::Error) -> GenError {
    if let csv::ErrorKind::UnequalLengths { expected_len, len, .. } = *source.kind() {
        return GenError::Arity { table: T::NAME, expected: expected_len as usize, got: len as usize };
    }
    GenError::Csv { path: path.to_path_buf(), source }
}

/// Write `rows` to `<dir>/<T::NAME>.csv` and return the path.
pub fn write_table<T: Table>(dir: &Path, rows: &[T]) -> Result<PathBuf> {
    let path = table_path::<T>(dir);

    let mut wtr = open_writer(&path)?;
    wtr.write_record(T::HEADER).map_err(|e| row_error::<T>(&path, e))?;
    for row in rows {
        wtr.serialize(row).map_err(|e| row_error::<T>(&path, e))?;
    }
    wtr.flush().map_err(|source| GenError::Io { path: path.clone(), source })?;

    ROWS_WRITTEN.with_label_values(&[T::NAME]).inc_by(rows.len() as u64);
    FILES_WRITTEN.inc();
    info!(table = T::NAME, rows = rows.len(), path = %path.display(), "table written");
    Ok(path)
}
