//! Line-delimited JSON file access.
//!
//! Every input is a directory of `*.json` files holding one JSON object per
//! line. Files are decoded in parallel; records come back in natural file-name
//! order, then line order, so results are deterministic.

use crate::types::{Keyed, natural_id_cmp};
use ahash::AHashMap;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const JSON_EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum FilesError {
    #[error("'{}' does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON record at {}:{line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize a record for '{}': {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Id '{id}' appears more than once (last seen in '{}')", .path.display())]
    DuplicateKey { id: String, path: PathBuf },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FilesError + '_ {
    move |source| FilesError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Regular `*.json` files directly inside `dir`, in natural name order.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, FilesError> {
    if !dir.is_dir() {
        return Err(FilesError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION));
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| natural_id_cmp(&a.to_string_lossy(), &b.to_string_lossy()));

    if files.is_empty() {
        warn!("No *.json files found in '{}'", dir.display());
    }
    Ok(files)
}

/// Decodes every record of type `T` from the `*.json` files in `dir`.
///
/// Blank lines are skipped and unknown fields are ignored. The first line that
/// fails to decode aborts the read with its file and 1-based line number.
pub fn read_records<T>(dir: &Path) -> Result<Vec<T>, FilesError>
where
    T: DeserializeOwned + Send,
{
    let files = list_json_files(dir)?;
    let per_file = files
        .par_iter()
        .map(|path| read_file::<T>(path))
        .collect::<Result<Vec<_>, FilesError>>()?;

    let records: Vec<T> = per_file.into_iter().flatten().collect();
    debug!(
        "Read {} records from {} files in '{}'",
        records.len(),
        files.len(),
        dir.display()
    );
    Ok(records)
}

/// Decodes the records in `dir` into a table keyed by [`Keyed::id`].
/// An id that occurs twice is an error.
pub fn read_keyed_records<T>(dir: &Path) -> Result<AHashMap<String, T>, FilesError>
where
    T: DeserializeOwned + Keyed + Send,
{
    let records = read_records::<T>(dir)?;
    let mut table = AHashMap::with_capacity(records.len());
    for record in records {
        let id = record.id().to_string();
        if table.contains_key(&id) {
            return Err(FilesError::DuplicateKey {
                id,
                path: dir.to_path_buf(),
            });
        }
        table.insert(id, record);
    }
    Ok(table)
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FilesError> {
    let reader = BufReader::new(File::open(path).map_err(io_error(path))?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| FilesError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Writes `records` to `path` as line-delimited JSON, replacing any existing file.
pub fn write_records<T: Serialize>(records: &[T], path: &Path) -> Result<(), FilesError> {
    let mut writer = BufWriter::new(File::create(path).map_err(io_error(path))?);
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(|source| FilesError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_error(path))?;
    }
    writer.flush().map_err(io_error(path))?;
    debug!("Wrote {} records to '{}'", records.len(), path.display());
    Ok(())
}
