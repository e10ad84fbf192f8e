//! Batch load/save for tabular files: CSV, NDJSON and zstd-compressed NDJSON.
//! A directory input is read as the concatenation of its supported files in name order.
//! Writes go to a `.inprogress` sibling and are promoted atomically, so a failed save
//! leaves no partial file behind.

use crate::error::{LoadError, SaveError};
use crate::ndjson::{NdjsonReader, NdjsonWriter};
use crate::record::{RawPost, Row, Tabular};
use crate::util::{create_with_backoff, inprogress_path, open_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder as ZstdEncoder;

const READ_BUF: usize = 256 * 1024;
const ZSTD_LEVEL: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Jsonl,
    JsonlZst,
}

impl TableFormat {
    /// Detect by extension: `.csv`, `.jsonl`/`.ndjson`, `.zst` (NDJSON inside).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".csv") {
            Some(Self::Csv)
        } else if name.ends_with(".jsonl") || name.ends_with(".ndjson") {
            Some(Self::Jsonl)
        } else if name.ends_with(".zst") {
            Some(Self::JsonlZst)
        } else {
            None
        }
    }
}

// ----------------------------- Loading ------------------------------------

/// Resolve an input path into the ordered list of files to read.
pub fn input_files(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        if TableFormat::from_path(path).is_none() {
            return Err(LoadError::UnsupportedFormat(path.to_path_buf()));
        }
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| TableFormat::from_path(p).is_some())
        .collect();
    files.sort();
    if files.is_empty() {
        tracing::warn!(dir = %path.display(), "No .csv/.jsonl/.ndjson/.zst files in input directory");
    }
    Ok(files)
}

/// Load loosely-typed rows from a file or directory.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, LoadError> {
    let mut rows = Vec::new();
    for file in input_files(path)? {
        let before = rows.len();
        match TableFormat::from_path(&file) {
            Some(TableFormat::Csv) => read_csv_rows(&file, &mut rows)?,
            Some(TableFormat::Jsonl) => {
                let rdr = NdjsonReader::open(&file, READ_BUF).map_err(|e| io_err(&file, e))?;
                read_json_rows(rdr, &file, &mut rows)?;
            }
            Some(TableFormat::JsonlZst) => {
                let f = open_with_backoff(&file).map_err(|e| io_err(&file, e))?;
                let dec = Decoder::new(f).map_err(|e| io_err(&file, e))?;
                read_json_rows(NdjsonReader::new(dec, READ_BUF), &file, &mut rows)?;
            }
            None => return Err(LoadError::UnsupportedFormat(file)),
        }
        tracing::debug!(path = %file.display(), rows = rows.len() - before, "Loaded input file");
    }
    Ok(rows)
}

/// Load raw post records. Rows never fail individually; missing columns become `None`.
pub fn load_raw(path: &Path) -> Result<Vec<RawPost>, LoadError> {
    let rows = load_rows(path)?;
    Ok(rows.iter().map(RawPost::from_row).collect())
}

/// Load strictly-typed records (e.g. a previously written cleaned batch).
/// Rows that do not decode are skipped with a warning.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let mut out = Vec::new();
    for file in input_files(path)? {
        if let Some(TableFormat::Csv) = TableFormat::from_path(&file) {
            let f = open_with_backoff(&file).map_err(|e| io_err(&file, e))?;
            let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(io::BufReader::with_capacity(READ_BUF, f));
            for (i, rec) in rdr.deserialize::<T>().enumerate() {
                match rec {
                    Ok(v) => out.push(v),
                    Err(e) if e.is_io_error() => return Err(LoadError::Csv { path: file.clone(), source: e }),
                    Err(e) => tracing::warn!(path = %file.display(), row = i + 1, error = %e, "Skipping undecodable row"),
                }
            }
        } else {
            for (i, row) in load_rows(&file)?.into_iter().enumerate() {
                match serde_json::from_value::<T>(Value::Object(row)) {
                    Ok(v) => out.push(v),
                    Err(e) => tracing::warn!(path = %file.display(), row = i + 1, error = %e, "Skipping undecodable row"),
                }
            }
        }
    }
    Ok(out)
}

fn read_csv_rows(path: &Path, rows: &mut Vec<Row>) -> Result<(), LoadError> {
    let f = open_with_backoff(path).map_err(|e| io_err(path, e))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(io::BufReader::with_capacity(READ_BUF, f));
    let headers = rdr
        .headers()
        .map_err(|e| LoadError::Csv { path: path.to_path_buf(), source: e })?
        .clone();

    for (i, rec) in rdr.records().enumerate() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(LoadError::Csv { path: path.to_path_buf(), source: e }),
            Err(e) => {
                tracing::warn!(path = %path.display(), row = i + 1, error = %e, "Skipping malformed CSV row");
                continue;
            }
        };
        let mut row = Row::new();
        for (h, field) in headers.iter().zip(rec.iter()) {
            // empty cells read as missing values
            let v = if field.is_empty() { Value::Null } else { Value::String(field.to_string()) };
            row.insert(h.to_string(), v);
        }
        rows.push(row);
    }
    Ok(())
}

fn read_json_rows<R: Read>(mut rdr: NdjsonReader<R>, path: &Path, rows: &mut Vec<Row>) -> Result<(), LoadError> {
    let mut buf = String::with_capacity(16 * 1024);
    loop {
        let n = rdr.read_line(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 { break; }
        if buf.trim().is_empty() { continue; }
        match serde_json::from_str::<Value>(&buf) {
            Ok(Value::Object(map)) => rows.push(map),
            Ok(_) => tracing::warn!(path = %path.display(), line = rdr.line_no(), "Skipping non-object JSON line"),
            Err(e) => tracing::warn!(path = %path.display(), line = rdr.line_no(), error = %e, "Skipping malformed JSON line"),
        }
    }
    Ok(())
}

fn io_err(path: &Path, source: io::Error) -> LoadError {
    LoadError::Io { path: path.to_path_buf(), source }
}

// ----------------------------- Saving -------------------------------------

/// Write `records` to `path` (format by extension), all-or-nothing.
pub fn save_records<T: Tabular>(path: &Path, records: &[T], write_buf: usize) -> Result<(), SaveError> {
    let format = TableFormat::from_path(path).ok_or_else(|| SaveError::UnsupportedFormat(path.to_path_buf()))?;
    write_atomic(path, |tmp| match format {
        TableFormat::Csv => write_csv(tmp, records, write_buf),
        TableFormat::Jsonl => {
            let w = NdjsonWriter::create(tmp, write_buf).map_err(|e| save_io(tmp, e))?;
            let w = write_json_lines(w, records, tmp)?;
            let mut f = w.finish().map_err(|e| save_io(tmp, e))?;
            f.flush().map_err(|e| save_io(tmp, e))
        }
        TableFormat::JsonlZst => {
            let f = create_with_backoff(tmp).map_err(|e| save_io(tmp, e))?;
            let enc = ZstdEncoder::new(f, ZSTD_LEVEL).map_err(|e| save_io(tmp, e))?;
            let w = write_json_lines(NdjsonWriter::new(enc, write_buf), records, tmp)?;
            let enc = w.finish().map_err(|e| save_io(tmp, e))?;
            enc.finish().map(|_| ()).map_err(|e| save_io(tmp, e))
        }
    })
}

/// Write a text file, all-or-nothing.
pub fn save_text(path: &Path, text: &str) -> Result<(), SaveError> {
    write_atomic(path, |tmp| {
        let f = create_with_backoff(tmp).map_err(|e| save_io(tmp, e))?;
        let mut w = BufWriter::new(f);
        w.write_all(text.as_bytes()).map_err(|e| save_io(tmp, e))?;
        w.flush().map_err(|e| save_io(tmp, e))
    })
}

fn write_atomic(path: &Path, write: impl FnOnce(&Path) -> Result<(), SaveError>) -> Result<(), SaveError> {
    write_atomic_via(path, &inprogress_path(path), write)
}

/// Like `write_atomic`, with a caller-chosen temp path (encoders that pick the
/// format from the extension need one that keeps it).
pub(crate) fn write_atomic_via(
    path: &Path,
    tmp: &Path,
    write: impl FnOnce(&Path) -> Result<(), SaveError>,
) -> Result<(), SaveError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| save_io(parent, e))?;
    }
    if let Err(e) = write(tmp) {
        let _ = remove_with_backoff(tmp);
        return Err(e);
    }
    if let Err(e) = replace_file_atomic_backoff(tmp, path) {
        let _ = remove_with_backoff(tmp);
        return Err(SaveError::Promote { path: path.to_path_buf(), message: format!("{e:#}") });
    }
    Ok(())
}

fn write_csv<T: Tabular>(tmp: &Path, records: &[T], write_buf: usize) -> Result<(), SaveError> {
    let f = create_with_backoff(tmp).map_err(|e| save_io(tmp, e))?;
    let csv_err = |e: csv::Error| SaveError::Csv { path: tmp.to_path_buf(), source: e };
    // header written by hand so an empty batch still carries its columns
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::with_capacity(write_buf, f));
    w.write_record(T::COLUMNS).map_err(csv_err)?;
    for r in records {
        w.serialize(r).map_err(csv_err)?;
    }
    w.flush().map_err(|e| save_io(tmp, e))
}

fn write_json_lines<T: Tabular, W: Write>(
    mut w: NdjsonWriter<W>,
    records: &[T],
    tmp: &Path,
) -> Result<NdjsonWriter<W>, SaveError> {
    for r in records {
        let line = serde_json::to_string(r)?;
        w.write_line(&line).map_err(|e| save_io(tmp, e))?;
    }
    Ok(w)
}

fn save_io(path: &Path, source: io::Error) -> SaveError {
    SaveError::Io { path: path.to_path_buf(), source }
}
