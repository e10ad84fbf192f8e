use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

// -------- robust file ops with backoff (Windows-friendly) --------

const TRIES: usize = 16;
const DELAY_MS: u64 = 50;

/// Return true for transient/retriable I/O errors often seen on Windows when
/// filter drivers (AV/backup), network volumes, or sharing violations occur.
#[cfg(windows)]
fn is_retriable_io_error(e: &io::Error) -> bool {
    // 5 access denied, 32 sharing violation, 33 lock violation, 21 device not ready,
    // 225 AV blocked, 1006 volume altered, 1117 device error, 1224 user-mapped section
    matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 225 | 1006 | 1117 | 1224))
        || e.kind() == io::ErrorKind::Interrupted
}

/// Elsewhere the same numbers mean permanent errors (EIO, EISDIR); only retry interrupts.
#[cfg(not(windows))]
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
}

/// Run `op` until it succeeds, fails with a non-transient error, or `tries` run out.
/// The pause grows linearly: `delay_ms`, `2 × delay_ms`, ...
fn retry_io<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

pub fn open_with_backoff(path: &Path) -> io::Result<File> {
    retry_io(TRIES, DELAY_MS, || File::open(path))
}

pub fn create_with_backoff(path: &Path) -> io::Result<File> {
    retry_io(TRIES, DELAY_MS, || File::create(path))
}

/// Succeeds if the file doesn't exist.
pub fn remove_with_backoff(path: &Path) -> Result<()> {
    retry_io(TRIES, DELAY_MS, || match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", path.display()))
}

/// Sibling temp path used while a file is being written: `<name>.inprogress`.
pub fn inprogress_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    dest.with_file_name(name)
}

/// Atomically replace `dest` with `tmp`.
/// If rename fails (e.g., due to sharing), fall back to copy+remove.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    if retry_io(TRIES, DELAY_MS, || fs::rename(tmp, dest)).is_ok() {
        return Ok(());
    }
    retry_io(TRIES, DELAY_MS, || fs::copy(tmp, dest))
        .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    remove_with_backoff(tmp)
}
