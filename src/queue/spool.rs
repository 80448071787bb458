//! Durable directory-spool queue backend.
//!
//! Each entry is stored as its own file named by a zero-padded sequence
//! number (`00000000000000000042.rec`), so lexical and numeric order agree.
//! Appends write a private temporary file first and then hard-link it to
//! the next sequence name. The link fails if that name is already claimed;
//! the handle then resynchronises with the directory and tries again.
//! Readers therefore never observe a partially written entry.
//!
//! The directory is listed only when the spool is opened, when the cached
//! tail sequence turns out to be taken, and when the cached head entry has
//! disappeared. Steady-state appends and head reads touch a single file.
//!
//! Several processes may append to the same spool. Each producer's entries
//! keep its own append order; entries from different producers are ordered
//! by the sequence numbers they claimed.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::warn;
use parking_lot::Mutex;

use super::QueueBackend;

const ENTRY_EXTENSION: &str = "rec";
const TEMP_EXTENSION: &str = "tmp";
const MAX_CLAIM_ATTEMPTS: u32 = 64;
/// Temporary files older than this are leftovers of a crashed writer.
const STALE_TEMP_AGE: Duration = Duration::from_secs(300);

/// Distinguishes temporary files written by handles within one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Queue backend persisted in a directory.
#[derive(Debug)]
pub struct SpoolQueue {
    dir: PathBuf,
    next_seq: Mutex<u64>,
    /// Sequence believed to hold the head entry; `None` forces a listing.
    head_hint: Mutex<Option<u64>>,
}

impl SpoolQueue {
    /// Open (creating if needed) the spool rooted at `dir`.
    ///
    /// Temporary files abandoned by crashed writers are removed.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        remove_stale_temps(&dir)?;
        let seqs = list_sequences(&dir)?;
        Ok(Self {
            next_seq: Mutex::new(seqs.last().map_or(0, |seq| seq + 1)),
            head_hint: Mutex::new(seqs.first().copied()),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, seq: u64) -> PathBuf {
        self.dir.join(format!("{seq:020}.{ENTRY_EXTENSION}"))
    }

    fn scan_head(&self) -> io::Result<Option<u64>> {
        Ok(list_sequences(&self.dir)?.first().copied())
    }
}

/// Sorted sequence numbers of the entries currently in `dir`.
fn list_sequences(dir: &Path) -> io::Result<Vec<u64>> {
    let mut seqs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }
        if let Some(seq) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u64>().ok())
        {
            seqs.push(seq);
        }
    }
    seqs.sort_unstable();
    Ok(seqs)
}

fn is_temp_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'));
    hidden && path.extension().and_then(|ext| ext.to_str()) == Some(TEMP_EXTENSION)
}

/// Remove temporary files old enough that no live writer can own them.
fn remove_stale_temps(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_temp_file(&path) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age >= STALE_TEMP_AGE);
        if !stale {
            continue;
        }
        if let Err(err) = fs::remove_file(&path)
            && err.kind() != io::ErrorKind::NotFound
        {
            warn!("nextlog: failed to remove stale spool file {}: {err}", path.display());
        }
    }
    Ok(())
}

/// Fully written entry waiting to be linked into place.
///
/// The file is removed on drop, whether or not the link succeeded.
struct TempEntry {
    path: PathBuf,
}

impl TempEntry {
    fn write(dir: &Path, entry: &str) -> io::Result<Self> {
        let id = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = Self {
            path: dir.join(format!(".{}-{id}.{TEMP_EXTENSION}", process::id())),
        };
        let mut file = File::create(&temp.path)?;
        file.write_all(entry.as_bytes())?;
        file.sync_all()?;
        Ok(temp)
    }
}

impl Drop for TempEntry {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl QueueBackend for SpoolQueue {
    fn push_tail(&self, entry: &str) -> io::Result<()> {
        let temp = TempEntry::write(&self.dir, entry)?;
        let mut next_seq = self.next_seq.lock();
        let mut resynced = false;
        for _ in 0..MAX_CLAIM_ATTEMPTS {
            match fs::hard_link(&temp.path, self.entry_path(*next_seq)) {
                Ok(()) => {
                    *next_seq += 1;
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    *next_seq += 1;
                    if !resynced {
                        // Another handle has been appending; jump past its entries.
                        if let Some(last) = list_sequences(&self.dir)?.last() {
                            *next_seq = (*next_seq).max(last + 1);
                        }
                        resynced = true;
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Err(io::Error::other("could not claim a spool sequence number"))
    }

    fn peek_head(&self) -> io::Result<Option<String>> {
        let mut hint = self.head_hint.lock();
        loop {
            let seq = match *hint {
                Some(seq) => seq,
                None => match self.scan_head()? {
                    Some(seq) => seq,
                    None => return Ok(None),
                },
            };
            match fs::read_to_string(self.entry_path(seq)) {
                Ok(entry) => {
                    *hint = Some(seq);
                    return Ok(Some(entry));
                }
                // Stale hint, or removed between listing and reading.
                Err(err) if err.kind() == io::ErrorKind::NotFound => *hint = None,
                Err(err) => return Err(err),
            }
        }
    }

    fn pop_head(&self) -> io::Result<()> {
        let mut hint = self.head_hint.lock();
        if let Some(seq) = *hint {
            match fs::remove_file(self.entry_path(seq)) {
                Ok(()) => {
                    *hint = Some(seq + 1);
                    return Ok(());
                }
                Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
                Err(_) => {}
            }
        }
        let Some(seq) = self.scan_head()? else {
            *hint = None;
            return Ok(());
        };
        match fs::remove_file(self.entry_path(seq)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => {
                *hint = Some(seq + 1);
                Ok(())
            }
        }
    }

    /// Lists the directory; meant for inspection rather than the hot path.
    fn len(&self) -> io::Result<usize> {
        Ok(list_sequences(&self.dir)?.len())
    }
}
