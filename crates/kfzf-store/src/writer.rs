//! Durable writes for a store's dump file.
//!
//! Two strategies share one destination path:
//!
//! - **Full rewrite** ([`StagedDump`]): the complete dump is written to the
//!   scratch path, flushed and fsynced, and only then renamed over the
//!   destination. Readers see either the old file or the new one.
//! - **Incremental append** ([`append_line`]): one line is written to the
//!   already-open destination handle, with no flush, sync or rename.
//!
//! After a rewrite the staged file's handle is kept open and becomes the
//! append handle, since it now lives at the destination path.

use crate::error::{Result, StoreError};
use crate::util::sync_dir_best_effort;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A fully written, synced dump sitting at the scratch path, not yet visible to readers.
///
/// Dropping it without calling [`StagedDump::commit`] leaves the destination untouched.
#[derive(Debug)]
pub struct StagedDump {
    scratch: PathBuf,
    file: File,
    lines: usize,
}

impl StagedDump {
    /// Creates (or truncates) `scratch` and writes `header` followed by every line.
    pub fn stage<I, S>(scratch: &Path, header: &str, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut file = File::create(scratch).map_err(|source| StoreError::CreateFile {
            path: scratch.to_path_buf(),
            source,
        })?;
        tracing::trace!(
            target = "kfzf.store",
            path = %scratch.display(),
            "created scratch file for full dump"
        );

        let mut count = 0usize;
        {
            let mut writer = BufWriter::new(&mut file);
            write_line(&mut writer, header).map_err(|source| StoreError::Write {
                path: scratch.to_path_buf(),
                source,
            })?;
            for line in lines {
                write_line(&mut writer, line.as_ref()).map_err(|source| StoreError::Write {
                    path: scratch.to_path_buf(),
                    source,
                })?;
                count += 1;
            }
            writer.flush().map_err(|source| StoreError::Flush {
                path: scratch.to_path_buf(),
                source,
            })?;
        }

        file.sync_all().map_err(|source| StoreError::Sync {
            path: scratch.to_path_buf(),
            source,
        })?;

        Ok(Self {
            scratch: scratch.to_path_buf(),
            file,
            lines: count,
        })
    }

    /// Number of record lines written, excluding the header.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Publishes the staged dump at `dest`.
    ///
    /// The previous append handle is closed first; on success the staged file's
    /// handle is returned as the new append handle.
    pub fn commit(self, dest: &Path, previous: &mut Option<File>) -> Result<File> {
        if let Some(old) = previous.take() {
            drop(old);
        }
        publish(&self.scratch, dest)?;
        Ok(self.file)
    }
}

/// Opens the initial scratch file a store bootstraps its destination from.
pub(crate) fn open_scratch(scratch: &Path) -> Result<File> {
    File::create(scratch).map_err(|source| StoreError::CreateFile {
        path: scratch.to_path_buf(),
        source,
    })
}

/// First-ever write: puts the header into the scratch handle and renames it onto `dest`.
///
/// The handle is rewound first so anything a failed earlier attempt left behind is discarded.
pub(crate) fn bootstrap(file: &mut File, scratch: &Path, dest: &Path, header: &str) -> Result<()> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: scratch.to_path_buf(),
        source,
    };
    file.set_len(0).map_err(write_err)?;
    file.seek(SeekFrom::Start(0)).map_err(write_err)?;
    write_line(file, header).map_err(write_err)?;
    publish(scratch, dest)
}

/// Appends one record line to the open destination handle.
pub fn append_line(file: &mut File, dest: &Path, line: &str) -> Result<()> {
    write_line(file, line).map_err(|source| StoreError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

/// Reopens the destination for appends after a handle was lost to a failed rewrite.
pub(crate) fn reopen_dest(dest: &Path) -> Result<File> {
    OpenOptions::new()
        .append(true)
        .open(dest)
        .map_err(|source| StoreError::CreateFile {
            path: dest.to_path_buf(),
            source,
        })
}

fn publish(scratch: &Path, dest: &Path) -> Result<()> {
    fs::rename(scratch, dest).map_err(|source| StoreError::Rename {
        from: scratch.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })?;
    if let Some(parent) = dest.parent() {
        sync_dir_best_effort(parent, "writer.publish");
    }
    Ok(())
}

fn write_line(out: &mut impl Write, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")
}
