//! Journal writer implementation.

use crate::errors::JournalError;
use crate::frame::{FrameHeader, FrameKind, JournalHeader, HEADER_SIZE};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
    /// Drop everything after this byte offset before appending.
    ///
    /// Used to cut off a torn trailing frame reported by a permissive reader.
    /// Must not be smaller than the header size.
    pub truncate_at: Option<u64>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
            truncate_at: None,
        }
    }
}

/// Append-only journal writer.
///
/// A new or empty file gets a header on open; an existing file must already
/// carry a valid header and is appended to.
///
/// # Example
///
/// ```rust
/// use attendance_journal::{JournalWriter, WriteOptions};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir()?;
/// let mut writer = JournalWriter::open(dir.path().join("registry.atj"), WriteOptions::default())?;
/// writer.append_record(&json!({"kind": "event_cancelled", "event_id": 0}))?;
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalWriter {
    file: File,
    sync: bool,
    len: u64,
}

impl JournalWriter {
    /// Opens or creates a journal file for appending.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if:
    /// - The file cannot be opened or created
    /// - The file is non-empty but shorter than a header
    /// - The existing header is invalid
    /// - `truncate_at` lies inside the header
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let mut file = OpenOptions::new()
            .create(options.create)
            .read(true)
            .write(true)
            .open(path)?;

        let existing = file.metadata()?.len();
        let mut writer = if existing == 0 {
            let header = JournalHeader::current().encode();
            file.write_all(&header)?;
            file.flush()?;
            if options.sync {
                file.sync_all()?;
            }
            Self {
                file,
                sync: options.sync,
                len: HEADER_SIZE as u64,
            }
        } else if existing < HEADER_SIZE as u64 {
            return Err(JournalError::FileNotEmpty);
        } else {
            let mut header = [0u8; HEADER_SIZE];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut header)?;
            JournalHeader::decode(&header)?;
            Self {
                file,
                sync: options.sync,
                len: existing,
            }
        };

        if let Some(cut) = options.truncate_at {
            if cut < HEADER_SIZE as u64 {
                return Err(JournalError::InvalidHeader(format!(
                    "cannot truncate to {cut} bytes, header needs {HEADER_SIZE}"
                )));
            }
            if cut < writer.len {
                writer.file.set_len(cut)?;
                writer.len = cut;
                if writer.sync {
                    writer.file.sync_all()?;
                }
            }
        }

        writer.file.seek(SeekFrom::Start(writer.len))?;
        Ok(writer)
    }

    /// Current file length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the journal holds a header and no frames.
    pub fn is_empty(&self) -> bool {
        self.len == HEADER_SIZE as u64
    }

    /// Serializes `record` to JSON and appends it as a record frame.
    pub fn append_record<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(record)?;
        self.append_raw(FrameKind::RecordJson, &payload)
    }

    /// Appends a frame with the given kind and payload.
    ///
    /// Header and payload go out in one write; on failure the file is cut
    /// back to its previous length so no torn frame is left behind.
    pub fn append_raw(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), JournalError> {
        let frame = FrameHeader::for_payload(kind, payload.len())?;
        let mut buf = Vec::with_capacity(frame.frame_len() as usize);
        buf.extend_from_slice(&frame.encode());
        buf.extend_from_slice(payload);

        if let Err(err) = self.write_frame(&buf) {
            let _ = self.file.set_len(self.len);
            let _ = self.file.seek(SeekFrom::Start(self.len));
            return Err(err);
        }
        self.len += frame.frame_len();
        Ok(())
    }

    fn write_frame(&mut self, buf: &[u8]) -> Result<(), JournalError> {
        self.file.write_all(buf)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}
