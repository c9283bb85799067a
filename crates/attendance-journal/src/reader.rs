//! Journal reader implementation.

use crate::errors::JournalError;
use crate::frame::{FrameHeader, FrameKind, JournalHeader, FRAME_HEADER_SIZE, HEADER_SIZE};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// How a reader treats an incomplete trailing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Truncated frames are errors.
    Strict,
    /// Truncation is treated as end-of-file.
    Permissive,
}

/// Sequential journal reader.
///
/// [`JournalReader::valid_len`] always points just past the last complete
/// frame, so after a permissive read hits a torn tail it tells the caller
/// where the good data ends.
///
/// # Example
///
/// ```rust
/// use attendance_journal::{JournalReader, JournalWriter, ReadMode, WriteOptions};
/// use serde_json::{json, Value};
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("registry.atj");
/// let mut writer = JournalWriter::open(&path, WriteOptions::default())?;
/// writer.append_record(&json!({"seq": 0}))?;
/// writer.finish()?;
///
/// let mut reader = JournalReader::open(&path, ReadMode::Strict)?;
/// while let Some(record) = reader.read_record::<Value>()? {
///     println!("seq {}", record["seq"]);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalReader {
    input: BufReader<File>,
    mode: ReadMode,
    valid_len: u64,
    truncated: bool,
}

impl JournalReader {
    /// Opens a journal and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened or its header is invalid.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let mut input = BufReader::new(File::open(path)?);
        let mut header = [0u8; HEADER_SIZE];
        input.read_exact(&mut header).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                JournalError::InvalidHeader("file shorter than header".to_string())
            } else {
                JournalError::Io(e)
            }
        })?;
        JournalHeader::decode(&header)?;

        Ok(Self {
            input,
            mode,
            valid_len: HEADER_SIZE as u64,
            truncated: false,
        })
    }

    /// Byte offset just past the last complete frame read so far.
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// True if a permissive read stopped at an incomplete frame.
    pub fn hit_truncation(&self) -> bool {
        self.truncated
    }

    /// Reads the next frame of any kind. `Ok(None)` at end-of-file.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        if self.truncated {
            return Ok(None);
        }

        let mut header = [0u8; FRAME_HEADER_SIZE];
        match read_fully(&mut self.input, &mut header)? {
            0 => return Ok(None),
            n if n < FRAME_HEADER_SIZE => return self.torn(),
            _ => {}
        }
        let frame = FrameHeader::decode(&header, self.valid_len)?;

        let mut payload = vec![0u8; frame.len as usize];
        if read_fully(&mut self.input, &mut payload)? < payload.len() {
            return self.torn();
        }

        self.valid_len += frame.frame_len();
        Ok(Some((frame.kind, payload)))
    }

    /// Reads and deserializes the next JSON record, skipping unknown frame kinds.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if:
    /// - A frame header is invalid
    /// - A payload is not UTF-8 or does not deserialize as `T`
    /// - Truncation is detected in strict mode
    pub fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>, JournalError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some((FrameKind::RecordJson, payload)) => {
                    let text = std::str::from_utf8(&payload)?;
                    return Ok(Some(serde_json::from_str(text)?));
                }
                Some((FrameKind::Unknown(_), _)) => continue,
            }
        }
    }

    fn torn<T>(&mut self) -> Result<Option<T>, JournalError> {
        match self.mode {
            ReadMode::Permissive => {
                self.truncated = true;
                Ok(None)
            }
            ReadMode::Strict => Err(JournalError::TruncatedFrame {
                offset: self.valid_len,
            }),
        }
    }
}

/// Reads until `buf` is full or EOF; returns the number of bytes read.
fn read_fully<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize, JournalError> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
