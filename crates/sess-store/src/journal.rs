use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sess_types::{Scope, Session, SessionData, SessionId, SessionType, Source};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::filter::DocumentKey;

/// A single journaled mutation.
///
/// Session data is carried as JSON text: the binary encoding cannot
/// represent self-describing JSON values directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalRecord {
    /// Store (or overwrite) a document.
    Put {
        source: Source,
        kind: SessionType,
        id: SessionId,
        data: String,
    },
    /// Remove a document.
    Delete {
        source: Source,
        kind: SessionType,
        id: SessionId,
    },
}

impl JournalRecord {
    pub fn put(session: &Session) -> StoreResult<Self> {
        let data = serde_json::to_string(&session.data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self::Put {
            source: session.source.clone(),
            kind: session.kind,
            id: session.id,
            data,
        })
    }

    pub fn delete(key: &DocumentKey) -> Self {
        Self::Delete {
            source: key.scope.source.clone(),
            kind: key.scope.kind,
            id: key.id,
        }
    }

    /// Decode the session carried by a `Put` record.
    pub fn to_session(&self) -> StoreResult<Option<Session>> {
        match self {
            Self::Put {
                source,
                kind,
                id,
                data,
            } => {
                let data: SessionData = serde_json::from_str(data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(Session::new(
                    *id,
                    Scope::new(source.clone(), *kind),
                    data,
                )))
            }
            Self::Delete { .. } => Ok(None),
        }
    }

    /// The key this record touches.
    pub fn key(&self) -> DocumentKey {
        match self {
            Self::Put { source, kind, id, .. } | Self::Delete { source, kind, id } => {
                DocumentKey::new(Scope::new(source.clone(), *kind), *id)
            }
        }
    }
}

/// Flush/sync strategy for the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every write (safest, highest latency).
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    #[default]
    OsDefault,
}

/// Configuration for the [`Journal`].
#[derive(Clone, Debug, Default)]
pub struct JournalConfig {
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct JournalWriter {
    writer: BufWriter<File>,
    /// Current write offset in the journal file.
    offset: u64,
}

/// Append-only, crash-recoverable mutation journal.
///
/// On-disk format, repeated per record:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized JournalRecord)]
/// ```
/// On recovery the file is read front-to-back. Records that fail the CRC
/// check are skipped; a torn tail ends recovery.
pub struct Journal {
    path: PathBuf,
    writer: Mutex<JournalWriter>,
    config: JournalConfig,
}

impl Journal {
    /// Open (or create) a journal file at the given path.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(JournalWriter {
                writer: BufWriter::new(file),
                offset,
            }),
            config,
        })
    }

    /// Append a single record. Returns the byte offset of the record.
    pub fn append(&self, record: &JournalRecord) -> StoreResult<u64> {
        let payload = encode(record)?;

        let mut w = self.writer.lock().expect("journal mutex poisoned");
        let record_offset = w.offset;

        write_frame(&mut w.writer, &payload)?;
        w.writer.flush()?;
        if self.config.sync_mode == SyncMode::EveryWrite {
            w.writer.get_ref().sync_all()?;
        }

        w.offset += (HEADER_SIZE + payload.len()) as u64;

        debug!(offset = record_offset, len = payload.len(), "journal append");
        Ok(record_offset)
    }

    /// Recover all valid records, in append order.
    pub fn recover(&self) -> StoreResult<Vec<JournalRecord>> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(&self.path)?).read_to_end(&mut bytes)?;

        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset + HEADER_SIZE <= bytes.len() {
            let header = &bytes[offset..offset + HEADER_SIZE];
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            let start = offset + HEADER_SIZE;
            if length == 0 || start + length > bytes.len() {
                warn!(
                    offset,
                    length,
                    file_len = bytes.len(),
                    "truncated or invalid journal record; stopping recovery"
                );
                break;
            }

            let payload = &bytes[start..start + length];
            let actual_crc = crc32fast::hash(payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "CRC mismatch; skipping record"
                );
            } else {
                match bincode::deserialize::<JournalRecord>(payload) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!(offset, error = %e, "failed to decode journal record; skipping")
                    }
                }
            }

            offset = start + length;
        }

        debug!(recovered = records.len(), "journal recovery complete");
        Ok(records)
    }

    /// Atomically replace the journal's contents with `records`.
    ///
    /// The new journal is written to a temporary file next to the current
    /// one and renamed over it, so a crash leaves either the old or the new
    /// journal intact.
    pub fn rewrite(&self, records: &[JournalRecord]) -> StoreResult<()> {
        let mut w = self.writer.lock().expect("journal mutex poisoned");
        w.writer.flush()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        let mut offset = 0u64;
        {
            let mut out = BufWriter::new(tmp.as_file_mut());
            for record in records {
                let payload = encode(record)?;
                write_frame(&mut out, &payload)?;
                offset += (HEADER_SIZE + payload.len()) as u64;
            }
            out.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        w.writer = BufWriter::new(open_append(&self.path)?);
        w.offset = offset;

        debug!(records = records.len(), bytes = offset, "journal rewritten");
        Ok(())
    }

    /// Current write offset.
    pub fn offset(&self) -> u64 {
        self.writer.lock().expect("journal mutex poisoned").offset
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("path", &self.path)
            .field("offset", &self.offset())
            .finish()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
}

fn encode(record: &JournalRecord) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn write_frame<W: Write>(out: &mut W, payload: &[u8]) -> io::Result<()> {
    let length = payload.len() as u32;
    let crc = crc32fast::hash(payload);
    out.write_all(&length.to_le_bytes())?;
    out.write_all(&crc.to_le_bytes())?;
    out.write_all(payload)
}
