//! Dataset store: line-delimited JSON conversations loaded wholesale into memory.
//!
//! Each non-blank line is one [`ConversationRecord`]. Saving writes the records back
//! in load order, one per line, changing nothing but edited message content.

mod record;

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub use record::{ConversationRecord, Message, Role};

use record::RecordError;

/// Errors from loading, saving, or indexing into a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read {origin}: {source}")]
    Read { origin: String, source: io::Error },
    #[error("{origin}, line {line}: invalid JSON: {source}")]
    Json {
        origin: String,
        line: usize,
        source: serde_json::Error,
    },
    #[error("{origin}, line {line}: {reason}")]
    InvalidRecord {
        origin: String,
        line: usize,
        reason: String,
    },
    #[error("{origin} contains no records")]
    Empty { origin: String },
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Row {index} is out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Message {index} is out of range ({len} messages)")]
    MessageOutOfRange { index: usize, len: usize },
}

/// Counts shown by `check` and in the TUI header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub records: usize,
    pub messages: usize,
    pub system: usize,
    pub user: usize,
    pub assistant: usize,
}

impl std::fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} messages (system: {}, user: {}, assistant: {})",
            self.records, self.messages, self.system, self.user, self.assistant
        )
    }
}

/// Ordered, non-empty collection of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<ConversationRecord>,
}

impl Dataset {
    #[cfg(test)]
    pub fn new(records: Vec<ConversationRecord>) -> Self {
        Self { records }
    }

    /// Load a dataset file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let origin = path.display().to_string();
        let file = fs::File::open(path).map_err(|source| DatasetError::Read {
            origin: origin.clone(),
            source,
        })?;
        let dataset = Self::parse(BufReader::new(file), &origin)?;
        log::info!("Loaded {} records from {}", dataset.len(), origin);
        Ok(dataset)
    }

    /// Load from any reader (uploaded content, stdin).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DatasetError> {
        let dataset = Self::parse(reader, "upload")?;
        log::info!("Loaded {} records from upload", dataset.len());
        Ok(dataset)
    }

    fn parse<R: BufRead>(reader: R, origin: &str) -> Result<Self, DatasetError> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| DatasetError::Read {
                origin: origin.to_string(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = ConversationRecord::from_line(&line).map_err(|e| match e {
                RecordError::Json(source) => DatasetError::Json {
                    origin: origin.to_string(),
                    line: idx + 1,
                    source,
                },
                RecordError::Invalid(reason) => DatasetError::InvalidRecord {
                    origin: origin.to_string(),
                    line: idx + 1,
                    reason,
                },
            })?;
            records.push(record);
        }
        let dataset = Self { records };
        if dataset.is_empty() {
            return Err(DatasetError::Empty {
                origin: origin.to_string(),
            });
        }
        Ok(dataset)
    }

    /// Write all records to `path`, replacing it. Uses a temp file + rename.
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let write_err = |source| DatasetError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));

        let mut file = io::BufWriter::new(fs::File::create(&tmp).map_err(write_err)?);
        if let Err(e) = self.write_to(&mut file).and_then(|_| file.flush()) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        drop(file);
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            write_err(e)
        })?;
        log::info!("Saved {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Serialize as JSONL, one record per line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for record in &self.records {
            let line = record
                .to_line()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<&ConversationRecord> {
        self.records.get(index)
    }

    /// Bounds-checked in-place replacement of one message's content.
    pub fn set_message_content(
        &mut self,
        record_index: usize,
        message_index: usize,
        content: String,
    ) -> Result<(), DatasetError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(record_index)
            .ok_or(DatasetError::RowOutOfRange {
                index: record_index,
                len,
            })?;
        let messages = record.messages_mut();
        let len = messages.len();
        let message = messages
            .get_mut(message_index)
            .ok_or(DatasetError::MessageOutOfRange {
                index: message_index,
                len,
            })?;
        message.set_content(content);
        Ok(())
    }

    pub fn stats(&self) -> DatasetStats {
        let mut stats = DatasetStats {
            records: self.records.len(),
            ..Default::default()
        };
        for message in self.records.iter().flat_map(|r| r.messages()) {
            stats.messages += 1;
            match message.role() {
                Role::System => stats.system += 1,
                Role::User => stats.user += 1,
                Role::Assistant => stats.assistant += 1,
            }
        }
        stats
    }
}
