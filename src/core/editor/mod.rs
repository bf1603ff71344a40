//! Editor session: the loaded dataset, the selected row, and staged message edits.
//!
//! Every operator action is a method on [`Editor`] that runs to completion and leaves
//! the session browsing again. Nothing here knows about the terminal UI.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::core::completion::{CompletionError, CompletionRequest};
use crate::core::dataset::{ConversationRecord, Dataset, DatasetError, Message, Role};
use crate::core::normalize::Normalizer;

/// Instruction offered by default for a rewrite.
pub const DEFAULT_INSTRUCTION: &str = "Migliora la formattazione e la grammatica.";

/// File name offered when loading or saving without a previous path.
pub const DEFAULT_FILE_NAME: &str = "conversations.json";

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("No dataset loaded")]
    NoDataset,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("Rewrite needs a user message right before message {message_index}")]
    RewriteUnavailable { message_index: usize },
    #[error("No file name to save to")]
    NoDestination,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Message a rewrite result is written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteTarget {
    pub row: usize,
    pub message_index: usize,
}

/// A checked rewrite, ready to hand to the completion client.
#[derive(Debug, Clone)]
pub struct RewriteJob {
    pub target: RewriteTarget,
    pub request: CompletionRequest,
}

#[derive(Debug, Default)]
pub struct Editor {
    dataset: Option<Dataset>,
    source: Option<PathBuf>,
    row: usize,
    /// Staged text per message index of the current row.
    buffers: BTreeMap<usize, String>,
    dirty: bool,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, replacing the current dataset. On error the session is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<(), EditorError> {
        let dataset = Dataset::load(path)?;
        self.replace_dataset(dataset, Some(path.to_path_buf()));
        Ok(())
    }

    /// Load uploaded content. The session has no source path until the first save.
    pub fn load_from_reader<R: BufRead>(&mut self, reader: R) -> Result<(), EditorError> {
        let dataset = Dataset::from_reader(reader)?;
        self.replace_dataset(dataset, None);
        Ok(())
    }

    fn replace_dataset(&mut self, dataset: Dataset, source: Option<PathBuf>) {
        self.dataset = Some(dataset);
        self.source = source;
        self.row = 0;
        self.buffers.clear();
        self.dirty = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Selected row (always in range while a dataset is loaded).
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn row_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::len)
    }

    pub fn record(&self) -> Option<&ConversationRecord> {
        self.dataset.as_ref()?.record(self.row)
    }

    /// Messages of the selected row; empty before load.
    pub fn messages(&self) -> &[Message] {
        self.record()
            .map(ConversationRecord::messages)
            .unwrap_or_default()
    }

    /// Select `index`, clamped to the dataset. Staged edits of the old row are dropped.
    pub fn select_row(&mut self, index: usize) -> usize {
        let clamped = index.min(self.row_count().saturating_sub(1));
        if clamped != self.row {
            self.buffers.clear();
            self.row = clamped;
        }
        self.row
    }

    pub fn next_row(&mut self) -> usize {
        self.select_row(self.row.saturating_add(1))
    }

    pub fn previous_row(&mut self) -> usize {
        self.select_row(self.row.saturating_sub(1))
    }

    /// Text shown in the edit box: the staged buffer, or the committed content.
    pub fn staged_text(&self, message_index: usize) -> Option<&str> {
        self.buffers
            .get(&message_index)
            .map(String::as_str)
            .or_else(|| self.messages().get(message_index).map(Message::content))
    }

    pub fn has_staged_edit(&self, message_index: usize) -> bool {
        self.buffers.contains_key(&message_index)
    }

    /// Stage `text` for a message without committing it.
    pub fn edit_message(&mut self, message_index: usize, text: String) -> Result<(), EditorError> {
        self.check_message(message_index)?;
        self.buffers.insert(message_index, text);
        Ok(())
    }

    pub fn discard_edit(&mut self, message_index: usize) {
        self.buffers.remove(&message_index);
    }

    /// Write the staged text into the dataset.
    pub fn commit_update(&mut self, message_index: usize) -> Result<(), EditorError> {
        let text = self.staged_owned(message_index)?;
        self.commit(message_index, text)
    }

    /// Apply `normalizer` to the staged text and commit the result.
    pub fn commit_normalize(
        &mut self,
        message_index: usize,
        normalizer: Normalizer,
    ) -> Result<(), EditorError> {
        let text = normalizer.apply(&self.staged_owned(message_index)?);
        self.commit(message_index, text)
    }

    /// A rewrite needs the message right before `message_index` to be a user message.
    /// The first message is never eligible.
    pub fn can_rewrite(&self, message_index: usize) -> bool {
        let messages = self.messages();
        message_index > 0
            && message_index < messages.len()
            && messages[message_index - 1].role() == Role::User
    }

    /// Check eligibility and snapshot what the completion needs.
    pub fn rewrite_request(
        &self,
        message_index: usize,
        instruction: &str,
    ) -> Result<RewriteJob, EditorError> {
        self.check_message(message_index)?;
        if !self.can_rewrite(message_index) {
            return Err(EditorError::RewriteUnavailable { message_index });
        }
        let messages = self.messages();
        let answer = self
            .staged_text(message_index)
            .unwrap_or_default()
            .to_string();
        Ok(RewriteJob {
            target: RewriteTarget {
                row: self.row,
                message_index,
            },
            request: CompletionRequest {
                question: messages[message_index - 1].content().to_string(),
                answer,
                conversation: messages.to_vec(),
                instruction: instruction.to_string(),
            },
        })
    }

    /// Commit a finished completion, or report its failure leaving the message as is.
    pub fn finish_rewrite(
        &mut self,
        target: RewriteTarget,
        result: Result<String, CompletionError>,
    ) -> Result<(), EditorError> {
        let text = result.inspect_err(|e| log::warn!("Rewrite failed: {}", e))?;
        let dataset = self.dataset.as_mut().ok_or(EditorError::NoDataset)?;
        dataset.set_message_content(target.row, target.message_index, text)?;
        if target.row == self.row {
            self.buffers.remove(&target.message_index);
        }
        self.dirty = true;
        log::info!(
            "Rewrote message {} of row {}",
            target.message_index,
            target.row
        );
        Ok(())
    }

    /// Rewrite a message through `client` and commit the answer.
    #[cfg(test)]
    pub async fn commit_rewrite<B: crate::core::completion::ChatBackend>(
        &mut self,
        message_index: usize,
        instruction: &str,
        client: &crate::core::completion::CompletionClient<B>,
    ) -> Result<(), EditorError> {
        let job = self.rewrite_request(message_index, instruction)?;
        let result = client.improve(&job.request).await;
        self.finish_rewrite(job.target, result)
    }

    /// Save to `destination`, or back to the source path. The saved path becomes the source.
    pub fn save(&mut self, destination: Option<&Path>) -> Result<PathBuf, EditorError> {
        let dataset = self.dataset.as_ref().ok_or(EditorError::NoDataset)?;
        let path = destination
            .or(self.source.as_deref())
            .ok_or(EditorError::NoDestination)?
            .to_path_buf();
        dataset.save(&path)?;
        self.source = Some(path.clone());
        self.dirty = false;
        Ok(path)
    }

    fn check_message(&self, message_index: usize) -> Result<(), EditorError> {
        if self.dataset.is_none() {
            return Err(EditorError::NoDataset);
        }
        let len = self.messages().len();
        if message_index >= len {
            return Err(DatasetError::MessageOutOfRange {
                index: message_index,
                len,
            }
            .into());
        }
        Ok(())
    }

    fn staged_owned(&self, message_index: usize) -> Result<String, EditorError> {
        self.check_message(message_index)?;
        Ok(self
            .staged_text(message_index)
            .unwrap_or_default()
            .to_string())
    }

    fn commit(&mut self, message_index: usize, text: String) -> Result<(), EditorError> {
        let row = self.row;
        let dataset = self.dataset.as_mut().ok_or(EditorError::NoDataset)?;
        dataset.set_message_content(row, message_index, text)?;
        self.buffers.remove(&message_index);
        self.dirty = true;
        Ok(())
    }
}
