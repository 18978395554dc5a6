use std::collections::HashMap;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_info, engine_warn, BATCH_TARGET};
use serde::Serialize;

use crate::naming::{resolve_output, OutputFile, RetrieveError};
use crate::view_model::{BatchViewModel, ItemRowView};
use crate::{BatchItem, ItemId, JobResult, SizeDecision, SourceFile, TransitionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted(ItemId),
    /// Already in the batch; nothing was queued.
    Duplicate(ItemId),
}

impl Submission {
    pub fn id(&self) -> &ItemId {
        match self {
            Submission::Accepted(id) | Submission::Duplicate(id) => id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Submission::Duplicate(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SubmitStats {
    pub accepted: usize,
    pub duplicates: usize,
}

/// Work order for one conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub id: ItemId,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Converted(SizeDecision),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no item {0} in this batch")]
    UnknownItem(ItemId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Cheap handles to an item's buffers, for building previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBytes {
    pub original: Bytes,
    /// What the item currently surfaces, once converted.
    pub output: Option<Bytes>,
}

/// Every item submitted in this session, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchRegistry {
    items: Vec<BatchItem>,
    index: HashMap<ItemId, usize>,
    last_submit: Option<SubmitStats>,
    dirty: bool,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `Pending` item unless a file with the same identity is already
    /// present, in which case the registry is left untouched.
    pub fn submit(&mut self, file: SourceFile) -> Submission {
        let id = file.id();
        if self.index.contains_key(&id) {
            engine_debug!(target: BATCH_TARGET, "Duplicate submission ignored: {}", id);
            return Submission::Duplicate(id);
        }

        engine_info!(
            target: BATCH_TARGET,
            "Accepted {} ({} bytes) as item #{}",
            id.name(),
            id.size(),
            self.items.len() + 1
        );
        self.index.insert(id.clone(), self.items.len());
        self.items.push(BatchItem::new(file));
        self.mark_dirty();
        Submission::Accepted(id)
    }

    /// Moves a pending item to `Converting` and hands out what the job needs.
    pub fn start_conversion(&mut self, id: &ItemId) -> Result<ConversionRequest, RegistryError> {
        let item = self.item_mut(id)?;
        item.begin_conversion()?;
        let request = ConversionRequest {
            id: id.clone(),
            bytes: item.original_bytes().clone(),
        };
        self.mark_dirty();
        Ok(request)
    }

    /// Applies a job's terminal result. A second settlement for the same item,
    /// or one for an item that never started converting, is rejected and leaves
    /// the item as it was.
    pub fn on_job_settled(
        &mut self,
        id: &ItemId,
        result: JobResult,
    ) -> Result<Settlement, RegistryError> {
        let item = self.item_mut(id)?;
        if let Err(err) = item.settle(result) {
            engine_warn!(target: BATCH_TARGET, "Ignoring settlement: {}", err);
            return Err(err.into());
        }

        let settlement = match (item.converted(), item.failure()) {
            (Some(artifact), _) => {
                engine_info!(
                    target: BATCH_TARGET,
                    "Converted {}: {} -> {} bytes ({:?})",
                    id.name(),
                    item.original_size(),
                    artifact.size(),
                    artifact.decision()
                );
                Settlement::Converted(artifact.decision())
            }
            (None, failure) => {
                engine_warn!(
                    target: BATCH_TARGET,
                    "Conversion of {} failed: {}",
                    id.name(),
                    failure.map(|f| f.message.as_str()).unwrap_or("unknown")
                );
                Settlement::Failed
            }
        };
        self.mark_dirty();
        Ok(settlement)
    }

    /// Owned copy of every item in submission order. Buffers are shared, not copied.
    pub fn snapshot(&self) -> Vec<BatchItem> {
        self.items.clone()
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&BatchItem> {
        self.index.get(id).map(|&idx| &self.items[idx])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True while any item is still pending or converting.
    pub fn is_busy(&self) -> bool {
        self.items.iter().any(|item| !item.status().is_terminal())
    }

    pub fn has_eligible(&self) -> bool {
        self.items.iter().any(BatchItem::is_eligible)
    }

    pub fn retrieve(&self, id: &ItemId) -> Result<OutputFile, RetrieveError> {
        let item = self
            .get(id)
            .ok_or_else(|| RetrieveError::UnknownItem(id.clone()))?;
        resolve_output(item)
    }

    pub fn preview(&self, id: &ItemId) -> Option<PreviewBytes> {
        self.get(id).map(|item| PreviewBytes {
            original: item.original_bytes().clone(),
            output: resolve_output(item).ok().map(|file| file.bytes),
        })
    }

    pub fn last_submit(&self) -> Option<SubmitStats> {
        self.last_submit
    }

    pub(crate) fn set_last_submit(&mut self, stats: SubmitStats) {
        self.last_submit = Some(stats);
        self.mark_dirty();
    }

    pub fn view(&self) -> BatchViewModel {
        let items: Vec<ItemRowView> = self.items.iter().map(ItemRowView::from_item).collect();
        BatchViewModel::new(items, self.is_busy(), self.last_submit, self.dirty)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn item_mut(&mut self, id: &ItemId) -> Result<&mut BatchItem, RegistryError> {
        match self.index.get(id) {
            Some(&idx) => Ok(&mut self.items[idx]),
            None => Err(RegistryError::UnknownItem(id.clone())),
        }
    }
}
