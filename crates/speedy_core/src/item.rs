use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use crate::{decide, ItemId, SizeDecision, SourceFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Pending,
    Converting,
    Converted,
    Failed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Converted | Status::Failed)
    }

    /// Forward-only lifecycle: `Pending -> Converting -> {Converted, Failed}`.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Converting)
                | (Status::Converting, Status::Converted)
                | (Status::Converting, Status::Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    /// The source could not be read or its format is unsupported.
    Decode,
    /// The decoded surface could not be turned into the target format.
    Encode,
    Timeout,
    Internal,
}

/// Why a conversion job failed. Recorded on the item, shown inline by the shell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ConversionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Self::new(FailureKind::Decode, format!("Could not read image: {cause}"))
    }

    pub fn encode(cause: impl std::fmt::Display) -> Self {
        Self::new(FailureKind::Encode, format!("Could not encode image: {cause}"))
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("Conversion timed out after {}s", limit.as_secs()),
        )
    }
}

/// Output of a successful conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Bytes,
    /// Extension of the target format, without the leading dot.
    pub extension: String,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Bytes>, extension: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            extension: extension.into(),
        }
    }
}

pub type JobResult = Result<EncodedImage, ConversionFailure>;

/// Converted output plus the size decision taken when the job settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArtifact {
    bytes: Bytes,
    extension: String,
    decision: SizeDecision,
}

impl ConvertedArtifact {
    pub(crate) fn settle(original_size: u64, encoded: EncodedImage) -> Self {
        let decision = decide(original_size, encoded.bytes.len() as u64);
        Self {
            bytes: encoded.bytes,
            extension: encoded.extension,
            decision,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn decision(&self) -> SizeDecision {
        self.decision
    }

    pub fn uses_original(&self) -> bool {
        self.decision == SizeDecision::UseOriginal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemState {
    Pending,
    Converting,
    Converted(ConvertedArtifact),
    Failed(ConversionFailure),
}

impl ItemState {
    fn status(&self) -> Status {
        match self {
            ItemState::Pending => Status::Pending,
            ItemState::Converting => Status::Converting,
            ItemState::Converted(_) => Status::Converted,
            ItemState::Failed(_) => Status::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition for {id}: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub id: ItemId,
    pub from: Status,
    pub to: Status,
}

/// One submitted file and its conversion state. Only the registry mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    id: ItemId,
    original: Bytes,
    state: ItemState,
}

impl BatchItem {
    pub(crate) fn new(file: SourceFile) -> Self {
        Self {
            id: file.id(),
            original: file.bytes,
            state: ItemState::Pending,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn original_bytes(&self) -> &Bytes {
        &self.original
    }

    pub fn original_size(&self) -> u64 {
        self.original.len() as u64
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn converted(&self) -> Option<&ConvertedArtifact> {
        match &self.state {
            ItemState::Converted(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ConversionFailure> {
        match &self.state {
            ItemState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.failure().map(|failure| failure.message.as_str())
    }

    /// Converted items go into archives and may be retrieved.
    pub fn is_eligible(&self) -> bool {
        self.status() == Status::Converted
    }

    /// Size of whatever this item surfaces: the original when the size
    /// policy kept it, the converted artifact otherwise.
    pub fn output_size(&self) -> Option<u64> {
        self.converted().map(|artifact| {
            if artifact.uses_original() {
                self.original_size()
            } else {
                artifact.size()
            }
        })
    }

    pub(crate) fn begin_conversion(&mut self) -> Result<(), TransitionError> {
        self.advance(ItemState::Converting)
    }

    pub(crate) fn settle(&mut self, result: JobResult) -> Result<(), TransitionError> {
        let next = match result {
            Ok(encoded) => {
                ItemState::Converted(ConvertedArtifact::settle(self.original_size(), encoded))
            }
            Err(failure) => ItemState::Failed(failure),
        };
        self.advance(next)
    }

    fn advance(&mut self, next: ItemState) -> Result<(), TransitionError> {
        let from = self.status();
        let to = next.status();
        if !from.can_transition_to(to) {
            return Err(TransitionError {
                id: self.id.clone(),
                from,
                to,
            });
        }
        self.state = next;
        Ok(())
    }
}
