//! Batch conversion core: item identity, per-item state machine, size policy
//! and output naming. Pure and synchronous; jobs run elsewhere.
mod effect;
mod identity;
mod item;
mod msg;
pub mod naming;
mod policy;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice};
pub use identity::{ItemId, SourceFile};
pub use item::{
    BatchItem, ConversionFailure, ConvertedArtifact, EncodedImage, FailureKind, JobResult, Status,
    TransitionError,
};
pub use msg::Msg;
pub use naming::{resolve_output, OutputFile, RetrieveError, DEFAULT_ARCHIVE_NAME};
pub use policy::{decide, SizeDecision};
pub use state::{
    BatchRegistry, ConversionRequest, PreviewBytes, RegistryError, Settlement, SubmitStats,
    Submission,
};
pub use update::update;
pub use view_model::{
    format_bytes, savings_percent, BatchViewModel, ItemRowView, ACCEPTED_MIME_TYPES,
    SUPPORTED_FORMATS,
};
