//! Embedding facade for a UI shell: a conversion session wiring the batch
//! registry to the conversion engine, plus configuration and logger setup.
mod config;
pub mod logging;
mod session;

pub use config::SessionConfig;
pub use session::{Session, SessionError};

pub use speedy_core::{
    format_bytes, BatchItem, BatchViewModel, ItemId, ItemRowView, Notice, OutputFile,
    PreviewBytes, SourceFile, Status, SubmitStats, Submission, ACCEPTED_MIME_TYPES,
    SUPPORTED_FORMATS,
};
pub use speedy_engine::{Archive, BundleOutcome, CodecAdapter, WebpCodec};
