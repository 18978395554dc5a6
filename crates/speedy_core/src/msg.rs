use crate::{ItemId, JobResult, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User dropped or picked files.
    FilesSubmitted(Vec<SourceFile>),
    /// A conversion job finished, successfully or not.
    JobSettled { id: ItemId, result: JobResult },
    /// User clicked "Download All".
    ArchiveClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    NoOp,
}
