use std::io;

use speedy_core::{ItemId, JobResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A job ran to completion; exactly one per enqueued item.
    JobSettled { id: ItemId, result: JobResult },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start conversion runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] io::Error),
    #[error("engine thread has stopped")]
    Disconnected,
}
