//! Conversion engine: codec adapter, job runner, archive assembly and file output.
mod archive;
mod codec;
mod engine;
mod job;
mod persist;
mod types;

pub use archive::{
    build_archive, Archive, ArchiveEntry, ArchiveError, ArchiveOptions, BundleOutcome,
    RenamedEntry,
};
pub use codec::{CodecAdapter, DecodeError, EncodeError, PixelSurface, WebpCodec};
pub use engine::EngineHandle;
pub use job::{run_conversion, ConversionSettings, DEFAULT_JOB_TIMEOUT, DEFAULT_QUALITY};
pub use persist::{ensure_output_dir, read_source_file, AtomicFileWriter, PersistError};
pub use types::{EngineError, EngineEvent};
