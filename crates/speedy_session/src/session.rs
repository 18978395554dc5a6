use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_error, engine_info};
use speedy_core::{
    update, BatchItem, BatchRegistry, BatchViewModel, ConversionFailure, Effect, FailureKind,
    ItemId, Msg, Notice, OutputFile, PreviewBytes, RetrieveError, SourceFile, SubmitStats,
    Submission,
};
use speedy_engine::{
    build_archive, read_source_file, ArchiveError, ArchiveOptions, AtomicFileWriter,
    BundleOutcome, CodecAdapter, EngineError, EngineEvent, EngineHandle, PersistError, WebpCodec,
};

use crate::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("conversions still running; wait for the batch to finish")]
    Busy,
    #[error(transparent)]
    Retrieve(#[from] RetrieveError),
    #[error("could not build archive: {0}")]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// One conversion session as seen by the shell: the batch registry plus the
/// engine running its jobs.
///
/// Engine results are applied only when the shell calls [`Session::pump`] or
/// [`Session::wait_idle`], so every registry change happens on the caller's
/// thread, one message at a time.
pub struct Session {
    registry: BatchRegistry,
    engine: EngineHandle,
    archive_options: ArchiveOptions,
    notices: Vec<Notice>,
}

impl Session {
    /// Session converting to WebP.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_codec(config, Arc::new(WebpCodec))
    }

    pub fn with_codec(
        config: SessionConfig,
        codec: Arc<dyn CodecAdapter>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let engine = EngineHandle::new(codec, config.conversion_settings())?;
        engine_info!(
            "Session started (quality {}, timeout {:?})",
            config.quality,
            config.job_timeout
        );
        Ok(Self {
            registry: BatchRegistry::new(),
            engine,
            archive_options: config.archive_options(),
            notices: Vec::new(),
        })
    }

    /// Queues one file for conversion. A file already in the batch is
    /// reported as a duplicate and changes nothing.
    pub fn submit(&mut self, file: SourceFile) -> Submission {
        let id = file.id();
        if self.registry.get(&id).is_some() {
            engine_debug!("Duplicate submission ignored: {}", id);
            return Submission::Duplicate(id);
        }
        self.dispatch(Msg::FilesSubmitted(vec![file]));
        Submission::Accepted(id)
    }

    pub fn submit_all(&mut self, files: Vec<SourceFile>) -> SubmitStats {
        if files.is_empty() {
            return SubmitStats::default();
        }
        self.dispatch(Msg::FilesSubmitted(files));
        self.registry.last_submit().unwrap_or_default()
    }

    /// Reads files from disk and submits them. Nothing is submitted if any
    /// path cannot be read.
    pub fn submit_paths<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
    ) -> Result<SubmitStats, SessionError> {
        let files = paths
            .iter()
            .map(|path| read_source_file(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.submit_all(files))
    }

    /// Applies every engine result that has arrived. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.engine.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Applies engine results until nothing is pending or converting.
    /// Returns `false` if `timeout` ran out first. If the engine has stopped,
    /// items still waiting on it are settled as failed.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.registry.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.engine.recv_timeout(remaining) {
                Ok(Some(event)) => self.apply(event),
                Ok(None) => {}
                Err(err) => {
                    engine_error!("Engine stopped while items were converting: {}", err);
                    self.fail_unsettled();
                    return !self.registry.is_busy();
                }
            }
        }
        true
    }

    pub fn is_busy(&self) -> bool {
        self.registry.is_busy()
    }

    pub fn snapshot(&self) -> Vec<BatchItem> {
        self.registry.snapshot()
    }

    pub fn registry(&self) -> &BatchRegistry {
        &self.registry
    }

    pub fn view(&self) -> BatchViewModel {
        self.registry.view()
    }

    /// See [`BatchRegistry::consume_dirty`].
    pub fn consume_dirty(&mut self) -> bool {
        self.registry.consume_dirty()
    }

    pub fn preview(&self, id: &ItemId) -> Option<PreviewBytes> {
        self.registry.preview(id)
    }

    /// Notices raised since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Name and bytes for one converted item.
    pub fn retrieve(&self, id: &ItemId) -> Result<OutputFile, SessionError> {
        Ok(self.registry.retrieve(id)?)
    }

    /// Bundles all converted items. Refused while any conversion is still
    /// running; a batch without converted items yields `NothingToBundle` and
    /// raises the matching notice.
    pub fn build_archive(&mut self) -> Result<BundleOutcome, SessionError> {
        if self.registry.is_busy() {
            return Err(SessionError::Busy);
        }
        if !self.dispatch(Msg::ArchiveClicked) {
            return Ok(BundleOutcome::NothingToBundle);
        }
        Ok(build_archive(self.registry.items(), &self.archive_options)?)
    }

    /// Builds the archive and writes it into `dir`. Returns `None` when there
    /// was nothing to bundle.
    pub fn save_archive(&mut self, dir: &Path) -> Result<Option<PathBuf>, SessionError> {
        match self.build_archive()? {
            BundleOutcome::Archive(archive) => {
                let writer = AtomicFileWriter::new(dir.to_path_buf());
                let path = writer.write(&archive.file_name, &archive.bytes)?;
                engine_info!("Saved {} entries to {:?}", archive.entries.len(), path);
                Ok(Some(path))
            }
            BundleOutcome::NothingToBundle => Ok(None),
        }
    }

    /// Writes one converted item into `dir` under its output name.
    pub fn save_item(&self, dir: &Path, id: &ItemId) -> Result<PathBuf, SessionError> {
        let file = self.retrieve(id)?;
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        Ok(writer.write(&file.name, &file.bytes)?)
    }

    fn fail_unsettled(&mut self) {
        let unsettled: Vec<ItemId> = self
            .registry
            .items()
            .iter()
            .filter(|item| !item.status().is_terminal())
            .map(|item| item.id().clone())
            .collect();
        for id in unsettled {
            self.dispatch(Msg::JobSettled {
                id,
                result: Err(engine_gone()),
            });
        }
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::JobSettled { id, result } => {
                self.dispatch(Msg::JobSettled { id, result });
            }
        }
    }

    /// Runs `msg` through the core and carries out the effects. Returns
    /// whether an archive build was requested.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let registry = std::mem::take(&mut self.registry);
        let (registry, effects) = update(registry, msg);
        self.registry = registry;
        self.run_effects(effects)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> bool {
        let mut archive_requested = false;
        for effect in effects {
            match effect {
                Effect::Convert { id, bytes } => {
                    engine_debug!("Enqueue {} ({} bytes)", id, bytes.len());
                    if let Err(err) = self.engine.enqueue(id.clone(), bytes) {
                        // Without an engine the item would stay `Converting` forever.
                        engine_error!("Could not enqueue {}: {}", id, err);
                        self.dispatch(Msg::JobSettled {
                            id,
                            result: Err(engine_gone()),
                        });
                    }
                }
                Effect::BuildArchive => archive_requested = true,
                Effect::Notify(notice) => {
                    engine_info!("{}: {}", notice.title(), notice.description());
                    self.notices.push(notice);
                }
            }
        }
        archive_requested
    }
}

fn engine_gone() -> ConversionFailure {
    ConversionFailure::new(FailureKind::Internal, "Conversion engine is not running")
}
