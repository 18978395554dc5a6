use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_error, engine_info, BATCH_TARGET};
use speedy_core::{ConversionFailure, FailureKind, ItemId};

use crate::codec::CodecAdapter;
use crate::job::{run_conversion, ConversionSettings};
use crate::{EngineError, EngineEvent};

enum EngineCommand {
    Convert { id: ItemId, bytes: Bytes },
}

/// Runs conversion jobs on a background tokio runtime. Each enqueued item gets
/// its own task; results come back as [`EngineEvent`]s in completion order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        codec: Arc<dyn CodecAdapter>,
        settings: ConversionSettings,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .thread_name("speedy-codec")
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("speedy-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let codec = codec.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(handle_command(codec, command, settings, event_tx));
                }
                engine_info!(target: BATCH_TARGET, "Engine shutting down");
                runtime.shutdown_background();
            })
            .map_err(EngineError::Thread)?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn enqueue(&self, id: ItemId, bytes: Bytes) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Convert { id, bytes })
            .map_err(|_| EngineError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means the wait
    /// ran out; an error means the engine thread is gone and nothing more
    /// will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}

async fn handle_command(
    codec: Arc<dyn CodecAdapter>,
    command: EngineCommand,
    settings: ConversionSettings,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Convert { id, bytes } => {
            // A panicking codec must still settle its item.
            let job_id = id.clone();
            let job = tokio::spawn(async move {
                run_conversion(codec.as_ref(), &job_id, bytes, &settings).await
            });
            let result = match job.await {
                Ok(result) => result,
                Err(err) => {
                    engine_error!(target: BATCH_TARGET, "Job {} aborted: {}", id, err);
                    Err(ConversionFailure::new(
                        FailureKind::Internal,
                        "Conversion crashed unexpectedly",
                    ))
                }
            };
            if event_tx.send(EngineEvent::JobSettled { id, result }).is_err() {
                engine_debug!(target: BATCH_TARGET, "Result dropped, session is gone");
            }
        }
    }
}
