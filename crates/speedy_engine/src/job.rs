use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_warn, BATCH_TARGET};
use speedy_core::{ConversionFailure, EncodedImage, ItemId, JobResult};

use crate::codec::CodecAdapter;

/// Quality handed to the encoder unless configured otherwise (0.0..=1.0).
pub const DEFAULT_QUALITY: f32 = 0.85;
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSettings {
    pub quality: f32,
    /// `None` lets a stuck codec call hold its item in `Converting` forever.
    pub timeout: Option<Duration>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            timeout: Some(DEFAULT_JOB_TIMEOUT),
        }
    }
}

/// Runs one conversion to completion. Never fails outward: every problem ends
/// up in the returned `JobResult`.
pub async fn run_conversion(
    codec: &dyn CodecAdapter,
    id: &ItemId,
    bytes: Bytes,
    settings: &ConversionSettings,
) -> JobResult {
    engine_debug!(target: BATCH_TARGET, "Converting {} ({} bytes)", id, bytes.len());
    let job = convert(codec, bytes, settings.quality);
    let result = match settings.timeout {
        Some(limit) => match tokio::time::timeout(limit, job).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ConversionFailure::timeout(limit)),
        },
        None => job.await,
    };

    match &result {
        Ok(encoded) => engine_debug!(
            target: BATCH_TARGET,
            "Encoded {} to {} bytes of {}",
            id,
            encoded.bytes.len(),
            encoded.extension
        ),
        Err(failure) => engine_warn!(target: BATCH_TARGET, "Job {} failed: {}", id, failure),
    }
    result
}

async fn convert(codec: &dyn CodecAdapter, bytes: Bytes, quality: f32) -> JobResult {
    let surface = codec
        .decode(bytes)
        .await
        .map_err(ConversionFailure::decode)?;
    let encoded = codec
        .encode(surface, quality)
        .await
        .map_err(ConversionFailure::encode)?;
    Ok(EncodedImage::new(encoded, codec.target_extension()))
}
