use async_trait::async_trait;
use bytes::Bytes;
use image::ImageError;

/// Decoded RGBA8 pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Non-empty, and the buffer length matches the dimensions.
    pub fn is_usable(&self) -> bool {
        let expected = self.width as usize * self.height as usize * 4;
        expected > 0 && self.rgba.len() == expected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported image format: {0}")]
    Unsupported(String),
    #[error("malformed image data: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("pixel surface unavailable")]
    SurfaceUnavailable,
    #[error("encoder returned no data")]
    EmptyOutput,
    #[error("encoder failed: {0}")]
    Encoder(String),
}

/// Decode/re-encode capability the conversion jobs are built on.
#[async_trait]
pub trait CodecAdapter: Send + Sync {
    /// Extension of the format `encode` produces, without the dot.
    fn target_extension(&self) -> &str;

    async fn decode(&self, bytes: Bytes) -> Result<PixelSurface, DecodeError>;

    /// `quality` is on a 0.0..=1.0 scale.
    async fn encode(&self, surface: PixelSurface, quality: f32) -> Result<Bytes, EncodeError>;
}

/// Lossy WebP through libwebp; sources are read with the `image` crate.
/// Both halves run on tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpCodec;

impl WebpCodec {
    pub fn decode_blocking(bytes: &[u8]) -> Result<PixelSurface, DecodeError> {
        let decoded = image::load_from_memory(bytes).map_err(map_image_error)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(PixelSurface::new(width, height, rgba.into_raw()))
    }

    pub fn encode_blocking(surface: &PixelSurface, quality: f32) -> Result<Vec<u8>, EncodeError> {
        if !surface.is_usable() {
            return Err(EncodeError::SurfaceUnavailable);
        }
        let encoder = webp::Encoder::from_rgba(&surface.rgba, surface.width, surface.height);
        let memory = encoder
            .encode_simple(false, quality.clamp(0.0, 1.0) * 100.0)
            .map_err(|err| EncodeError::Encoder(format!("{err:?}")))?;
        if memory.is_empty() {
            return Err(EncodeError::EmptyOutput);
        }
        Ok(memory.to_vec())
    }
}

#[async_trait]
impl CodecAdapter for WebpCodec {
    fn target_extension(&self) -> &str {
        "webp"
    }

    async fn decode(&self, bytes: Bytes) -> Result<PixelSurface, DecodeError> {
        tokio::task::spawn_blocking(move || Self::decode_blocking(&bytes))
            .await
            .map_err(|err| DecodeError::Malformed(format!("decoder task failed: {err}")))?
    }

    async fn encode(&self, surface: PixelSurface, quality: f32) -> Result<Bytes, EncodeError> {
        let encoded = tokio::task::spawn_blocking(move || Self::encode_blocking(&surface, quality))
            .await
            .map_err(|err| EncodeError::Encoder(format!("encoder task failed: {err}")))??;
        Ok(Bytes::from(encoded))
    }
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(inner) => DecodeError::Unsupported(inner.to_string()),
        other => DecodeError::Malformed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodeError, PixelSurface, WebpCodec};

    #[test]
    fn surface_usability_checks_dimensions() {
        assert!(PixelSurface::new(2, 1, vec![0; 8]).is_usable());
        assert!(!PixelSurface::new(2, 1, vec![0; 7]).is_usable());
        assert!(!PixelSurface::new(0, 0, Vec::new()).is_usable());
    }

    #[test]
    fn unusable_surface_is_not_encoded() {
        let surface = PixelSurface::new(4, 4, vec![0; 3]);
        assert_eq!(
            WebpCodec::encode_blocking(&surface, 0.85),
            Err(EncodeError::SurfaceUnavailable)
        );
    }
}
