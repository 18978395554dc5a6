use serde::Serialize;

use crate::{BatchItem, Status, SubmitStats};

/// Formats the shell's file picker should offer. Each has a decoder behind
/// `WebpCodec`; AVIF is left out because no AVIF decoder is built in.
pub const SUPPORTED_FORMATS: [&str; 6] = ["JPG", "PNG", "GIF", "BMP", "TIFF", "WEBP"];
pub const ACCEPTED_MIME_TYPES: &str =
    "image/jpeg,image/png,image/gif,image/bmp,image/tiff,image/webp";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchViewModel {
    pub items: Vec<ItemRowView>,
    pub item_count: usize,
    pub busy: bool,
    /// The "download all" action is offered only when this is set.
    pub can_download_all: bool,
    pub total_original_bytes: u64,
    pub total_output_bytes: u64,
    pub last_submit: Option<SubmitStats>,
    pub dirty: bool,
}

impl BatchViewModel {
    pub(crate) fn new(
        items: Vec<ItemRowView>,
        busy: bool,
        last_submit: Option<SubmitStats>,
        dirty: bool,
    ) -> Self {
        let eligible = items.iter().filter(|row| row.output_size.is_some());
        let total_output_bytes = eligible.clone().filter_map(|row| row.output_size).sum();
        let can_download_all = !busy && eligible.count() > 0;
        Self {
            item_count: items.len(),
            total_original_bytes: items.iter().map(|row| row.original_size).sum(),
            total_output_bytes,
            busy,
            can_download_all,
            last_submit,
            dirty,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRowView {
    /// Display key, `<name>-<last_modified>-<size>`.
    pub id: String,
    pub name: String,
    pub status: Status,
    pub original_size: u64,
    pub output_size: Option<u64>,
    pub uses_original: bool,
    pub savings_percent: Option<u8>,
    pub error: Option<String>,
}

impl ItemRowView {
    pub(crate) fn from_item(item: &BatchItem) -> Self {
        let artifact = item.converted();
        let uses_original = artifact.is_some_and(|a| a.uses_original());
        let savings_percent = artifact
            .filter(|a| !a.uses_original())
            .and_then(|a| savings_percent(item.original_size(), a.size()));
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            status: item.status(),
            original_size: item.original_size(),
            output_size: item.output_size(),
            uses_original,
            savings_percent,
            error: item.error_reason().map(str::to_string),
        }
    }
}

/// Percentage saved, only when the converted output is strictly smaller.
pub fn savings_percent(original: u64, converted: u64) -> Option<u8> {
    if original == 0 || converted >= original {
        return None;
    }
    let saved = (original - converted) as f64 / original as f64 * 100.0;
    Some(saved.round() as u8)
}

/// Human-readable size with 1024-based units, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let mut text = format!("{value:.decimals$}");
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{text} {}", UNITS[unit])
}
