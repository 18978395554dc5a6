use std::collections::HashSet;
use std::io::{self, Cursor, Write};

use bytes::Bytes;
use engine_logging::{engine_info, engine_warn, ARCHIVE_TARGET};
use speedy_core::naming::numbered_name;
use speedy_core::{resolve_output, BatchItem, ItemId, OutputFile, DEFAULT_ARCHIVE_NAME};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub file_name: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub item_id: ItemId,
    pub name: String,
    pub size: u64,
    pub uses_original: bool,
}

/// An entry whose preferred name was already taken by an earlier item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedEntry {
    pub item_id: ItemId,
    pub requested: String,
    pub assigned: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Bytes,
    pub entries: Vec<ArchiveEntry>,
    pub renamed: Vec<RenamedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    Archive(Archive),
    /// No converted items. Not a fault; the shell shows a notice instead.
    NothingToBundle,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Bundles every converted item, in batch order, into one zip.
///
/// Failed and unfinished items are skipped. Entry names come from
/// [`resolve_output`], so they match single-item downloads. When two items
/// resolve to the same name (compared case-insensitively), later ones get a
/// ` (n)` suffix and are listed in [`Archive::renamed`]. Entries are stored
/// uncompressed with a fixed timestamp; the same batch always produces the
/// same bytes.
pub fn build_archive(
    items: &[BatchItem],
    options: &ArchiveOptions,
) -> Result<BundleOutcome, ArchiveError> {
    let files: Vec<(&ItemId, OutputFile)> = items
        .iter()
        .filter(|item| item.is_eligible())
        .filter_map(|item| resolve_output(item).ok().map(|file| (item.id(), file)))
        .collect();
    if files.is_empty() {
        engine_info!(target: ARCHIVE_TARGET, "Nothing to bundle");
        return Ok(BundleOutcome::NothingToBundle);
    }

    let entry_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut taken = HashSet::new();
    let mut entries = Vec::with_capacity(files.len());
    let mut renamed = Vec::new();

    for (item_id, file) in files {
        let name = claim_name(&file.name, &mut taken);
        if name != file.name {
            engine_warn!(
                target: ARCHIVE_TARGET,
                "Entry name {} already used, storing {} as {}",
                file.name,
                item_id,
                name
            );
            renamed.push(RenamedEntry {
                item_id: item_id.clone(),
                requested: file.name.clone(),
                assigned: name.clone(),
            });
        }

        writer.start_file(name.as_str(), entry_options)?;
        writer.write_all(&file.bytes)?;
        entries.push(ArchiveEntry {
            item_id: item_id.clone(),
            name,
            size: file.bytes.len() as u64,
            uses_original: file.uses_original,
        });
    }

    let bytes = Bytes::from(writer.finish()?.into_inner());
    engine_info!(
        target: ARCHIVE_TARGET,
        "Built {} with {} entries ({} bytes)",
        options.file_name,
        entries.len(),
        bytes.len()
    );
    Ok(BundleOutcome::Archive(Archive {
        file_name: options.file_name.clone(),
        bytes,
        entries,
        renamed,
    }))
}

fn claim_name(requested: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = requested.to_string();
    let mut n = 1;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = numbered_name(requested, n);
        n += 1;
    }
    candidate
}
