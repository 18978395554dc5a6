use bytes::Bytes;

use crate::{BatchItem, ItemId, Status};

/// File name used when the whole batch is downloaded as one archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "WebP_Speedy_Images.zip";

const FALLBACK_NAME: &str = "image";

/// The name and bytes an eligible item surfaces, for download or bundling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub bytes: Bytes,
    pub uses_original: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrieveError {
    #[error("no item {0} in this batch")]
    UnknownItem(ItemId),
    #[error("item {id} is {status:?}; only converted items can be retrieved")]
    NotReady { id: ItemId, status: Status },
}

/// Picks the name and bytes for a converted item, honouring the size decision
/// cached on it. Archive assembly and single downloads both go through here.
pub fn resolve_output(item: &BatchItem) -> Result<OutputFile, RetrieveError> {
    let Some(artifact) = item.converted() else {
        return Err(RetrieveError::NotReady {
            id: item.id().clone(),
            status: item.status(),
        });
    };

    let name = sanitize_name(item.name());
    if artifact.uses_original() {
        return Ok(OutputFile {
            name,
            bytes: item.original_bytes().clone(),
            uses_original: true,
        });
    }

    let (stem, _) = split_extension(&name);
    Ok(OutputFile {
        name: format!("{stem}.{}", artifact.extension()),
        bytes: artifact.bytes().clone(),
        uses_original: false,
    })
}

/// Splits at the last `.`. A name without one, or whose only `.` leads the
/// name (`.hidden`), is all stem.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Inserts ` (n)` before the extension: `photo.webp` -> `photo (2).webp`.
pub fn numbered_name(name: &str, n: usize) -> String {
    match split_extension(name) {
        (stem, Some(ext)) => format!("{stem} ({n}).{ext}"),
        (stem, None) => format!("{stem} ({n})"),
    }
}

/// Makes a user-supplied file name safe to use as an archive entry or a file
/// in an output directory. Ordinary names come back unchanged.
pub fn sanitize_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    if cleaned.trim_matches(&['.', ' '][..]).is_empty() {
        return FALLBACK_NAME.to_string();
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | '\0'..='\u{1F}' | '\u{7F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_split_uses_last_dot() {
        assert_eq!(split_extension("photo.png"), ("photo", Some("png")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension("README"), ("README", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("photo."), ("photo", Some("")));
    }

    #[test]
    fn numbered_name_keeps_extension() {
        assert_eq!(numbered_name("photo.webp", 1), "photo (1).webp");
        assert_eq!(numbered_name("scan", 3), "scan (3)");
    }

    #[test]
    fn sanitize_leaves_ordinary_names_alone() {
        assert_eq!(sanitize_name("Holiday 2024 (final).JPG"), "Holiday 2024 (final).JPG");
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_name("../../etc/passwd.png"), ".._.._etc_passwd.png");
        assert_eq!(sanitize_name("dir\\x.png"), "dir_x.png");
        assert_eq!(sanitize_name("tab\there.png"), "tab_here.png");
    }

    #[test]
    fn degenerate_names_fall_back() {
        assert_eq!(sanitize_name(""), "image");
        assert_eq!(sanitize_name(".."), "image");
        assert_eq!(sanitize_name(" . "), "image");
    }
}
