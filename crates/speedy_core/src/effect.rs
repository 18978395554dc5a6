use bytes::Bytes;

use crate::ItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a conversion job for an item that is now `Converting`.
    Convert { id: ItemId, bytes: Bytes },
    /// Bundle every converted item into one archive.
    BuildArchive,
    Notify(Notice),
}

/// Short user-facing messages, shown as toasts by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Conversion made the file larger, so the original is kept.
    NotOptimal { name: String },
    NothingToBundle,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::NotOptimal { .. } => "Conversion not optimal",
            Notice::NothingToBundle => "No images to download",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Notice::NotOptimal { name } => {
                format!("{name} is larger after conversion. Original will be used.")
            }
            Notice::NothingToBundle => "Please convert some images first.".to_string(),
        }
    }
}
