/// Shared data structures for the application state
///
/// These types describe one uploaded file and its print configuration,
/// and flow between the loader, the store, the preview resolver and the
/// batch request.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Identity of an entry in the store, stable for the entry's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// Print color mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Color,
    Bw,
}

impl ColorMode {
    pub const ALL: [ColorMode; 2] = [ColorMode::Color, ColorMode::Bw];

    /// Value sent to the upload service
    pub fn as_wire(&self) -> &'static str {
        match self {
            ColorMode::Color => "color",
            ColorMode::Bw => "bw",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Color => write!(f, "Color Printing"),
            ColorMode::Bw => write!(f, "Black & White"),
        }
    }
}

/// Paper size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageType {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageType {
    pub const ALL: [PageType; 3] = [PageType::A4, PageType::Letter, PageType::Legal];

    pub fn as_wire(&self) -> &'static str {
        match self {
            PageType::A4 => "A4",
            PageType::Letter => "Letter",
            PageType::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::A4 => write!(f, "A4 (210 × 297mm)"),
            PageType::Letter => write!(f, "Letter (8.5 × 11in)"),
            PageType::Legal => write!(f, "Legal (8.5 × 14in)"),
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Number of copies; never below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(u32);

impl Quantity {
    /// Build a quantity, clamping anything below 1 up to 1
    pub fn new(value: u32) -> Self {
        Quantity(value.max(1))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Quantity(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Quantity::new(self.0.saturating_sub(1))
    }

    /// "1 copy", "3 copies"
    pub fn label(&self) -> String {
        if self.0 > 1 {
            format!("{} copies", self.0)
        } else {
            format!("{} copy", self.0)
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity(1)
    }
}

/// Default color/paper/orientation applied to every file on a global save.
/// Quantity is always per-file and is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub color: ColorMode,
    pub page_type: PageType,
    pub orientation: Orientation,
}

/// A partial update to one entry's settings. `None` fields are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    pub color: Option<ColorMode>,
    pub page_type: Option<PageType>,
    pub orientation: Option<Orientation>,
    /// Raw requested copy count; clamped to at least 1 when applied
    pub quantity: Option<u32>,
}

/// SHA-256 of a file's bytes, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Fingerprint(format!("{:x}", Sha256::digest(bytes)))
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The raw file as it was added: name, MIME type and bytes.
/// Immutable once added; cloning shares the bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: Arc::from(bytes),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Images are displayed directly without remote conversion
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// A file that has been read and fingerprinted, ready to enter the store
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub payload: FilePayload,
    pub fingerprint: Fingerprint,
}

impl LoadedFile {
    pub fn new(payload: FilePayload) -> Self {
        let fingerprint = Fingerprint::of(&payload.bytes);
        Self { payload, fingerprint }
    }
}

/// One uploaded file plus its print configuration
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: EntryId,
    pub payload: FilePayload,
    pub fingerprint: Fingerprint,
    /// Locally resolvable handle for inline display of the raw bytes
    pub preview_handle: iced::widget::image::Handle,
    pub color: ColorMode,
    pub page_type: PageType,
    pub orientation: Orientation,
    pub quantity: Quantity,
}

impl FileEntry {
    /// Create an entry with default print settings
    pub fn new(id: EntryId, file: LoadedFile) -> Self {
        let preview_handle = iced::widget::image::Handle::from_bytes(file.payload.bytes.to_vec());
        Self {
            id,
            payload: file.payload,
            fingerprint: file.fingerprint,
            preview_handle,
            color: ColorMode::default(),
            page_type: PageType::default(),
            orientation: Orientation::default(),
            quantity: Quantity::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.payload.name
    }

    /// Apply only the fields present in the patch
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(page_type) = patch.page_type {
            self.page_type = page_type;
        }
        if let Some(orientation) = patch.orientation {
            self.orientation = orientation;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = Quantity::new(quantity);
        }
    }

    /// Overwrite color/paper/orientation; quantity is untouched
    pub fn apply_global(&mut self, settings: &GlobalSettings) {
        self.color = settings.color;
        self.page_type = settings.page_type;
        self.orientation = settings.orientation;
    }
}

#[cfg(test)]
pub(crate) fn sample_file(name: &str, mime: &str, bytes: &[u8]) -> LoadedFile {
    LoadedFile::new(FilePayload::new(name, mime, bytes.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let entry = FileEntry::new(EntryId(0), sample_file("a.pdf", "application/pdf", b"%PDF"));
        assert_eq!(entry.color, ColorMode::Color);
        assert_eq!(entry.page_type, PageType::A4);
        assert_eq!(entry.orientation, Orientation::Portrait);
        assert_eq!(entry.quantity.get(), 1);
    }

    #[test]
    fn test_quantity_never_below_one() {
        assert_eq!(Quantity::new(0).get(), 1);
        assert_eq!(Quantity::new(1).decrement().get(), 1);
        assert_eq!(Quantity::new(3).decrement().get(), 2);
        assert_eq!(Quantity::new(u32::MAX).increment().get(), u32::MAX);
    }

    #[test]
    fn test_quantity_label() {
        assert_eq!(Quantity::new(1).label(), "1 copy");
        assert_eq!(Quantity::new(4).label(), "4 copies");
    }

    #[test]
    fn test_patch_touches_only_listed_fields() {
        let mut entry = FileEntry::new(EntryId(0), sample_file("a.pdf", "application/pdf", b"%PDF"));
        entry.apply(&SettingsPatch {
            orientation: Some(Orientation::Landscape),
            ..SettingsPatch::default()
        });
        assert_eq!(entry.orientation, Orientation::Landscape);
        assert_eq!(entry.color, ColorMode::Color);
        assert_eq!(entry.page_type, PageType::A4);
        assert_eq!(entry.payload.name, "a.pdf");
    }

    #[test]
    fn test_fingerprint_depends_on_content_only() {
        let a = sample_file("report.pdf", "application/pdf", b"one");
        let b = sample_file("report.pdf", "application/pdf", b"two");
        let c = sample_file("other.pdf", "application/pdf", b"one");
        assert_ne!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint, c.fingerprint);
        assert_eq!(a.fingerprint.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_lowercase_sha256_hex() {
        assert_eq!(
            Fingerprint::of(b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(ColorMode::Bw.as_wire(), "bw");
        assert_eq!(PageType::Legal.as_wire(), "Legal");
        assert_eq!(Orientation::Landscape.as_wire(), "landscape");
    }
}
