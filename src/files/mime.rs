/// Accepted document and image types.
///
/// Type is decided by extension first; files without a known extension are
/// sniffed from their leading bytes.

use std::path::Path;

/// Extension -> MIME type for everything we accept
const ACCEPTED: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xps", "application/oxps"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("heif", "image/heif"),
    ("heic", "image/heic"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
];

/// Extensions for the file picker filter
pub fn accepted_extensions() -> Vec<&'static str> {
    ACCEPTED.iter().map(|(ext, _)| *ext).collect()
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    ACCEPTED
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED.iter().any(|(_, known)| *known == mime)
}

/// True when the path has an accepted extension
pub fn is_accepted_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .is_some()
}

/// MIME type for a file, or None if we cannot print it
pub fn detect(path: &Path, bytes: &[u8]) -> Option<String> {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        return mime_for_extension(ext).map(str::to_string);
    }

    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| is_accepted_mime(mime))
        .map(str::to_string)
}

/// Raster formats the image widget can decode. Other `image/*` types
/// (SVG, HEIC/HEIF) are accepted but get no inline bitmap.
const INLINE_DECODABLE: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/bmp", "image/webp"];

pub fn can_display_inline(mime: &str) -> bool {
    INLINE_DECODABLE.contains(&mime)
}

/// Coarse file category, used for the list icon label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Word,
    PowerPoint,
    Other,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            m if m.starts_with("image/") => FileKind::Image,
            "application/pdf" => FileKind::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => FileKind::Word,
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                FileKind::PowerPoint
            }
            _ => FileKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Image => "IMG",
            FileKind::Pdf => "PDF",
            FileKind::Word => "DOC",
            FileKind::PowerPoint => "PPT",
            FileKind::Other => "FILE",
        }
    }
}
