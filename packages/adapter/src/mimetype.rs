//! Extension to mimetype table.
//!
//! Used as the fallback when content sniffing cannot identify an upload,
//! and to validate conversion targets.

use std::collections::BTreeMap;

use collection_literals::btree;
use lazy_static::lazy_static;

/// Fallback for content nothing else can identify.
pub const OCTET_STREAM: &str = "application/octet-stream";

lazy_static! {
    static ref EXTENSION_MIMETYPES: BTreeMap<&'static str, &'static str> = btree! {
        "7z" => "application/x-7z-compressed",
        "avi" => "video/x-msvideo",
        "bmp" => "image/bmp",
        "bz2" => "application/x-bzip2",
        "css" => "text/css",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "eml" => "message/rfc822",
        "epub" => "application/epub+zip",
        "flac" => "audio/flac",
        "gif" => "image/gif",
        "gz" => "application/gzip",
        "htm" => "text/html",
        "html" => "text/html",
        "ico" => "image/x-icon",
        "ics" => "text/calendar",
        "jpeg" => "image/jpeg",
        "jpg" => "image/jpeg",
        "js" => "application/javascript",
        "json" => "application/json",
        "md" => "text/markdown",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "mpeg" => "video/mpeg",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "oga" => "audio/ogg",
        "ogv" => "video/ogg",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rar" => "application/x-rar-compressed",
        "rtf" => "application/rtf",
        "svg" => "image/svg+xml",
        "tar" => "application/x-tar",
        "tif" => "image/tiff",
        "tiff" => "image/tiff",
        "txt" => "text/plain",
        "wav" => "audio/wav",
        "webm" => "video/webm",
        "webp" => "image/webp",
        "xhtml" => "application/xhtml+xml",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xml" => "application/xml",
        "yaml" => "application/x-yaml",
        "zip" => "application/zip",
    };
}

/// Mimetype registered for `extension` (case-insensitive, no leading dot).
pub fn from_extension(extension: &str) -> Option<&'static str> {
    EXTENSION_MIMETYPES
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}

/// Mimetype guessed from the extension of the last segment of `path`.
pub fn from_path(path: &str) -> Option<&'static str> {
    let name = crate::path_codec::basename(path);
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    from_extension(extension)
}

/// Whether `mimetype` appears in the table.
pub fn is_known(mimetype: &str) -> bool {
    EXTENSION_MIMETYPES.values().any(|m| *m == mimetype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(from_extension("pdf"), Some("application/pdf"));
        assert_eq!(from_extension("PDF"), Some("application/pdf"));
        assert_eq!(from_extension("nope"), None);
    }

    #[test]
    fn path_lookup_uses_last_segment() {
        assert_eq!(from_path("/ws/reports/q1.docx"), Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert_eq!(from_path("notes.txt"), Some("text/plain"));
        assert_eq!(from_path("dir.d/README"), None);
        assert_eq!(from_path(".hidden"), None);
    }

    #[test]
    fn known_mimetypes() {
        assert!(is_known("application/pdf"));
        assert!(is_known("text/plain"));
        assert!(!is_known("application/x-made-up"));
    }
}
