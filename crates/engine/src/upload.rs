//! Upload admission: which files may be attached, and their transport encoding.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// MIME types an attachment may have.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/svg+xml"];

/// Largest accepted attachment, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A file the visitor selected, before admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    /// Size as declared by the file picker.
    pub size_bytes: u64,
    pub raw_bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, raw_bytes: Vec<u8>) -> Self {
        FileCandidate {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: raw_bytes.len() as u64,
            raw_bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, RejectReason> {
        let raw_bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RejectReason::Unreadable(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FileCandidate::new(name, mime_for_path(path), raw_bytes))
    }
}

/// Best-effort MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// An admitted attachment, ready to travel in the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// `data:<mime>;base64,<payload>`
    pub encoded_data: String,
}

/// Why a candidate was refused. `Display` is the message shown under the
/// upload control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Please upload a JPG, PNG, or SVG image.")]
    UnsupportedType { mime_type: String },
    #[error("File size must be less than {}MB.", .limit / (1024 * 1024))]
    TooLarge { size_bytes: u64, limit: u64 },
    #[error("The selected file could not be read.")]
    Unreadable(String),
}

/// Admit `candidate` against the default 5 MiB limit.
pub fn admit(candidate: FileCandidate) -> Result<AttachedFile, RejectReason> {
    admit_with_limit(candidate, MAX_UPLOAD_BYTES)
}

/// Admit `candidate`. The type check comes first, so a disallowed type is
/// reported as such regardless of size.
pub fn admit_with_limit(candidate: FileCandidate, limit: u64) -> Result<AttachedFile, RejectReason> {
    check_admission(&candidate.mime_type, candidate.size_bytes, limit)?;
    let encoded_data = encode_data_uri(&candidate.mime_type, &candidate.raw_bytes);
    Ok(AttachedFile {
        name: candidate.name,
        mime_type: candidate.mime_type,
        size_bytes: candidate.size_bytes,
        encoded_data,
    })
}

/// The accept/reject decision without touching the bytes.
pub fn check_admission(mime_type: &str, size_bytes: u64, limit: u64) -> Result<(), RejectReason> {
    if !ALLOWED_MIME_TYPES.iter().any(|allowed| *allowed == mime_type) {
        return Err(RejectReason::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }
    if size_bytes > limit {
        return Err(RejectReason::TooLarge { size_bytes, limit });
    }
    Ok(())
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a `data:<mime>;base64,<payload>` URI back into MIME type and bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mime: &str, size: u64) -> FileCandidate {
        FileCandidate {
            name: "logo".to_string(),
            mime_type: mime.to_string(),
            size_bytes: size,
            raw_bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn disallowed_types_are_rejected_regardless_of_size() {
        for mime in ["image/gif", "application/pdf", "text/plain", "image/webp", ""] {
            for size in [0, 10, MAX_UPLOAD_BYTES + 1] {
                assert!(
                    matches!(
                        admit(candidate(mime, size)),
                        Err(RejectReason::UnsupportedType { .. })
                    ),
                    "{mime} / {size}"
                );
            }
        }
    }

    #[test]
    fn oversized_allowed_types_are_rejected() {
        for mime in ALLOWED_MIME_TYPES {
            assert_eq!(
                admit(candidate(mime, MAX_UPLOAD_BYTES + 1)),
                Err(RejectReason::TooLarge {
                    size_bytes: MAX_UPLOAD_BYTES + 1,
                    limit: MAX_UPLOAD_BYTES
                })
            );
        }
    }

    #[test]
    fn exactly_the_limit_is_accepted() {
        assert!(admit(candidate("image/png", MAX_UPLOAD_BYTES)).is_ok());
    }

    #[test]
    fn accepted_file_round_trips_through_data_uri() {
        let bytes: Vec<u8> = (0..=255).collect();
        let file = admit(FileCandidate::new("pixels.png", "image/png", bytes.clone())).unwrap();

        assert_eq!(file.name, "pixels.png");
        assert_eq!(file.size_bytes, 256);
        assert!(file.encoded_data.starts_with("data:image/png;base64,"));
        let (mime, decoded) = decode_data_uri(&file.encoded_data).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn decode_rejects_non_base64_uris() {
        assert_eq!(decode_data_uri("data:text/plain,hello"), None);
        assert_eq!(decode_data_uri("https://example.com/x.png"), None);
        assert_eq!(decode_data_uri("data:image/png;base64,@@@"), None);
    }

    #[test]
    fn attached_file_serializes_camel_case() {
        let file = admit(FileCandidate::new("a.svg", "image/svg+xml", b"<svg/>".to_vec())).unwrap();
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["mimeType"], "image/svg+xml");
        assert_eq!(json["sizeBytes"], 6);
        assert!(json["encodedData"].as_str().unwrap().starts_with("data:"));
    }

    #[test]
    fn mime_guess_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(mime_for_path(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let candidate = FileCandidate::from_path(&path).await.unwrap();
        assert_eq!(candidate.name, "team.png");
        assert_eq!(candidate.mime_type, "image/png");
        assert_eq!(candidate.size_bytes, 3);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileCandidate::from_path(&dir.path().join("nope.png")).await;
        assert!(matches!(result, Err(RejectReason::Unreadable(_))));
    }
}
