//! `multipart/form-data` parsing.
//!
//! Text parts become form fields; parts carrying a `filename` become
//! [`UploadedFile`]s.

use std::collections::HashMap;

use brackets_core::{DjangoError, DjangoResult};

/// The largest single upload accepted, in bytes (2.5 MB).
pub const FILE_UPLOAD_MAX_MEMORY_SIZE: usize = 2_621_440;

/// A file submitted in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The client-supplied file name.
    pub name: String,
    /// The part's content type (`text/plain` when the part has none).
    pub content_type: String,
    /// The raw content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Returns the size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Fields and files parsed from one multipart body.
#[derive(Debug, Clone, Default)]
pub struct MultipartData {
    /// Text fields in body order, possibly repeated.
    pub fields: Vec<(String, String)>,
    /// Files keyed by field name.
    pub files: HashMap<String, Vec<UploadedFile>>,
}

/// Returns the `boundary` parameter of a multipart content type.
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("boundary="))
        .map(|b| b.trim_matches('"'))
        .find(|b| !b.is_empty())
}

/// Splits a multipart body on `boundary` and sorts its parts into fields
/// and files.
///
/// Parts without a `name` are skipped, as are empty file inputs.
///
/// # Errors
///
/// Returns [`DjangoError::BadRequest`] when a file exceeds
/// [`FILE_UPLOAD_MAX_MEMORY_SIZE`].
pub fn parse_multipart(body: &[u8], boundary: &str) -> DjangoResult<MultipartData> {
    let mut data = MultipartData::default();
    let body = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");

    for raw_part in body.split(delimiter.as_str()) {
        let part = raw_part.strip_prefix("\r\n").unwrap_or(raw_part);
        if part.is_empty() || part.starts_with("--") {
            continue;
        }
        let Some((head, content)) = part
            .split_once("\r\n\r\n")
            .or_else(|| part.split_once("\n\n"))
        else {
            continue;
        };
        let content = content.strip_suffix("\r\n").unwrap_or(content);

        let mut name = None;
        let mut filename = None;
        let mut content_type = "text/plain".to_string();
        for line in head.lines() {
            let Some((header, value)) = line.split_once(':') else {
                continue;
            };
            if header.trim().eq_ignore_ascii_case("content-disposition") {
                name = disposition_param(value, "name");
                filename = disposition_param(value, "filename");
            } else if header.trim().eq_ignore_ascii_case("content-type") {
                content_type = value.trim().to_string();
            }
        }

        let Some(name) = name else {
            continue;
        };
        match filename {
            Some(filename) => {
                if filename.is_empty() && content.is_empty() {
                    continue;
                }
                if content.len() > FILE_UPLOAD_MAX_MEMORY_SIZE {
                    return Err(DjangoError::BadRequest(format!(
                        "File '{filename}' exceeds maximum upload size of \
                         {FILE_UPLOAD_MAX_MEMORY_SIZE} bytes"
                    )));
                }
                data.files.entry(name).or_default().push(UploadedFile {
                    name: filename,
                    content_type,
                    content: content.as_bytes().to_vec(),
                });
            }
            None => data.fields.push((name, content.to_string())),
        }
    }

    Ok(data)
}

/// Reads `param="value"` (or an unquoted value) out of a
/// `Content-Disposition` header value.
fn disposition_param(value: &str, param: &str) -> Option<String> {
    value.split(';').find_map(|segment| {
        let (key, val) = segment.trim().split_once('=')?;
        (key.trim() == param).then(|| val.trim().trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(parts: &[&str]) -> Vec<u8> {
        let mut out = String::new();
        for part in parts {
            out.push_str("--XyZ\r\n");
            out.push_str(part);
            out.push_str("\r\n");
        }
        out.push_str("--XyZ--\r\n");
        out.into_bytes()
    }

    #[test]
    fn test_extract_boundary() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=----abc"),
            Some("----abc")
        );
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=\"quoted\""),
            Some("quoted")
        );
        assert_eq!(extract_boundary("multipart/form-data"), None);
        assert_eq!(extract_boundary("multipart/form-data; boundary="), None);
    }

    #[test]
    fn test_parse_fields_and_files() {
        let raw = body(&[
            "Content-Disposition: form-data; name=\"profile-bio\"\r\n\r\nHello there",
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA",
        ]);
        let data = parse_multipart(&raw, "XyZ").unwrap();
        assert_eq!(
            data.fields,
            vec![("profile-bio".to_string(), "Hello there".to_string())]
        );
        let avatar = &data.files["avatar"][0];
        assert_eq!(avatar.name, "me.png");
        assert_eq!(avatar.content_type, "image/png");
        assert_eq!(avatar.content, b"PNGDATA");
        assert_eq!(avatar.size(), 7);
    }

    #[test]
    fn test_parse_skips_empty_file_inputs_and_nameless_parts() {
        let raw = body(&[
            "Content-Disposition: form-data; name=\"doc\"; filename=\"\"\r\n\r\n",
            "Content-Disposition: form-data\r\n\r\norphan",
        ]);
        let data = parse_multipart(&raw, "XyZ").unwrap();
        assert!(data.fields.is_empty());
        assert!(data.files.is_empty());
    }

    #[test]
    fn test_parse_rejects_oversized_file() {
        let big = "a".repeat(FILE_UPLOAD_MAX_MEMORY_SIZE + 1);
        let part = format!(
            "Content-Disposition: form-data; name=\"f\"; filename=\"big.txt\"\r\n\r\n{big}"
        );
        let raw = body(&[part.as_str()]);
        let err = parse_multipart(&raw, "XyZ").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
