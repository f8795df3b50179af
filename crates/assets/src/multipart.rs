//! Two-part upload body for the asset store.

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    md5::{Digest, Md5},
};

/// Fixed part boundary. The service accepts any boundary; a constant keeps
/// the body deterministic for a given blob.
pub const BOUNDARY: &str = "frontier";

/// Content type announcing the composed body.
pub const CONTENT_TYPE: &str = "multipart/mixed; boundary=frontier";

/// Compose the upload body: a JSON settings part first, then the encrypted
/// blob with its MD5 checksum. Parts are CRLF-framed.
#[must_use]
pub fn compose(mime_type: &str, blob: &[u8]) -> Vec<u8> {
    let settings =
        serde_json::json!({ "public": false, "retention": "volatile" }).to_string();
    let checksum = STANDARD.encode(Md5::digest(blob));

    let head = format!(
        "--{BOUNDARY}\r\n\
         Content-Type: application/json; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {settings}\r\n\
         --{BOUNDARY}\r\n\
         Content-Type: {mime_type}\r\n\
         Content-Length: {}\r\n\
         Content-MD5: {checksum}\r\n\
         \r\n",
        settings.len(),
        blob.len(),
    );

    let mut body = Vec::with_capacity(head.len() + blob.len() + BOUNDARY.len() + 8);
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(blob);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
