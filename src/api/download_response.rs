//! Attachment response helper for the download gate.

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// File content served as a forced download
pub struct AttachmentResponse {
    data: Bytes,
    content_type: String,
    filename: String,
}

impl AttachmentResponse {
    pub fn new(data: Bytes, content_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

impl IntoResponse for AttachmentResponse {
    fn into_response(self) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type)
            .header(CONTENT_LENGTH, self.data.len())
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .body(Body::from(self.data))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_into_response() {
        let resp = AttachmentResponse::new(
            Bytes::from_static(b"PKzip"),
            "application/zip",
            "CT173000000042.zip",
        )
        .into_response();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap().to_str().unwrap(),
            "application/zip"
        );
        assert_eq!(
            resp.headers()
                .get("content-length")
                .unwrap()
                .to_str()
                .unwrap(),
            "5"
        );
        assert_eq!(
            resp.headers()
                .get("content-disposition")
                .unwrap()
                .to_str()
                .unwrap(),
            "attachment; filename=\"CT173000000042.zip\""
        );
    }

    #[test]
    fn test_empty_attachment_has_zero_length() {
        let resp =
            AttachmentResponse::new(Bytes::new(), "text/plain", "empty.txt").into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("content-length")
                .unwrap()
                .to_str()
                .unwrap(),
            "0"
        );
    }
}
