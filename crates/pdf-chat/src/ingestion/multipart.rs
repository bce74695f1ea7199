//! Incremental multipart reader for the upload endpoint
//!
//! Every body chunk passes through a [`SizeGuard`] before the multipart parser sees
//! it, so an oversized upload is rejected while it streams in rather than after it
//! has been buffered.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use super::size_guard::SizeGuard;
use crate::error::{Error, Result};

const PDF_MIME: &str = "application/pdf";

/// A file field read from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename declared in the field's `Content-Disposition`
    pub filename: String,
    /// Media type declared for the field, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Whether the field declares a PDF, by media type or by filename extension
    pub fn declares_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case(PDF_MIME))
            .unwrap_or(false);
        let by_name = mime_guess::from_path(&self.filename)
            .first_raw()
            .map(|mime| mime == PDF_MIME)
            .unwrap_or(false);
        by_type || by_name
    }

    /// Reject fields that do not declare a PDF
    pub fn ensure_pdf(self) -> Result<Self> {
        if self.declares_pdf() {
            Ok(self)
        } else {
            Err(Error::malformed_upload(format!(
                "unrecognized file field '{}' ({})",
                self.filename,
                self.content_type.as_deref().unwrap_or("no content type")
            )))
        }
    }
}

/// Read the named file field from a multipart body stream
///
/// The whole body is consumed so the guard accounts for every byte, but only the
/// named field is buffered. Later fields with the same name are ignored.
///
/// Errors:
/// - `PayloadTooLarge` from the guard
/// - `ClientDisconnected` if reading the body stream fails
/// - `MalformedUpload` for a missing/unparseable content type, a body that is not
///   complete multipart data, or a missing field
pub async fn read_file_field<S, E>(
    content_type: Option<&str>,
    body: S,
    field_name: &str,
    guard: SizeGuard,
) -> Result<UploadedFile>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display,
{
    let content_type =
        content_type.ok_or_else(|| Error::malformed_upload("missing Content-Type header"))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| Error::malformed_upload(format!("invalid multipart content type: {}", e)))?;

    let mut guard = guard;
    let guarded = body.map(move |chunk| {
        let chunk = chunk.map_err(|e| Error::ClientDisconnected(e.to_string()))?;
        guard.observe(&chunk)?;
        Ok::<Bytes, Error>(chunk)
    });

    let mut multipart = multer::Multipart::new(guarded, boundary);
    let mut uploaded = None;

    while let Some(mut field) = multipart.next_field().await.map_err(classify)? {
        if uploaded.is_some() || field.name() != Some(field_name) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::malformed_upload(format!("field '{}' is not a file", field_name)))?;
        let field_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(classify)? {
            data.extend_from_slice(&chunk);
        }

        tracing::debug!("Read upload field '{}' ({} bytes)", filename, data.len());
        uploaded = Some(UploadedFile {
            filename,
            content_type: field_type,
            data: data.freeze(),
        });
    }

    uploaded.ok_or_else(|| Error::malformed_upload(format!("missing '{}' field", field_name)))
}

/// Map a multipart parser error back onto the service error it stands for
fn classify(err: multer::Error) -> Error {
    match err {
        // Errors raised by the guarded stream itself (size guard, broken connection)
        multer::Error::StreamReadFailed(source) => match source.downcast::<Error>() {
            Ok(err) => *err,
            Err(other) => Error::ClientDisconnected(other.to_string()),
        },
        // The body arrived in full but is not well-formed multipart
        other => Error::malformed_upload(other.to_string()),
    }
}
