//! Streamed multipart/form-data file upload.

use std::path::Path;

use futures_util::stream;
use futures_util::Stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::TransportError;
use crate::params::{ParamValue, Params};
use crate::transport::HttpResponse;

/// Field name the upload endpoint expects for the file part.
const FILE_FIELD: &str = "image[original]";

/// Bytes read from the file per chunk; the progress callback fires once
/// per chunk.
const CHUNK_SIZE: usize = 8192;

/// Uploads a local file as a multipart form to an absolute URL.
///
/// The form carries the file under the vendor's fixed field name plus
/// one text part per extra field.
pub(crate) async fn post_file<F>(
    http: &reqwest::Client,
    url: &str,
    file_path: &Path,
    fields: &Params,
    progress: F,
) -> Result<HttpResponse, TransportError>
where
    F: FnMut(u64) + Send + Sync + 'static,
{
    let file = File::open(file_path).await?;
    let length = file.metadata().await?.len();
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    debug!(url = %url, file = %file_path.display(), bytes = length, "Uploading file");

    let body = Body::wrap_stream(chunked_stream(file, progress));
    let part = Part::stream_with_length(body, length)
        .file_name(file_name)
        .mime_str(mime_type_for_file(file_path))
        .map_err(|err| TransportError::Connection(err.to_string()))?;

    let mut form = Form::new().part(FILE_FIELD, part);
    for (key, value) in fields.iter() {
        if let ParamValue::Value(text) = value {
            form = form.text(key.clone(), text.clone());
        }
    }

    let response = http.post(url).multipart(form).send().await?;
    let code = response.status().as_u16();
    let body = response.text().await?;

    if !(200..400).contains(&code) {
        return Err(TransportError::Status { code, body });
    }
    Ok(HttpResponse { code, body })
}

/// Reads the file in fixed-size chunks, reporting each chunk's size to
/// the progress callback as the request body consumes it.
fn chunked_stream<F>(file: File, progress: F) -> impl Stream<Item = std::io::Result<Vec<u8>>>
where
    F: FnMut(u64) + Send + Sync + 'static,
{
    stream::try_unfold((file, progress), |(mut file, mut progress)| async move {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            return Ok(None);
        }
        buffer.truncate(read);
        progress(read as u64);
        Ok(Some((buffer, (file, progress))))
    })
}

/// Content type for the file part, derived from the file extension.
fn mime_type_for_file(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp4" | "m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("wmv") => "video/x-ms-wmv",
        Some("webm") => "video/webm",
        Some("mpg" | "mpeg") => "video/mpeg",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("m4a" | "aac") => "audio/mp4",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
