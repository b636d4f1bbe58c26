//! Low-level HTTP transport for the Reelcast API.

use std::path::Path;
use std::time::Duration;

use futures_util::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::error::TransportError;
use crate::multipart;
use crate::params::Params;

/// Default chunk size for streaming downloads, in bytes.
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 8192;

/// A successful HTTP response: the decoded status and body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code, within `[200, 400)`
    pub code: u16,
    /// The response body
    pub body: String,
}

/// HTTP client addressing one configured server.
///
/// Callers pass a host and port rather than a scheme, so TLS is used iff
/// the port is 443; HTTPS endpoints must be addressed through port 443.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    host: String,
    port: u16,
    http: reqwest::Client,
    download_buffer_size: usize,
}

impl HttpTransport {
    /// Creates a transport for the given server.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("reelcast-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            host: host.into(),
            port,
            http,
            download_buffer_size: DEFAULT_DOWNLOAD_BUFFER_SIZE,
        })
    }

    /// The configured server host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured server port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` authority string.
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Chunk size used when streaming downloads to disk.
    pub fn set_download_buffer_size(&mut self, bytes: usize) {
        self.download_buffer_size = bytes.max(1);
    }

    fn scheme(&self) -> &'static str {
        // The scheme is never configured; port 443 is the only TLS signal.
        if self.port == 443 {
            "https"
        } else {
            "http"
        }
    }

    /// Absolute URL for the given server path and params.
    pub fn create_url(&self, path: &str, params: &Params) -> String {
        format!(
            "{}://{}:{}/{}",
            self.scheme(),
            self.host,
            self.port,
            Self::create_sub_url(path, params)
        )
    }

    /// Server-relative URL with the params rendered as a query string.
    pub fn create_sub_url(path: &str, params: &Params) -> String {
        if params.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, params.to_query_string())
        }
    }

    /// Performs an HTTP GET request, returning the response body.
    pub async fn get(&self, path: &str, params: &Params) -> Result<HttpResponse, TransportError> {
        self.request(reqwest::Method::GET, path, params, None, None)
            .await
    }

    /// Performs an HTTP PUT request, returning the response body.
    pub async fn put(&self, path: &str, params: &Params) -> Result<HttpResponse, TransportError> {
        self.request(reqwest::Method::PUT, path, params, None, None)
            .await
    }

    /// Performs an HTTP DELETE request, returning the response body.
    pub async fn delete(&self, path: &str, params: &Params) -> Result<HttpResponse, TransportError> {
        self.request(reqwest::Method::DELETE, path, params, None, None)
            .await
    }

    /// Performs an HTTP POST request with a body, returning the response
    /// body. Pass an empty body and `"application/x-www-form-urlencoded"`
    /// for plain form-style calls.
    pub async fn post(
        &self,
        path: &str,
        params: &Params,
        body: impl Into<String>,
        content_type: &str,
    ) -> Result<HttpResponse, TransportError> {
        self.request(
            reqwest::Method::POST,
            path,
            params,
            Some(body.into()),
            Some(content_type),
        )
        .await
    }

    /// Performs one HTTP request against the configured server.
    ///
    /// Connection-level faults map to a codeless transport error; a
    /// response status outside `[200, 400)` maps to a transport error
    /// carrying the status and body.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &Params,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.create_url(path, params);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.http.request(method, &url);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let code = response.status().as_u16();
        let body = response.text().await?;
        debug!(code, "Received response");

        if !(200..400).contains(&code) {
            return Err(TransportError::Status { code, body });
        }
        Ok(HttpResponse { code, body })
    }

    /// Performs a multipart/form-data upload of a local file.
    ///
    /// The URL is absolute: upload sessions hand out their own hosts, so
    /// this call does not use the configured host and port. The progress
    /// callback receives the number of bytes read after each chunk.
    pub async fn upload_multipart<F>(
        &self,
        url: &str,
        file_path: &Path,
        fields: &Params,
        progress: F,
    ) -> Result<HttpResponse, TransportError>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        multipart::post_file(&self.http, url, file_path, fields, progress).await
    }

    /// Streams the body of `GET {path}` into a local file in fixed-size
    /// chunks, without ever buffering the whole body. Failures map
    /// exactly as in [`HttpTransport::request`].
    pub async fn download(
        &self,
        path: &str,
        destination: &Path,
    ) -> Result<u64, TransportError> {
        let url = self.create_url(path, &Params::new());
        debug!(url = %url, destination = %destination.display(), "Downloading file");

        let response = self.http.get(&url).send().await?;
        let code = response.status().as_u16();
        if !(200..400).contains(&code) {
            let body = response.text().await?;
            return Err(TransportError::Status { code, body });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stream = response
            .bytes_stream()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
        let mut reader = StreamReader::new(stream);
        let mut output = File::create(destination).await?;
        let mut buffer = vec![0u8; self.download_buffer_size];
        let mut written: u64 = 0;

        loop {
            let read = reader.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            output.write_all(&buffer[..read]).await?;
            written += read as u64;
        }
        output.flush().await?;

        debug!(bytes = written, "Download complete");
        Ok(written)
    }
}
