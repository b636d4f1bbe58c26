//! Image resource API.

use std::path::Path;

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::Params;
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`ImageApi`] operations.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The call failed for a reason other than authentication
    #[error("image API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("image API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for ImageError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => ImageError::AuthenticationFailed(err),
            other => ImageError::Service(other),
        }
    }
}

/// Wrapper for the REST image API.
pub struct ImageApi {
    media: MediaClient,
}

impl ImageApi {
    /// Creates a client scoped to one library within an account.
    /// Required for uploading images.
    pub fn for_library(
        base_url: &str,
        company_id: &str,
        library_id: &str,
        license_key: &str,
    ) -> Result<Self, ImageError> {
        let config = ClientConfig::for_library(base_url, company_id, library_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, true)?,
        })
    }

    /// Creates a client scoped to the whole account.
    pub fn for_account(
        base_url: &str,
        company_id: &str,
        license_key: &str,
    ) -> Result<Self, ImageError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, ImageError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches an image's metadata, decoded unless a format is
    /// requested.
    pub async fn get_image_metadata(
        &self,
        image_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, ImageError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(&format!("images/{}", image_id), Some(params), format)
            .await?)
    }

    /// Searches images in the configured account or library scope.
    pub async fn search_images(
        &self,
        params: Params,
        format: Option<&str>,
    ) -> Result<StructuredData, ImageError> {
        Ok(self.media.search_media("images", params, format).await?)
    }

    /// Uploads an image file into the configured library, returning the
    /// upload receipt.
    pub async fn upload_image<F>(
        &self,
        file_path: &Path,
        contributor: &str,
        params: Params,
        progress: F,
    ) -> Result<String, ImageError>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        Ok(self
            .media
            .upload_media(file_path, contributor, params, progress)
            .await?)
    }
}
