//! Album resource API.

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::Params;
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`AlbumApi`] operations.
#[derive(Error, Debug)]
pub enum AlbumError {
    /// The call failed for a reason other than authentication
    #[error("album API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("album API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for AlbumError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => AlbumError::AuthenticationFailed(err),
            other => AlbumError::Service(other),
        }
    }
}

/// Wrapper for the REST album API.
pub struct AlbumApi {
    media: MediaClient,
}

impl AlbumApi {
    /// Creates a client scoped to the whole account.
    pub fn for_account(
        base_url: &str,
        company_id: &str,
        license_key: &str,
    ) -> Result<Self, AlbumError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, AlbumError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches an album's metadata, decoded unless a format is
    /// requested.
    pub async fn get_album_metadata(
        &self,
        album_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, AlbumError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(&format!("albums/{}", album_id), Some(params), format)
            .await?)
    }

    /// Searches albums in the configured account or library scope.
    pub async fn search_albums(
        &self,
        params: Params,
        format: Option<&str>,
    ) -> Result<StructuredData, AlbumError> {
        Ok(self.media.search_media("albums", params, format).await?)
    }
}
