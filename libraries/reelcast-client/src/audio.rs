//! Audio track resource API.

use std::path::Path;

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::{wrap_update_params, Params};
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`AudioApi`] operations.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The call failed for a reason other than authentication
    #[error("audio API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("audio API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for AudioError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => AudioError::AuthenticationFailed(err),
            other => AudioError::Service(other),
        }
    }
}

/// Wrapper for the REST audio-track API.
pub struct AudioApi {
    media: MediaClient,
}

impl AudioApi {
    /// Creates a client scoped to one library within an account.
    /// Required for ingesting tracks.
    pub fn for_library(
        base_url: &str,
        company_id: &str,
        library_id: &str,
        license_key: &str,
    ) -> Result<Self, AudioError> {
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
    ) -> Result<Self, AudioError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, AudioError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches a track's metadata, decoded unless a format is requested.
    pub async fn get_track_metadata(
        &self,
        track_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, AudioError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(&format!("tracks/{}", track_id), Some(params), format)
            .await?)
    }

    /// Searches tracks in the configured account or library scope.
    pub async fn search_tracks(
        &self,
        params: Params,
        format: Option<&str>,
    ) -> Result<StructuredData, AudioError> {
        Ok(self.media.search_media("tracks", params, format).await?)
    }

    /// Updates a track's metadata. Params are wrapped in `track[...]`
    /// unless already wrapped.
    pub async fn update_track(&self, track_id: &str, params: Params) -> Result<(), AudioError> {
        let params = self
            .media
            .add_update_auth_param(wrap_update_params(&params, "track"))
            .await?;
        self.media
            .http()
            .put(&format!("tracks/{}", track_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Moves a track to the trash.
    pub async fn delete_track(&self, track_id: &str) -> Result<(), AudioError> {
        let params = self.media.add_update_auth_param(Params::new()).await?;
        self.media
            .http()
            .delete(&format!("tracks/{}", track_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Uploads an audio file into the configured library, returning the
    /// upload receipt.
    pub async fn upload_track<F>(
        &self,
        file_path: &Path,
        contributor: &str,
        params: Params,
        progress: F,
    ) -> Result<String, AudioError>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        Ok(self
            .media
            .upload_media(file_path, contributor, params, progress)
            .await?)
    }
}
