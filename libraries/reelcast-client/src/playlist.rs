//! Playlist resource API.

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::{wrap_update_params, Params};
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`PlaylistApi`] operations.
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The call failed for a reason other than authentication
    #[error("playlist API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("playlist API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for PlaylistError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => PlaylistError::AuthenticationFailed(err),
            other => PlaylistError::Service(other),
        }
    }
}

/// Wrapper for the REST playlist API.
pub struct PlaylistApi {
    media: MediaClient,
}

impl PlaylistApi {
    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, PlaylistError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// Creates a client scoped to the whole account.
    pub fn for_account(
        base_url: &str,
        company_id: &str,
        license_key: &str,
    ) -> Result<Self, PlaylistError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches a playlist's metadata, decoded unless a format is
    /// requested.
    pub async fn get_playlist_metadata(
        &self,
        playlist_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, PlaylistError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(&format!("playlists/{}", playlist_id), Some(params), format)
            .await?)
    }

    /// Creates a playlist in the configured account. Params are wrapped
    /// in `playlist[...]` unless already wrapped. Returns the response
    /// body (the new playlist's ID).
    pub async fn create_playlist(&self, params: Params) -> Result<String, PlaylistError> {
        let params = wrap_update_params(&params, "playlist");
        let params = self.media.add_update_auth_param(params).await?;
        let response = self
            .media
            .http()
            .post(
                &format!("companies/{}/playlists", self.media.company_id()),
                &params,
                "",
                "application/x-www-form-urlencoded",
            )
            .await
            .map_err(MediaError::service_from)?;
        Ok(response.body)
    }

    /// Updates a playlist's metadata. Params are wrapped in
    /// `playlist[...]` unless already wrapped.
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        params: Params,
    ) -> Result<(), PlaylistError> {
        let params = wrap_update_params(&params, "playlist");
        let params = self.media.add_update_auth_param(params).await?;
        self.media
            .http()
            .put(&format!("playlists/{}", playlist_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Permanently destroys a playlist.
    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<(), PlaylistError> {
        let params = self.media.add_update_auth_param(Params::new()).await?;
        self.media
            .http()
            .delete(&format!("playlists/{}", playlist_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }
}
