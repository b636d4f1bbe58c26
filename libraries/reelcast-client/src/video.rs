//! Video resource API.

use std::path::Path;

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::{wrap_update_params, Params};
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`VideoApi`] operations.
#[derive(Error, Debug)]
pub enum VideoError {
    /// The call failed for a reason other than authentication
    #[error("video API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("video API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for VideoError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => VideoError::AuthenticationFailed(err),
            other => VideoError::Service(other),
        }
    }
}

/// Selects one of a video's assets for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoAsset {
    /// The video's main asset
    Main,
    /// A specific asset by ID
    AssetId(String),
    /// An asset by format name
    Format(String),
    /// An asset by file extension; `Ext("source")` selects the original
    /// uploaded file
    Ext(String),
}

impl VideoAsset {
    fn sub_url(&self, video_id: &str) -> String {
        match self {
            VideoAsset::Main => format!("videos/{}/file", video_id),
            VideoAsset::AssetId(asset_id) => {
                format!("videos/{}/assets/{}/file", video_id, asset_id)
            }
            VideoAsset::Format(format) => {
                format!("videos/{}/formats/{}/file", video_id, format)
            }
            VideoAsset::Ext(ext) => format!("videos/{}/file.{}", video_id, ext),
        }
    }
}

/// Wrapper for the REST video API.
#[derive(Debug)]
pub struct VideoApi {
    media: MediaClient,
}

impl VideoApi {
    /// Creates a client scoped to one library within an account.
    /// Required for ingesting or importing videos.
    pub fn for_library(
        base_url: &str,
        company_id: &str,
        library_id: &str,
        license_key: &str,
    ) -> Result<Self, VideoError> {
        let config = ClientConfig::for_library(base_url, company_id, library_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, true)?,
        })
    }

    /// Creates a client scoped to the whole account. Ingest and import
    /// calls will fail; use [`VideoApi::for_library`] for those.
    pub fn for_account(
        base_url: &str,
        company_id: &str,
        license_key: &str,
    ) -> Result<Self, VideoError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, VideoError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches a video's metadata, decoded into a dynamic tree unless a
    /// format (`"xml"`, `"json"`) is requested.
    pub async fn get_video_metadata(
        &self,
        video_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, VideoError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(&format!("videos/{}", video_id), Some(params), format)
            .await?)
    }

    /// Searches videos in the configured account or library scope.
    pub async fn search_videos(
        &self,
        params: Params,
        format: Option<&str>,
    ) -> Result<StructuredData, VideoError> {
        Ok(self.media.search_media("videos", params, format).await?)
    }

    /// Updates a video's metadata. Params are wrapped in `video[...]`
    /// unless already wrapped.
    pub async fn update_video(&self, video_id: &str, params: Params) -> Result<(), VideoError> {
        let params = self
            .media
            .add_update_auth_param(wrap_update_params(&params, "video"))
            .await?;
        self.media
            .http()
            .put(&format!("videos/{}", video_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Sets a video visible or hidden.
    pub async fn set_video_visibility(
        &self,
        video_id: &str,
        visible: bool,
    ) -> Result<(), VideoError> {
        let params =
            Params::new().set("video[hidden]", if visible { "false" } else { "true" });
        self.update_video(video_id, params).await
    }

    /// Moves a video to the trash. Trashed videos are permanently
    /// deleted after 7 days.
    pub async fn delete_video(&self, video_id: &str) -> Result<(), VideoError> {
        let params = self.media.add_update_auth_param(Params::new()).await?;
        self.media
            .http()
            .delete(&format!("videos/{}", video_id), &params)
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Moves a video out of the trash by blanking its deletion stamp.
    pub async fn undelete_video(&self, video_id: &str) -> Result<(), VideoError> {
        self.update_video(video_id, Params::new().set("deleted_at", ""))
            .await
    }

    /// Creates a video asset from a caller-supplied XML document.
    pub async fn create_video_asset_from_xml_string(
        &self,
        video_id: &str,
        xml: &str,
    ) -> Result<String, VideoError> {
        let params = self.media.add_update_auth_param(Params::new()).await?;
        let response = self
            .media
            .http()
            .post(
                &format!("videos/{}/assets.xml", video_id),
                &params,
                xml,
                "text/xml",
            )
            .await
            .map_err(MediaError::service_from)?;
        Ok(response.body)
    }

    /// URL of a video's stillframe, optionally constrained to a width
    /// and/or height in pixels.
    pub fn get_stillframe_url(
        &self,
        video_id: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> String {
        let mut url = self
            .media
            .http()
            .create_url(&format!("videos/{}/screenshots/", video_id), &Params::new());
        if let Some(width) = width {
            url.push_str(&format!("{}w", width));
        }
        if let Some(height) = height {
            url.push_str(&format!("{}h", height));
        }
        if width.is_none() && height.is_none() {
            url.push_str("original");
        }
        url + ".jpg"
    }

    /// Progressive-download URL for one of the video's assets.
    pub async fn get_download_url(
        &self,
        video_id: &str,
        asset: &VideoAsset,
    ) -> Result<String, VideoError> {
        let sub_url = self.download_sub_url(video_id, asset).await?;
        Ok(self.media.http().create_url(&sub_url, &Params::new()))
    }

    /// Progressive-download URL for the video's original source asset.
    pub async fn get_download_url_for_source_asset(
        &self,
        video_id: &str,
    ) -> Result<String, VideoError> {
        self.get_download_url(video_id, &VideoAsset::Ext("source".to_string()))
            .await
    }

    /// Downloads one of the video's assets into a local file.
    pub async fn download_video_asset(
        &self,
        video_id: &str,
        file_path: &Path,
        asset: &VideoAsset,
    ) -> Result<u64, VideoError> {
        let sub_url = self.download_sub_url(video_id, asset).await?;
        Ok(self
            .media
            .http()
            .download(&sub_url, file_path)
            .await
            .map_err(MediaError::service_from)?)
    }

    /// Downloads the video's original source asset into a local file.
    pub async fn download_video_source_asset(
        &self,
        video_id: &str,
        file_path: &Path,
    ) -> Result<u64, VideoError> {
        self.download_video_asset(video_id, file_path, &VideoAsset::Ext("source".to_string()))
            .await
    }

    /// Uploads a video file into the configured library, returning the
    /// upload receipt. The progress callback receives the bytes read
    /// after each chunk.
    pub async fn upload_video<F>(
        &self,
        file_path: &Path,
        contributor: &str,
        params: Params,
        progress: F,
    ) -> Result<String, VideoError>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        Ok(self
            .media
            .upload_media(file_path, contributor, params, progress)
            .await?)
    }

    async fn download_sub_url(
        &self,
        video_id: &str,
        asset: &VideoAsset,
    ) -> Result<String, VideoError> {
        let url = asset.sub_url(video_id);
        if self.media.config().auth_required_for_download {
            let signature = self.media.authenticate_for_view(None).await?;
            Ok(format!("{}?signature={}", url, signature))
        } else {
            Ok(url)
        }
    }
}
