//! Library resource API.

use thiserror::Error;

use crate::client::MediaClient;
use crate::error::MediaError;
use crate::params::{wrap_update_params, Params};
use crate::types::ClientConfig;
use crate::value::StructuredData;

/// Errors surfaced by [`LibraryApi`] operations.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The call failed for a reason other than authentication
    #[error("library API call failed: {0}")]
    Service(#[source] MediaError),

    /// A valid authentication signature could not be obtained
    #[error("library API authentication failed: {0}")]
    AuthenticationFailed(#[source] MediaError),
}

impl From<MediaError> for LibraryError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AuthenticationFailed { .. } => LibraryError::AuthenticationFailed(err),
            other => LibraryError::Service(other),
        }
    }
}

/// Wrapper for the REST library API.
pub struct LibraryApi {
    media: MediaClient,
}

impl LibraryApi {
    /// Creates a client scoped to one library within an account.
    pub fn for_library(
        base_url: &str,
        company_id: &str,
        library_id: &str,
        license_key: &str,
    ) -> Result<Self, LibraryError> {
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
    ) -> Result<Self, LibraryError> {
        let config = ClientConfig::new(base_url, company_id, license_key);
        Ok(Self {
            media: MediaClient::new(config, false)?,
        })
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig, require_library: bool) -> Result<Self, LibraryError> {
        Ok(Self {
            media: MediaClient::new(config, require_library)?,
        })
    }

    /// The underlying media client.
    pub fn media(&self) -> &MediaClient {
        &self.media
    }

    /// Fetches a library's metadata, decoded unless a format is
    /// requested.
    pub async fn get_library_metadata(
        &self,
        library_id: &str,
        format: Option<&str>,
        options: Params,
    ) -> Result<StructuredData, LibraryError> {
        let params = self.media.add_view_auth_param(options).await?;
        Ok(self
            .media
            .structured_data_request(
                &format!(
                    "companies/{}/libraries/{}",
                    self.media.company_id(),
                    library_id
                ),
                Some(params),
                format,
            )
            .await?)
    }

    /// Updates a library's metadata. Params are wrapped in `library[...]`
    /// unless already wrapped, so `name` and `library[name]` are
    /// interchangeable.
    pub async fn update_library(
        &self,
        library_id: &str,
        params: Params,
    ) -> Result<(), LibraryError> {
        let params = wrap_update_params(&params, "library");
        let params = self.media.add_update_auth_param(params).await?;
        self.media
            .http()
            .put(
                &format!(
                    "companies/{}/libraries/{}",
                    self.media.company_id(),
                    library_id
                ),
                &params,
            )
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Moves a library to the trash. Trashed libraries are permanently
    /// deleted after 7 days.
    pub async fn delete_library(&self, library_id: &str) -> Result<(), LibraryError> {
        let params = self.media.add_update_auth_param(Params::new()).await?;
        self.media
            .http()
            .delete(
                &format!(
                    "companies/{}/libraries/{}",
                    self.media.company_id(),
                    library_id
                ),
                &params,
            )
            .await
            .map_err(MediaError::service_from)?;
        Ok(())
    }

    /// Moves a library out of the trash by blanking its deletion stamp.
    pub async fn undelete_library(&self, library_id: &str) -> Result<(), LibraryError> {
        self.update_library(library_id, Params::new().set("deleted_at", ""))
            .await
    }

    /// Creates a library from a caller-supplied XML document.
    pub async fn create_library_from_xml_string(
        &self,
        xml: &str,
        params: Params,
    ) -> Result<String, LibraryError> {
        let params = self.media.add_update_auth_param(Params::new()).await?.merge(params);
        let response = self
            .media
            .http()
            .post(
                &format!("companies/{}/libraries", self.media.company_id()),
                &params,
                xml,
                "text/xml",
            )
            .await
            .map_err(MediaError::service_from)?;
        Ok(response.body)
    }
}
