//! Main Reelcast API client: the signed-request orchestrator.

use std::path::Path;

use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::{MediaError, Result};
use crate::params::Params;
use crate::token::{AuthToken, TokenKind};
use crate::transport::HttpTransport;
use crate::types::ClientConfig;
use crate::value::{DynamicValue, StructuredData};

/// Client for the Reelcast REST API.
///
/// Authentication is managed automatically, including duration-based
/// signatures that expire after a set time. Signatures are stored in a
/// cache file shared across instances and processes, so callers never
/// obtain or maintain them directly: operations that need a signature
/// fetch one first, and the client makes sure outbound calls always
/// carry a valid one.
#[derive(Debug)]
pub struct MediaClient {
    config: ClientConfig,
    http: HttpTransport,
    view_token: RwLock<AuthToken>,
    update_token: RwLock<AuthToken>,
    ingest_token: RwLock<AuthToken>,
}

impl MediaClient {
    /// Creates a client from the given configuration.
    ///
    /// `require_library` rejects configurations without a library scope;
    /// ingesting and importing media is meaningless account-wide.
    pub fn new(config: ClientConfig, require_library: bool) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(MediaError::Validation("base_url is required.".to_string()));
        }
        if config.company_id.is_empty() {
            return Err(MediaError::Validation(
                "company_id is required.".to_string(),
            ));
        }
        if config.license_key.is_empty() {
            return Err(MediaError::Validation(
                "license_key is required.".to_string(),
            ));
        }
        if require_library && !config_has_library(&config) {
            return Err(MediaError::Validation(
                "MediaClient::new: library_id required.".to_string(),
            ));
        }

        let url = Url::parse(&config.base_url)
            .map_err(|e| MediaError::Validation(format!("base_url is not a valid URL: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| MediaError::Validation("base_url has no host".to_string()))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(80);

        let http = HttpTransport::new(host, port).map_err(MediaError::service_from)?;

        let cache_dir = config
            .cache_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let view_token = RwLock::new(AuthToken::with_cache_dir(
            TokenKind::View,
            config.license_key.as_str(),
            &cache_dir,
        )?);
        let update_token = RwLock::new(AuthToken::with_cache_dir(
            TokenKind::Update,
            config.license_key.as_str(),
            &cache_dir,
        )?);
        let ingest_token = RwLock::new(AuthToken::with_cache_dir(
            TokenKind::Ingest,
            config.license_key.as_str(),
            &cache_dir,
        )?);

        Ok(Self {
            config,
            http,
            view_token,
            update_token,
            ingest_token,
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The account (company) ID.
    pub fn company_id(&self) -> &str {
        &self.config.company_id
    }

    /// The configured library scope, if any.
    pub fn library_id(&self) -> Option<&str> {
        self.config.library_id.as_deref()
    }

    /// The low-level transport, for resource layers that issue their own
    /// calls.
    pub fn http(&self) -> &HttpTransport {
        &self.http
    }

    fn has_library(&self) -> bool {
        config_has_library(&self.config)
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Returns a valid view (read-only) authentication signature,
    /// calling the auth API only when the cached signature has expired.
    ///
    /// `duration` optionally overrides the configured signature lifetime
    /// in minutes.
    pub async fn authenticate_for_view(&self, duration: Option<u64>) -> Result<String> {
        let duration = duration.unwrap_or(self.config.auth_duration_minutes);
        let mut token = self.view_token.write().await;
        self.auth_signature(&mut token, duration, Params::new())
            .await
    }

    /// Returns a valid update authentication signature, calling the auth
    /// API only when the cached signature has expired.
    pub async fn authenticate_for_update(&self, duration: Option<u64>) -> Result<String> {
        let duration = duration.unwrap_or(self.config.auth_duration_minutes);
        let mut token = self.update_token.write().await;
        self.auth_signature(&mut token, duration, Params::new())
            .await
    }

    /// Returns a fresh ingest authentication signature for the given
    /// contributor.
    ///
    /// Ingest signatures are requested with a zero duration, so every
    /// call fetches a new one; the vendor treats them as single-use.
    /// `params` may carry an `ingest_profile` to ingest with.
    pub async fn authenticate_for_ingest(
        &self,
        contributor: &str,
        params: Params,
    ) -> Result<String> {
        if contributor.trim().is_empty() {
            return Err(MediaError::Validation(
                "You must provide a non-blank contributor name to obtain an ingest authentication signature.".to_string(),
            ));
        }
        let library_id = match self.library_id() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                return Err(MediaError::Validation(
                    "You must provide a non-blank library ID to obtain an ingest authentication signature.".to_string(),
                ))
            }
        };

        let params = params
            .set("userID", contributor)
            .set("library_id", library_id);
        let mut token = self.ingest_token.write().await;
        self.auth_signature(&mut token, 0, params).await
    }

    /// True if the cached view signature has expired, meaning the next
    /// view authentication will call the auth API.
    pub async fn view_token_expired(&self) -> bool {
        self.view_token.write().await.is_expired().await
    }

    /// True if the cached update signature has expired.
    pub async fn update_token_expired(&self) -> bool {
        self.update_token.write().await.is_expired().await
    }

    /// Invalidates the view and update signature caches, forcing a fetch
    /// the next time either signature is needed.
    pub async fn reset_auth_token_cache(&self) -> Result<()> {
        self.view_token.write().await.reset_cache().await?;
        self.update_token.write().await.reset_cache().await?;
        Ok(())
    }

    /// Returns the cached signature when it is still valid, otherwise
    /// fetches, validates, and caches a fresh one.
    ///
    /// The fast path makes no network call; signature fetches are
    /// rate-limited server-side, which is the reason the cache exists.
    async fn auth_signature(
        &self,
        token: &mut AuthToken,
        duration: u64,
        params: Params,
    ) -> Result<String> {
        if !token.is_expired().await {
            if let Some(signature) = token.signature().await {
                debug!(kind = %token.kind(), "Using cached signature");
                return Ok(signature);
            }
        }

        let fresh = self
            .fetch_auth_signature(token.kind(), duration, params)
            .await?;
        let signature = token.renew(&fresh, duration).await?;
        info!(kind = %token.kind(), duration, "Renewed authentication signature");
        Ok(signature)
    }

    /// Calls the auth endpoint for the given credential kind.
    ///
    /// Any transport failure here is an authentication failure, distinct
    /// from ordinary call failures, so callers can tell "could not get a
    /// credential" from "the call itself failed".
    async fn fetch_auth_signature(
        &self,
        kind: TokenKind,
        duration: u64,
        params: Params,
    ) -> Result<String> {
        let params = params
            .set("licenseKey", self.config.license_key.as_str())
            .set("duration", duration.to_string());
        self.http
            .get(&format!("api/{}", kind), &params)
            .await
            .map(|response| response.body)
            .map_err(MediaError::auth_failed_from)
    }

    /// Merges a currently-valid view signature into `params`.
    pub async fn add_view_auth_param(&self, params: Params) -> Result<Params> {
        let signature = self.authenticate_for_view(None).await?;
        Ok(params.set("signature", signature))
    }

    /// Merges a currently-valid update signature into `params`.
    pub async fn add_update_auth_param(&self, params: Params) -> Result<Params> {
        let signature = self.authenticate_for_update(None).await?;
        Ok(params.set("signature", signature))
    }

    /// Merges a fresh ingest signature into `params`; the params are
    /// also forwarded to the ingest authentication call.
    pub async fn add_ingest_auth_param(
        &self,
        contributor: &str,
        params: Params,
    ) -> Result<Params> {
        let signature = self
            .authenticate_for_ingest(contributor, params.clone())
            .await?;
        Ok(params.set("signature", signature))
    }

    // ------------------------------------------------------------------
    // Structured data
    // ------------------------------------------------------------------

    /// Fetches a resource in the requested serialization format, or as a
    /// decoded dynamic tree when no format is given.
    ///
    /// - no format: restarts with `"json"` and decodes the result into a
    ///   [`DynamicValue`] tree;
    /// - format but no params: calls `path` verbatim, for callers that
    ///   already built a fully-qualified sub-URL;
    /// - format and params: calls `{path}.{format}` with the params.
    pub async fn structured_data_request(
        &self,
        path: &str,
        params: Option<Params>,
        format: Option<&str>,
    ) -> Result<StructuredData> {
        match format {
            None => {
                let json = self.raw_structured_request(path, params, "json").await?;
                Ok(StructuredData::Decoded(DynamicValue::from_json(&json)?))
            }
            Some(format) => Ok(StructuredData::Raw(
                self.raw_structured_request(path, params, format).await?,
            )),
        }
    }

    /// The format-bearing half of [`MediaClient::structured_data_request`]:
    /// absent params mean the path is used verbatim, present params mean
    /// `.{format}` is appended and the params attached.
    async fn raw_structured_request(
        &self,
        path: &str,
        params: Option<Params>,
        format: &str,
    ) -> Result<String> {
        let response = match params {
            None => self.http.get(path, &Params::new()).await,
            Some(params) => {
                self.http
                    .get(&format!("{}.{}", path, format), &params)
                    .await
            }
        };
        response
            .map(|response| response.body)
            .map_err(MediaError::service_from)
    }

    /// Searches media of the given type in the configured account or
    /// library scope.
    ///
    /// The fully-qualified search sub-URL (including the view signature,
    /// unless the format is unauthenticated RSS) is built up front and
    /// fetched through the verbatim branch of
    /// [`MediaClient::structured_data_request`].
    pub async fn search_media(
        &self,
        media_type: &str,
        params: Params,
        format: Option<&str>,
    ) -> Result<StructuredData> {
        let effective = format.unwrap_or("json");
        let url = format!("{}/{}.{}", self.account_library_path(), media_type, effective);
        let all_params = if self.include_auth_in_search_call(effective) {
            self.add_view_auth_param(params).await?
        } else {
            params
        };
        let sub_url = HttpTransport::create_sub_url(&url, &all_params);
        self.structured_data_request(&sub_url, None, format).await
    }

    /// RSS search results skip the view signature unless configured
    /// otherwise; every other format carries it.
    fn include_auth_in_search_call(&self, format: &str) -> bool {
        !(format == "rss" && !self.config.rss_auth_required)
    }

    // ------------------------------------------------------------------
    // Upload sessions
    // ------------------------------------------------------------------

    /// Uploads a local media file into the configured library, returning
    /// the closed upload session's receipt.
    ///
    /// `ingest_profile` params are routed to the ingest authentication
    /// call; all other params go to the session-open call. The progress
    /// callback receives the number of bytes read after each chunk of
    /// the file.
    pub async fn upload_media<F>(
        &self,
        file_path: &Path,
        contributor: &str,
        params: Params,
        progress: F,
    ) -> Result<String>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        let (auth_params, open_params) = split_ingest_params(params);

        let signature = self
            .authenticate_for_ingest(contributor, auth_params)
            .await?;

        let upload_url = self.media_upload_open(&signature, open_params).await?;

        self.http
            .upload_multipart(upload_url.trim(), file_path, &Params::new(), progress)
            .await
            .map_err(MediaError::service_from)?;

        let receipt = self.media_upload_close(&signature).await?;
        Ok(receipt.trim().to_string())
    }

    /// Opens an upload session, returning the URL to post the file to.
    async fn media_upload_open(&self, signature: &str, params: Params) -> Result<String> {
        self.http
            .get(
                &format!("upload_sessions/{}/http_open", signature),
                &params,
            )
            .await
            .map(|response| response.body)
            .map_err(MediaError::service_from)
    }

    /// Closes an upload session, returning the session receipt.
    async fn media_upload_close(&self, signature: &str) -> Result<String> {
        self.http
            .get(
                &format!("upload_sessions/{}/http_close", signature),
                &Params::new(),
            )
            .await
            .map(|response| response.body)
            .map_err(MediaError::service_from)
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    /// `companies/{company_id}`, extended with `/libraries/{library_id}`
    /// when a library scope is configured.
    pub fn account_library_path(&self) -> String {
        if self.has_library() {
            format!(
                "companies/{}/libraries/{}",
                self.config.company_id,
                self.config.library_id.as_deref().unwrap_or_default()
            )
        } else {
            format!("companies/{}", self.config.company_id)
        }
    }
}

fn config_has_library(config: &ClientConfig) -> bool {
    config
        .library_id
        .as_deref()
        .is_some_and(|id| !id.is_empty())
}

/// Param keys consumed by ingest authentication rather than the
/// session-open call.
fn ingest_auth_param_key(key: &str) -> bool {
    key == "ingest_profile"
}

fn split_ingest_params(params: Params) -> (Params, Params) {
    let mut auth = Params::new();
    let mut open = Params::new();
    for (key, value) in params {
        if ingest_auth_param_key(&key) {
            auth.insert_entry(key, value);
        } else {
            open.insert_entry(key, value);
        }
    }
    (auth, open)
}
