//! Configuration types for the Reelcast client.

use std::path::PathBuf;

/// Default signature lifetime requested from the auth endpoints, in
/// minutes, when the caller gives no override.
pub const DEFAULT_AUTH_DURATION_MINUTES: u64 = 15;

/// Configuration for connecting to the Reelcast API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server (e.g. `"https://service.reelcast.example"`).
    ///
    /// Only the host and port are used on the wire; TLS is used iff the
    /// effective port is 443, so HTTPS endpoints must be addressed
    /// through port 443.
    pub base_url: String,
    /// The account (company) ID
    pub company_id: String,
    /// The library to scope calls to, or `None` for account-wide calls.
    /// Ingesting or importing media requires a library scope.
    pub library_id: Option<String>,
    /// The license key used for all authentication requests
    pub license_key: String,
    /// Signature duration requested when the caller gives no override
    pub auth_duration_minutes: u64,
    /// Whether RSS-format search calls carry a view signature
    pub rss_auth_required: bool,
    /// Whether progressive-download URLs carry a view signature
    pub auth_required_for_download: bool,
    /// Directory holding the durable signature cache files. Defaults to
    /// the platform temp directory, which is what makes the cache shared
    /// across processes.
    pub cache_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Creates an account-wide configuration.
    pub fn new(
        base_url: impl Into<String>,
        company_id: impl Into<String>,
        license_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            company_id: company_id.into(),
            library_id: None,
            license_key: license_key.into(),
            auth_duration_minutes: DEFAULT_AUTH_DURATION_MINUTES,
            rss_auth_required: false,
            auth_required_for_download: false,
            cache_dir: None,
        }
    }

    /// Creates a configuration scoped to one library within the account.
    pub fn for_library(
        base_url: impl Into<String>,
        company_id: impl Into<String>,
        library_id: impl Into<String>,
        license_key: impl Into<String>,
    ) -> Self {
        Self::new(base_url, company_id, license_key).with_library(library_id)
    }

    /// Scopes the configuration to the given library.
    pub fn with_library(mut self, library_id: impl Into<String>) -> Self {
        self.library_id = Some(library_id.into());
        self
    }

    /// Overrides the signature cache directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Overrides the default signature duration.
    pub fn with_auth_duration_minutes(mut self, minutes: u64) -> Self {
        self.auth_duration_minutes = minutes;
        self
    }
}
