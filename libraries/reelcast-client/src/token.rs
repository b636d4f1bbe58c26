//! Durable authentication-signature cache.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MediaError;

/// Seconds of safety margin added to the elapsed time when checking
/// expiry, so a signature is never handed out just before it expires
/// server-side.
const EXPIRY_PAD_SECS: i64 = 30;

/// The credential kinds issued by the auth endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Read-only access
    View,
    /// Metadata/resource modification
    Update,
    /// Content upload and import; signatures are single-use
    Ingest,
}

impl TokenKind {
    /// The name used both in the auth endpoint URL (`api/{name}`) and in
    /// the cache file name.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::View => "view_key",
            TokenKind::Update => "update_key",
            TokenKind::Ingest => "ingest_key",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk cache record. The key names are part of the cache file's
/// contract: any process writing the same derived path participates in
/// the same cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CacheRecord {
    token: Option<String>,
    start_time: i64,
    duration_in_minutes: u64,
}

/// A duration-based authentication signature cached in a local file.
///
/// The cache file is keyed by `(kind, license key)` and shared across
/// instances and processes; it is the source of truth across restarts.
/// Writers replace the file wholesale and perform no locking, so
/// concurrent renewals race and the last writer wins.
#[derive(Debug)]
pub struct AuthToken {
    kind: TokenKind,
    license_key: String,
    cache_dir: PathBuf,
    record: CacheRecord,
    loaded: bool,
}

impl AuthToken {
    /// Creates a token caching under the platform temp directory.
    pub fn new(kind: TokenKind, license_key: impl Into<String>) -> Result<Self, MediaError> {
        Self::with_cache_dir(kind, license_key, std::env::temp_dir())
    }

    /// Creates a token caching under an explicit directory.
    pub fn with_cache_dir(
        kind: TokenKind,
        license_key: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self, MediaError> {
        let license_key = license_key.into();
        if license_key.is_empty() {
            return Err(MediaError::Validation("license_key required".to_string()));
        }
        Ok(Self {
            kind,
            license_key,
            cache_dir: cache_dir.into(),
            record: CacheRecord::default(),
            loaded: false,
        })
    }

    /// The credential kind this token holds.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Deterministic cache file path for this `(kind, license key)`
    /// pair; repeated constructions across processes address the same
    /// file.
    pub fn cache_file_path(&self) -> PathBuf {
        self.cache_dir
            .join(format!("reelcast.{}.{}.json", self.kind, self.license_key))
    }

    /// The cached signature, or `None` if none has been stored.
    pub async fn signature(&mut self) -> Option<String> {
        self.load().await;
        self.record.token.clone()
    }

    /// The cached signature's requested lifetime in minutes.
    pub async fn duration_in_minutes(&mut self) -> u64 {
        self.load().await;
        self.record.duration_in_minutes
    }

    /// Epoch seconds at which the cached signature was stored.
    pub async fn start_time(&mut self) -> i64 {
        self.load().await;
        self.record.start_time
    }

    /// Whether the cached signature is missing or past its lifetime.
    ///
    /// A zero-duration signature is always expired, which is how ingest
    /// credentials force a fetch on every use.
    pub async fn is_expired(&mut self) -> bool {
        self.is_expired_at(Utc::now().timestamp()).await
    }

    /// Expiry check against an explicit clock.
    pub async fn is_expired_at(&mut self, now: i64) -> bool {
        self.load().await;
        if self.record.token.is_none() {
            return true;
        }
        let duration = i64::try_from(self.record.duration_in_minutes).unwrap_or(i64::MAX);
        self.elapsed_minutes_at(now) >= duration
    }

    /// Whole minutes elapsed since the signature was stored, padded by
    /// 30 seconds so a signature is not used right at its expiry.
    fn elapsed_minutes_at(&self, now: i64) -> i64 {
        (now - self.record.start_time + EXPIRY_PAD_SECS).div_euclid(60)
    }

    /// Validates and stores a freshly fetched signature, stamping it
    /// with the current time.
    pub async fn renew(
        &mut self,
        signature: &str,
        duration_in_minutes: u64,
    ) -> Result<String, MediaError> {
        self.renew_at(signature, duration_in_minutes, Utc::now().timestamp())
            .await
    }

    /// Renewal against an explicit clock.
    pub async fn renew_at(
        &mut self,
        signature: &str,
        duration_in_minutes: u64,
        now: i64,
    ) -> Result<String, MediaError> {
        assert_valid_signature(signature)?;
        self.write_cache(&CacheRecord {
            token: Some(signature.to_string()),
            start_time: now,
            duration_in_minutes,
        })
        .await?;
        self.reset();
        Ok(signature.to_string())
    }

    /// Clears the cache file and the in-memory copy, forcing a fetch on
    /// the next authentication check. The file is zeroed rather than
    /// deleted.
    pub async fn reset_cache(&mut self) -> Result<(), MediaError> {
        self.write_cache(&CacheRecord::default()).await?;
        self.reset();
        Ok(())
    }

    /// Drops the in-memory copy so the next access re-reads the file.
    fn reset(&mut self) {
        self.record = CacheRecord::default();
        self.loaded = false;
    }

    /// Lazily reads the cache file. A file that cannot be parsed is
    /// deleted and treated as absent; corruption is self-healing, never
    /// fatal.
    async fn load(&mut self) {
        if self.loaded {
            return;
        }
        let path = self.cache_file_path();
        self.record = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<CacheRecord>(&contents) {
                Ok(record) => record,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Deleting corrupt signature cache file"
                    );
                    let _ = tokio::fs::remove_file(&path).await;
                    CacheRecord::default()
                }
            },
            Err(_) => CacheRecord::default(),
        };
        self.loaded = true;
    }

    async fn write_cache(&self, record: &CacheRecord) -> Result<(), MediaError> {
        let path = self.cache_file_path();
        let contents = serde_json::to_string(record).map_err(|e| MediaError::Service {
            code: None,
            message: format!("failed to serialize signature cache: {}", e),
        })?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| MediaError::Service {
                code: None,
                message: format!("failed to write signature cache {}: {}", path.display(), e),
            })?;
        debug!(path = %path.display(), "Wrote signature cache");
        Ok(())
    }
}

/// A usable signature is non-empty and alphanumeric once trailing
/// whitespace is stripped; anything else is an authentication failure
/// even when the HTTP fetch nominally succeeded (the server may answer
/// an auth call with an HTML error page and a 200).
pub(crate) fn assert_valid_signature(signature: &str) -> Result<(), MediaError> {
    let trimmed = signature.trim_end();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MediaError::AuthenticationFailed {
            code: None,
            message: format!("invalid signature: {}", signature),
        });
    }
    Ok(())
}
