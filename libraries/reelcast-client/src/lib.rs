//! Reelcast Client
//!
//! HTTP client library for the Reelcast media hosting REST API
//! (video/audio/image/playlist/library/album resources).
//!
//! # Features
//!
//! - **Automatic authentication**: duration-based view/update/ingest
//!   signatures, fetched lazily and cached in a file shared across
//!   instances and processes
//! - **Typed errors**: one error type per resource family, with
//!   authentication failures distinguishable from ordinary call
//!   failures
//! - **Structured responses**: fetch raw XML/JSON, or decode into a
//!   dynamic tree when no format is requested
//! - **Upload/download**: streamed multipart uploads with progress
//!   reporting, chunked downloads
//!
//! # Example
//!
//! ```ignore
//! use reelcast_client::{Params, VideoApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client scoped to one library
//!     let api = VideoApi::for_library(
//!         "https://service.reelcast.example:443",
//!         "my_company",
//!         "my_library",
//!         "my_license_key",
//!     )?;
//!
//!     // Fetch metadata as a decoded tree; the view signature is
//!     // obtained and cached automatically
//!     let video = api.get_video_metadata("ABCDE", None, Params::new()).await?;
//!     if let Some(tree) = video.decoded() {
//!         println!("title: {:?}", tree["title"].as_str());
//!     }
//!
//!     // Upload a file with progress reporting
//!     let receipt = api
//!         .upload_video(
//!             std::path::Path::new("clip.mp4"),
//!             "alice",
//!             Params::new().set("title", "My Clip"),
//!             |bytes| println!("read {} bytes", bytes),
//!         )
//!         .await?;
//!     println!("uploaded: {}", receipt);
//!
//!     Ok(())
//! }
//! ```

mod album;
mod audio;
mod client;
mod error;
mod image;
mod library;
mod multipart;
mod params;
mod playlist;
mod token;
mod transport;
mod types;
mod value;
mod video;

// Re-export main types
pub use client::MediaClient;
pub use error::{MediaError, Result, TransportError};
pub use params::{wrap_update_params, ParamValue, Params};
pub use token::{AuthToken, TokenKind};
pub use transport::{HttpResponse, HttpTransport, DEFAULT_DOWNLOAD_BUFFER_SIZE};
pub use types::{ClientConfig, DEFAULT_AUTH_DURATION_MINUTES};
pub use value::{DynamicValue, StructuredData};

// Re-export the resource-family APIs
pub use album::{AlbumApi, AlbumError};
pub use audio::{AudioApi, AudioError};
pub use image::{ImageApi, ImageError};
pub use library::{LibraryApi, LibraryError};
pub use playlist::{PlaylistApi, PlaylistError};
pub use video::{VideoApi, VideoAsset, VideoError};
