//! flickr-api: a small Flickr REST client.
//!
//! - [`ClientUri`]: client configuration packed into one URI string.
//! - [`FlickrClient`]: rate-limited method calls returning raw JSON bodies.
//! - [`Paginator`]: pull-based walk over a paginated method's pages.
//!
//! # Examples
//!
//! ```no_run
//! use flickr_api::{FlickrClient, Paginator};
//!
//! # async fn run() -> flickr_api::Result<()> {
//! let client = FlickrClient::from_uri("flickr://api?api_key=your-key")?;
//! let params = vec![
//!     ("method".to_string(), "flickr.photos.search".to_string()),
//!     ("user_id".to_string(), "me".to_string()),
//!     ("extras".to_string(), "geo".to_string()),
//! ];
//! let mut pages = Paginator::new(client, params);
//! while let Some(page) = pages.next_page().await? {
//!     println!("page {} is {} bytes", page.number, page.body.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod paginate;
pub mod uri;

pub use client::FlickrClient;
pub use error::{Error, Result};
pub use paginate::{Page, Paginator};
pub use uri::ClientUri;
