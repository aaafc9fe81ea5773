//! Page sources.
//!
//! The orchestrator pulls pages through [`PageSource`]; `Ok(None)` means the
//! source is exhausted. Rate limiting and backoff between fetches are the
//! source's business.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;

pub use flickr_api::Page;

/// A pull-based sequence of raw pages.
#[async_trait]
pub trait PageSource: Send {
    async fn next_page(&mut self) -> Result<Option<Page>, SourceError>;
}

#[async_trait]
impl PageSource for flickr_api::Paginator {
    async fn next_page(&mut self) -> Result<Option<Page>, SourceError> {
        flickr_api::Paginator::next_page(self)
            .await
            .map_err(SourceError::from)
    }
}

/// Replays a fixed list of page bodies, numbered from 1.
#[derive(Debug, Default)]
pub struct VecSource {
    pages: VecDeque<Page>,
}

impl VecSource {
    pub fn new<I, B>(bodies: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let pages = bodies
            .into_iter()
            .zip(1..)
            .map(|(body, number)| Page {
                number,
                body: body.into(),
            })
            .collect();
        Self { pages }
    }

    /// Load saved API responses, one page per file, in the given order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> std::io::Result<Self> {
        let bodies = paths
            .iter()
            .map(std::fs::read)
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::new(bodies))
    }
}

#[async_trait]
impl PageSource for VecSource {
    async fn next_page(&mut self) -> Result<Option<Page>, SourceError> {
        Ok(self.pages.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn vec_source_numbers_pages_in_order() {
        let mut source = VecSource::new(vec!["a", "b"]);

        let first = source.next_page().await.unwrap().unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(&first.body[..], b"a");

        let second = source.next_page().await.unwrap().unwrap();
        assert_eq!(second.number, 2);

        assert!(source.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn vec_source_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("page-1.json");
        let two = dir.path().join("page-2.json");
        std::fs::write(&one, br#"{"photos":{"photo":[]}}"#).unwrap();
        std::fs::write(&two, br#"{"photos":{"photo":[{"id":"1"}]}}"#).unwrap();

        let mut source = VecSource::from_files(&[two, one]).unwrap();
        let page = source.next_page().await.unwrap().unwrap();
        assert_eq!(page.number, 1);
        assert!(page.body.starts_with(br#"{"photos":{"photo":[{"#));
    }

    #[test]
    fn from_files_missing_file() {
        assert!(VecSource::from_files(&["/nonexistent/page.json"]).is_err());
    }
}
