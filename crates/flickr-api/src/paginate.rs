//! Pull-based pagination over a Flickr API method.
//!
//! [`Paginator`] turns a paginated method call into a sequence of
//! [`Page`]s: each [`next_page`](Paginator::next_page) call fetches one page
//! and `Ok(None)` signals that the result set is exhausted.

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::FlickrClient;
use crate::error::Result;

/// One raw page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number as requested from the API.
    pub number: u32,
    /// Raw JSON body.
    pub body: Bytes,
}

/// Walks every page of a method's result set.
pub struct Paginator {
    client: FlickrClient,
    params: Vec<(String, String)>,
    next: u32,
    last: Option<u32>,
    exhausted: bool,
}

impl Paginator {
    /// Create a paginator for the method described by `params`.
    ///
    /// A caller-supplied `page` parameter sets the first page to fetch; it is
    /// otherwise owned by the paginator.
    pub fn new(client: FlickrClient, params: Vec<(String, String)>) -> Self {
        let mut first = 1;
        let params = params
            .into_iter()
            .filter(|(k, v)| {
                if k == "page" {
                    if let Ok(n) = v.parse::<u32>() {
                        first = n.max(1);
                    }
                    false
                } else {
                    true
                }
            })
            .collect();

        Self {
            client,
            params,
            next: first,
            last: None,
            exhausted: false,
        }
    }

    /// Fetch the next page, or `Ok(None)` once every page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(last) = self.last {
            if self.next > last {
                self.exhausted = true;
                return Ok(None);
            }
        }

        let number = self.next;
        let mut params = self.params.clone();
        params.push(("page".to_string(), number.to_string()));

        let body = match self.client.execute_method(&params).await {
            Ok(body) => body,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        match total_pages(&body) {
            Some(total) => {
                if self.last.is_none() {
                    info!(pages = total, "Paginating Flickr results");
                }
                self.last = Some(total);
            }
            None => {
                debug!(page = number, "Response carries no pagination metadata, stopping");
                self.exhausted = true;
            }
        }

        self.next = number + 1;
        Ok(Some(Page { number, body }))
    }
}

/// Read the total page count from the first object in the response that
/// carries a `pages` field (`photos`, `photoset`, ...).
///
/// Flickr reports it as either a number or a numeric string.
pub(crate) fn total_pages(body: &[u8]) -> Option<u32> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.as_object()?.values().find_map(|v| {
        match v.get("pages")? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_as_number() {
        let body = br#"{"photos":{"page":1,"pages":7,"perpage":100,"photo":[]},"stat":"ok"}"#;
        assert_eq!(total_pages(body), Some(7));
    }

    #[test]
    fn pages_as_string() {
        let body = br#"{"photoset":{"page":"1","pages":"3","photo":[]},"stat":"ok"}"#;
        assert_eq!(total_pages(body), Some(3));
    }

    #[test]
    fn no_pagination_metadata() {
        assert_eq!(total_pages(br#"{"photo":{"id":"1"},"stat":"ok"}"#), None);
        assert_eq!(total_pages(b"[]"), None);
    }

    #[test]
    fn page_param_sets_start() {
        let client = FlickrClient::from_uri("flickr://api?api_key=k").unwrap();
        let paginator = Paginator::new(
            client,
            vec![
                ("method".into(), "flickr.photos.search".into()),
                ("page".into(), "4".into()),
            ],
        );
        assert_eq!(paginator.next, 4);
        assert!(paginator.params.iter().all(|(k, _)| k != "page"));
    }
}
