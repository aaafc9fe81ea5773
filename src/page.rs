//! Page decoding.
//!
//! Extracts `(id, latitude, longitude)` records from one raw API page. The
//! payload is loosely typed: Flickr returns most numbers as strings and only
//! includes coordinates for geotagged photos. Entries without usable
//! coordinates are skipped; only a payload that is not a photo page at all
//! fails the decode.

use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::pip::Coordinate;

/// Object keys under which a photo list may appear.
const PHOTO_LIST_ROOTS: [&str; 2] = ["photos", "photoset"];

/// A geotagged photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoRecord {
    pub id: i64,
    pub coordinate: Coordinate,
}

/// Records decoded from one page, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPage {
    pub number: u32,
    pub records: Vec<PhotoRecord>,
    /// Entries dropped for missing or malformed fields.
    pub skipped: usize,
}

/// Decode one page payload.
///
/// # Errors
///
/// Returns [`DecodeError`] if `body` is not JSON or has no photo list.
pub fn decode_page(number: u32, body: &[u8]) -> Result<DecodedPage, DecodeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::new(number, e.to_string()))?;

    let photos = PHOTO_LIST_ROOTS
        .iter()
        .find_map(|root| value.get(root)?.get("photo"))
        .ok_or_else(|| DecodeError::new(number, "no photo list in payload"))?
        .as_array()
        .ok_or_else(|| DecodeError::new(number, "photo list is not an array"))?;

    let mut page = DecodedPage {
        number,
        records: Vec::with_capacity(photos.len()),
        skipped: 0,
    };

    for entry in photos {
        match decode_record(entry) {
            Some(record) => page.records.push(record),
            None => page.skipped += 1,
        }
    }

    debug!(
        page = number,
        records = page.records.len(),
        skipped = page.skipped,
        "Decoded page"
    );

    Ok(page)
}

fn decode_record(entry: &Value) -> Option<PhotoRecord> {
    let (Some(lat), Some(lon)) = (entry.get("latitude"), entry.get("longitude")) else {
        return None;
    };

    let Some(id) = entry.get("id").and_then(as_i64) else {
        debug!(entry = %entry, "Skipping photo without a usable id");
        return None;
    };

    let (Some(latitude), Some(longitude)) = (as_f64(lat), as_f64(lon)) else {
        debug!(photo_id = id, "Skipping photo with non-numeric coordinates");
        return None;
    };

    Some(PhotoRecord {
        id,
        coordinate: Coordinate::new(latitude, longitude),
    })
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    let f = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decodes_string_fields() {
        let body = br#"{"photos":{"photo":[{"id":"1","latitude":"37.6","longitude":"-122.4"}]}}"#;
        let page = decode_page(1, body).unwrap();

        assert_eq!(page.skipped, 0);
        assert_eq!(
            page.records,
            vec![PhotoRecord {
                id: 1,
                coordinate: Coordinate::new(37.6, -122.4),
            }]
        );
    }

    #[test]
    fn decodes_numeric_fields() {
        let body = br#"{"photos":{"photo":[{"id":52841234567,"latitude":37.615223,"longitude":-122.389977}]}}"#;
        let page = decode_page(1, body).unwrap();
        assert_eq!(page.records[0].id, 52841234567);
        assert_eq!(page.records[0].coordinate.latitude, 37.615223);
    }

    #[test]
    fn skips_missing_coordinates() {
        let body = br#"{"photos":{"photo":[
            {"id":"1","latitude":"37.6"},
            {"id":"2","longitude":"-122.4"},
            {"id":"3"},
            {"id":"4","latitude":"1.5","longitude":"2.5"}
        ]}}"#;
        let page = decode_page(2, body).unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.skipped, 3);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, 4);
    }

    #[test]
    fn skips_malformed_entries() {
        let body = br#"{"photos":{"photo":[
            {"id":"x","latitude":"1","longitude":"2"},
            {"latitude":"1","longitude":"2"},
            {"id":"5","latitude":"north","longitude":"2"},
            {"id":"6","latitude":null,"longitude":"2"},
            "not an object",
            {"id":"7","latitude":"0","longitude":"0"}
        ]}}"#;
        let page = decode_page(1, body).unwrap();

        assert_eq!(page.skipped, 5);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, 7);
    }

    #[test]
    fn preserves_payload_order() {
        let body = br#"{"photos":{"photo":[
            {"id":"30","latitude":"3","longitude":"3"},
            {"id":"10","latitude":"1","longitude":"1"},
            {"id":"20","latitude":"2","longitude":"2"}
        ]}}"#;
        let ids: Vec<i64> = decode_page(1, body)
            .unwrap()
            .records
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn accepts_photoset_root() {
        let body = br#"{"photoset":{"id":"721","photo":[{"id":"9","latitude":"1","longitude":"2"}]},"stat":"ok"}"#;
        assert_eq!(decode_page(1, body).unwrap().records.len(), 1);
    }

    #[test]
    fn empty_page() {
        let page = decode_page(1, br#"{"photos":{"pages":0,"photo":[]}}"#).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn truncated_payload_is_fatal() {
        let err = decode_page(4, br#"{"photos":{"photo":[{"id":"1","lat"#).unwrap_err();
        assert_eq!(err.page, 4);
    }

    #[test]
    fn missing_photo_list_is_fatal() {
        assert_matches!(decode_page(1, br#"{"stat":"ok"}"#), Err(DecodeError { page: 1, .. }));
        assert_matches!(
            decode_page(1, br#"{"photos":{"photo":{"id":"1"}}}"#),
            Err(DecodeError { .. })
        );
    }
}
