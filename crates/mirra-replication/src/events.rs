//! Change-notification parsing.
//!
//! The source store delivers notifications as JSON batches of records,
//! each naming a bucket, a percent-encoded object key, and an event name.
//! Only the `ObjectCreated:*` and `ObjectRemoved:*` families are acted
//! on; records from any other family are dropped during parsing.

use mirra_core::{Error, Result};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::debug;

/// The kind of change a notification record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The source object was created or overwritten.
    Created,
    /// The source object was deleted.
    Removed,
}

/// One decoded change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Source bucket the change occurred in.
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
    /// What happened to the object.
    pub kind: EventKind,
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<RecordPayload>,
}

/// Wire shape of a single notification record. Unknown fields are
/// tolerated; only the parts Mirra acts on are modeled.
#[derive(Debug, Deserialize)]
struct RecordPayload {
    #[serde(rename = "eventName")]
    event_name: String,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// Parses a notification batch into the events Mirra handles.
///
/// Records outside the created/removed families are skipped. Delivery is
/// at-least-once and unordered, so the returned order carries no meaning.
///
/// # Errors
///
/// Returns [`Error::InvalidEvent`] if the payload is not valid
/// notification JSON or a key fails to decode.
pub fn parse_notification(payload: &str) -> Result<Vec<ChangeEvent>> {
    let notification: Notification =
        serde_json::from_str(payload).map_err(|e| Error::InvalidEvent(e.to_string()))?;

    let mut events = Vec::with_capacity(notification.records.len());
    for record in notification.records {
        let Some(kind) = classify(&record.event_name) else {
            debug!(event_name = %record.event_name, "ignoring unhandled event family");
            continue;
        };
        events.push(ChangeEvent {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key)?,
            kind,
        });
    }
    Ok(events)
}

fn classify(event_name: &str) -> Option<EventKind> {
    if event_name.contains("ObjectCreated") {
        Some(EventKind::Created)
    } else if event_name.contains("ObjectRemoved") {
        Some(EventKind::Removed)
    } else {
        None
    }
}

/// Decodes a notification object key. Keys arrive percent-encoded with
/// spaces as `+`.
fn decode_key(raw: &str) -> Result<String> {
    let plussed = raw.replace('+', " ");
    percent_decode_str(&plussed)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| Error::InvalidEvent(format!("object key is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Records": [
            {
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "photos-src", "arn": "arn:aws:s3:::photos-src" },
                    "object": { "key": "albums/cat+photo%281%29.jpg", "size": 1024 }
                }
            },
            {
                "eventName": "ObjectRemoved:Delete",
                "s3": {
                    "bucket": { "name": "photos-src" },
                    "object": { "key": "albums/old.jpg" }
                }
            },
            {
                "eventName": "ObjectRestore:Completed",
                "s3": {
                    "bucket": { "name": "photos-src" },
                    "object": { "key": "ignored.bin" }
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_batch_decodes_and_filters() {
        let events = parse_notification(SAMPLE).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].kind, EventKind::Created);
        assert_eq!(events[0].bucket, "photos-src");
        assert_eq!(events[0].key, "albums/cat photo(1).jpg");

        assert_eq!(events[1].kind, EventKind::Removed);
        assert_eq!(events[1].key, "albums/old.jpg");
    }

    #[test]
    fn test_parse_empty_batch() {
        assert!(parse_notification("{}").unwrap().is_empty());
        assert!(parse_notification(r#"{"Records": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_payload() {
        let err = parse_notification("not json").unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[test]
    fn test_classify_families() {
        assert_eq!(classify("ObjectCreated:CompleteMultipartUpload"), Some(EventKind::Created));
        assert_eq!(classify("ObjectRemoved:DeleteMarkerCreated"), Some(EventKind::Removed));
        assert_eq!(classify("LifecycleExpiration:Delete"), None);
    }
}
