//! The persisted record shape: one document per object.
//!
//! Every record in the tree — top-level resources and annotation sub-records
//! alike — is stored as a single flat document keyed by its oid. The opaque
//! serialized object state travels in the `state` field as base64 text so it
//! survives the document format; [`encode_state`]/[`decode_state`] guarantee
//! a byte-for-byte round trip.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::ids::{Oid, Tid};

/// Encode an opaque state blob into its document-safe text form.
pub fn encode_state(state: &[u8]) -> String {
    STANDARD.encode(state)
}

/// Decode the document text form back into raw state bytes.
pub fn decode_state(text: &str) -> Result<Vec<u8>, RecordError> {
    STANDARD
        .decode(text)
        .map_err(|e| RecordError::InvalidStateEncoding(e.to_string()))
}

/// A persisted object record, as stored in (and read back from) a document.
///
/// Query projections select only a subset of the fields, so everything but
/// the key, the name, and the type falls back to a default when absent:
/// `part` defaults to 0, ownership and version markers to `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// The record's oid. Stored under `zoid` to keep the document key
    /// queryable as an ordinary field.
    #[serde(rename = "zoid")]
    pub oid: Oid,
    /// Transaction id of the current version.
    #[serde(default)]
    pub tid: Tid,
    /// Byte length of the serialized state.
    #[serde(default)]
    pub size: u64,
    /// Partition/shard hint; 0 when the writer reports none.
    #[serde(default)]
    pub part: i64,
    /// Marks a top-level content resource.
    #[serde(default)]
    pub resource: bool,
    /// Owning resource when this record is an annotation; `None` for
    /// top-level resources.
    #[serde(default)]
    pub of: Option<Oid>,
    /// The tid the writer observed as current immediately before this write.
    /// Populated on every write but never checked — conflict detection is a
    /// known gap, not a feature.
    #[serde(default)]
    pub otid: Option<Tid>,
    /// Structural parent in the content tree.
    #[serde(default)]
    pub parent_id: Option<Oid>,
    /// The record's name, unique among siblings under one parent.
    pub id: String,
    /// Content-type discriminator.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Denormalized projection of indexable fields for search queries;
    /// independent of `state`.
    #[serde(default)]
    pub json: Option<Map<String, Value>>,
    /// The opaque serialized object, carried as base64 text in the document.
    #[serde(with = "b64_state")]
    pub state: Vec<u8>,
}

impl ObjectRecord {
    /// Decode a record from a stored document (or a query projection of one).
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, RecordError> {
        serde_json::from_value(Value::Object(doc)).map_err(|e| RecordError::Malformed(e.to_string()))
    }

    /// Serialize the record into its full document form. Optional fields are
    /// written as explicit nulls so the document shape stays uniform.
    pub fn to_document(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct always serializes to an object.
            _ => Map::new(),
        }
    }
}

mod b64_state {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{decode_state, encode_state};

    pub fn serialize<S: Serializer>(state: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_state(state))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_state(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_record() -> ObjectRecord {
        ObjectRecord {
            oid: Oid::from("a1"),
            tid: Tid::new(7),
            size: 5,
            part: 0,
            resource: true,
            of: None,
            otid: Some(Tid::new(6)),
            parent_id: Some(Oid::root()),
            id: "folder".to_string(),
            type_name: "Folder".to_string(),
            json: Some(Map::new()),
            state: b"hello".to_vec(),
        }
    }

    // -----------------------------------------------------------------------
    // State encoding
    // -----------------------------------------------------------------------

    #[test]
    fn state_round_trips_through_text() {
        let state = vec![0u8, 1, 2, 255, 254, 127];
        let text = encode_state(&state);
        assert!(text.is_ascii());
        assert_eq!(decode_state(&text).unwrap(), state);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_state("not base64 at all!!").unwrap_err();
        assert!(matches!(err, RecordError::InvalidStateEncoding(_)));
    }

    proptest! {
        #[test]
        fn any_state_round_trips(state in proptest::collection::vec(any::<u8>(), 0..512)) {
            let text = encode_state(&state);
            prop_assert_eq!(decode_state(&text).unwrap(), state);
        }
    }

    // -----------------------------------------------------------------------
    // Document round trip
    // -----------------------------------------------------------------------

    #[test]
    fn full_document_round_trip() {
        let record = sample_record();
        let doc = record.to_document();
        assert_eq!(doc["zoid"], Value::String("a1".to_string()));
        assert_eq!(doc["type"], Value::String("Folder".to_string()));
        // State travels as base64 text, not raw bytes.
        assert_eq!(doc["state"], Value::String(encode_state(b"hello")));
        // Absent owner is an explicit null, keeping the document uniform.
        assert_eq!(doc["of"], Value::Null);

        let back = ObjectRecord::from_document(doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn partial_projection_fills_defaults() {
        // A child-listing projection carries only a subset of fields.
        let mut doc = Map::new();
        doc.insert("zoid".into(), Value::String("c9".into()));
        doc.insert("tid".into(), Value::from(3u64));
        doc.insert("id".into(), Value::String("child".into()));
        doc.insert("type".into(), Value::String("Item".into()));
        doc.insert("state".into(), Value::String(encode_state(b"x")));

        let record = ObjectRecord::from_document(doc).unwrap();
        assert_eq!(record.part, 0);
        assert_eq!(record.of, None);
        assert_eq!(record.otid, None);
        assert_eq!(record.parent_id, None);
        assert!(!record.resource);
        assert_eq!(record.state, b"x");
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut doc = Map::new();
        doc.insert("zoid".into(), Value::String("c9".into()));
        let err = ObjectRecord::from_document(doc).unwrap_err();
        assert!(matches!(err, RecordError::Malformed(_)));
    }

    #[test]
    fn corrupt_state_text_is_invalid_encoding_error() {
        let mut doc = sample_record().to_document();
        doc.insert("state".into(), Value::String("%%%".into()));
        let err = ObjectRecord::from_document(doc).unwrap_err();
        // Surfaces through serde as a malformed-document error.
        assert!(matches!(err, RecordError::Malformed(_)));
    }
}
