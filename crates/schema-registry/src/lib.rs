//! Schema registry backed Avro decoding.
//!
//! Values written by Confluent-style serializers are framed as:
//!
//! ```text
//! byte 0      magic byte 0x00
//! bytes 1..5  schema id, big-endian u32
//! bytes 5..   Avro binary datum
//! ```
//!
//! [`SchemaRegistryDecoder`] looks the schema up (once per id, then cached),
//! decodes the datum and returns it as JSON. Data without the frame is passed
//! through unchanged.

pub mod avro;
pub mod client;
pub mod error;

use std::collections::HashMap;
use std::sync::Arc;

use apache_avro::Schema;
use async_trait::async_trait;
use kafka_tail_source::SchemaDecoder;
use tokio::sync::RwLock;
use tracing::debug;

pub use client::{RegistryClient, RegistryConfig};
pub use error::{Result, SchemaError};

const MAGIC_BYTE: u8 = 0x00;
const HEADER_LEN: usize = 5;

/// Split framed data into its schema id and Avro datum.
///
/// Returns `None` for data that is not framed.
pub fn split_frame(data: &[u8]) -> Option<(u32, &[u8])> {
    if data.len() < HEADER_LEN || data[0] != MAGIC_BYTE {
        return None;
    }
    let id = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    Some((id, &data[HEADER_LEN..]))
}

/// Decodes registry-framed Avro data to JSON bytes.
///
/// Safe to share between partition workers: lookups take a read lock and only
/// a cache miss takes the write lock.
pub struct SchemaRegistryDecoder {
    client: RegistryClient,
    cache: RwLock<HashMap<u32, Arc<Schema>>>,
}

impl SchemaRegistryDecoder {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        Ok(Self {
            client: RegistryClient::new(config)?,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Decode framed data, passing unframed data through.
    pub async fn decode_message(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Some((id, datum)) = split_frame(data) else {
            return Ok(data.to_vec());
        };

        let schema = self.schema(id).await?;
        let mut reader = datum;
        let value = apache_avro::from_avro_datum(&schema, &mut reader, None)
            .map_err(|source| SchemaError::Decode { id, source })?;

        Ok(avro::avro_to_json(&value).to_string().into_bytes())
    }

    async fn schema(&self, id: u32) -> Result<Arc<Schema>> {
        if let Some(schema) = self.cache.read().await.get(&id) {
            return Ok(Arc::clone(schema));
        }

        let definition = self.client.schema_by_id(id).await?;
        let schema =
            Schema::parse_str(&definition).map_err(|source| SchemaError::Parse { id, source })?;
        debug!("Cached schema {id} from {}", self.client.url());

        let mut cache = self.cache.write().await;
        let schema = cache.entry(id).or_insert_with(|| Arc::new(schema));
        Ok(Arc::clone(schema))
    }
}

#[async_trait]
impl SchemaDecoder for SchemaRegistryDecoder {
    async fn decode(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.decode_message(data).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::types::Value;

    const USER_SCHEMA: &str = r#"{
        "type": "record",
        "name": "User",
        "fields": [
            {"name": "id", "type": "long"},
            {"name": "name", "type": "string"},
            {"name": "email", "type": ["null", "string"], "default": null}
        ]
    }"#;

    fn decoder_with(id: u32, definition: &str) -> SchemaRegistryDecoder {
        // Unreachable registry: every lookup must hit the cache.
        let decoder = SchemaRegistryDecoder::new(RegistryConfig::new("http://127.0.0.1:1")).unwrap();
        let schema = Schema::parse_str(definition).unwrap();
        decoder
            .cache
            .try_write()
            .unwrap()
            .insert(id, Arc::new(schema));
        decoder
    }

    fn framed(id: u32, datum: Vec<u8>) -> Vec<u8> {
        let mut data = vec![MAGIC_BYTE];
        data.extend_from_slice(&id.to_be_bytes());
        data.extend(datum);
        data
    }

    #[test]
    fn test_split_frame() {
        assert_eq!(split_frame(&[0, 0, 0, 1, 2, 9, 9]), Some((258, &[9u8, 9][..])));
        assert_eq!(split_frame(&[0, 0, 0, 0, 1]), Some((1, &[][..])));
        assert_eq!(split_frame(&[0, 0, 0, 1]), None);
        assert_eq!(split_frame(b"{\"a\":1}"), None);
    }

    #[tokio::test]
    async fn test_unframed_data_passes_through() {
        let decoder = decoder_with(1, USER_SCHEMA);
        let decoded = decoder.decode_message(b"plain").await.unwrap();
        assert_eq!(decoded, b"plain");
    }

    #[tokio::test]
    async fn test_decode_cached_schema() {
        let decoder = decoder_with(7, USER_SCHEMA);
        let schema = Schema::parse_str(USER_SCHEMA).unwrap();
        let record = Value::Record(vec![
            ("id".to_string(), Value::Long(42)),
            ("name".to_string(), Value::String("ada".to_string())),
            (
                "email".to_string(),
                Value::Union(0, Box::new(Value::Null)),
            ),
        ]);
        let datum = apache_avro::to_avro_datum(&schema, record).unwrap();

        let decoded = decoder.decode_message(&framed(7, datum)).await.unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            r#"{"id":42,"name":"ada","email":null}"#
        );
    }

    #[tokio::test]
    async fn test_truncated_datum_is_an_error() {
        let decoder = decoder_with(7, USER_SCHEMA);
        let err = decoder.decode_message(&framed(7, vec![0x54])).await.unwrap_err();
        assert!(matches!(err, SchemaError::Decode { id: 7, .. }));
    }

    #[tokio::test]
    async fn test_uncached_schema_needs_registry() {
        let decoder = decoder_with(7, USER_SCHEMA);
        let err = decoder.decode_message(&framed(8, vec![0])).await.unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Http { id: 8, .. } | SchemaError::Status { id: 8, .. }
        ));
    }
}
