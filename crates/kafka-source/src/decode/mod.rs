//! Record decoding.
//!
//! Turns a [`FetchedRecord`] into exactly one [`DecodedRecord`]. Nothing in
//! here fails: schema decode and formatting problems are recorded as
//! diagnostics on the record and the raw bytes are kept for display.

mod format;
mod header;

pub use format::{format_key, pretty_value};
pub use header::decode_header_value;

use kafka_types::{DecodedHeader, DecodedRecord, FetchedRecord};
use tracing::debug;

use crate::schema::PayloadDecoder;

/// Decodes fetched records for display.
#[derive(Debug, Clone, Default)]
pub struct DecodePipeline {
    decoder: PayloadDecoder,
    raw: bool,
    color: bool,
}

impl DecodePipeline {
    pub fn new(decoder: PayloadDecoder, raw: bool) -> Self {
        Self {
            decoder,
            raw,
            color: false,
        }
    }

    /// Color pretty-printed values and JSON keys with ANSI escapes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Whether values are shown without pretty-printing and without metadata.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub async fn decode(&self, record: FetchedRecord) -> DecodedRecord {
        let FetchedRecord {
            partition,
            offset,
            timestamp,
            key,
            value,
            headers,
            read_errors,
        } = record;
        let mut decode_errors = read_errors;

        let value = self.decode_value(value, &mut decode_errors).await;

        let (key, headers) = if self.raw {
            (None, Vec::new())
        } else {
            let key = match key {
                Some(key) if !key.is_empty() => {
                    Some(self.decode_key(key, &mut decode_errors).await)
                }
                _ => None,
            };
            let headers = headers
                .into_iter()
                .map(|header| DecodedHeader {
                    key: String::from_utf8_lossy(&header.key).into_owned(),
                    value: decode_header_value(&header.value),
                })
                .collect();
            (key, headers)
        };

        if !decode_errors.is_empty() {
            debug!(
                "Record {partition}/{offset} decoded with {} diagnostic(s)",
                decode_errors.len()
            );
        }

        DecodedRecord {
            partition,
            offset,
            timestamp,
            key,
            headers,
            value,
            decode_errors,
        }
    }

    async fn decode_value(&self, value: Vec<u8>, errors: &mut Vec<String>) -> Vec<u8> {
        if value.is_empty() {
            return value;
        }

        let decoded = match self.decoder.decode(&value).await {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(e) => {
                errors.push(format!("could not decode schema-encoded value: {e:#}"));
                None
            }
        };
        let decoded = decoded.unwrap_or(value);

        if self.raw {
            return decoded;
        }
        pretty_value(&decoded, self.color).unwrap_or(decoded)
    }

    async fn decode_key(&self, key: Vec<u8>, errors: &mut Vec<String>) -> String {
        match self.decoder.decode(&key).await {
            Ok(decoded) => format_key(&decoded, self.color),
            Err(e) => {
                errors.push(format!("could not decode schema-encoded key: {e:#}"));
                format_key(&key, self.color)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDecoder;
    use async_trait::async_trait;

    /// Accepts bytes prefixed with `0x00`, returning the rest.
    struct Framed;

    #[async_trait]
    impl SchemaDecoder for Framed {
        async fn decode(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
            match data.split_first() {
                Some((0, rest)) => Ok(rest.to_vec()),
                _ => anyhow::bail!("unknown magic byte"),
            }
        }
    }

    fn record() -> FetchedRecord {
        FetchedRecord::new(2, 17, br#"{"name":"x","n":1}"#.to_vec())
            .with_key(br#"{"id":1}"#.to_vec())
            .with_header("source", vec![161, 3, b'a', b'p', b'p'])
            .with_header("seq", vec![131, 0, 0, 0, 0, 0, 0, 0, 9])
            .with_timestamp_millis(1_000)
    }

    #[tokio::test]
    async fn test_pass_through_pretty_prints() {
        let decoded = DecodePipeline::default().decode(record()).await;

        assert_eq!(decoded.partition, 2);
        assert_eq!(decoded.offset, 17);
        assert_eq!(decoded.key.as_deref(), Some(r#"{ "id": 1 }"#));
        assert_eq!(
            String::from_utf8(decoded.value).unwrap(),
            "{\n  \"name\": \"x\",\n  \"n\": 1\n}"
        );
        let headers: Vec<_> = decoded
            .headers
            .iter()
            .map(|h| (h.key.as_str(), h.value.as_slice()))
            .collect();
        assert_eq!(headers, vec![("source", &b"app"[..]), ("seq", &b"9"[..])]);
        assert!(decoded.decode_errors.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_value_is_shown_verbatim() {
        let decoded = DecodePipeline::default()
            .decode(FetchedRecord::new(0, 0, b"hello world".to_vec()))
            .await;
        assert_eq!(decoded.value, b"hello world");
        assert!(decoded.decode_errors.is_empty());
    }

    #[tokio::test]
    async fn test_schema_decoded_value() {
        let pipeline = DecodePipeline::new(PayloadDecoder::schema(Framed), false);
        let mut value = vec![0];
        value.extend_from_slice(br#"{"a":1}"#);
        let decoded = pipeline.decode(FetchedRecord::new(0, 0, value)).await;

        assert_eq!(decoded.value, b"{\n  \"a\": 1\n}");
        assert!(decoded.decode_errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_decode_keeps_raw_bytes() {
        let pipeline = DecodePipeline::new(PayloadDecoder::schema(Framed), false);
        let input = FetchedRecord::new(1, 5, b"not framed".to_vec()).with_key("k1");
        let decoded = pipeline.decode(input).await;

        assert_eq!(decoded.value, b"not framed");
        assert_eq!(decoded.key.as_deref(), Some("k1"));
        assert_eq!(decoded.decode_errors.len(), 2);
        assert!(decoded.decode_errors[0].contains("value"));
        assert!(decoded.decode_errors[0].contains("unknown magic byte"));
        assert!(decoded.decode_errors[1].contains("key"));
    }

    #[tokio::test]
    async fn test_empty_value_and_key_skip_decoder() {
        let pipeline = DecodePipeline::new(PayloadDecoder::schema(Framed), false);
        let decoded = pipeline
            .decode(FetchedRecord::new(0, 3, Vec::new()).with_key(Vec::new()))
            .await;

        assert!(decoded.value.is_empty());
        assert_eq!(decoded.key, None);
        assert!(decoded.decode_errors.is_empty());
    }

    #[tokio::test]
    async fn test_raw_mode_skips_formatting_and_metadata() {
        let pipeline = DecodePipeline::new(PayloadDecoder::PassThrough, true);
        let decoded = pipeline.decode(record()).await;

        assert_eq!(decoded.value, br#"{"name":"x","n":1}"#);
        assert_eq!(decoded.key, None);
        assert!(decoded.headers.is_empty());
    }

    #[tokio::test]
    async fn test_color_applies_to_formatted_output_only() {
        let colored = DecodePipeline::default().with_color(true);
        let decoded = colored.decode(record()).await;
        assert_eq!(
            decoded.key.as_deref(),
            Some("{ \x1b[34;1m\"id\"\x1b[0m: \x1b[36m1\x1b[0m }")
        );
        assert!(decoded.value.starts_with(b"{\n  \x1b[34;1m\"name\"\x1b[0m: \x1b[32m\"x\""));

        let plain = colored
            .decode(FetchedRecord::new(0, 0, b"hello world".to_vec()))
            .await;
        assert_eq!(plain.value, b"hello world");

        let raw = DecodePipeline::new(PayloadDecoder::PassThrough, true).with_color(true);
        assert_eq!(raw.decode(record()).await.value, br#"{"name":"x","n":1}"#);
    }

    #[tokio::test]
    async fn test_read_errors_are_carried_over() {
        let mut input = FetchedRecord::new(0, 0, b"v".to_vec());
        input.read_errors.push("could not read header 0".to_string());
        let decoded = DecodePipeline::default().decode(input).await;
        assert_eq!(decoded.decode_errors, vec!["could not read header 0"]);
    }
}
