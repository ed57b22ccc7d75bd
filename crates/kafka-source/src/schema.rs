//! Schema decode capability.
//!
//! The consumer does not talk to a schema registry itself. It is handed a
//! [`SchemaDecoder`] at startup, or runs in pass-through mode when none is
//! configured. The choice is made once, as a [`PayloadDecoder`] variant.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

/// Turns schema-encoded bytes into displayable bytes (typically JSON).
///
/// Implementations are shared by all partition workers and must tolerate
/// concurrent calls.
#[async_trait]
pub trait SchemaDecoder: Send + Sync {
    async fn decode(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// How record keys and values are decoded before display.
#[derive(Clone, Default)]
pub enum PayloadDecoder {
    /// Decode through a configured schema decoder
    Schema(Arc<dyn SchemaDecoder>),
    /// Bytes are shown as they arrived
    #[default]
    PassThrough,
}

impl PayloadDecoder {
    pub fn schema(decoder: impl SchemaDecoder + 'static) -> Self {
        PayloadDecoder::Schema(Arc::new(decoder))
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, PayloadDecoder::PassThrough)
    }

    /// Decode `data`, borrowing it unchanged in pass-through mode.
    pub async fn decode<'a>(&self, data: &'a [u8]) -> anyhow::Result<Cow<'a, [u8]>> {
        match self {
            PayloadDecoder::Schema(decoder) => Ok(Cow::Owned(decoder.decode(data).await?)),
            PayloadDecoder::PassThrough => Ok(Cow::Borrowed(data)),
        }
    }
}

impl std::fmt::Debug for PayloadDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadDecoder::Schema(_) => write!(f, "PayloadDecoder::Schema"),
            PayloadDecoder::PassThrough => write!(f, "PayloadDecoder::PassThrough"),
        }
    }
}
