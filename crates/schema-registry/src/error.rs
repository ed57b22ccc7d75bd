use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("HTTP error fetching schema {id}: {source}")]
    Http {
        id: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Schema registry returned {status} for schema {id}")]
    Status { id: u32, status: reqwest::StatusCode },

    #[error("Invalid Avro schema {id}: {source}")]
    Parse {
        id: u32,
        #[source]
        source: apache_avro::Error,
    },

    #[error("Avro decode error with schema {id}: {source}")]
    Decode {
        id: u32,
        #[source]
        source: apache_avro::Error,
    },

    #[error("Invalid schema registry configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
