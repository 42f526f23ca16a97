use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Byte encoding for ideas leaving the process (CLI output, exports).
pub trait IdeaCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T>;
}

// MessagePack codec (compact binary output)
pub struct MsgPackCodec;

impl IdeaCodec for MsgPackCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let buf = rmp_serde::to_vec_named(value)?;
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        let value = rmp_serde::from_slice(data)?;
        Ok(value)
    }
}

// Pretty JSON, the same shape the HTTP API returns
pub struct JsonCodec;

impl IdeaCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }
}
