//! Metadata/content parsing capability registered per block type.
//!
//! Concrete, statically-typed block schemas are out of scope for this
//! crate — extracted blocks are handed back as generic `serde_json::Value`,
//! and a caller downcasts via `serde_json::from_value::<T>` using the known
//! `block_type` tag. `Schema` is the seam a caller plugs validation or
//! shaping logic into before that happens.

use serde_json::{Map, Value};

/// Parses a candidate's accumulated metadata/content into JSON values,
/// returning a human-readable error on failure.
pub trait Schema: Send + Sync {
    fn parse_metadata(&self, raw: &Map<String, Value>) -> Result<Value, String>;
    fn parse_content(&self, raw: &str) -> Result<Value, String>;
}

/// The default schema used when no type-specific schema is registered:
/// metadata passes through as a JSON object, content is wrapped the way the
/// reference implementation's `BaseContent` does (a `raw_content` field).
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseSchema;

impl Schema for BaseSchema {
    fn parse_metadata(&self, raw: &Map<String, Value>) -> Result<Value, String> {
        Ok(Value::Object(raw.clone()))
    }

    fn parse_content(&self, raw: &str) -> Result<Value, String> {
        let mut map = Map::new();
        map.insert("raw_content".to_string(), Value::String(raw.to_string()));
        Ok(Value::Object(map))
    }
}
