//! Wire JSON for record trees.
//!
//! Foreign relationships collapse to scalar keys under `<field>_FK` when the
//! target carries an identity, and expand back into records through an
//! optional [`Reader`] when decoding.

mod de;
mod ser;
pub mod scalar;

use crate::{Record, RecordFactory, Reader, Result};

use serde_json::Value as Json;

/// Key naming the model of an encoded record.
pub const MODEL_KEY: &str = "model";

/// Suffix of keys carrying a foreign record as its scalar key.
pub const FOREIGN_KEY_SUFFIX: &str = "_FK";

/// Enum constant that is never written and reads back as the default.
pub(crate) const UNKNOWN_ENUM: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Collapse foreign records to their key. When false every foreign
    /// record is embedded in full.
    pub foreign_keys: bool,

    /// Condense nested records of the enclosing model (or one related to it
    /// by inheritance) to their populated scalar fields.
    pub condense_self: bool,

    /// Leave virtual and ephemeral fields out of the output.
    pub skip_transient: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            foreign_keys: true,
            condense_self: true,
            skip_transient: false,
        }
    }
}

pub struct Codec<'a> {
    factory: &'a RecordFactory,
    options: CodecOptions,
    lookup: Option<&'a dyn Reader>,
}

impl<'a> Codec<'a> {
    pub fn new(factory: &'a RecordFactory) -> Codec<'a> {
        Codec {
            factory,
            options: CodecOptions::default(),
            lookup: None,
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Codec<'a> {
        self.options = options;
        self
    }

    /// Resolves foreign keys against `reader` while decoding. Without one,
    /// foreign keys decode to records holding only the key.
    pub fn with_lookup(mut self, reader: &'a dyn Reader) -> Codec<'a> {
        self.lookup = Some(reader);
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn serialize(&self, record: &Record) -> Result<Json> {
        Ok(Json::Object(self.encode_record(record)?))
    }

    pub fn to_string(&self, record: &Record) -> Result<String> {
        Ok(serde_json::to_string(&self.serialize(record)?)?)
    }

    pub fn to_string_pretty(&self, record: &Record) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize(record)?)?)
    }

    /// Decodes a record whose model is named by the `model` key.
    pub fn deserialize(&self, json: &Json) -> Result<Record> {
        self.decode_record(None, json)
    }

    pub fn from_str(&self, contents: &str) -> Result<Record> {
        let json: Json = serde_json::from_str(contents)?;
        self.deserialize(&json)
    }

    /// Decodes `contents` as a record of `model`, whether or not the payload
    /// names its model.
    pub fn import_record(&self, model: &str, contents: &str) -> Result<Record> {
        let mut json: Json = serde_json::from_str(contents)?;
        if let Json::Object(map) = &mut json {
            if !map.contains_key(MODEL_KEY) {
                map.insert(MODEL_KEY.to_string(), Json::String(model.to_string()));
            }
        }
        self.decode_record(Some(model), &json)
    }
}
