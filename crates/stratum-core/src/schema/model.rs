use super::FieldSchema;
use crate::{Kind, Order, Result};

use serde::{Deserialize, Serialize};

/// Structural definition of a model.
///
/// Schemas handed out by the registry are flattened: inherited fields have
/// been appended after the model's own fields, and `implements` lists the
/// model itself followed by every ancestor visited while flattening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSchema {
    pub name: String,

    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[serde(default)]
    pub inherits: Vec<String>,

    /// Models this one claims to implement without importing their fields.
    #[serde(default)]
    pub like_inherits: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldSchema>,

    #[serde(default)]
    pub constraints: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Order applied to selects that do not name a sort field. Inherited
    /// from the nearest ancestor declaring one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,

    #[serde(default)]
    pub sort_order: Order,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
}

impl ModelSchema {
    /// Parses a raw schema document.
    pub fn from_json(contents: &str) -> Result<ModelSchema> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Identity fields in declaration order.
    pub fn identity_fields(&self) -> impl Iterator<Item = &FieldSchema> + '_ {
        self.fields.iter().filter(|field| field.identity)
    }

    pub fn has_identity(&self) -> bool {
        self.identity_fields().next().is_some()
    }

    /// The sequence-generated identity, if the model has one.
    pub fn sequence_field(&self) -> Option<&FieldSchema> {
        self.identity_fields().find(|field| field.sequence)
    }

    /// The generated opaque string identity, if the model has one.
    pub fn generated_field(&self) -> Option<&FieldSchema> {
        self.identity_fields()
            .find(|field| !field.sequence && field.kind == Kind::String)
    }

    /// Identity and indexed fields, the projection used by the file index.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &FieldSchema> + '_ {
        self.fields.iter().filter(|field| field.identity || field.index)
    }

    /// Fields that map to columns of the model's own table.
    pub fn columns(&self) -> impl Iterator<Item = &FieldSchema> + '_ {
        self.fields.iter().filter(|field| field.is_column())
    }

    /// Whether this model is `model` or extends it.
    pub fn inherits_from(&self, model: &str) -> bool {
        self.name == model || self.implements.iter().any(|name| name == model)
    }
}
