use crate::Kind;

use serde::{Deserialize, Serialize};

/// Per-field metadata of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: Kind,

    /// Target model for `model` fields and for lists of records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model: Option<String>,

    /// Element kind for lists of scalars, or the enum type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,

    /// Property of the target that a foreign field stores as its key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_field: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub identity: bool,

    /// Identity values come from a sequence rather than being generated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub sequence: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub index: bool,

    /// Computed, never persisted.
    #[serde(default, rename = "virtual", skip_serializing_if = "is_false")]
    pub is_virtual: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    /// Stored as a scalar key to another record.
    #[serde(default, skip_serializing_if = "is_false")]
    pub foreign: bool,

    /// Children are independent records looked up by owner id.
    #[serde(default, skip_serializing_if = "is_false")]
    pub referenced: bool,

    /// Set on fields appended from an ancestor while flattening.
    #[serde(default, skip_serializing_if = "is_false")]
    pub inherited: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: Kind) -> FieldSchema {
        FieldSchema {
            name: name.into(),
            kind,
            base_model: None,
            base_type: None,
            foreign_field: None,
            identity: false,
            sequence: false,
            index: false,
            is_virtual: false,
            ephemeral: false,
            required: false,
            read_only: false,
            foreign: false,
            referenced: false,
            inherited: false,
            default: None,
            provider: None,
            description: None,
        }
    }

    /// Neither virtual nor ephemeral.
    pub fn is_persisted(&self) -> bool {
        !self.is_virtual && !self.ephemeral
    }

    /// A list whose elements are foreign keys to another model.
    pub fn is_foreign_list(&self) -> bool {
        self.kind == Kind::List && self.foreign
    }

    /// A single foreign record stored as its key.
    pub fn is_foreign_model(&self) -> bool {
        self.kind == Kind::Model && self.foreign
    }

    /// A list whose elements are records of `base_model`.
    pub fn is_model_list(&self) -> bool {
        self.kind == Kind::List && self.base_model.is_some()
    }

    /// Whether the field maps to a column of the model's own table.
    pub fn is_column(&self) -> bool {
        if !self.is_persisted() || self.referenced || self.is_foreign_list() {
            return false;
        }

        match self.kind {
            Kind::Model => self.foreign,
            Kind::List => self.base_model.is_none(),
            Kind::Flex => false,
            _ => true,
        }
    }

    /// Whether the field can be the target of an update.
    pub fn is_mutable_column(&self) -> bool {
        self.is_column() && !self.identity && !self.read_only
    }
}
