use serde::{Deserialize, Serialize};

/// Declared kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Int,
    Long,
    Double,
    Boolean,
    Timestamp,
    Blob,
    Enum,
    Model,
    List,
    /// Placeholder kind. A cell declared `flex` must be concretized through
    /// the flex-set path before it can be read or written.
    Flex,
}

impl Kind {
    pub fn is_scalar(self) -> bool {
        !matches!(self, Kind::Model | Kind::List | Kind::Flex)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Double => "double",
            Kind::Boolean => "boolean",
            Kind::Timestamp => "timestamp",
            Kind::Blob => "blob",
            Kind::Enum => "enum",
            Kind::Model => "model",
            Kind::List => "list",
            Kind::Flex => "flex",
        }
    }

    /// Parses a kind name as it appears in schema documents.
    pub fn parse(name: &str) -> Option<Kind> {
        Some(match name.to_ascii_lowercase().as_str() {
            "string" => Kind::String,
            "int" => Kind::Int,
            "long" => Kind::Long,
            "double" => Kind::Double,
            "boolean" => Kind::Boolean,
            "timestamp" => Kind::Timestamp,
            "blob" => Kind::Blob,
            "enum" => Kind::Enum,
            "model" => Kind::Model,
            "list" => Kind::List,
            "flex" => Kind::Flex,
            _ => return None,
        })
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
