use postgres::types::Type;
use stratum_core::{driver::Param, Kind};

pub trait TypeExt {
    /// Converts a column kind to a PostgreSQL type.
    fn to_postgres_type(&self) -> Type;

    /// The array type whose elements have this kind.
    fn to_postgres_array_type(&self) -> Type;
}

impl TypeExt for Kind {
    fn to_postgres_type(&self) -> Type {
        match self {
            Kind::Boolean => Type::BOOL,
            Kind::Int => Type::INT4,
            Kind::Long | Kind::Model => Type::INT8,
            Kind::Double => Type::FLOAT8,
            Kind::Timestamp => Type::TIMESTAMPTZ,
            Kind::Blob => Type::BYTEA,
            // Enums, lists and flex values live in TEXT columns.
            Kind::String | Kind::Enum | Kind::List | Kind::Flex => Type::TEXT,
        }
    }

    fn to_postgres_array_type(&self) -> Type {
        match self {
            Kind::Boolean => Type::BOOL_ARRAY,
            Kind::Int => Type::INT4_ARRAY,
            Kind::Long | Kind::Model => Type::INT8_ARRAY,
            Kind::Double => Type::FLOAT8_ARRAY,
            Kind::Timestamp => Type::TIMESTAMPTZ_ARRAY,
            Kind::Blob => Type::BYTEA_ARRAY,
            Kind::String | Kind::Enum | Kind::List | Kind::Flex => Type::TEXT_ARRAY,
        }
    }
}

/// The declared type of a bound parameter.
pub fn param_type(param: &Param) -> Type {
    if param.is_array() {
        param.kind.to_postgres_array_type()
    } else {
        param.kind.to_postgres_type()
    }
}
