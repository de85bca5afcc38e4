//! `CREATE TABLE` and `CREATE INDEX` for a model.

use crate::{naming, SqlDialect};

use stratum_core::{
    schema::{names, ModelSchema},
    Error, Result,
};

/// Statements creating the table of `schema` and its indexes. Every
/// statement is idempotent.
pub fn create_table(dialect: &dyn SqlDialect, prefix: &str, schema: &ModelSchema) -> Result<Vec<String>> {
    if schema.is_abstract {
        return Err(Error::invalid_statement(format!(
            "`{}` is abstract and has no table",
            schema.name
        )));
    }
    if !schema.has_identity() {
        return Err(Error::identity_missing(&schema.name));
    }

    let table = naming::table_name(prefix, &schema.name);

    let definitions: Vec<String> = schema
        .columns()
        .map(|field| {
            let column = naming::column_name(&field.name);
            if field.sequence {
                format!("{column} {}", dialect.sequence_column())
            } else if field.identity {
                format!("{column} {} UNIQUE", dialect.column_type(field.kind))
            } else {
                format!("{column} {}", dialect.column_type(field.kind))
            }
        })
        .collect();

    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        definitions.join(", ")
    )];

    for field in schema.columns() {
        if field.identity || !(field.index || field.name == names::REFERENCE_ID) {
            continue;
        }
        statements.push(format!(
            "CREATE INDEX IF NOT EXISTS {table}_{}_idx ON {table} ({})",
            field.name.to_lowercase(),
            naming::column_name(&field.name)
        ));
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgresql, Sqlite};

    fn tag() -> ModelSchema {
        ModelSchema::from_json(
            r#"{
                "name": "tag",
                "fields": [
                    { "name": "id", "type": "long", "identity": true, "sequence": true },
                    { "name": "objectId", "type": "string", "identity": true },
                    { "name": "name", "type": "string", "index": true },
                    { "name": "referenceId", "type": "long" },
                    { "name": "referenceType", "type": "string" },
                    { "name": "scratch", "type": "string", "virtual": true }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn sqlite_table() {
        let statements = create_table(&Sqlite, "a7", &tag()).unwrap();
        assert_eq!(
            statements,
            [
                "CREATE TABLE IF NOT EXISTS a7_tag (id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 objectId TEXT UNIQUE, name TEXT, referenceId INTEGER, referenceType TEXT)",
                "CREATE INDEX IF NOT EXISTS a7_tag_name_idx ON a7_tag (name)",
                "CREATE INDEX IF NOT EXISTS a7_tag_referenceid_idx ON a7_tag (referenceId)",
            ]
        );
    }

    #[test]
    fn postgresql_table() {
        let statements = create_table(&Postgresql, "a7", &tag()).unwrap();
        assert_eq!(
            statements[0],
            "CREATE TABLE IF NOT EXISTS a7_tag (id BIGSERIAL PRIMARY KEY, \
             objectId TEXT UNIQUE, name TEXT, referenceId BIGINT, referenceType TEXT)"
        );
    }

    #[test]
    fn schema_without_identity_has_no_table() {
        let schema = ModelSchema::from_json(
            r#"{ "name": "loose", "fields": [ { "name": "x", "type": "int" } ] }"#,
        )
        .unwrap();
        assert!(create_table(&Sqlite, "a7", &schema)
            .unwrap_err()
            .is_identity_missing());
    }
}
