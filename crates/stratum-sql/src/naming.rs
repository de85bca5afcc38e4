//! Table, column and alias names.

/// Words that must be quoted when used as a column name.
const RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASYMMETRIC", "AUTHORIZATION", "BETWEEN", "BOTH", "CASE",
    "CAST", "CHECK", "CONSTRAINT", "CROSS", "CURRENT_CATALOG", "CURRENT_DATE", "CURRENT_PATH",
    "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "DAY",
    "DEFAULT", "DISTINCT", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN",
    "FROM", "FULL", "GROUP", "GROUPS", "HAVING", "HOUR", "IF", "ILIKE", "IN", "INNER", "INTERSECT",
    "INTERVAL", "IS", "JOIN", "KEY", "LEADING", "LEFT", "LIKE", "LIMIT", "LOCALTIME",
    "LOCALTIMESTAMP", "MINUS", "MINUTE", "MONTH", "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR",
    "ORDER", "OVER", "PARTITION", "PRIMARY", "QUALIFY", "RANGE", "REGEXP", "RIGHT", "ROW", "ROWNUM",
    "ROWS", "SECOND", "SELECT", "SESSION_USER", "SET", "SOME", "SYMMETRIC", "SYSTEM_USER", "TABLE",
    "TO", "TOP", "TRAILING", "TRUE", "UESCAPE", "UNION", "UNIQUE", "UNKNOWN", "USER", "USING",
    "VALUE", "VALUES", "WHEN", "WHERE", "WINDOW", "WITH", "YEAR", "_ROWID_",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
}

/// `<prefix>_<model>`, lower-cased, with `.` replaced by `_`.
pub fn table_name(prefix: &str, model: &str) -> String {
    let model = model.replace('.', "_").to_lowercase();
    if prefix.is_empty() {
        model
    } else {
        format!("{}_{model}", prefix.to_lowercase())
    }
}

/// The column name for a field, double-quoted when reserved.
pub fn column_name(field: &str) -> String {
    if is_reserved(field) {
        format!("\"{field}\"")
    } else {
        field.to_string()
    }
}

/// First and last alphanumeric characters of the model name followed by
/// `ordinal`.
pub fn alias(model: &str, ordinal: usize) -> String {
    let mut chars = model
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase());

    let first = chars.next().unwrap_or('t');
    let last = chars.last().unwrap_or(first);
    format!("{first}{last}{ordinal}")
}

/// Escapes a string for use inside a single-quoted SQL literal.
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
