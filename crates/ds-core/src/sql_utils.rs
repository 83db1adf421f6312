//! SQL identifier quoting utilities
//!
//! The statistics gatherer interpolates schema, table, and column names
//! into generated SQL. These helpers quote identifiers so hostile or
//! merely unusual names cannot break out of their position.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and doubles any embedded double
/// quotes, following the SQL standard.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`),
/// quoting each `.`-separated component individually.
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a potentially schema-qualified table name into (schema, table)
/// on the last `.`. Names without a `.` default to the `main` schema.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    if let Some(pos) = name.rfind('.') {
        (&name[..pos], &name[pos + 1..])
    } else {
        ("main", name)
    }
}
