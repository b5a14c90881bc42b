//! SQL identifier quoting.

use crate::connection::Dialect;

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are escaped by doubling them (`"` → `""`).
///
/// # Examples
///
/// ```
/// use linksync_core::quote_ident;
///
/// assert_eq!(quote_ident("hero_powers"), "\"hero_powers\"");
/// assert_eq!(quote_ident("user\"name"), "\"user\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL identifier using MySQL backtick quoting.
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote an identifier the way `dialect` expects.
#[inline]
pub fn quote_ident_for(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::Mysql => quote_ident_mysql(name),
        Dialect::Postgres | Dialect::Sqlite => quote_ident(name),
    }
}
