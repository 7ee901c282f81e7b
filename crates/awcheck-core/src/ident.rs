//! Validated SQL identifiers and table/column references.
//!
//! Values are always sent as bound parameters. Names cannot be bound, so the
//! checks that put a schema, table or column into the statement text go through
//! [`Ident`], which only admits regular T-SQL identifiers and renders them
//! bracket-quoted.
//!
//! Catalog queries compare lower-cased names, so they match under any
//! collation. Data queries name the object directly; there the caller's
//! spelling is quoted as given, which matters on case-sensitive collations.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Maximum identifier length (`sysname` is `nvarchar(128)`).
pub const MAX_IDENT_LEN: usize = 128;

/// A regular T-SQL identifier.
///
/// Equality, ordering and display use the lower-cased name.
#[derive(Debug, Clone)]
pub struct Ident {
    name: String,
    spelling: String,
}

impl Ident {
    /// Validate a name, keeping its spelling for quoting.
    ///
    /// Accepts a letter or `_` followed by letters, digits, `_`, `@`, `#` or `$`.
    pub fn new(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(Error::InvalidIdentifier("empty name".to_string()));
        };

        if name.chars().count() > MAX_IDENT_LEN {
            return Err(Error::InvalidIdentifier(format!(
                "'{name}' is longer than {MAX_IDENT_LEN} characters"
            )));
        }
        if !(first.is_alphabetic() || first == '_') {
            return Err(Error::InvalidIdentifier(format!(
                "'{name}' must start with a letter or underscore"
            )));
        }
        if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$'))) {
            return Err(Error::InvalidIdentifier(format!(
                "'{name}' contains '{bad}'"
            )));
        }

        Ok(Self {
            name: name.to_lowercase(),
            spelling: name.to_string(),
        })
    }

    /// The lower-cased name, as compared against `LOWER(...)` in catalog queries.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Bracket-quoted spelling for statement text.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("[{}]", self.spelling)
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ident {}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `schema.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    /// Schema name.
    pub schema: Ident,
    /// Table name.
    pub table: Ident,
}

impl TableRef {
    /// Validate both parts.
    pub fn new(schema: &str, table: &str) -> Result<Self> {
        Ok(Self {
            schema: Ident::new(schema)?,
            table: Ident::new(table)?,
        })
    }

    /// `[schema].[table]`.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("{}.{}", self.schema.quoted(), self.table.quoted())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// `schema.table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    /// Owning table.
    pub table: TableRef,
    /// Column name.
    pub column: Ident,
}

impl ColumnRef {
    /// Validate all three parts.
    pub fn new(schema: &str, table: &str, column: &str) -> Result<Self> {
        Ok(Self {
            table: TableRef::new(schema, table)?,
            column: Ident::new(column)?,
        })
    }

    /// `[column]`, for use inside a statement that already names the table.
    #[must_use]
    pub fn quoted_column(&self) -> String {
        self.column.quoted()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ident_compares_lowercased_and_quotes_spelling() {
        let ident = Ident::new("UnitMeasureCode").unwrap();
        assert_eq!(ident.as_str(), "unitmeasurecode");
        assert_eq!(ident.to_string(), "unitmeasurecode");
        assert_eq!(ident.quoted(), "[UnitMeasureCode]");
        assert_eq!(ident, Ident::new("unitmeasurecode").unwrap());
    }

    #[test]
    fn test_ident_rejects_injection() {
        for bad in ["", "1abc", "name; DROP TABLE x", "a]b", "a b", "a'b", "a.b", "a-b"] {
            assert!(
                matches!(Ident::new(bad), Err(Error::InvalidIdentifier(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_ident_length_limit() {
        assert!(Ident::new(&"a".repeat(MAX_IDENT_LEN)).is_ok());
        assert!(Ident::new(&"a".repeat(MAX_IDENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_table_and_column_refs() {
        let column = ColumnRef::new("Production", "Document", "FolderFlag").unwrap();
        assert_eq!(column.to_string(), "production.document.folderflag");
        assert_eq!(column.table.quoted(), "[Production].[Document]");
        assert_eq!(column.quoted_column(), "[FolderFlag]");
        assert_eq!(column, ColumnRef::new("production", "document", "folderflag").unwrap());
    }

    proptest! {
        #[test]
        fn prop_regular_identifiers_accepted(name in "[A-Za-z_][A-Za-z0-9_@#$]{0,60}") {
            let ident = Ident::new(&name).unwrap();
            prop_assert_eq!(ident.as_str(), name.to_lowercase());
        }

        #[test]
        fn prop_quoted_never_breaks_out(name in "\\PC{1,40}") {
            if let Ok(ident) = Ident::new(&name) {
                let quoted = ident.quoted();
                prop_assert!(quoted.starts_with('[') && quoted.ends_with(']'));
                prop_assert_eq!(quoted.matches(']').count(), 1);
                prop_assert!(!quoted.contains('\''));
                prop_assert!(!quoted.contains(';'));
            }
        }
    }
}
