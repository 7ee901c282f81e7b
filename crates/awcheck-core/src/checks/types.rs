//! Column data types.

use std::collections::BTreeMap;

use super::{CatalogCheck, Observation, Stage, Verdict};
use crate::ident::TableRef;
use crate::source::{CatalogQuery, RowSet};

// User-defined types (e.g. `dbo.Name`) share a system_type_id with their base
// type; the `sys` schema filter keeps only built-ins, and `sysname` is the one
// built-in alias of `nvarchar` that would otherwise appear twice. CLR types
// (`hierarchyid`, `geometry`, `geography`) still share id 240, so a column of
// one of them comes back once per CLR type name.
const SQL: &str = "
SELECT
    LOWER(col.name) AS column_name,
    LOWER(ty.name) AS column_type
FROM sys.tables AS tab
INNER JOIN sys.columns AS col ON col.object_id = tab.object_id
INNER JOIN sys.types AS ty ON ty.system_type_id = col.system_type_id
WHERE
    LOWER(SCHEMA_NAME(tab.schema_id)) = @P1
    AND LOWER(SCHEMA_NAME(ty.schema_id)) = 'sys'
    AND LOWER(tab.name) = @P2
    AND ty.name <> 'sysname'
ORDER BY column_name;";

/// The table's column -> built-in type mapping equals an expected mapping.
#[derive(Debug, Clone)]
pub struct ColumnTypes {
    table: TableRef,
    expected: BTreeMap<String, String>,
}

impl ColumnTypes {
    /// Column and type names are compared lower-cased.
    #[must_use]
    pub fn new<K, V>(table: TableRef, expected: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table,
            expected: expected
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into().to_lowercase()))
                .collect(),
        }
    }
}

impl CatalogCheck for ColumnTypes {
    fn stage(&self) -> Stage {
        Stage::DataTypes
    }

    fn name(&self) -> String {
        format!("data-types/{}", self.table)
    }

    fn purpose(&self) -> String {
        "Check if the datatypes of the given schema name and table name match expected columns datatypes.".into()
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("schema_name", self.table.schema.to_string()),
            ("table_name", self.table.table.to_string()),
        ]
    }

    fn query(&self) -> CatalogQuery {
        CatalogQuery::new(SQL)
            .bind(self.table.schema.as_str())
            .bind(self.table.table.as_str())
    }

    fn evaluate(&self, rows: &RowSet) -> Verdict {
        let mut actual: BTreeMap<String, String> = BTreeMap::new();
        let mut details = Vec::new();
        let mut conflicting = false;

        for row in rows {
            let (Some(Some(column)), Some(Some(ty))) = (row.first(), row.get(1)) else {
                continue;
            };
            match actual.get(column) {
                Some(previous) if previous != ty => {
                    conflicting = true;
                    details.push(format!("column {column} resolved to both {previous} and {ty}"));
                }
                Some(_) => {}
                None => {
                    actual.insert(column.clone(), ty.clone());
                }
            }
        }

        for (column, ty) in &self.expected {
            match actual.get(column) {
                None => details.push(format!("missing column: {column} ({ty})")),
                Some(found) if found != ty => {
                    details.push(format!("type mismatch: {column} is {found}, expected {ty}"));
                }
                Some(_) => {}
            }
        }
        for (column, ty) in &actual {
            if !self.expected.contains_key(column) {
                details.push(format!("unexpected column: {column} ({ty})"));
            }
        }

        Verdict::new(
            Observation::Types(actual),
            Observation::Types(self.expected.clone()),
        )
        .with_details(details)
        .with_conflict(conflicting)
    }
}
