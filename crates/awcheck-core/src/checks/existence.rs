//! Table existence.

use super::{render_row, CatalogCheck, Observation, Stage, Verdict};
use crate::ident::TableRef;
use crate::source::{CatalogQuery, RowSet};

const SQL: &str = "
SELECT
    SCHEMA_NAME(tab.schema_id) AS schema_name,
    tab.name AS table_name
FROM sys.tables AS tab
WHERE
    LOWER(tab.name) = @P2
    AND LOWER(SCHEMA_NAME(tab.schema_id)) = @P1;";

/// Exactly one table matches `schema.table`, case-insensitively.
#[derive(Debug, Clone)]
pub struct TableExistence {
    table: TableRef,
    expected_rows: usize,
}

impl TableExistence {
    /// Expect the table to exist.
    #[must_use]
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            expected_rows: 1,
        }
    }

    /// Expect the table not to exist.
    #[must_use]
    pub fn absent(table: TableRef) -> Self {
        Self {
            table,
            expected_rows: 0,
        }
    }
}

impl CatalogCheck for TableExistence {
    fn stage(&self) -> Stage {
        Stage::Existence
    }

    fn name(&self) -> String {
        if self.expected_rows == 0 {
            format!("absence/{}", self.table)
        } else {
            format!("existence/{}", self.table)
        }
    }

    fn purpose(&self) -> String {
        if self.expected_rows == 0 {
            "Check that the given schema name and table name do not exist in the database.".into()
        } else {
            "Check if the given schema name and table name exist in the database.".into()
        }
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
        let details = if rows.len() > 1 {
            rows.iter().map(|r| format!("match: {}", render_row(r))).collect()
        } else {
            Vec::new()
        };
        Verdict::new(
            Observation::RowCount(rows.len()),
            Observation::RowCount(self.expected_rows),
        )
        .with_details(details)
    }
}
