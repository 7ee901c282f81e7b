//! Column value domains.

use super::{first_cells, CatalogCheck, Observation, Stage, Verdict};
use crate::ident::ColumnRef;
use crate::source::{CatalogQuery, RowSet};
use crate::values::AllowedValues;

/// Every stored value of a column is in a permitted set.
///
/// NULLs are outside `NOT IN` semantics and are not reported.
#[derive(Debug, Clone)]
pub struct ValueDomain {
    column: ColumnRef,
    allowed: AllowedValues,
}

impl ValueDomain {
    /// Create the check.
    #[must_use]
    pub fn new(column: ColumnRef, allowed: AllowedValues) -> Self {
        Self { column, allowed }
    }
}

impl CatalogCheck for ValueDomain {
    fn stage(&self) -> Stage {
        Stage::Values
    }

    fn name(&self) -> String {
        format!("domain/{}", self.column)
    }

    fn purpose(&self) -> String {
        "Check if the values of the given schema name, table name and column name match expected values.".into()
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("schema_name", self.column.table.schema.to_string()),
            ("table_name", self.column.table.table.to_string()),
            ("column_name", self.column.column.to_string()),
            ("expected_values", self.allowed.to_string()),
        ]
    }

    fn query(&self) -> CatalogQuery {
        let column = self.column.quoted_column();
        let sql = format!(
            "
SELECT DISTINCT CONVERT(NVARCHAR(4000), {column}) AS offending_value
FROM {table}
WHERE {column} NOT IN ({placeholders});",
            table = self.column.table.quoted(),
            placeholders = self.allowed.placeholders(1),
        );
        CatalogQuery::new(sql).bind_all(self.allowed.values())
    }

    fn evaluate(&self, rows: &RowSet) -> Verdict {
        let details = first_cells(rows)
            .into_iter()
            .map(|v| format!("value outside domain: {v}"))
            .collect();
        Verdict::new(Observation::RowCount(rows.len()), Observation::RowCount(0)).with_details(details)
    }
}
