//! Table column lists.

use super::{first_cells, CatalogCheck, Observation, Stage, Verdict};
use crate::ident::TableRef;
use crate::source::{CatalogQuery, RowSet};

const SQL: &str = "
SELECT LOWER(col.name) AS column_name
FROM sys.tables AS tab
LEFT JOIN sys.columns AS col ON col.object_id = tab.object_id
WHERE
    LOWER(tab.name) = @P2
    AND LOWER(SCHEMA_NAME(tab.schema_id)) = @P1
ORDER BY column_name;";

/// The table's lower-cased column names, sorted, equal an expected list.
#[derive(Debug, Clone)]
pub struct TableStructure {
    table: TableRef,
    expected: Vec<String>,
}

impl TableStructure {
    /// `expected` is compared as given: order and membership both matter.
    #[must_use]
    pub fn new<S: Into<String>>(table: TableRef, expected: impl IntoIterator<Item = S>) -> Self {
        Self {
            table,
            expected: expected.into_iter().map(Into::into).collect(),
        }
    }
}

impl CatalogCheck for TableStructure {
    fn stage(&self) -> Stage {
        Stage::Structure
    }

    fn name(&self) -> String {
        format!("structure/{}", self.table)
    }

    fn purpose(&self) -> String {
        "Check if the structure of the given schema name and table name matches expected list of column names.".into()
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
        let actual = first_cells(rows);

        let mut details: Vec<String> = self
            .expected
            .iter()
            .filter(|c| !actual.contains(c))
            .map(|c| format!("missing column: {c}"))
            .collect();
        details.extend(
            actual
                .iter()
                .filter(|c| !self.expected.contains(c))
                .map(|c| format!("unexpected column: {c}")),
        );

        Verdict::new(
            Observation::Columns(actual),
            Observation::Columns(self.expected.clone()),
        )
        .with_details(details)
    }
}
