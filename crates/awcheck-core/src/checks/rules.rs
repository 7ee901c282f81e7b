//! Business-rule checks: numeric lower bounds and code-column references.

use super::{first_cells, render_row, CatalogCheck, Observation, Stage, Verdict};
use crate::ident::ColumnRef;
use crate::source::{CatalogQuery, RowSet};

/// No stored value of a numeric column is below `min`.
#[derive(Debug, Clone)]
pub struct LowerBound {
    column: ColumnRef,
    min: i64,
}

impl LowerBound {
    /// Create the check.
    #[must_use]
    pub fn new(column: ColumnRef, min: i64) -> Self {
        Self { column, min }
    }
}

impl CatalogCheck for LowerBound {
    fn stage(&self) -> Stage {
        Stage::Values
    }

    fn name(&self) -> String {
        format!("lower-bound/{}", self.column)
    }

    fn purpose(&self) -> String {
        format!(
            "Test if the {} column values are no less than {}.",
            self.column.column, self.min
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("schema_name", self.column.table.schema.to_string()),
            ("table_name", self.column.table.table.to_string()),
            ("column_name", self.column.column.to_string()),
            ("minimum", self.min.to_string()),
        ]
    }

    fn query(&self) -> CatalogQuery {
        let column = self.column.quoted_column();
        let sql = format!(
            "
SELECT DISTINCT CONVERT(NVARCHAR(4000), {column}) AS offending_value
FROM {table}
WHERE {column} < @P1;",
            table = self.column.table.quoted(),
        );
        CatalogQuery::new(sql).bind(self.min)
    }

    fn evaluate(&self, rows: &RowSet) -> Verdict {
        let details = first_cells(rows)
            .into_iter()
            .map(|v| format!("value below {}: {v}", self.min))
            .collect();
        Verdict::new(Observation::RowCount(rows.len()), Observation::RowCount(0)).with_details(details)
    }
}

/// Every code used by `dependent` exists in `reference`.
///
/// Runs a `FULL JOIN` from the reference table and reports rows whose
/// reference side is `NULL`.
#[derive(Debug, Clone)]
pub struct Referential {
    reference: ColumnRef,
    dependent: ColumnRef,
}

impl Referential {
    /// `dependent` must only hold values present in `reference`.
    #[must_use]
    pub fn new(reference: ColumnRef, dependent: ColumnRef) -> Self {
        Self {
            reference,
            dependent,
        }
    }
}

impl CatalogCheck for Referential {
    fn stage(&self) -> Stage {
        Stage::Values
    }

    fn name(&self) -> String {
        format!("references/{}->{}", self.dependent, self.reference)
    }

    fn purpose(&self) -> String {
        format!(
            "Test if the values in the {} column exist in the {} column.",
            self.dependent, self.reference
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("reference", self.reference.to_string()),
            ("dependent", self.dependent.to_string()),
        ]
    }

    fn query(&self) -> CatalogQuery {
        let r_col = self.reference.quoted_column();
        let d_col = self.dependent.quoted_column();
        CatalogQuery::new(format!(
            "
SELECT
    CONVERT(NVARCHAR(4000), r.{r_col}) AS reference_value,
    CONVERT(NVARCHAR(4000), d.{d_col}) AS dependent_value
FROM {r_table} AS r
FULL JOIN {d_table} AS d ON d.{d_col} = r.{r_col}
WHERE r.{r_col} IS NULL;",
            r_table = self.reference.table.quoted(),
            d_table = self.dependent.table.quoted(),
        ))
    }

    fn evaluate(&self, rows: &RowSet) -> Verdict {
        let details = rows
            .iter()
            .map(|r| format!("orphaned row: {}", render_row(r)))
            .collect();
        Verdict::new(Observation::RowCount(rows.len()), Observation::RowCount(0)).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::SqlValue;

    fn documentlevel() -> LowerBound {
        LowerBound::new(
            ColumnRef::new("production", "document", "documentlevel").unwrap(),
            0,
        )
    }

    fn unit_codes() -> Referential {
        Referential::new(
            ColumnRef::new("production", "unitmeasure", "unitmeasurecode").unwrap(),
            ColumnRef::new("purchasing", "productvendor", "unitmeasurecode").unwrap(),
        )
    }

    #[test]
    fn test_lower_bound_binds_minimum() {
        let query = documentlevel().query();
        assert!(query.sql.contains("WHERE [documentlevel] < @P1"));
        assert_eq!(query.params, vec![SqlValue::Int(0)]);
    }

    #[test]
    fn test_lower_bound_verdicts() {
        let check = documentlevel();
        assert!(check.evaluate(&Vec::new()).passed());

        let verdict = check.evaluate(&vec![vec![Some("-1".to_string())]]);
        assert!(!verdict.passed());
        assert_eq!(verdict.details, vec!["value below 0: -1".to_string()]);
    }

    #[test]
    fn test_referential_query_shape() {
        let query = unit_codes().query();
        assert!(query.sql.contains("FROM [production].[unitmeasure] AS r"));
        assert!(query
            .sql
            .contains("FULL JOIN [purchasing].[productvendor] AS d ON d.[unitmeasurecode] = r.[unitmeasurecode]"));
        assert!(query.sql.contains("WHERE r.[unitmeasurecode] IS NULL"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_referential_orphans_fail() {
        let check = unit_codes();
        assert!(check.evaluate(&Vec::new()).passed());

        let verdict = check.evaluate(&vec![vec![None, Some("XYZ".to_string())]]);
        assert!(!verdict.passed());
        assert_eq!(verdict.details, vec!["orphaned row: NULL | XYZ".to_string()]);
    }
}
