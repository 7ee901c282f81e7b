//! Catalog and data-quality checks.
//!
//! Every check is a single statement plus a literal expectation. A check only
//! builds its query and judges the rows; running it against a live session is
//! [`run`]'s job, so each check can be unit-tested against canned rows.

mod domain;
mod existence;
mod rules;
mod structure;
mod types;

pub use domain::ValueDomain;
pub use existence::TableExistence;
pub use rules::{LowerBound, Referential};
pub use structure::TableStructure;
pub use types::ColumnTypes;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::report::{CheckReport, CheckStatus};
use crate::source::{CatalogQuery, RowSet, RowSource};

/// Check groups, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Tables exist.
    Existence,
    /// Column lists match.
    Structure,
    /// Column types match.
    DataTypes,
    /// Stored values obey their domains and business rules.
    Values,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Existence,
        Stage::Structure,
        Stage::DataTypes,
        Stage::Values,
    ];

    /// Stages that must fully pass before this one is meaningful.
    #[must_use]
    pub fn depends_on(self) -> &'static [Stage] {
        match self {
            Stage::Existence => &[],
            Stage::Structure => &[Stage::Existence],
            Stage::DataTypes => &[Stage::Existence, Stage::Structure],
            Stage::Values => &[Stage::Existence, Stage::Structure, Stage::DataTypes],
        }
    }

    /// Kebab-case name used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Existence => "existence",
            Stage::Structure => "structure",
            Stage::DataTypes => "data-types",
            Stage::Values => "values",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown stage '{s}'"))
    }
}

/// What a query produced, or what it should have produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// Number of rows.
    RowCount(usize),
    /// Ordered column names.
    Columns(Vec<String>),
    /// Column name -> type name.
    Types(BTreeMap<String, String>),
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCount(n) => write!(f, "{n} rows"),
            Self::Columns(cols) => f.write_str(&cols.join(", ")),
            Self::Types(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}

/// Outcome of judging one row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// What the rows show.
    pub actual: Observation,
    /// What the check expects.
    pub expected: Observation,
    /// Human-readable diagnostics (offending values, missing columns, ...).
    pub details: Vec<String>,
    /// The rows contradict themselves, so `actual` is not trustworthy.
    pub conflicting: bool,
}

impl Verdict {
    /// Verdict without extra diagnostics.
    #[must_use]
    pub fn new(actual: Observation, expected: Observation) -> Self {
        Self {
            actual,
            expected,
            details: Vec::new(),
            conflicting: false,
        }
    }

    /// Attach diagnostics.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Mark the rows as self-contradictory; such a verdict never passes.
    #[must_use]
    pub fn with_conflict(mut self, conflicting: bool) -> Self {
        self.conflicting = conflicting;
        self
    }

    /// `true` when actual equals expected and the rows were consistent.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.conflicting && self.actual == self.expected
    }
}

/// A single catalog or data-quality check.
pub trait CatalogCheck: Send + Sync {
    /// Stage this check belongs to.
    fn stage(&self) -> Stage;

    /// Stable identifier, e.g. `existence/production.unitmeasure`.
    fn name(&self) -> String;

    /// One-sentence description of what is being verified.
    fn purpose(&self) -> String;

    /// Named inputs, for the report.
    fn parameters(&self) -> Vec<(&'static str, String)>;

    /// The statement to run.
    fn query(&self) -> CatalogQuery;

    /// Judge the returned rows.
    fn evaluate(&self, rows: &RowSet) -> Verdict;
}

/// Run one check on an open source.
///
/// Query failures come back as `Err`; a mismatch is a report with
/// [`CheckStatus::Failed`].
pub async fn execute(check: &dyn CatalogCheck, source: &mut dyn RowSource) -> Result<CheckReport> {
    let query = check.query();
    debug!(check = %check.name(), source = source.source_type(), "Running check");
    let rows = source.fetch(&query).await?;
    let verdict = check.evaluate(&rows);
    Ok(CheckReport::from_verdict(check, verdict))
}

/// Run one check and fold any error into the report.
pub async fn run(check: &dyn CatalogCheck, source: &mut dyn RowSource) -> CheckReport {
    match execute(check, source).await {
        Ok(report) => report,
        Err(err) => CheckReport::errored(check, &err),
    }
}

/// First cell of each row, skipping NULLs.
pub(crate) fn first_cells(rows: &RowSet) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.first().cloned().flatten())
        .collect()
}

/// Render a row as `a | b | NULL` for diagnostics.
pub(crate) fn render_row(row: &[Option<String>]) -> String {
    row.iter()
        .map(|cell| cell.as_deref().unwrap_or("NULL").trim_end().to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Status for a verdict.
pub(crate) fn status_of(verdict: &Verdict) -> CheckStatus {
    if verdict.passed() {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::stub::{row, StubSource};

    #[test]
    fn test_stage_dependencies_point_backwards() {
        for stage in Stage::ALL {
            for dep in stage.depends_on() {
                assert!(dep < &stage, "{stage} depends on later stage {dep}");
            }
        }
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!("data-types".parse::<Stage>(), Ok(Stage::DataTypes));
        assert_eq!("VALUES".parse::<Stage>(), Ok(Stage::Values));
        assert!("ordering".parse::<Stage>().is_err());
    }

    #[test]
    fn test_observation_display() {
        assert_eq!(Observation::RowCount(0).to_string(), "0 rows");
        assert_eq!(
            Observation::Columns(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
        let types = BTreeMap::from([("name".to_string(), "nvarchar".to_string())]);
        assert_eq!(Observation::Types(types).to_string(), "{name: nvarchar}");
    }

    #[test]
    fn test_render_row_handles_null_and_padding() {
        let cells = vec![None, Some("EA ".to_string())];
        assert_eq!(render_row(&cells), "NULL | EA");
    }

    #[tokio::test]
    async fn test_run_folds_query_error_into_report() {
        let check = TableExistence::new(crate::ident::TableRef::new("production", "document").unwrap());
        let mut source = StubSource::failing("Invalid object name");
        let report = run(&check, &mut source).await;
        assert_eq!(report.status, CheckStatus::Error);
        assert!(report.error.as_deref().unwrap_or_default().contains("Invalid object name"));
    }

    #[tokio::test]
    async fn test_execute_passes_on_expected_rows() {
        let check = TableExistence::new(crate::ident::TableRef::new("production", "document").unwrap());
        let mut source = StubSource::with_rows(vec![row(&["Production", "Document"])]);
        let report = execute(&check, &mut source).await.unwrap();
        assert_eq!(report.status, CheckStatus::Passed);
        assert_eq!(source.queries.len(), 1);
    }
}
