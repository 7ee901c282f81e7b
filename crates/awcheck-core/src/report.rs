//! Per-check and per-run reports.
//!
//! Text rendering follows the layout the suite has always printed: purpose,
//! parameters, actual result, expected result. Colour is left to the caller.

use std::fmt;

use serde::Serialize;

use crate::checks::{status_of, CatalogCheck, Observation, Stage, Verdict};
use crate::error::Error;

/// Final state of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Result matched the expectation.
    Passed,
    /// Query ran; result did not match.
    Failed,
    /// Connection or query failed before a verdict.
    Error,
    /// Not run because a prerequisite stage did not pass.
    Skipped,
}

impl CheckStatus {
    /// Upper-case label for console output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::Skipped => "SKIPPED",
        }
    }
}

/// A named input of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Rendered value.
    pub value: String,
}

/// Everything printed for one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Check identifier.
    pub name: String,
    /// Stage the check belongs to.
    pub stage: Stage,
    /// What is verified.
    pub purpose: String,
    /// Inputs.
    pub parameters: Vec<Parameter>,
    /// Outcome.
    pub status: CheckStatus,
    /// Observed result, when the query ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Observation>,
    /// Expected result, when the query ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Observation>,
    /// Diagnostics for failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Error or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    fn base(check: &dyn CatalogCheck, status: CheckStatus) -> Self {
        Self {
            name: check.name(),
            stage: check.stage(),
            purpose: check.purpose(),
            parameters: check
                .parameters()
                .into_iter()
                .map(|(name, value)| Parameter {
                    name: name.to_string(),
                    value,
                })
                .collect(),
            status,
            actual: None,
            expected: None,
            details: Vec::new(),
            error: None,
        }
    }

    /// Report for a completed query.
    #[must_use]
    pub fn from_verdict(check: &dyn CatalogCheck, verdict: Verdict) -> Self {
        let mut report = Self::base(check, status_of(&verdict));
        report.actual = Some(verdict.actual);
        report.expected = Some(verdict.expected);
        report.details = verdict.details;
        report
    }

    /// Report for a check that could not produce a verdict.
    #[must_use]
    pub fn errored(check: &dyn CatalogCheck, err: &Error) -> Self {
        let mut report = Self::base(check, CheckStatus::Error);
        report.error = Some(err.to_string());
        report
    }

    /// Report for a check that was not run.
    #[must_use]
    pub fn skipped(check: &dyn CatalogCheck, reason: impl Into<String>) -> Self {
        let mut report = Self::base(check, CheckStatus::Skipped);
        report.error = Some(reason.into());
        report
    }

    /// `true` only for [`CheckStatus::Passed`].
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.name, self.stage)?;
        writeln!(f, "{}", self.purpose)?;
        writeln!(f, "Parameters:")?;
        for p in &self.parameters {
            writeln!(f, "{} = {}", p.name, p.value)?;
        }
        writeln!(f)?;
        if let (Some(actual), Some(expected)) = (&self.actual, &self.expected) {
            writeln!(f, "Actual result: {actual}")?;
            writeln!(f, "Expected result: {expected}")?;
        }
        for detail in &self.details {
            writeln!(f, "  - {detail}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Reason: {error}")?;
        }
        write!(f, "{}", self.status.label())
    }
}

/// Tally of statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Passed checks.
    pub passed: usize,
    /// Failed checks.
    pub failed: usize,
    /// Errored checks.
    pub errors: usize,
    /// Skipped checks.
    pub skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} errors, {} skipped",
            self.passed, self.failed, self.errors, self.skipped
        )
    }
}

/// Reports for a whole run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// One entry per check.
    pub checks: Vec<CheckReport>,
}

impl SuiteReport {
    /// Count statuses.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.checks.iter().fold(Summary::default(), |mut acc, r| {
            match r.status {
                CheckStatus::Passed => acc.passed += 1,
                CheckStatus::Failed => acc.failed += 1,
                CheckStatus::Error => acc.errors += 1,
                CheckStatus::Skipped => acc.skipped += 1,
            }
            acc
        })
    }

    /// `true` when every check passed (an empty run passes).
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(CheckReport::passed)
    }

    /// Process exit code: 0 when everything passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.all_passed())
    }

    /// `(name, status)` pairs, for comparing two runs.
    #[must_use]
    pub fn outcomes(&self) -> Vec<(&str, CheckStatus)> {
        self.checks
            .iter()
            .map(|r| (r.name.as_str(), r.status))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::TableExistence;
    use crate::ident::TableRef;

    fn check() -> TableExistence {
        TableExistence::new(TableRef::new("production", "unitmeasure").unwrap())
    }

    #[test]
    fn test_text_layout() {
        let verdict = Verdict::new(Observation::RowCount(1), Observation::RowCount(1));
        let text = CheckReport::from_verdict(&check(), verdict).to_string();
        assert_eq!(
            text,
            "existence/production.unitmeasure [existence]\n\
             Check if the given schema name and table name exist in the database.\n\
             Parameters:\n\
             schema_name = production\n\
             table_name = unitmeasure\n\
             \n\
             Actual result: 1 rows\n\
             Expected result: 1 rows\n\
             PASSED"
        );
    }

    #[test]
    fn test_summary_and_exit_code() {
        let c = check();
        let mut suite = SuiteReport::default();
        assert_eq!(suite.exit_code(), 0);

        suite.checks.push(CheckReport::from_verdict(
            &c,
            Verdict::new(Observation::RowCount(1), Observation::RowCount(1)),
        ));
        assert_eq!(suite.exit_code(), 0);

        suite.checks.push(CheckReport::errored(&c, &Error::Connection("refused".into())));
        suite.checks.push(CheckReport::skipped(&c, "stage existence did not pass"));
        assert_eq!(
            suite.summary(),
            Summary {
                passed: 1,
                failed: 0,
                errors: 1,
                skipped: 1
            }
        );
        assert_eq!(suite.summary().to_string(), "1 passed, 0 failed, 1 errors, 1 skipped");
        assert_eq!(suite.exit_code(), 1);
    }

    #[test]
    fn test_json_shape() {
        let report = CheckReport::skipped(&check(), "blocked");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["stage"], "existence");
        assert_eq!(json["parameters"][0]["name"], "schema_name");
        assert!(json.get("actual").is_none());
    }
}
