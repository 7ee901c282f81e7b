//! Sequential, stage-gated execution of a check list.
//!
//! Checks run one at a time, each on its own connection which is closed before
//! the next check starts. A stage whose prerequisites did not fully pass is
//! not run; its checks are reported as skipped.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::checks::{self, CatalogCheck, Stage};
use crate::config::Settings;
use crate::connection::MssqlConnection;
use crate::error::Result;
use crate::report::{CheckReport, SuiteReport};
use crate::source::RowSource;
use crate::suite::BoxedCheck;

/// Opens a fresh session for each check.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new session.
    async fn connect(&self) -> Result<Box<dyn RowSource>>;
}

/// Connector for a real SQL Server.
#[derive(Debug, Clone)]
pub struct MssqlConnector {
    settings: Settings,
}

impl MssqlConnector {
    /// Create a connector from settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self) -> Result<Box<dyn RowSource>> {
        Ok(Box::new(MssqlConnection::open(&self.settings).await?))
    }
}

/// Runs checks in order with stage gating.
pub struct Runner<'a> {
    connector: &'a dyn Connector,
}

impl<'a> Runner<'a> {
    /// Create a runner over a connector.
    #[must_use]
    pub fn new(connector: &'a dyn Connector) -> Self {
        Self { connector }
    }

    /// Run `checks` in the given order.
    ///
    /// Callers pass checks grouped by stage (as [`crate::suite::catalogue`]
    /// returns them); gating only considers stages already seen in this run.
    pub async fn run(&self, checks: &[BoxedCheck]) -> SuiteReport {
        let mut report = SuiteReport::default();
        let mut stage_passed: HashMap<Stage, bool> = HashMap::new();

        for check in checks {
            let stage = check.stage();
            let blocker = stage
                .depends_on()
                .iter()
                .find(|dep| stage_passed.get(*dep) == Some(&false));

            if let Some(blocker) = blocker {
                info!(check = %check.name(), "Skipped: stage '{}' did not pass", blocker);
                report.checks.push(CheckReport::skipped(
                    &**check,
                    format!("prerequisite stage '{blocker}' did not pass"),
                ));
                stage_passed.insert(stage, false);
                continue;
            }

            let outcome = self.run_one(&**check).await;
            info!(check = %outcome.name, "{}", outcome.status.label());
            *stage_passed.entry(stage).or_insert(true) &= outcome.passed();
            report.checks.push(outcome);
        }

        info!("Run finished: {}", report.summary());
        report
    }

    async fn run_one(&self, check: &dyn CatalogCheck) -> CheckReport {
        let mut source = match self.connector.connect().await {
            Ok(source) => source,
            Err(err) => {
                error!(check = %check.name(), "Connection failed: {}", err);
                return CheckReport::errored(check, &err);
            }
        };

        let report = checks::run(check, source.as_mut()).await;

        if let Err(err) = source.close().await {
            warn!(check = %check.name(), "Failed to close connection: {}", err);
        }
        report
    }
}
