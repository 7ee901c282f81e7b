//! Shared fixture for live AdventureWorks2012 tests.
//!
//! Every test opens its own connection and closes it before returning. When an
//! assertion fails first, `MssqlConnection`'s `Drop` releases the socket.

#![allow(dead_code)]

use awcheck_core::{checks, CatalogCheck, CheckReport, CheckStatus, MssqlConnection, RowSource, Settings};

/// Connect using `db_host`, `db_username`, `db_password`.
///
/// A connectivity problem fails the test here, before any assertion.
pub async fn connect() -> MssqlConnection {
    let settings = Settings::load(None).expect("db_host, db_username and db_password must be set");
    MssqlConnection::open(&settings)
        .await
        .expect("Failed to connect to AdventureWorks2012")
}

/// Run one check on a fresh connection and print its report.
pub async fn run_check(check: &dyn CatalogCheck) -> CheckReport {
    let mut conn = connect().await;
    let report = checks::execute(check, &mut conn)
        .await
        .expect("Query failed");
    conn.close().await.expect("Failed to close connection");
    println!("{report}\n");
    report
}

/// Run a check and assert it passed, showing actual and expected on failure.
pub async fn assert_check_passes(check: &dyn CatalogCheck) {
    let report = run_check(check).await;
    assert_eq!(
        report.status,
        CheckStatus::Passed,
        "{}: actual {:?}, expected {:?}, details {:?}",
        report.name,
        report.actual,
        report.expected,
        report.details
    );
}
