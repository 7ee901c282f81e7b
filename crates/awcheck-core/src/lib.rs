//! # awcheck core
//!
//! Schema and data-integrity checks for the `AdventureWorks2012` sample
//! database on SQL Server.
//!
//! Each check is one statement with bound parameters and a literal
//! expectation: a row count, an ordered column list, or a column -> type map.
//! Checks run against a [`RowSource`]; [`MssqlConnection`] is the real one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use awcheck_core::{checks, suite, MssqlConnection, RowSource, Settings};
//!
//! # async fn demo() -> awcheck_core::Result<()> {
//! let settings = Settings::load(None)?;
//! let mut conn = MssqlConnection::open(&settings).await?;
//!
//! for check in suite::existence_cases()? {
//!     let report = checks::run(&check, &mut conn).await;
//!     println!("{report}");
//! }
//!
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::useless_vec,
        clippy::manual_assert
    )
)]

pub mod checks;
pub mod config;
pub mod connection;
pub mod error;
pub mod ident;
pub mod report;
pub mod runner;
pub mod source;
pub mod suite;
pub mod values;

pub use checks::{CatalogCheck, Observation, Stage, Verdict};
pub use config::{Settings, DATABASE};
pub use connection::MssqlConnection;
pub use error::{Error, Result};
pub use ident::{ColumnRef, Ident, TableRef};
pub use report::{CheckReport, CheckStatus, SuiteReport, Summary};
pub use runner::{Connector, MssqlConnector, Runner};
pub use source::{CatalogQuery, Row, RowSet, RowSource};
pub use values::{AllowedValues, SqlValue};
