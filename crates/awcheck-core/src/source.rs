//! The seam between checks and the database.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::values::SqlValue;

/// A statement with its bound parameters (`@P1`, `@P2`, ... in order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    /// Statement text; contains no literal values.
    pub sql: String,
    /// Values bound to `@P1..@Pn`.
    pub params: Vec<SqlValue>,
}

impl CatalogQuery {
    /// Create a query with no parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a bound parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Append several bound parameters.
    #[must_use]
    pub fn bind_all<'a>(mut self, values: impl IntoIterator<Item = &'a SqlValue>) -> Self {
        self.params.extend(values.into_iter().cloned());
        self
    }
}

/// One result row; every cell arrives as nullable text.
pub type Row = Vec<Option<String>>;

/// The rows of the first result set, in server order.
pub type RowSet = Vec<Row>;

/// Something that can run catalog queries.
///
/// Implementations hold one live session. `close` ends it; after `close`,
/// `fetch` returns [`crate::Error::Closed`].
#[async_trait]
pub trait RowSource: Send {
    /// Short name for logs ("mssql", "stub", ...).
    fn source_type(&self) -> &'static str;

    /// Run a query and collect its first result set.
    async fn fetch(&mut self, query: &CatalogQuery) -> Result<RowSet>;

    /// Release the session.
    async fn close(&mut self) -> Result<()>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_order_is_preserved() {
        let query = CatalogQuery::new("SELECT 1 WHERE @P1 = @P2")
            .bind("production")
            .bind(0_i64);
        assert_eq!(
            query.params,
            vec![SqlValue::Text("production".into()), SqlValue::Int(0)]
        );
    }

    #[tokio::test]
    async fn test_stub_refuses_after_close() {
        let mut source = stub::StubSource::empty();
        source.close().await.unwrap();
        let err = source.fetch(&CatalogQuery::new("SELECT 1")).await.unwrap_err();
        assert!(matches!(err, crate::Error::Closed));
    }
}
