//! SQL Server connection over TDS.
//!
//! One [`MssqlConnection`] is opened per check and closed right after it.
//! `close` ends the session gracefully; if the owner bails out early (an
//! error, a failed assertion) `Drop` still releases the socket.

use async_trait::async_trait;
use tiberius::{Client, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

use crate::config::{Settings, DATABASE};
use crate::error::{Error, Result};
use crate::source::{CatalogQuery, Row, RowSet, RowSource};
use crate::values::SqlValue;

type TdsClient = Client<Compat<TcpStream>>;

/// A live session against [`DATABASE`].
pub struct MssqlConnection {
    client: Option<TdsClient>,
    address: String,
}

impl MssqlConnection {
    /// Connect and log in. Not retried.
    pub async fn open(settings: &Settings) -> Result<Self> {
        let address = settings.address();
        debug!("Connecting to {} at {}", DATABASE, address);

        let tcp = TcpStream::connect(&address)
            .await
            .map_err(|e| Error::Connection(format!("{address}: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| Error::Connection(format!("{address}: {e}")))?;

        let client = Client::connect(settings.tds_config(), tcp.compat_write())
            .await
            .map_err(|e| Error::Connection(format!("login to {DATABASE} at {address} failed: {e}")))?;

        info!("Connected to the {} database.", DATABASE);
        Ok(Self {
            client: Some(client),
            address,
        })
    }

    /// `false` once `close` has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

fn decode_row(row: &tiberius::Row) -> Result<Row> {
    (0..row.columns().len())
        .map(|idx| {
            row.try_get::<&str, usize>(idx)
                .map(|cell| cell.map(str::to_owned))
                .map_err(|e| Error::Query(format!("column {idx}: {e}")))
        })
        .collect()
}

#[async_trait]
impl RowSource for MssqlConnection {
    fn source_type(&self) -> &'static str {
        "mssql"
    }

    async fn fetch(&mut self, query: &CatalogQuery) -> Result<RowSet> {
        let client = self.client.as_mut().ok_or(Error::Closed)?;
        debug!(sql = %query.sql.trim(), params = query.params.len(), "Executing query");

        let mut statement = Query::new(query.sql.as_str());
        for param in &query.params {
            match param {
                SqlValue::Int(n) => statement.bind(*n),
                SqlValue::Text(s) => statement.bind(s.as_str()),
            }
        }

        let rows = statement
            .query(client)
            .await
            .map_err(|e| Error::Query(e.to_string()))?
            .into_first_result()
            .await
            .map_err(|e| Error::Query(e.to_string()))?;

        debug!("Fetched {} rows", rows.len());
        rows.iter().map(decode_row).collect()
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
            info!("Disconnected from the {} database.", DATABASE);
        }
        Ok(())
    }
}

impl Drop for MssqlConnection {
    fn drop(&mut self) {
        if self.client.take().is_some() {
            warn!(
                "Connection to {} at {} dropped without close; socket released",
                DATABASE, self.address
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_for_port(port: u16) -> Settings {
        Settings {
            host: "127.0.0.1".to_string(),
            username: "sa".to_string(),
            password: "unused".to_string(),
            port,
            trust_server_certificate: true,
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = match MssqlConnection::open(&settings_for_port(port)).await {
            Ok(_) => panic!("connected to a closed port"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::Connection(_)), "got {err:?}");
        assert!(err.to_string().contains(&format!("127.0.0.1:{port}")));
    }

    #[tokio::test]
    async fn test_non_tds_peer_fails_login() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        tokio::spawn(async move {
            // Accept and hang up without speaking TDS.
            if let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let err = match MssqlConnection::open(&settings_for_port(port)).await {
            Ok(_) => panic!("login succeeded against a non-TDS peer"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::Connection(_)), "got {err:?}");
    }
}
