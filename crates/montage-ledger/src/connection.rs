//! Lazily established, reusable ledger connection.
//!
//! The connection is created on first use and cached. Before each reuse it
//! is checked with [`Connector::is_alive`]; a dead connection is replaced.
//! Concurrent callers serialize on the cell so only one of them reconnects.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::LedgerResult;
use crate::metrics::record_connect;

/// Establishes and probes connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Clone + Send + Sync;

    /// Open a new connection, resolving credentials as needed.
    async fn connect(&self) -> LedgerResult<Self::Connection>;

    /// True if `conn` can still serve requests.
    async fn is_alive(&self, conn: &Self::Connection) -> bool;
}

/// Connection cell that connects on first use and reconnects when stale.
pub struct LazyConnection<C: Connector> {
    connector: C,
    cell: Mutex<Option<C::Connection>>,
}

impl<C: Connector> LazyConnection<C> {
    /// Create an empty cell; nothing is connected until [`Self::get`].
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            cell: Mutex::new(None),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Get a live connection, connecting or reconnecting if necessary.
    pub async fn get(&self) -> LedgerResult<C::Connection> {
        let mut cell = self.cell.lock().await;

        let reconnect = match cell.as_ref() {
            Some(conn) if self.connector.is_alive(conn).await => {
                return Ok(conn.clone());
            }
            Some(_) => {
                warn!("Ledger connection is no longer alive, reconnecting");
                true
            }
            None => false,
        };

        *cell = None;
        let conn = self.connector.connect().await?;
        record_connect(reconnect);
        debug!(reconnect, "Ledger connection established");

        *cell = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the cached connection so the next [`Self::get`] reconnects.
    pub async fn invalidate(&self) {
        *self.cell.lock().await = None;
    }

    /// True if a connection is currently cached.
    pub async fn is_connected(&self) -> bool {
        self.cell.lock().await.is_some()
    }
}
