//! Client for the finished-video ledger.
//!
//! This crate provides:
//! - The [`VideoLedger`] trait and its HTTP implementation
//! - A lazily established, health-checked connection cell
//! - Retry with exponential backoff and jitter
//! - Request metrics

pub mod client;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod types;

pub use client::{HttpConnector, HttpLedger, LedgerConfig, LedgerSession, VideoLedger};
pub use connection::{Connector, LazyConnection};
pub use error::{LedgerError, LedgerResult};
pub use retry::RetryConfig;
pub use types::{RecordReceipt, VideoRecord};
